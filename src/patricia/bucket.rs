//! Associative backends: the collision buckets stored in Patricia leaves.
//!
//! A bucket holds every value whose hash collides on one integer key. The
//! buckets are plain boxed slices built with the copy-on-write helpers;
//! like the tree nodes they are never mutated after construction. Buckets
//! stay tiny in practice, so membership is a linear scan.

use crate::cow;

/// Read access shared by all bucket flavors; the tree iterators flatten
/// buckets through this.
pub(crate) trait Bucket {
    type Item;
    fn items(&self) -> &[Self::Item];
}

/// Collision bucket for sets; membership by value equality.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValueBucket<T>(Box<[T]>);

impl<T: Clone + PartialEq> ValueBucket<T> {
    pub(crate) fn single(value: T) -> Self {
        Self(Box::new([value]))
    }

    pub(crate) fn contains(&self, value: &T) -> bool {
        self.0.iter().any(|v| v == value)
    }

    /// Appends `value` unless an equal one is already present, in which
    /// case the result equals `self`.
    pub(crate) fn insert(&self, value: T) -> Self {
        if self.contains(&value) {
            self.clone()
        } else {
            Self(cow::slice_append(&self.0, value))
        }
    }

    /// Drops one value equal to `value`. Returns `None` when that removes
    /// the sole remaining member, and an unchanged-equal bucket when the
    /// value is absent.
    pub(crate) fn remove(&self, value: &T) -> Option<Self> {
        match self.0.iter().position(|v| v == value) {
            None => Some(self.clone()),
            Some(_) if self.0.len() == 1 => None,
            Some(i) => Some(Self(cow::slice_excise(&self.0, i))),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

impl<T> Bucket for ValueBucket<T> {
    type Item = T;

    fn items(&self) -> &[T] {
        &self.0
    }
}

/// Collision bucket for maps; membership by key equality.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PairBucket<K, V>(Box<[(K, V)]>);

impl<K: Clone + PartialEq, V: Clone> PairBucket<K, V> {
    pub(crate) fn single(key: K, value: V) -> Self {
        Self(Box::new([(key, value)]))
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Binds `key` to `value`, replacing an existing binding for the same
    /// key.
    pub(crate) fn insert(&self, key: K, value: V) -> Self {
        match self.0.iter().position(|(k, _)| *k == key) {
            Some(i) => Self(cow::slice_update(&self.0, i, (key, value))),
            None => Self(cow::slice_append(&self.0, (key, value))),
        }
    }

    /// Drops the binding for `key`. Returns `None` when that removes the
    /// sole remaining pair, and an unchanged-equal bucket when the key is
    /// absent.
    pub(crate) fn remove(&self, key: &K) -> Option<Self> {
        match self.0.iter().position(|(k, _)| k == key) {
            None => Some(self.clone()),
            Some(_) if self.0.len() == 1 => None,
            Some(i) => Some(Self(cow::slice_excise(&self.0, i))),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K, V> Bucket for PairBucket<K, V> {
    type Item = (K, V);

    fn items(&self) -> &[(K, V)] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_bucket_insert_is_idempotent() {
        let b = ValueBucket::single(1).insert(2).insert(1);
        assert_eq!(b.len(), 2);
        assert_eq!(b, b.insert(2));
    }

    #[test]
    fn value_bucket_remove_signals_emptiness() {
        let b = ValueBucket::single(7);
        assert_eq!(b.remove(&8), Some(b.clone()));
        assert_eq!(b.remove(&7), None);
        let b = b.insert(8);
        assert_eq!(b.remove(&7), Some(ValueBucket::single(8)));
    }

    #[test]
    fn pair_bucket_replaces_by_key() {
        let b = PairBucket::single("a", 1).insert("b", 2).insert("a", 3);
        assert_eq!(b.len(), 2);
        assert_eq!(b.get(&"a"), Some(&3));
        assert_eq!(b.get(&"b"), Some(&2));
        assert_eq!(b.get(&"c"), None);
    }

    #[test]
    fn pair_bucket_remove_signals_emptiness() {
        let b = PairBucket::single("a", 1);
        assert_eq!(b.remove(&"z"), Some(b.clone()));
        assert_eq!(b.remove(&"a"), None);
    }
}
