//! A persistent hash map backed by the Patricia engine.
//!
//! Keys are folded to 32-bit integer keys by [`crate::hash`]; pairs whose
//! key hashes collide share one leaf through a
//! [`PairBucket`](crate::patricia::bucket::PairBucket), which resolves them
//! by key equality. The map holds the current root and a pair count;
//! `clone` is O(1) and clones share all unchanged subtrees.
//!
//! No enumeration order is guaranteed.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::hash::key_hash;
use crate::patricia::bucket::PairBucket;
use crate::patricia::{modify_root, ModifyOp, Tree, Values};

/// A persistent (immutable, structurally shared) hash map.
///
/// # Examples
///
/// ```
/// use coppice::Map;
///
/// let mut m = Map::new();
/// m.insert("rings", 3);
/// let before = m.clone();
/// m.insert("rings", 4);
/// assert_eq!(before.get(&"rings"), Some(&3));
/// assert_eq!(m.get(&"rings"), Some(&4));
/// ```
pub struct Map<K, V> {
    root: Option<Arc<Tree<PairBucket<K, V>>>>,
    len: usize,
}

struct InsertPair<'a, K, V> {
    key: &'a K,
    value: &'a V,
    previous: Option<V>,
}

impl<K, V> ModifyOp<PairBucket<K, V>> for InsertPair<'_, K, V>
where
    K: Clone + PartialEq,
    V: Clone,
{
    fn on_found(&mut self, bucket: &PairBucket<K, V>) -> Option<PairBucket<K, V>> {
        self.previous = bucket.get(self.key).cloned();
        Some(bucket.insert(self.key.clone(), self.value.clone()))
    }

    fn on_insert(&mut self) -> Option<PairBucket<K, V>> {
        Some(PairBucket::single(self.key.clone(), self.value.clone()))
    }
}

struct RemovePair<'a, K, V> {
    key: &'a K,
    previous: Option<V>,
}

impl<K, V> ModifyOp<PairBucket<K, V>> for RemovePair<'_, K, V>
where
    K: Clone + PartialEq,
    V: Clone,
{
    fn on_found(&mut self, bucket: &PairBucket<K, V>) -> Option<PairBucket<K, V>> {
        self.previous = bucket.get(self.key).cloned();
        bucket.remove(self.key)
    }

    fn on_insert(&mut self) -> Option<PairBucket<K, V>> {
        None
    }
}

impl<K, V> Map<K, V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Map { root: None, len: 0 }
    }

    /// Number of key-value pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no pairs are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over the pairs in no particular order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter(Values::new(self.root.as_ref()))
    }

    /// Iterates over the keys in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    /// Iterates over the values in no particular order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }
}

impl<K, V> Map<K, V>
where
    K: Hash + PartialEq + Clone,
    V: Clone + PartialEq,
{
    /// Reference to the value bound to `key`, or `None`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.root
            .as_ref()
            .and_then(|root| root.find(key_hash(key)))
            .and_then(|bucket| bucket.get(key))
    }

    /// True when a binding for `key` exists.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Binds `key` to `value`; returns the previously bound value, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut op = InsertPair {
            key: &key,
            value: &value,
            previous: None,
        };
        self.root = modify_root(&self.root, key_hash(&key), &mut op);
        if op.previous.is_none() {
            self.len += 1;
        }
        op.previous
    }

    /// Removes the binding for `key`; returns the bound value, if any.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let mut op = RemovePair {
            key,
            previous: None,
        };
        self.root = modify_root(&self.root, key_hash(key), &mut op);
        if op.previous.is_some() {
            self.len -= 1;
        }
        op.previous
    }
}

impl<K, V> Default for Map<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for Map<K, V> {
    fn clone(&self) -> Self {
        Map {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Map<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> PartialEq for Map<K, V>
where
    K: Hash + PartialEq + Clone,
    V: Clone + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|w| v == w))
    }
}

impl<K, V> Eq for Map<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone + Eq,
{
}

impl<K, V> FromIterator<(K, V)> for Map<K, V>
where
    K: Hash + PartialEq + Clone,
    V: Clone + PartialEq,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Map::new();
        m.extend(iter);
        m
    }
}

impl<K, V> Extend<(K, V)> for Map<K, V>
where
    K: Hash + PartialEq + Clone,
    V: Clone + PartialEq,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

/// Strategy producing maps of pairs drawn from `entry`.
///
/// `size` bounds the number of *drawn* pairs; later bindings for a drawn
/// key replace earlier ones, so the resulting map may be smaller.
#[cfg(feature = "proptest")]
pub fn arb_map<K, V, S>(
    entry: S,
    size: impl Into<proptest::collection::SizeRange>,
) -> impl proptest::strategy::Strategy<Value = Map<K, V>>
where
    K: Hash + PartialEq + Clone + fmt::Debug,
    V: Clone + PartialEq + fmt::Debug,
    S: proptest::strategy::Strategy<Value = (K, V)>,
{
    use proptest::strategy::Strategy as _;
    proptest::collection::vec(entry, size).prop_map(Map::from_iter)
}

/// Iterator over key-value reference pairs in no particular order.
pub struct Iter<'a, K, V>(Values<'a, PairBucket<K, V>>);

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (k, v))
    }
}

impl<'a, K, V> std::iter::FusedIterator for Iter<'a, K, V> {}

impl<'a, K, V> IntoIterator for &'a Map<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
