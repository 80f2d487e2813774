//! A persistent hash set backed by the Patricia engine.
//!
//! Elements are folded to 32-bit keys by [`crate::hash`]; values whose
//! hashes collide share one leaf through a
//! [`ValueBucket`](crate::patricia::bucket::ValueBucket). The set holds the
//! current root and an element count, and translates the engine's
//! empty-subtree sentinel back to the canonical empty root. `clone` is O(1).
//!
//! No enumeration order is guaranteed.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::hash::key_hash;
use crate::patricia::bucket::ValueBucket;
use crate::patricia::{modify_root, ModifyOp, Tree, Values};

/// A persistent (immutable, structurally shared) hash set.
///
/// # Examples
///
/// ```
/// use coppice::Set;
///
/// let mut s = Set::new();
/// s.insert("fir");
/// let before = s.clone();
/// s.insert("alder");
/// s.remove(&"fir");
/// assert!(before.contains(&"fir"));
/// assert!(!before.contains(&"alder"));
/// assert!(s.contains(&"alder"));
/// ```
pub struct Set<T> {
    root: Option<Arc<Tree<ValueBucket<T>>>>,
    len: usize,
}

struct InsertValue<'a, T> {
    value: &'a T,
    added: bool,
}

impl<T: Clone + PartialEq> ModifyOp<ValueBucket<T>> for InsertValue<'_, T> {
    fn on_found(&mut self, bucket: &ValueBucket<T>) -> Option<ValueBucket<T>> {
        let new = bucket.insert(self.value.clone());
        self.added = new.len() > bucket.len();
        Some(new)
    }

    fn on_insert(&mut self) -> Option<ValueBucket<T>> {
        self.added = true;
        Some(ValueBucket::single(self.value.clone()))
    }
}

struct RemoveValue<'a, T> {
    value: &'a T,
    removed: bool,
}

impl<T: Clone + PartialEq> ModifyOp<ValueBucket<T>> for RemoveValue<'_, T> {
    fn on_found(&mut self, bucket: &ValueBucket<T>) -> Option<ValueBucket<T>> {
        match bucket.remove(self.value) {
            None => {
                self.removed = true;
                None
            }
            Some(new) => {
                self.removed = new.len() < bucket.len();
                Some(new)
            }
        }
    }

    fn on_insert(&mut self) -> Option<ValueBucket<T>> {
        None
    }
}

impl<T> Set<T> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Set { root: None, len: 0 }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no elements are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over the elements in no particular order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter(Values::new(self.root.as_ref()))
    }
}

impl<T: Hash + PartialEq + Clone> Set<T> {
    /// True when an equal value is stored.
    pub fn contains(&self, value: &T) -> bool {
        self.root
            .as_ref()
            .and_then(|root| root.find(key_hash(value)))
            .is_some_and(|bucket| bucket.contains(value))
    }

    /// Adds `value`. Returns true when the set did not already contain it.
    pub fn insert(&mut self, value: T) -> bool {
        let mut op = InsertValue {
            value: &value,
            added: false,
        };
        self.root = modify_root(&self.root, key_hash(&value), &mut op);
        if op.added {
            self.len += 1;
        }
        op.added
    }

    /// Removes `value`. Returns true when it was present.
    pub fn remove(&mut self, value: &T) -> bool {
        let mut op = RemoveValue {
            value,
            removed: false,
        };
        self.root = modify_root(&self.root, key_hash(value), &mut op);
        if op.removed {
            self.len -= 1;
        }
        op.removed
    }
}

impl<T> Default for Set<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Set<T> {
    fn clone(&self) -> Self {
        Set {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Set<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Hash + PartialEq + Clone> PartialEq for Set<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|v| other.contains(v))
    }
}

impl<T: Hash + Eq + Clone> Eq for Set<T> {}

impl<T: Hash + PartialEq + Clone> FromIterator<T> for Set<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut s = Set::new();
        s.extend(iter);
        s
    }
}

impl<T: Hash + PartialEq + Clone> Extend<T> for Set<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for v in iter {
            self.insert(v);
        }
    }
}

/// Strategy producing sets of elements drawn from `element`.
///
/// `size` bounds the number of *drawn* elements; duplicates collapse, so
/// the resulting set may be smaller.
#[cfg(feature = "proptest")]
pub fn arb_set<T, S>(
    element: S,
    size: impl Into<proptest::collection::SizeRange>,
) -> impl proptest::strategy::Strategy<Value = Set<T>>
where
    T: Hash + PartialEq + Clone + fmt::Debug,
    S: proptest::strategy::Strategy<Value = T>,
{
    use proptest::strategy::Strategy as _;
    proptest::collection::vec(element, size).prop_map(Set::from_iter)
}

/// Iterator over element references in no particular order.
pub struct Iter<'a, T>(Values<'a, ValueBucket<T>>);

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl<'a, T> std::iter::FusedIterator for Iter<'a, T> {}

impl<'a, T> IntoIterator for &'a Set<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
