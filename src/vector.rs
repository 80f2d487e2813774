//! A persistent vector backed by the bitmapped vector trie.
//!
//! [`Vector`] keeps the current root and the element count; every mutation
//! swaps in a new root produced by the engine in [`node`] and leaves every
//! previously cloned handle untouched. `clone` is O(1) and clones share all
//! unchanged subtrees.

pub(crate) mod node;

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use node::Node;

/// A persistent (immutable, structurally shared) vector.
///
/// Random access and append run in O(log32 n). Mid-sequence insertion and
/// removal truncate the trie at the edit point and re-append the suffix, so
/// they cost O(n) in the distance to the back.
///
/// # Examples
///
/// ```
/// use coppice::Vector;
///
/// let mut v: Vector<i32> = (0..5).collect();
/// let before = v.clone();
/// v.push_back(5);
/// assert_eq!(v.len(), 6);
/// assert_eq!(before.len(), 5);
/// assert_eq!(v[5], 5);
/// ```
pub struct Vector<T> {
    root: Arc<Node<T>>,
    count: usize,
}

impl<T> Vector<T> {
    /// Creates an empty vector.
    pub fn new() -> Self {
        Vector {
            root: Arc::new(Node::Empty),
            count: 0,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.count
    }

    /// True when no elements are stored.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Reference to the element at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<&T> {
        (index < self.count).then(|| self.root.nth(index))
    }

    /// Reference to the last element, or `None` when empty.
    pub fn last(&self) -> Option<&T> {
        self.count.checked_sub(1).map(|i| self.root.nth(i))
    }

    /// Iterates over the elements front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            stack: match *self.root {
                Node::Empty => Vec::new(),
                _ => vec![&*self.root],
            },
            leaf: Default::default(),
            remaining: self.count,
        }
    }
}

impl<T: Clone> Vector<T> {
    /// Appends `element` at the back.
    pub fn push_back(&mut self, element: T) {
        self.root = Node::append(&self.root, element, self.count);
        self.count += 1;
        debug_assert!(self.count <= node::capacity(self.root.level()));
    }

    /// Removes and returns the last element.
    pub fn pop_back(&mut self) -> Option<T> {
        let last = self.count.checked_sub(1)?;
        let popped = self.root.nth(last).clone();
        if last == 0 {
            self.root = Arc::new(Node::Empty);
        } else {
            self.root = Node::remove(&self.root, last - 1);
        }
        self.count = last;
        Some(popped)
    }

    /// Replaces the element at `index`.
    ///
    /// Panics when `index` is out of range.
    pub fn set(&mut self, index: usize, element: T) {
        assert!(
            index < self.count,
            "index out of range: {} >= {}",
            index,
            self.count
        );
        self.root = Node::update(&self.root, element, index);
    }

    /// Inserts `element` at `index`, shifting the suffix back by one.
    ///
    /// The trie is truncated at `index` with `element` as the new last slot
    /// and the displaced suffix is re-appended. Panics when
    /// `index > len()`.
    pub fn insert(&mut self, index: usize, element: T) {
        assert!(
            index <= self.count,
            "index out of range: {} > {}",
            index,
            self.count
        );
        if index == self.count {
            self.push_back(element);
            return;
        }
        let suffix: Vec<T> = self.iter().skip(index).cloned().collect();
        self.root = Node::update_and_remove(&self.root, element, index);
        self.count = index + 1;
        for e in suffix {
            self.push_back(e);
        }
    }

    /// Removes and returns the element at `index`, shifting the suffix
    /// forward by one.
    ///
    /// Panics when `index` is out of range.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(
            index < self.count,
            "index out of range: {} >= {}",
            index,
            self.count
        );
        let removed = self.root.nth(index).clone();
        let suffix: Vec<T> = self.iter().skip(index + 1).cloned().collect();
        if index == 0 {
            self.root = Arc::new(Node::Empty);
            self.count = 0;
        } else {
            self.root = Node::remove(&self.root, index - 1);
            self.count = index;
        }
        for e in suffix {
            self.push_back(e);
        }
        removed
    }
}

impl<T> Default for Vector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Vector<T> {
    fn clone(&self) -> Self {
        Vector {
            root: self.root.clone(),
            count: self.count,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for Vector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for Vector<T> {}

impl<T> Index<usize> for Vector<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.get(index)
            .unwrap_or_else(|| panic!("index out of range: {} >= {}", index, self.count))
    }
}

impl<T: Clone> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut v = Vector::new();
        v.extend(iter);
        v
    }
}

impl<T: Clone> Extend<T> for Vector<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for e in iter {
            self.push_back(e);
        }
    }
}

/// Strategy producing vectors of elements drawn from `element`.
#[cfg(feature = "proptest")]
pub fn arb_vector<T, S>(
    element: S,
    size: impl Into<proptest::collection::SizeRange>,
) -> impl proptest::strategy::Strategy<Value = Vector<T>>
where
    T: Clone + fmt::Debug,
    S: proptest::strategy::Strategy<Value = T>,
{
    use proptest::strategy::Strategy as _;
    proptest::collection::vec(element, size).prop_map(Vector::from_iter)
}

/// Iterator over element references, front to back.
pub struct Iter<'a, T> {
    /// Unvisited subtrees, rightmost at the bottom.
    stack: Vec<&'a Node<T>>,
    leaf: std::slice::Iter<'a, T>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.leaf.next() {
                self.remaining -= 1;
                return Some(item);
            }
            match self.stack.pop()? {
                Node::Empty => {}
                Node::Leaf(elems) => self.leaf = elems.iter(),
                Node::Level { children, .. } => {
                    self.stack.extend(children.iter().rev().map(|c| &**c));
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> std::iter::FusedIterator for Iter<'a, T> {}

impl<'a, T> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator; elements are cloned out of the shared trie.
pub struct IntoIter<T> {
    vector: Vector<T>,
    front: usize,
}

impl<T: Clone> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.vector.get(self.front).cloned()?;
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vector.len() - self.front;
        (remaining, Some(remaining))
    }
}

impl<T: Clone> ExactSizeIterator for IntoIter<T> {}

impl<T: Clone> IntoIterator for Vector<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            vector: self,
            front: 0,
        }
    }
}
