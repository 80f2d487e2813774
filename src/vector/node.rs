//! The bitmapped vector trie engine.
//!
//! A tree of fixed fanout [`FANOUT`] addressed by element index: level 0
//! nodes hold elements, higher levels hold up to [`FANOUT`] children one
//! level below. Every operation is pure; a mutation reallocates only the
//! path from the root to the touched leaf and shares every other subtree
//! with the previous version.
//!
//! The engine is stateless about the global element count. Callers pass the
//! pre-append count to [`Node::append`] and keep the root level consistent
//! with it; height grows by one exactly when the count reaches the capacity
//! of the current root level.

use std::sync::Arc;

use arrayvec::ArrayVec;

use crate::cow;

/// Bits of the index consumed per tree level.
pub(crate) const BITS: usize = 5;
/// Branching factor, `2^BITS`.
pub(crate) const FANOUT: usize = 1 << BITS;
/// Mask extracting the slot within one node.
pub(crate) const MASK: usize = FANOUT - 1;

/// Slot of `index` at `level`.
#[inline]
pub(crate) fn local_slot(index: usize, level: usize) -> usize {
    (index >> (BITS * level)) & MASK
}

/// Number of elements a full subtree rooted at `level` holds.
#[inline]
pub(crate) fn capacity(level: usize) -> usize {
    1 << (BITS * (level + 1))
}

#[derive(Debug)]
pub(crate) enum Node<T> {
    /// The zero-element tree. Only [`Node::append`] is defined on it.
    Empty,
    /// Up to [`FANOUT`] elements, level 0.
    Leaf(ArrayVec<T, FANOUT>),
    /// Up to [`FANOUT`] children, each one level below `level >= 1`.
    Level {
        level: usize,
        children: ArrayVec<Arc<Node<T>>, FANOUT>,
    },
}

impl<T> Node<T> {
    pub(crate) fn level(&self) -> usize {
        match self {
            Node::Empty | Node::Leaf(_) => 0,
            Node::Level { level, .. } => *level,
        }
    }

    /// Reads the element at `index`.
    ///
    /// Precondition: `index` addresses an occupied slot; in particular the
    /// node must not be `Empty`.
    pub(crate) fn nth(&self, index: usize) -> &T {
        match self {
            Node::Empty => panic!("nth on an empty vector trie"),
            Node::Leaf(elems) => &elems[local_slot(index, 0)],
            Node::Level { level, children } => children[local_slot(index, *level)].nth(index),
        }
    }
}

impl<T: Clone> Node<T> {
    /// Builds the minimal chain of single-child levels holding exactly
    /// `element`, rooted at `level`.
    fn fresh_subtree(element: T, level: usize) -> Arc<Self> {
        let mut elems = ArrayVec::new();
        elems.push(element);
        let mut node = Arc::new(Node::Leaf(elems));
        for l in 1..=level {
            let mut children = ArrayVec::new();
            children.push(node);
            node = Arc::new(Node::Level { level: l, children });
        }
        node
    }

    /// Appends `element` as the new last element.
    ///
    /// `count` is the global element count *before* the append. Returns the
    /// new root, which sits one level higher than `node` exactly when
    /// `count` filled the current root to capacity.
    pub(crate) fn append(node: &Arc<Self>, element: T, count: usize) -> Arc<Self> {
        match &**node {
            Node::Empty => Self::fresh_subtree(element, 0),
            Node::Leaf(elems) => {
                if elems.len() < FANOUT {
                    Arc::new(Node::Leaf(cow::append(elems, element)))
                } else {
                    let mut children = ArrayVec::new();
                    children.push(node.clone());
                    children.push(Self::fresh_subtree(element, 0));
                    Arc::new(Node::Level { level: 1, children })
                }
            }
            Node::Level { level, children } => {
                if count == capacity(*level) {
                    let mut roots = ArrayVec::new();
                    roots.push(node.clone());
                    roots.push(Self::fresh_subtree(element, *level));
                    return Arc::new(Node::Level {
                        level: level + 1,
                        children: roots,
                    });
                }
                let slot = local_slot(count, *level);
                if slot == children.len() {
                    let child = Self::fresh_subtree(element, level - 1);
                    Arc::new(Node::Level {
                        level: *level,
                        children: cow::append(children, child),
                    })
                } else {
                    let child = Self::append(&children[slot], element, count);
                    Arc::new(Node::Level {
                        level: *level,
                        children: cow::update(children, slot, child),
                    })
                }
            }
        }
    }

    /// Replaces the element at `index`, sharing every untouched subtree.
    ///
    /// Precondition: `index` addresses an occupied slot.
    pub(crate) fn update(node: &Arc<Self>, element: T, index: usize) -> Arc<Self> {
        match &**node {
            Node::Empty => panic!("update on an empty vector trie"),
            Node::Leaf(elems) => Arc::new(Node::Leaf(cow::update(
                elems,
                local_slot(index, 0),
                element,
            ))),
            Node::Level { level, children } => {
                let slot = local_slot(index, *level);
                let child = Self::update(&children[slot], element, index);
                Arc::new(Node::Level {
                    level: *level,
                    children: cow::update(children, slot, child),
                })
            }
        }
    }

    /// Replaces the element at `index` and discards everything after it.
    ///
    /// A level whose addressed slot is 0 hands its truncated child up
    /// directly, so no single-child level survives below the root.
    pub(crate) fn update_and_remove(node: &Arc<Self>, element: T, index: usize) -> Arc<Self> {
        match &**node {
            Node::Empty => panic!("update_and_remove on an empty vector trie"),
            Node::Leaf(elems) => {
                let slot = local_slot(index, 0);
                let mut out = cow::truncate(elems, slot);
                out.push(element);
                Arc::new(Node::Leaf(out))
            }
            Node::Level { level, children } => {
                let slot = local_slot(index, *level);
                let child = Self::update_and_remove(&children[slot], element, index);
                if slot == 0 {
                    return child;
                }
                let mut out = cow::truncate(children, slot);
                out.push(child);
                Arc::new(Node::Level {
                    level: *level,
                    children: out,
                })
            }
        }
    }

    /// Truncates to the elements at or before `index`, with the same
    /// single-child collapse rule as [`Node::update_and_remove`].
    pub(crate) fn remove(node: &Arc<Self>, index: usize) -> Arc<Self> {
        match &**node {
            Node::Empty => panic!("remove on an empty vector trie"),
            Node::Leaf(elems) => {
                let slot = local_slot(index, 0);
                Arc::new(Node::Leaf(cow::truncate(elems, slot + 1)))
            }
            Node::Level { level, children } => {
                let slot = local_slot(index, *level);
                let child = Self::remove(&children[slot], index);
                if slot == 0 {
                    return child;
                }
                let mut out = cow::truncate(children, slot);
                out.push(child);
                Arc::new(Node::Level {
                    level: *level,
                    children: out,
                })
            }
        }
    }
}
