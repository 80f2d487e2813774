//! Persistent (immutable, structurally shared) trie collections.
//!
//! Every mutating operation produces a new version of a structure while
//! leaving all previously obtained versions valid and unaffected; unchanged
//! subtrees are shared by reference instead of copied. Two engines carry
//! the library:
//!
//! - a **bitmapped vector trie** (fixed fanout 32, index-addressed) behind
//!   [`Vector`], and
//! - a **little-endian Patricia trie** over 32-bit hash keys, with in-leaf
//!   collision buckets, behind [`Set`] and [`Map`].
//!
//! Wrappers expose the familiar `&mut self` surface; persistence comes from
//! O(1) `clone`. A clone taken before a mutation keeps observing the old
//! version:
//!
//! ```
//! use coppice::Vector;
//!
//! let grove: Vector<&str> = ["oak", "ash"].into_iter().collect();
//! let mut pruned = grove.clone();
//! pruned.remove(0);
//! assert_eq!(grove.len(), 2);
//! assert_eq!(pruned.len(), 1);
//! assert_eq!(pruned[0], "ash");
//! ```
//!
//! Nodes are immutable once constructed and shared through `Arc`, so any
//! number of threads may read any version concurrently; handing a
//! collection to another thread is an ordinary move or clone.

mod cow;
mod hash;
pub mod map;
mod patricia;
pub mod set;
pub mod vector;

pub use map::Map;
pub use set::Set;
pub use vector::Vector;
