//! Little-endian Patricia trie over 32-bit integer keys.
//!
//! A binary radix tree branching on the lowest bit at which keys differ,
//! after Okasaki and Gill, "Fast Mergeable Integer Maps". Leaves carry a
//! collision [`bucket`](self::bucket) holding every value stored under one
//! key; branches carry the common `prefix` of their subtree and a `mask`
//! with exactly the branching bit set.
//!
//! Nodes are shared across versions through `Arc` and never mutated after
//! construction: a modification reallocates the spine from the touched leaf
//! to the root and reuses everything else by reference. A branch always has
//! two non-empty children by construction; the empty tree exists only as
//! the caller-held `None` root, so a one-armed branch is unrepresentable.

pub(crate) mod bucket;

use std::sync::Arc;

use bucket::Bucket;

/// Returns an integer with only the lowest set bit of `n` set.
///
/// Precondition: `n != 0`.
#[inline]
pub(crate) fn lowest_bit(n: i32) -> i32 {
    debug_assert_ne!(n, 0);
    n & n.wrapping_neg()
}

/// Returns the lowest bit at which `a` and `b` differ, or 0 when they are
/// equal.
#[inline]
pub(crate) fn branching_bit(a: i32, b: i32) -> i32 {
    if a == b {
        0
    } else {
        lowest_bit(a ^ b)
    }
}

/// Whether `key` agrees with `prefix` on every bit below `mask`.
#[inline]
pub(crate) fn match_prefix(key: i32, prefix: i32, mask: i32) -> bool {
    (key & mask.wrapping_sub(1)) == prefix
}

#[derive(Debug)]
pub(crate) enum Tree<B> {
    /// One key and the bucket of values colliding on it.
    Leaf { key: i32, bucket: B },
    /// A binary fork on the bit in `mask`. Keys with that bit clear sit in
    /// `left`, keys with it set in `right`; all of them agree with `prefix`
    /// below `mask`.
    Branch {
        prefix: i32,
        mask: i32,
        left: Arc<Tree<B>>,
        right: Arc<Tree<B>>,
    },
}

/// Joins two subtrees whose representative keys differ, under a fresh
/// branch on their branching bit. The subtree whose key has the bit clear
/// becomes the left child.
///
/// Precondition: `key_a != key_b`.
pub(crate) fn join<B>(
    key_a: i32,
    a: Arc<Tree<B>>,
    key_b: i32,
    b: Arc<Tree<B>>,
) -> Arc<Tree<B>> {
    let bb = branching_bit(key_a, key_b);
    debug_assert_ne!(bb, 0);
    let prefix = key_a & bb.wrapping_sub(1);
    if key_a & bb == 0 {
        Arc::new(Tree::Branch {
            prefix,
            mask: bb,
            left: a,
            right: b,
        })
    } else {
        Arc::new(Tree::Branch {
            prefix,
            mask: bb,
            left: b,
            right: a,
        })
    }
}

/// The single mutation primitive: insert, update and removal are all
/// expressed through one of these handed to [`modify_root`].
///
/// Exactly one of the two methods is invoked per modification:
/// [`ModifyOp::on_found`] when the key is present (`None` deletes the
/// bucket), [`ModifyOp::on_insert`] when it is absent (`None` leaves the
/// tree untouched).
pub(crate) trait ModifyOp<B> {
    fn on_found(&mut self, bucket: &B) -> Option<B>;
    fn on_insert(&mut self) -> Option<B>;
}

/// Applies `op` at `key`, starting from a caller-held root.
///
/// Returns the new root, or `None` when the modification emptied the tree;
/// a no-op modification hands back the identical root `Arc`.
pub(crate) fn modify_root<B, M>(
    root: &Option<Arc<Tree<B>>>,
    key: i32,
    op: &mut M,
) -> Option<Arc<Tree<B>>>
where
    B: PartialEq,
    M: ModifyOp<B>,
{
    match root {
        None => op.on_insert().map(|bucket| Arc::new(Tree::Leaf { key, bucket })),
        Some(node) => Tree::modify(node, key, op),
    }
}

impl<B> Tree<B> {
    /// Exact-key lookup.
    pub(crate) fn find(&self, key: i32) -> Option<&B> {
        match self {
            Tree::Leaf { key: k, bucket } => (*k == key).then_some(bucket),
            Tree::Branch {
                prefix,
                mask,
                left,
                right,
            } => {
                if !match_prefix(key, *prefix, *mask) {
                    None
                } else if key & *mask == 0 {
                    left.find(key)
                } else {
                    right.find(key)
                }
            }
        }
    }
}

impl<B: PartialEq> Tree<B> {
    /// See [`modify_root`]. `None` means this subtree became empty; the
    /// caller at *every* level substitutes the sibling in its place, so a
    /// one-armed branch never survives a removal.
    pub(crate) fn modify<M: ModifyOp<B>>(
        node: &Arc<Self>,
        key: i32,
        op: &mut M,
    ) -> Option<Arc<Self>> {
        match &**node {
            Tree::Leaf { key: k, bucket } => {
                if *k == key {
                    match op.on_found(bucket) {
                        None => None,
                        Some(new) if new == *bucket => Some(node.clone()),
                        Some(new) => Some(Arc::new(Tree::Leaf { key, bucket: new })),
                    }
                } else {
                    match op.on_insert() {
                        None => Some(node.clone()),
                        Some(new) => Some(join(
                            key,
                            Arc::new(Tree::Leaf { key, bucket: new }),
                            *k,
                            node.clone(),
                        )),
                    }
                }
            }
            Tree::Branch {
                prefix,
                mask,
                left,
                right,
            } => {
                if !match_prefix(key, *prefix, *mask) {
                    match op.on_insert() {
                        None => Some(node.clone()),
                        Some(new) => Some(join(
                            key,
                            Arc::new(Tree::Leaf { key, bucket: new }),
                            *prefix,
                            node.clone(),
                        )),
                    }
                } else if key & *mask == 0 {
                    match Self::modify(left, key, op) {
                        None => Some(right.clone()),
                        Some(new_left) if Arc::ptr_eq(&new_left, left) => Some(node.clone()),
                        Some(new_left) => Some(Arc::new(Tree::Branch {
                            prefix: *prefix,
                            mask: *mask,
                            left: new_left,
                            right: right.clone(),
                        })),
                    }
                } else {
                    match Self::modify(right, key, op) {
                        None => Some(left.clone()),
                        Some(new_right) if Arc::ptr_eq(&new_right, right) => Some(node.clone()),
                        Some(new_right) => Some(Arc::new(Tree::Branch {
                            prefix: *prefix,
                            mask: *mask,
                            left: left.clone(),
                            right: new_right,
                        })),
                    }
                }
            }
        }
    }
}

/// Depth-first traversal over every value in every bucket. Lazy; a new
/// traversal starts from scratch each time one is created. No ordering
/// beyond "radix order of the hashed keys" is promised.
pub(crate) struct Values<'a, B: Bucket> {
    stack: Vec<&'a Tree<B>>,
    leaf: std::slice::Iter<'a, B::Item>,
}

impl<'a, B: Bucket> Values<'a, B> {
    pub(crate) fn new(root: Option<&'a Arc<Tree<B>>>) -> Self {
        Values {
            stack: root.map(|r| vec![&**r]).unwrap_or_default(),
            leaf: Default::default(),
        }
    }
}

impl<'a, B: Bucket> Iterator for Values<'a, B> {
    type Item = &'a B::Item;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.leaf.next() {
                return Some(item);
            }
            match self.stack.pop()? {
                Tree::Leaf { bucket, .. } => self.leaf = bucket.items().iter(),
                Tree::Branch { left, right, .. } => {
                    self.stack.push(right);
                    self.stack.push(left);
                }
            }
        }
    }
}

impl<'a, B: Bucket> std::iter::FusedIterator for Values<'a, B> {}

#[cfg(test)]
mod tests {
    use super::bucket::ValueBucket;
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    struct InsertOne(i32);

    impl ModifyOp<ValueBucket<i32>> for InsertOne {
        fn on_found(&mut self, bucket: &ValueBucket<i32>) -> Option<ValueBucket<i32>> {
            Some(bucket.insert(self.0))
        }

        fn on_insert(&mut self) -> Option<ValueBucket<i32>> {
            Some(ValueBucket::single(self.0))
        }
    }

    struct RemoveOne(i32);

    impl ModifyOp<ValueBucket<i32>> for RemoveOne {
        fn on_found(&mut self, bucket: &ValueBucket<i32>) -> Option<ValueBucket<i32>> {
            bucket.remove(&self.0)
        }

        fn on_insert(&mut self) -> Option<ValueBucket<i32>> {
            None
        }
    }

    type Root = Option<Arc<Tree<ValueBucket<i32>>>>;

    fn insert(root: &Root, key: i32) -> Root {
        modify_root(root, key, &mut InsertOne(key))
    }

    fn remove(root: &Root, key: i32) -> Root {
        modify_root(root, key, &mut RemoveOne(key))
    }

    fn naive_branching_bit(a: i32, b: i32) -> i32 {
        for i in 0..32 {
            let bit = 1i32.wrapping_shl(i);
            if a & bit != b & bit {
                return bit;
            }
        }
        0
    }

    #[test]
    fn two_keys_make_one_branch_in_either_order() {
        for (first, second) in [(0x1FFF, 0x2FFF), (0x2FFF, 0x1FFF)] {
            let root = insert(&insert(&None, first), second);
            let node = root.as_ref().expect("tree is non-empty");
            let Tree::Branch {
                prefix,
                mask,
                left,
                right,
            } = &**node
            else {
                panic!("expected a branch root")
            };
            assert_eq!(*mask, 0x1000);
            assert_eq!(*prefix, 0x0FFF);
            assert!(matches!(&**left, Tree::Leaf { key: 0x2FFF, .. }));
            assert!(matches!(&**right, Tree::Leaf { key: 0x1FFF, .. }));
            assert!(node.find(0x1FFF).is_some());
            assert!(node.find(0x2FFF).is_some());
        }
    }

    #[test]
    fn removing_one_of_two_leaves_collapses_the_branch() {
        let root = insert(&insert(&None, 0x1FFF), 0x2FFF);
        let root = remove(&root, 0x2FFF);
        let node = root.as_ref().expect("one key remains");
        assert!(matches!(&**node, Tree::Leaf { key: 0x1FFF, .. }));
        let root = remove(&root, 0x1FFF);
        assert!(root.is_none());
    }

    #[test]
    fn noop_modify_returns_the_identical_node() {
        let mut root = None;
        for key in [3, -7, 1024, i32::MIN, 0] {
            root = insert(&root, key);
        }
        let before = root.clone().expect("non-empty");
        for key in [3, -7, 1024, i32::MIN, 0] {
            root = insert(&root, key);
            assert!(
                Arc::ptr_eq(&before, root.as_ref().expect("non-empty")),
                "re-inserting {} reallocated the spine",
                key
            );
            // Removing an absent key is a no-op too.
            root = remove(&root, key ^ 0x55AA_55AA_u32 as i32);
            assert!(Arc::ptr_eq(&before, root.as_ref().expect("non-empty")));
        }
    }

    #[test]
    fn modify_shares_the_untouched_sibling() {
        let mut root: Root = None;
        for key in 0..64 {
            root = insert(&root, key);
        }
        let before = root.clone().expect("non-empty");
        // Keys 0..64 differ first on bit 0: evens left, odds right.
        let Tree::Branch {
            mask: 1,
            left: old_left,
            right: old_right,
            ..
        } = &*before
        else {
            panic!("expected a branch root on bit 0")
        };

        // A genuine modification under key 1 reallocates the right spine
        // only.
        root = modify_root(&root, 1, &mut InsertOne(999));
        let after = root.clone().expect("non-empty");
        assert!(!Arc::ptr_eq(&before, &after));
        let Tree::Branch {
            left: new_left,
            right: new_right,
            ..
        } = &*after
        else {
            panic!("expected a branch root")
        };
        assert!(Arc::ptr_eq(old_left, new_left));
        assert!(!Arc::ptr_eq(old_right, new_right));

        assert!(after
            .find(1)
            .is_some_and(|b| b.contains(&1) && b.contains(&999)));
        assert!(before.find(1).is_some_and(|b| !b.contains(&999)));
    }

    #[test]
    fn colliding_values_share_one_leaf() {
        struct InsertValue(i32);

        impl ModifyOp<ValueBucket<i32>> for InsertValue {
            fn on_found(&mut self, bucket: &ValueBucket<i32>) -> Option<ValueBucket<i32>> {
                Some(bucket.insert(self.0))
            }

            fn on_insert(&mut self) -> Option<ValueBucket<i32>> {
                Some(ValueBucket::single(self.0))
            }
        }

        let mut root: Root = None;
        for value in [10, 20, 30] {
            root = modify_root(&root, 42, &mut InsertValue(value));
        }
        let node = root.as_ref().expect("non-empty");
        let Tree::Leaf { key: 42, bucket } = &**node else {
            panic!("expected a single collision leaf")
        };
        assert_eq!(bucket.len(), 3);
        for value in [10, 20, 30] {
            assert!(bucket.contains(&value));
        }
        root = modify_root(&root, 42, &mut RemoveOne(20));
        let node = root.as_ref().expect("non-empty");
        let bucket = node.find(42).expect("key still present");
        assert_eq!(bucket.len(), 2);
        assert!(!bucket.contains(&20));
    }

    proptest! {
        #[test]
        fn branching_bit_matches_naive_scan(a in any::<i32>(), b in any::<i32>()) {
            prop_assert_eq!(branching_bit(a, b), naive_branching_bit(a, b));
        }

        #[test]
        fn branching_bit_handles_sign_boundaries(a in prop::sample::select(
            vec![0, -1, 1, i32::MIN, i32::MAX, i32::MIN + 1, i32::MAX - 1])) {
            for b in [0, -1, 1, i32::MIN, i32::MAX] {
                prop_assert_eq!(branching_bit(a, b), naive_branching_bit(a, b));
            }
        }

        #[test]
        fn round_trip(keys in prop::collection::vec(any::<i32>(), 1..1000)) {
            let mut root: Root = None;
            let mut model = HashSet::new();
            for &key in &keys {
                root = insert(&root, key);
                model.insert(key);
            }
            for key in &model {
                let bucket = root.as_ref().and_then(|n| n.find(*key));
                prop_assert!(bucket.is_some_and(|b| b.contains(key)));
            }
            let mut values: Vec<i32> = Values::new(root.as_ref()).copied().collect();
            let mut expected: Vec<i32> = model.iter().copied().collect();
            values.sort_unstable();
            expected.sort_unstable();
            prop_assert_eq!(values, expected);
        }

        #[test]
        fn interleaved_insert_remove(ops in prop::collection::vec((any::<bool>(), -50i32..50), 1..1000)) {
            let mut root: Root = None;
            let mut model = HashSet::new();
            for &(is_insert, key) in &ops {
                if is_insert {
                    root = insert(&root, key);
                    model.insert(key);
                } else {
                    root = remove(&root, key);
                    model.remove(&key);
                }
                prop_assert_eq!(root.is_none(), model.is_empty());
            }
            for key in -50i32..50 {
                let found = root.as_ref().and_then(|n| n.find(key)).is_some();
                prop_assert_eq!(found, model.contains(&key), "key {}", key);
            }
        }
    }
}
