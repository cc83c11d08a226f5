// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Interval Tree
//!
//! This module provides an augmented balanced search tree over closed
//! intervals `[start, last]`. It is the lookup structure behind the range
//! lock: every pending or granted range lives here so that overlap queries
//! stay logarithmic.
//!
//! # Design
//!
//! - **AVL balanced**: height stays within `1.44 * log2(n)`
//! - **Augmented**: each node caches the largest `last` in its subtree so
//!   overlap searches prune whole subtrees
//! - **Ordered by `(start, seq)`**: the sequence number breaks ties between
//!   intervals sharing a start, so every key is unique
//! - **Arena storage**: nodes live in a slot vector with an embedded free
//!   list; a [`NodeId`] stays valid until that node is removed
//! - **No locking**: callers serialize access themselves
//!
//! | Operation             | Cost           |
//! |-----------------------|----------------|
//! | `insert`              | O(log n)       |
//! | `remove`              | O(log n)       |
//! | `for_each_overlap`    | O(k log n)     |

use alloc::collections::TryReserveError;
use alloc::vec::Vec;
use core::cmp::{self, Ordering};

/// Handle to a node stored in an [`IntervalTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Slot index of this node
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A stored interval and its payload
#[derive(Debug)]
pub struct IntervalNode<T> {
    start: u64,
    last: u64,
    seq: u64,
    left: Option<usize>,
    right: Option<usize>,
    height: u32,
    /// Largest `last` in the subtree rooted here
    subtree_last: u64,
    value: T,
}

impl<T> IntervalNode<T> {
    /// First point covered by the interval
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last point covered by the interval (inclusive)
    pub fn last(&self) -> u64 {
        self.last
    }

    /// Tie-breaking sequence number
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Payload
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Mutable payload
    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    fn key(&self) -> (u64, u64) {
        (self.start, self.seq)
    }
}

#[derive(Debug)]
enum Slot<T> {
    Occupied(IntervalNode<T>),
    /// Free slot, linked to the next free slot
    Vacant(Option<usize>),
}

/// Augmented AVL tree of closed intervals
#[derive(Debug)]
pub struct IntervalTree<T> {
    slots: Vec<Slot<T>>,
    free: Option<usize>,
    root: Option<usize>,
    len: usize,
}

impl<T> IntervalTree<T> {
    /// Create an empty tree
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            root: None,
            len: 0,
        }
    }

    /// Create an empty tree with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: None,
            root: None,
            len: 0,
        }
    }

    /// Number of stored intervals
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree holds no intervals
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop every interval
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
        self.root = None;
        self.len = 0;
    }

    /// Look up a node
    pub fn get(&self, id: NodeId) -> Option<&IntervalNode<T>> {
        match self.slots.get(id.0) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    /// Look up a node mutably
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut IntervalNode<T>> {
        match self.slots.get_mut(id.0) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    /// Insert `[start, last]` keyed by `(start, seq)`
    ///
    /// Storage is reserved before the tree is touched: on failure the tree
    /// is unchanged. `seq` must be unique among stored intervals.
    pub fn insert(
        &mut self,
        start: u64,
        last: u64,
        seq: u64,
        value: T,
    ) -> Result<NodeId, TryReserveError> {
        debug_assert!(start <= last, "interval [{}, {}] is reversed", start, last);

        if self.free.is_none() {
            self.slots.try_reserve(1)?;
        }

        let node = IntervalNode {
            start,
            last,
            seq,
            left: None,
            right: None,
            height: 1,
            subtree_last: last,
            value,
        };

        let idx = match self.free {
            Some(idx) => {
                if let Slot::Vacant(next) = self.slots[idx] {
                    self.free = next;
                }
                self.slots[idx] = Slot::Occupied(node);
                idx
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                self.slots.len() - 1
            }
        };

        self.root = Some(self.insert_at(self.root, idx));
        self.len += 1;
        Ok(NodeId(idx))
    }

    /// Remove a node, returning its payload
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        let key = self.get(id)?.key();
        self.root = self.remove_at(self.root, key);

        let slot = core::mem::replace(&mut self.slots[id.0], Slot::Vacant(self.free));
        self.free = Some(id.0);
        self.len -= 1;

        match slot {
            Slot::Occupied(node) => Some(node.value),
            Slot::Vacant(_) => None,
        }
    }

    /// Visit every interval overlapping `[start, last]`, in key order
    pub fn for_each_overlap<F>(&self, start: u64, last: u64, mut f: F)
    where
        F: FnMut(NodeId, &IntervalNode<T>),
    {
        self.visit(self.root, start, last, &mut f);
    }

    /// Visit every interval overlapping `[start, last]` with mutable payload
    /// access, in key order
    pub fn for_each_overlap_mut<F>(&mut self, start: u64, last: u64, mut f: F)
    where
        F: FnMut(NodeId, &mut IntervalNode<T>),
    {
        self.visit_mut(self.root, start, last, &mut f);
    }

    /// Check whether any stored interval overlaps `[start, last]`
    pub fn overlaps(&self, start: u64, last: u64) -> bool {
        let mut cur = self.root;
        while let Some(idx) = cur {
            let node = self.node(idx);
            if node.start <= last && start <= node.last {
                return true;
            }
            // The left subtree can only hold a match if its max `last`
            // reaches `start`; otherwise only the right one can.
            cur = match node.left {
                Some(left) if self.node(left).subtree_last >= start => Some(left),
                _ if node.start > last => None,
                _ => node.right,
            };
        }
        false
    }

    /// Visit every interval in key order
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(NodeId, &IntervalNode<T>),
    {
        self.walk(self.root, &mut f);
    }

    /// Check the structural invariants of the whole tree
    ///
    /// Panics if the key order, AVL balance, cached heights, cached
    /// subtree maxima, or node count are inconsistent.
    pub fn validate(&self) {
        let mut count = 0;
        self.validate_at(self.root, None, None, &mut count);
        assert_eq!(count, self.len, "interval tree: node count mismatch");
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn node(&self, idx: usize) -> &IntervalNode<T> {
        match &self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => panic!("interval tree: link to free slot {}", idx),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut IntervalNode<T> {
        match &mut self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => panic!("interval tree: link to free slot {}", idx),
        }
    }

    fn height(&self, idx: Option<usize>) -> u32 {
        idx.map_or(0, |i| self.node(i).height)
    }

    fn balance_factor(&self, idx: usize) -> i64 {
        let node = self.node(idx);
        i64::from(self.height(node.left)) - i64::from(self.height(node.right))
    }

    /// Recompute the cached height and subtree maximum of one node
    fn update(&mut self, idx: usize) {
        let (left, right, last) = {
            let node = self.node(idx);
            (node.left, node.right, node.last)
        };

        let mut subtree_last = last;
        for child in [left, right].into_iter().flatten() {
            subtree_last = cmp::max(subtree_last, self.node(child).subtree_last);
        }
        let height = 1 + cmp::max(self.height(left), self.height(right));

        let node = self.node_mut(idx);
        node.height = height;
        node.subtree_last = subtree_last;
    }

    fn rotate_right(&mut self, idx: usize) -> usize {
        let pivot = match self.node(idx).left {
            Some(pivot) => pivot,
            None => return idx,
        };
        let inner = self.node(pivot).right;
        self.node_mut(idx).left = inner;
        self.node_mut(pivot).right = Some(idx);
        self.update(idx);
        self.update(pivot);
        pivot
    }

    fn rotate_left(&mut self, idx: usize) -> usize {
        let pivot = match self.node(idx).right {
            Some(pivot) => pivot,
            None => return idx,
        };
        let inner = self.node(pivot).left;
        self.node_mut(idx).right = inner;
        self.node_mut(pivot).left = Some(idx);
        self.update(idx);
        self.update(pivot);
        pivot
    }

    /// Restore the AVL property at `idx`, returning the new subtree root
    fn rebalance(&mut self, idx: usize) -> usize {
        self.update(idx);
        let balance = self.balance_factor(idx);

        if balance > 1 {
            if let Some(left) = self.node(idx).left {
                if self.balance_factor(left) < 0 {
                    let new_left = self.rotate_left(left);
                    self.node_mut(idx).left = Some(new_left);
                }
            }
            return self.rotate_right(idx);
        }

        if balance < -1 {
            if let Some(right) = self.node(idx).right {
                if self.balance_factor(right) > 0 {
                    let new_right = self.rotate_right(right);
                    self.node_mut(idx).right = Some(new_right);
                }
            }
            return self.rotate_left(idx);
        }

        idx
    }

    fn insert_at(&mut self, root: Option<usize>, idx: usize) -> usize {
        let root = match root {
            Some(root) => root,
            None => return idx,
        };

        if self.node(idx).key() < self.node(root).key() {
            let left = self.node(root).left;
            let new_left = self.insert_at(left, idx);
            self.node_mut(root).left = Some(new_left);
        } else {
            let right = self.node(root).right;
            let new_right = self.insert_at(right, idx);
            self.node_mut(root).right = Some(new_right);
        }

        self.rebalance(root)
    }

    fn remove_at(&mut self, root: Option<usize>, key: (u64, u64)) -> Option<usize> {
        let root = root?;
        let (left, right) = {
            let node = self.node(root);
            (node.left, node.right)
        };

        match key.cmp(&self.node(root).key()) {
            Ordering::Less => {
                let new_left = self.remove_at(left, key);
                self.node_mut(root).left = new_left;
            }
            Ordering::Greater => {
                let new_right = self.remove_at(right, key);
                self.node_mut(root).right = new_right;
            }
            Ordering::Equal => {
                return match (left, right) {
                    (None, None) => None,
                    (Some(child), None) | (None, Some(child)) => Some(child),
                    (Some(left), Some(right)) => {
                        let (new_right, successor) = self.remove_min(right);
                        let node = self.node_mut(successor);
                        node.left = Some(left);
                        node.right = new_right;
                        Some(self.rebalance(successor))
                    }
                };
            }
        }

        Some(self.rebalance(root))
    }

    /// Unlink the minimum of the subtree at `idx`
    ///
    /// Returns the new subtree root and the unlinked node.
    fn remove_min(&mut self, idx: usize) -> (Option<usize>, usize) {
        match self.node(idx).left {
            None => (self.node(idx).right, idx),
            Some(left) => {
                let (new_left, min) = self.remove_min(left);
                self.node_mut(idx).left = new_left;
                (Some(self.rebalance(idx)), min)
            }
        }
    }

    fn visit<F>(&self, idx: Option<usize>, start: u64, last: u64, f: &mut F)
    where
        F: FnMut(NodeId, &IntervalNode<T>),
    {
        let idx = match idx {
            Some(idx) => idx,
            None => return,
        };
        let node = self.node(idx);
        if node.subtree_last < start {
            return;
        }

        self.visit(node.left, start, last, f);

        // Everything to the right starts even later.
        if node.start > last {
            return;
        }
        if node.last >= start {
            f(NodeId(idx), node);
        }

        self.visit(node.right, start, last, f);
    }

    fn visit_mut<F>(&mut self, idx: Option<usize>, start: u64, last: u64, f: &mut F)
    where
        F: FnMut(NodeId, &mut IntervalNode<T>),
    {
        let idx = match idx {
            Some(idx) => idx,
            None => return,
        };
        let (left, right, node_start, node_last, subtree_last) = {
            let node = self.node(idx);
            (node.left, node.right, node.start, node.last, node.subtree_last)
        };
        if subtree_last < start {
            return;
        }

        self.visit_mut(left, start, last, f);

        if node_start > last {
            return;
        }
        if node_last >= start {
            f(NodeId(idx), self.node_mut(idx));
        }

        self.visit_mut(right, start, last, f);
    }

    fn walk<F>(&self, idx: Option<usize>, f: &mut F)
    where
        F: FnMut(NodeId, &IntervalNode<T>),
    {
        if let Some(idx) = idx {
            let node = self.node(idx);
            self.walk(node.left, f);
            f(NodeId(idx), node);
            self.walk(node.right, f);
        }
    }

    /// Returns `(height, subtree_last)` of the validated subtree
    fn validate_at(
        &self,
        idx: Option<usize>,
        lower: Option<(u64, u64)>,
        upper: Option<(u64, u64)>,
        count: &mut usize,
    ) -> (u32, Option<u64>) {
        let idx = match idx {
            Some(idx) => idx,
            None => return (0, None),
        };
        let node = self.node(idx);
        *count += 1;

        assert!(node.start <= node.last, "interval tree: reversed interval");
        if let Some(lower) = lower {
            assert!(node.key() > lower, "interval tree: key order violated");
        }
        if let Some(upper) = upper {
            assert!(node.key() < upper, "interval tree: key order violated");
        }

        let (lh, llast) = self.validate_at(node.left, lower, Some(node.key()), count);
        let (rh, rlast) = self.validate_at(node.right, Some(node.key()), upper, count);

        let height = 1 + cmp::max(lh, rh);
        assert_eq!(node.height, height, "interval tree: stale height");
        assert!(
            (i64::from(lh) - i64::from(rh)).abs() <= 1,
            "interval tree: AVL balance violated"
        );

        let subtree_last = [llast, rlast]
            .into_iter()
            .flatten()
            .fold(node.last, cmp::max);
        assert_eq!(
            node.subtree_last, subtree_last,
            "interval tree: stale subtree maximum"
        );

        (height, Some(subtree_last))
    }
}

impl<T> Default for IntervalTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn overlapping(tree: &IntervalTree<u32>, start: u64, last: u64) -> Vec<u32> {
        let mut found = Vec::new();
        tree.for_each_overlap(start, last, |_, node| found.push(*node.value()));
        found
    }

    #[test]
    fn test_interval_tree_new() {
        let tree: IntervalTree<u32> = IntervalTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert!(!tree.overlaps(0, u64::MAX));
        tree.validate();
    }

    #[test]
    fn test_interval_tree_overlap_query() {
        let mut tree = IntervalTree::new();
        tree.insert(0, 10, 0, 0).unwrap();
        tree.insert(20, 30, 1, 1).unwrap();
        tree.insert(5, 25, 2, 2).unwrap();
        tree.insert(40, 40, 3, 3).unwrap();
        tree.validate();

        assert_eq!(overlapping(&tree, 11, 19), vec![2]);
        assert_eq!(overlapping(&tree, 10, 20), vec![0, 2, 1]);
        assert_eq!(overlapping(&tree, 31, 39), Vec::<u32>::new());
        assert_eq!(overlapping(&tree, 40, 40), vec![3]);
        assert!(tree.overlaps(26, 30));
        assert!(!tree.overlaps(41, u64::MAX));
    }

    #[test]
    fn test_interval_tree_same_start_ordered_by_seq() {
        let mut tree = IntervalTree::new();
        tree.insert(5, 15, 7, 7).unwrap();
        tree.insert(5, 6, 3, 3).unwrap();
        tree.insert(5, 100, 9, 9).unwrap();
        tree.validate();

        assert_eq!(overlapping(&tree, 0, u64::MAX), vec![3, 7, 9]);
    }

    #[test]
    fn test_interval_tree_remove() {
        let mut tree = IntervalTree::new();
        let a = tree.insert(0, 10, 0, 10).unwrap();
        let b = tree.insert(5, 15, 1, 11).unwrap();
        let c = tree.insert(12, 20, 2, 12).unwrap();

        assert_eq!(tree.remove(b), Some(11));
        tree.validate();
        assert_eq!(tree.len(), 2);
        assert!(tree.get(b).is_none());
        assert_eq!(tree.remove(b), None);
        assert_eq!(overlapping(&tree, 11, 11), Vec::<u32>::new());

        assert_eq!(tree.remove(a), Some(10));
        assert_eq!(tree.remove(c), Some(12));
        assert!(tree.is_empty());
        tree.validate();
    }

    #[test]
    fn test_interval_tree_reuses_slots() {
        let mut tree = IntervalTree::with_capacity(2);
        let a = tree.insert(0, 1, 0, 0).unwrap();
        tree.remove(a);
        let b = tree.insert(2, 3, 1, 1).unwrap();
        assert_eq!(a.index(), b.index());
        assert_eq!(tree.get(b).map(|n| n.start()), Some(2));
    }

    #[test]
    fn test_interval_tree_stays_balanced() {
        let mut tree = IntervalTree::new();
        for i in 0..1024u64 {
            tree.insert(i, i, i, 0u32).unwrap();
        }
        tree.validate();
        // AVL bound for 1024 nodes
        assert!(tree.height(tree.root) <= 15);
    }

    #[test]
    fn test_interval_tree_mut_visit() {
        let mut tree = IntervalTree::new();
        tree.insert(0, 10, 0, 1u32).unwrap();
        tree.insert(20, 30, 1, 1u32).unwrap();
        tree.for_each_overlap_mut(0, 5, |_, node| *node.value_mut() += 1);
        assert_eq!(overlapping(&tree, 0, 100), vec![2, 1]);
    }

    proptest! {
        #[test]
        fn prop_overlaps_match_linear_scan(
            ranges in proptest::collection::vec((0u64..200, 0u64..50), 1..64),
            removals in proptest::collection::vec(any::<prop::sample::Index>(), 0..32),
            query in (0u64..250, 0u64..60),
        ) {
            let mut tree = IntervalTree::new();
            let mut live = Vec::new();
            for (seq, (start, len)) in ranges.iter().enumerate() {
                let id = tree.insert(*start, start + len, seq as u64, seq as u32).unwrap();
                live.push((id, *start, start + len, seq as u32));
            }
            for index in removals {
                if live.is_empty() {
                    break;
                }
                let (id, _, _, value) = live.remove(index.index(live.len()));
                prop_assert_eq!(tree.remove(id), Some(value));
                tree.validate();
            }

            let (qstart, qlen) = query;
            let qlast = qstart + qlen;
            let mut expected: Vec<u32> = live
                .iter()
                .filter(|(_, s, l, _)| *s <= qlast && qstart <= *l)
                .map(|(_, _, _, v)| *v)
                .collect();
            let mut found = overlapping(&tree, qstart, qlast);
            expected.sort_unstable();
            found.sort_unstable();
            prop_assert_eq!(&found, &expected);
            prop_assert_eq!(tree.overlaps(qstart, qlast), !expected.is_empty());
        }
    }
}
