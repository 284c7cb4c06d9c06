use std::rc::Rc;

use tracing::debug;

use super::rebalance::Cause;
use super::{AvlTree, OperationCount};
use crate::arena::{NodeArena, Ptr};
use crate::error::{Error, JoinError};
use crate::node::Direction;

impl<K: Ord, V> AvlTree<K, V> {
    /// Merge `self`, a new `(key, value)` entry and `right` into one tree.
    ///
    /// Requires every key of `self` < `key` < every key of `right`; otherwise
    /// fails with [`Error::RangeViolation`] and hands all inputs back
    /// unchanged. Returns the merged tree and `|h(self) - h(right)| + 1`,
    /// the number of spine levels walked (an empty tree has height -1).
    ///
    /// O(|Δh| + 1) when both trees share storage (see
    /// [`new_sibling`](Self::new_sibling) and [`split`](Self::split));
    /// otherwise the smaller tree is first moved into the other's storage and
    /// handles into it are invalidated.
    pub fn join(self, key: K, value: V, right: Self) -> std::result::Result<(Self, OperationCount), JoinError<K, V>> {
        if !self.all_keys_below(&key) || !right.all_keys_above(&key) {
            return Err(JoinError {
                error: Error::RangeViolation,
                left: self,
                key,
                value,
                right,
            });
        }

        let (mut left, mut right) = (self, right);
        if !Rc::ptr_eq(&left.arena, &right.arena) {
            let (small, large) = if left.len() < right.len() {
                (&mut left, &right)
            } else {
                (&mut right, &left)
            };
            debug!(moved = small.len(), "joining trees from separate storage");
            small.rehome(&large.arena);
        }

        let arena = Rc::clone(&left.arena);
        let (left_root, right_root) = (left.take_root(), right.take_root());
        drop(left);
        drop(right);

        let (root, cost) = {
            let mut arena = arena.borrow_mut();
            let mid = arena.alloc(key, value);
            arena.join_roots(left_root, mid, right_root)
        };
        let tree = Self { arena, root };
        tree.after_mutation();
        Ok((tree, cost))
    }

    fn all_keys_below(&self, key: &K) -> bool {
        if self.root.is_null() {
            return true;
        }
        let arena = self.arena.borrow();
        arena[arena[self.root].max].key < *key
    }

    fn all_keys_above(&self, key: &K) -> bool {
        if self.root.is_null() {
            return true;
        }
        let arena = self.arena.borrow();
        arena[arena[self.root].min].key > *key
    }
}

impl<K, V> NodeArena<K, V> {
    /// Join two detached subtrees around the detached leaf `mid`. Ordering is
    /// the caller's responsibility. Returns the new root and the spine cost.
    pub(crate) fn join_roots(&mut self, left: Ptr, mid: Ptr, right: Ptr) -> (Ptr, OperationCount) {
        debug_assert!(self[mid].parent.is_null() && self[mid].size == 1);
        let (left_height, right_height) = (self.height(left), self.height(right));
        let cost = left_height.abs_diff(right_height) as usize + 1;
        debug!(left_height, right_height, cost, "join");

        if left.is_null() && right.is_null() {
            return (mid, cost);
        }
        if left.is_null() {
            let mut root = right;
            let min = self[right].min;
            self.attach_leaf(&mut root, min, Direction::Left, mid);
            return (root, cost);
        }
        if right.is_null() {
            let mut root = left;
            let max = self[left].max;
            self.attach_leaf(&mut root, max, Direction::Right, mid);
            return (root, cost);
        }

        // Walk the taller tree's spine facing the shorter one down to the
        // first node no taller than the shorter tree.
        let (tall, short, toward) = if left_height >= right_height {
            (left, right, Direction::Right)
        } else {
            (right, left, Direction::Left)
        };
        let short_height = self.height(short);
        let mut spine = tall;
        let mut spine_parent = Ptr::NULL;
        while self.height(spine) > short_height {
            spine_parent = spine;
            spine = self.child(spine, toward);
        }

        self.set_child(mid, toward.opposite(), spine);
        self.set_child(mid, toward, short);
        self.update_fields(mid);

        if spine_parent.is_null() {
            return (mid, cost);
        }
        let mut root = tall;
        self.set_child(spine_parent, toward, mid);
        self.update_fields(spine_parent);
        self.rebalance(&mut root, spine_parent, Cause::Join);
        (root, cost)
    }
}
