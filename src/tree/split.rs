use std::rc::Rc;

use tracing::debug;

use super::AvlTree;
use crate::arena::{NodeArena, NodeRef, Ptr};
use crate::error::SplitError;

impl<K: Ord, V> AvlTree<K, V> {
    /// Split around `node` into the trees of smaller and of larger keys.
    ///
    /// `node` itself is discarded. Both halves share this tree's storage, so
    /// surviving handles stay valid in whichever half holds their node, and
    /// the halves can be joined back without moving nodes.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) if `node` is not
    /// in this tree, handing the tree back unchanged.
    pub fn split(mut self, node: NodeRef) -> std::result::Result<(Self, Self), SplitError<K, V>> {
        let target = self.locate(&self.arena.borrow(), node);
        let target = match target {
            Ok(ptr) => ptr,
            Err(error) => return Err(SplitError { error, tree: self }),
        };

        self.take_root();
        let (left, right) = self.arena.borrow_mut().split_at(target);
        let arena = Rc::clone(&self.arena);
        let halves = (
            Self {
                arena: Rc::clone(&arena),
                root: left,
            },
            Self { arena, root: right },
        );
        halves.0.after_mutation();
        halves.1.after_mutation();
        Ok(halves)
    }
}

impl<K, V> NodeArena<K, V> {
    /// Split the tree containing `target` into the roots of the smaller and
    /// the larger keys, freeing `target`.
    ///
    /// Ancestors are folded in from the innermost outward: each join costs
    /// the height difference of its inputs and those differences telescope,
    /// so the whole split is O(log n).
    pub(crate) fn split_at(&mut self, target: Ptr) -> (Ptr, Ptr) {
        let mut left = self.detach(self[target].left);
        let mut right = self.detach(self[target].right);
        let mut child = target;
        let mut ancestor = self[target].parent;
        let mut cost = 0;

        while !ancestor.is_null() {
            let next = self[ancestor].parent;
            let joined = if self[ancestor].right == child {
                // `target` was in the right subtree: the ancestor and its left
                // side are all smaller.
                let off_path = self.detach(self[ancestor].left);
                self.reset_leaf(ancestor);
                let (root, c) = self.join_roots(off_path, ancestor, left);
                left = root;
                c
            } else {
                let off_path = self.detach(self[ancestor].right);
                self.reset_leaf(ancestor);
                let (root, c) = self.join_roots(right, ancestor, off_path);
                right = root;
                c
            };
            cost += joined;
            child = ancestor;
            ancestor = next;
        }

        self.free(target);
        debug!(
            cost,
            left = self.size(left),
            right = self.size(right),
            "split"
        );
        (left, right)
    }

    fn detach(&mut self, ptr: Ptr) -> Ptr {
        if !ptr.is_null() {
            self[ptr].parent = Ptr::NULL;
        }
        ptr
    }
}
