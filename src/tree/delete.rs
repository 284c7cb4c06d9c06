use super::rebalance::Cause;
use super::{AvlTree, OperationCount};
use crate::arena::{NodeArena, NodeRef, Ptr};
use crate::error::Result;
use crate::node::{Direction, Node};

impl<K: Ord, V> AvlTree<K, V> {
    /// Remove `node` from the tree.
    ///
    /// Handles to every other node stay valid: when `node` has two children
    /// its successor is relinked into its place rather than copied.
    /// Returns the rebalancing operation count; fails with
    /// [`Error::NotFound`](crate::Error::NotFound) if `node` is not in this
    /// tree.
    pub fn delete(&mut self, node: NodeRef) -> Result<OperationCount> {
        let ops = {
            let mut arena = self.arena.borrow_mut();
            let ptr = self.locate(&arena, node)?;
            arena.delete_node(&mut self.root, ptr).1
        };
        self.after_mutation();
        Ok(ops)
    }

    /// Remove the entry for `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let removed = {
            let mut arena = self.arena.borrow_mut();
            let ptr = arena.find(self.root, key);
            if ptr.is_null() {
                return None;
            }
            arena.delete_node(&mut self.root, ptr).0
        };
        self.after_mutation();
        Some(removed.value)
    }
}

impl<K, V> NodeArena<K, V> {
    /// Unlink `target`, rebalance, and release its slot.
    ///
    /// Nodes relinked here are refreshed before the walk, so only heights
    /// changing further up are counted.
    pub(crate) fn delete_node(&mut self, root: &mut Ptr, target: Ptr) -> (Node<K, V>, OperationCount) {
        let Node {
            left, right, parent, ..
        } = self[target];

        let ops = match (left.is_null(), right.is_null()) {
            (false, false) => {
                // Lies in the right subtree and has no left child.
                let successor = self.successor(target);
                let start = if successor == right {
                    successor
                } else {
                    let successor_parent = self[successor].parent;
                    let successor_right = self[successor].right;
                    self.set_child(successor_parent, Direction::Left, successor_right);
                    self.set_child(successor, Direction::Right, right);
                    successor_parent
                };
                self.set_child(successor, Direction::Left, left);
                self.replace_child(root, parent, target, successor);

                let mut cur = start;
                loop {
                    self.update_fields(cur);
                    if cur == successor {
                        break;
                    }
                    cur = self[cur].parent;
                }
                if !parent.is_null() {
                    self.update_fields(parent);
                }
                self.rebalance(root, start, Cause::Deletion)
            }
            (false, true) | (true, false) => {
                let child = if left.is_null() { right } else { left };
                self.replace_child(root, parent, target, child);
                if parent.is_null() {
                    // The tree lost a level.
                    1
                } else {
                    self.update_fields(parent);
                    self.rebalance(root, parent, Cause::Deletion)
                }
            }
            (true, true) => {
                self.replace_child(root, parent, target, Ptr::NULL);
                if parent.is_null() {
                    0
                } else {
                    self.update_fields(parent);
                    self.rebalance(root, parent, Cause::Deletion)
                }
            }
        };

        (self.free(target), ops)
    }
}
