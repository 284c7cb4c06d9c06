use tracing::trace;

use super::OperationCount;
use crate::arena::{NodeArena, Ptr};
use crate::node::Direction;

/// What disturbed the tree before a rebalance walk.
///
/// After an insertion the heavy child of a node that tips to ±2 is never
/// itself balanced. Deletions and joins give no such guarantee, so a balanced
/// heavy child takes a single rotation there.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Cause {
    Insertion,
    Deletion,
    Join,
}

impl<K, V> NodeArena<K, V> {
    /// Restore the AVL invariant and the cached aggregates from `start` up to
    /// the root, updating `root` if a rotation replaces it.
    ///
    /// Callers refresh `start` (and any node they relinked) before the walk.
    /// Each node's height is then compared with what is cached when the walk
    /// reaches it: a node refreshed by the caller, or by a rotation just below
    /// it, contributes no height-change count.
    pub(crate) fn rebalance(&mut self, root: &mut Ptr, start: Ptr, cause: Cause) -> OperationCount {
        let mut ops = 0;
        let mut node = start;

        while !node.is_null() {
            let parent = self[node].parent;
            let old_height = self[node].height;
            let bf = self.balance_factor(node);

            if (-1..=1).contains(&bf) {
                self.update_fields(node);
                if self[node].height != old_height {
                    ops += 1;
                }
            } else {
                let heavy_dir = if bf > 0 { Direction::Left } else { Direction::Right };
                let heavy = self.child(node, heavy_dir);
                let heavy_bf = self.balance_factor(heavy);
                debug_assert!(
                    heavy_bf != 0 || cause != Cause::Insertion,
                    "balanced heavy child after an insertion"
                );
                // Same sign as `bf`, or balanced: the outer grandchild is tallest.
                let single = heavy_bf == 0 || (heavy_bf > 0) == (bf > 0);
                let subtree = if single {
                    ops += 1;
                    self.rotate(node, heavy_dir.opposite())
                } else {
                    ops += 2;
                    self.rotate(heavy, heavy_dir);
                    self.rotate(node, heavy_dir.opposite())
                };
                trace!(slot = node.slot(), bf, heavy_bf, single, ?cause, "rotated");
                if parent.is_null() {
                    *root = subtree;
                }
            }

            node = parent;
        }

        ops
    }
}
