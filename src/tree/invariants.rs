//! Whole-tree consistency checks.
//!
//! Compiled for tests, and with the `check-invariants` feature, where they
//! run after every mutating operation.

use std::rc::Rc;

use super::AvlTree;
use crate::arena::{NodeArena, Ptr};

/// Aggregates of a subtree, recomputed from scratch.
struct Derived {
    height: i32,
    size: usize,
    min: Ptr,
    max: Ptr,
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Panics unless the BST order, AVL balance, parent links and every
    /// cached aggregate are consistent.
    pub(crate) fn assert_invariants(&self) {
        let arena = self.arena.borrow();
        if self.root.is_null() {
            return;
        }
        let derived = check_subtree(&*arena, self.root, Ptr::NULL);
        assert_eq!(derived.size, arena[self.root].size);

        // With storage to itself, every live slot must be reachable.
        if Rc::strong_count(&self.arena) == 1 {
            assert_eq!(
                arena.len(),
                derived.size,
                "live slots must match reachable nodes"
            );
        }
    }
}

fn check_subtree<K: Ord, V>(arena: &NodeArena<K, V>, ptr: Ptr, parent: Ptr) -> Derived {
    if ptr.is_null() {
        return Derived {
            height: -1,
            size: 0,
            min: Ptr::NULL,
            max: Ptr::NULL,
        };
    }

    let node = &arena[ptr];
    assert_eq!(node.parent, parent, "parent link of slot {}", ptr.slot());

    let left = check_subtree(arena, node.left, ptr);
    let right = check_subtree(arena, node.right, ptr);

    if !left.max.is_null() {
        assert!(arena[left.max].key < node.key, "left subtree out of order");
    }
    if !right.min.is_null() {
        assert!(arena[right.min].key > node.key, "right subtree out of order");
    }

    let bf = left.height - right.height;
    assert!(
        (-1..=1).contains(&bf),
        "slot {} out of balance: bf={bf}",
        ptr.slot()
    );

    let derived = Derived {
        height: left.height.max(right.height) + 1,
        size: left.size + right.size + 1,
        min: if left.min.is_null() { ptr } else { left.min },
        max: if right.max.is_null() { ptr } else { right.max },
    };
    assert_eq!(node.height, derived.height, "cached height of slot {}", ptr.slot());
    assert_eq!(node.size, derived.size, "cached size of slot {}", ptr.slot());
    assert_eq!(node.min, derived.min, "cached min of slot {}", ptr.slot());
    assert_eq!(node.max, derived.max, "cached max of slot {}", ptr.slot());
    derived
}
