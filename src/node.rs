//! Augmented AVL node and its O(1) local mechanics.
//!
//! Structural operations are methods on [`NodeArena`] because every one of
//! them touches more than one node.

use crate::arena::{NodeArena, Ptr};

/// One key/value pair plus aggregates cached for the subtree rooted here.
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Ptr,
    pub(crate) right: Ptr,
    /// Non-owning back link; `NULL` at a tree root.
    pub(crate) parent: Ptr,
    /// 0 for a leaf, `1 + max(child heights)` otherwise.
    pub(crate) height: i32,
    /// Minimum-key node of this subtree.
    pub(crate) min: Ptr,
    /// Maximum-key node of this subtree.
    pub(crate) max: Ptr,
    pub(crate) size: usize,
}

impl<K, V> Node<K, V> {
    /// A detached leaf. `min`/`max` are filled in once the slot is known.
    pub(crate) fn leaf(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: Ptr::NULL,
            right: Ptr::NULL,
            parent: Ptr::NULL,
            height: 0,
            min: Ptr::NULL,
            max: Ptr::NULL,
            size: 1,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Direction {
    Left,
    Right,
}

impl Direction {
    #[inline]
    pub(crate) fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl<K, V> NodeArena<K, V> {
    #[inline]
    pub(crate) fn height(&self, ptr: Ptr) -> i32 {
        if ptr.is_null() {
            -1
        } else {
            self[ptr].height
        }
    }

    #[inline]
    pub(crate) fn size(&self, ptr: Ptr) -> usize {
        if ptr.is_null() {
            0
        } else {
            self[ptr].size
        }
    }

    #[inline]
    pub(crate) fn child(&self, ptr: Ptr, dir: Direction) -> Ptr {
        match dir {
            Direction::Left => self[ptr].left,
            Direction::Right => self[ptr].right,
        }
    }

    /// `height(left) - height(right)`; 0 for the sentinel.
    #[inline]
    pub(crate) fn balance_factor(&self, ptr: Ptr) -> i32 {
        if ptr.is_null() {
            return 0;
        }
        let node = &self[ptr];
        self.height(node.left) - self.height(node.right)
    }

    /// Recompute `height`, `min`, `max` and `size` from the children, which
    /// must already be correct.
    pub(crate) fn update_fields(&mut self, ptr: Ptr) {
        let (left, right) = (self[ptr].left, self[ptr].right);
        let (height, min, max, size) = match (left.is_null(), right.is_null()) {
            (false, false) => {
                let (l, r) = (&self[left], &self[right]);
                (l.height.max(r.height) + 1, l.min, r.max, l.size + r.size + 1)
            }
            (false, true) => {
                let l = &self[left];
                (l.height + 1, l.min, ptr, l.size + 1)
            }
            (true, false) => {
                let r = &self[right];
                (r.height + 1, ptr, r.max, r.size + 1)
            }
            (true, true) => (0, ptr, ptr, 1),
        };
        let node = &mut self[ptr];
        node.height = height;
        node.min = min;
        node.max = max;
        node.size = size;
    }

    /// Turn `ptr` back into a detached leaf, dropping all links.
    pub(crate) fn reset_leaf(&mut self, ptr: Ptr) {
        let node = &mut self[ptr];
        node.left = Ptr::NULL;
        node.right = Ptr::NULL;
        node.parent = Ptr::NULL;
        node.height = 0;
        node.min = ptr;
        node.max = ptr;
        node.size = 1;
    }

    /// Point `parent`'s `dir` slot at `child` and `child` back at `parent`.
    #[inline]
    pub(crate) fn set_child(&mut self, parent: Ptr, dir: Direction, child: Ptr) {
        match dir {
            Direction::Left => self[parent].left = child,
            Direction::Right => self[parent].right = child,
        }
        if !child.is_null() {
            self[child].parent = parent;
        }
    }

    /// Which side of `parent` holds `child`.
    #[inline]
    pub(crate) fn side_of(&self, parent: Ptr, child: Ptr) -> Direction {
        if self[parent].left == child {
            Direction::Left
        } else {
            debug_assert_eq!(self[parent].right, child);
            Direction::Right
        }
    }

    /// Put `new` where `old` hangs under `parent`, or make it the root when
    /// `parent` is `NULL`.
    pub(crate) fn replace_child(&mut self, root: &mut Ptr, parent: Ptr, old: Ptr, new: Ptr) {
        if parent.is_null() {
            *root = new;
            if !new.is_null() {
                self[new].parent = Ptr::NULL;
            }
        } else {
            let side = self.side_of(parent, old);
            self.set_child(parent, side, new);
        }
    }

    /// Single rotation about `ptr`. `Direction::Left` lifts the right child.
    ///
    /// Rewires the pivot, `ptr` and the subtree crossing sides, relinks the
    /// grandparent, then refreshes `ptr`, the pivot and the grandparent in that
    /// order. Returns the pivot, the new root of this subtree; its parent is
    /// `NULL` when `ptr` was a tree root.
    pub(crate) fn rotate(&mut self, ptr: Ptr, dir: Direction) -> Ptr {
        let pivot = self.child(ptr, dir.opposite());
        debug_assert!(!pivot.is_null(), "rotation needs a child to lift");
        let inner = self.child(pivot, dir);
        let grandparent = self[ptr].parent;
        let side = (!grandparent.is_null()).then(|| self.side_of(grandparent, ptr));

        self.set_child(ptr, dir.opposite(), inner);
        self.set_child(pivot, dir, ptr);
        match side {
            Some(side) => self.set_child(grandparent, side, pivot),
            None => self[pivot].parent = Ptr::NULL,
        }

        self.update_fields(ptr);
        self.update_fields(pivot);
        if !grandparent.is_null() {
            self.update_fields(grandparent);
        }
        pivot
    }

    /// In-order successor, or `NULL` at the maximum.
    ///
    /// O(1) when there is a right subtree, otherwise climbs while `ptr` is a
    /// right child.
    pub(crate) fn successor(&self, ptr: Ptr) -> Ptr {
        self.neighbour(ptr, Direction::Right)
    }

    /// In-order predecessor, or `NULL` at the minimum.
    pub(crate) fn predecessor(&self, ptr: Ptr) -> Ptr {
        self.neighbour(ptr, Direction::Left)
    }

    fn neighbour(&self, ptr: Ptr, dir: Direction) -> Ptr {
        let down = self.child(ptr, dir);
        if !down.is_null() {
            return match dir {
                Direction::Right => self[down].min,
                Direction::Left => self[down].max,
            };
        }
        let mut node = ptr;
        let mut parent = self[ptr].parent;
        while !parent.is_null() && self.child(parent, dir) == node {
            node = parent;
            parent = self[parent].parent;
        }
        parent
    }

    /// Topmost ancestor of `ptr`.
    pub(crate) fn top(&self, ptr: Ptr) -> Ptr {
        let mut node = ptr;
        while !self[node].parent.is_null() {
            node = self[node].parent;
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds `1 <- 2 -> 3` by hand.
    fn three() -> (NodeArena<u32, ()>, [Ptr; 3]) {
        let mut arena = NodeArena::new();
        let a = arena.alloc(1, ());
        let b = arena.alloc(2, ());
        let c = arena.alloc(3, ());
        arena.set_child(b, Direction::Left, a);
        arena.set_child(b, Direction::Right, c);
        arena.update_fields(b);
        (arena, [a, b, c])
    }

    #[test]
    fn test_update_fields_combines_children() {
        let (arena, [a, b, c]) = three();
        let node = &arena[b];
        assert_eq!(node.height, 1);
        assert_eq!(node.size, 3);
        assert_eq!(node.min, a);
        assert_eq!(node.max, c);
        assert_eq!(arena.balance_factor(b), 0);
        assert_eq!(arena.height(Ptr::NULL), -1);
        assert_eq!(arena.size(Ptr::NULL), 0);
    }

    #[test]
    fn test_update_fields_single_child_extends_to_self() {
        let mut arena: NodeArena<u32, ()> = NodeArena::new();
        let a = arena.alloc(1, ());
        let b = arena.alloc(2, ());
        arena.set_child(a, Direction::Right, b);
        arena.update_fields(a);
        assert_eq!(arena[a].min, a);
        assert_eq!(arena[a].max, b);
        assert_eq!(arena[a].height, 1);
        assert_eq!(arena.balance_factor(a), -1);
    }

    #[test]
    fn test_rotate_left_at_root() {
        // 1 -> 2 -> 3 (right chain) becomes 1 <- 2 -> 3.
        let mut arena: NodeArena<u32, ()> = NodeArena::new();
        let a = arena.alloc(1, ());
        let b = arena.alloc(2, ());
        let c = arena.alloc(3, ());
        arena.set_child(b, Direction::Right, c);
        arena.update_fields(b);
        arena.set_child(a, Direction::Right, b);
        arena.update_fields(a);
        assert_eq!(arena.balance_factor(a), -2);

        let top = arena.rotate(a, Direction::Left);
        assert_eq!(top, b);
        assert!(arena[b].parent.is_null());
        assert_eq!(arena[b].left, a);
        assert_eq!(arena[b].right, c);
        assert_eq!(arena[a].parent, b);
        assert_eq!(arena[b].height, 1);
        assert_eq!(arena[a].height, 0);
        assert_eq!(arena[b].min, a);
        assert_eq!(arena[a].max, a);
    }

    #[test]
    fn test_rotate_right_relinks_grandparent() {
        // 4 <- [3 <- 2 <- 1]: rotating right at 3 leaves 4's left pointing at 2.
        let mut arena: NodeArena<u32, ()> = NodeArena::new();
        let n = [1, 2, 3, 4].map(|k| arena.alloc(k, ()));
        arena.set_child(n[1], Direction::Left, n[0]);
        arena.update_fields(n[1]);
        arena.set_child(n[2], Direction::Left, n[1]);
        arena.update_fields(n[2]);
        arena.set_child(n[3], Direction::Left, n[2]);
        arena.update_fields(n[3]);

        let top = arena.rotate(n[2], Direction::Right);
        assert_eq!(top, n[1]);
        assert_eq!(arena[n[3]].left, n[1]);
        assert_eq!(arena[n[1]].parent, n[3]);
        assert_eq!(arena[n[1]].right, n[2]);
        assert_eq!(arena[n[3]].height, 2);
        assert_eq!(arena[n[3]].size, 4);
        assert_eq!(arena[n[3]].min, n[0]);
    }

    #[test]
    fn test_successor_and_predecessor() {
        let (arena, [a, b, c]) = three();
        assert_eq!(arena.successor(a), b);
        assert_eq!(arena.successor(b), c);
        assert!(arena.successor(c).is_null());
        assert_eq!(arena.predecessor(c), b);
        assert_eq!(arena.predecessor(b), a);
        assert!(arena.predecessor(a).is_null());
        assert_eq!(arena.top(a), b);
    }
}
