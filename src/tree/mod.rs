//! The ordered dictionary built on the augmented AVL node.

mod delete;
mod insert;
#[cfg(any(test, feature = "check-invariants"))]
mod invariants;
mod join;
mod rebalance;
mod split;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use crate::arena::{NodeArena, NodeRef, Ptr};
use crate::error::{Error, Result};

/// Rotations plus height-only changes performed while restoring balance.
///
/// For `join` it is the length of the spine walked instead; either way it is
/// the cost witness of the operation.
pub type OperationCount = usize;

/// An ordered dictionary on an augmented AVL tree.
///
/// Every node caches its subtree height, size, minimum and maximum, which
/// gives O(1) `len`, O(log n) order statistics, min/max shortcuts on search
/// and insert, and O(log n) [`split`](Self::split) and
/// [`join`](Self::join).
///
/// Trees produced by `split` share node storage with the tree they came
/// from; joining such trees is purely structural. Storage is reference
/// counted, not locked: the type is neither `Send` nor `Sync`.
pub struct AvlTree<K, V> {
    arena: Rc<RefCell<NodeArena<K, V>>>,
    root: Ptr,
}

impl<K, V> AvlTree<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// An empty tree whose storage is pre-sized for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Rc::new(RefCell::new(NodeArena::with_capacity(capacity))),
            root: Ptr::NULL,
        }
    }

    /// An empty tree sharing this tree's storage, so that a later `join`
    /// with it does not have to move nodes.
    pub fn new_sibling(&self) -> Self {
        Self {
            arena: Rc::clone(&self.arena),
            root: Ptr::NULL,
        }
    }

    /// Number of entries. O(1) from the root's cached size.
    #[inline]
    pub fn len(&self) -> usize {
        self.arena.borrow().size(self.root)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_null()
    }

    /// Height of the root; -1 for an empty tree, 0 for a single entry.
    pub fn height(&self) -> i32 {
        self.arena.borrow().height(self.root)
    }

    pub fn root(&self) -> Result<NodeRef> {
        if self.root.is_null() {
            return Err(Error::EmptyTree);
        }
        Ok(self.arena.borrow().handle(self.root))
    }

    /// Node with the smallest key.
    pub fn min(&self) -> Result<NodeRef> {
        self.extreme(|arena, root| arena[root].min)
    }

    /// Node with the largest key.
    pub fn max(&self) -> Result<NodeRef> {
        self.extreme(|arena, root| arena[root].max)
    }

    fn extreme(&self, pick: impl Fn(&NodeArena<K, V>, Ptr) -> Ptr) -> Result<NodeRef> {
        if self.root.is_null() {
            return Err(Error::EmptyTree);
        }
        let arena = self.arena.borrow();
        Ok(arena.handle(pick(&*arena, self.root)))
    }

    /// Node following `node` in key order.
    ///
    /// Fails with [`Error::EmptyTree`] at the maximum.
    pub fn successor(&self, node: NodeRef) -> Result<NodeRef> {
        let arena = self.arena.borrow();
        let ptr = self.locate(&arena, node)?;
        let next = arena.successor(ptr);
        if next.is_null() {
            return Err(Error::EmptyTree);
        }
        Ok(arena.handle(next))
    }

    /// Node preceding `node` in key order.
    ///
    /// Fails with [`Error::EmptyTree`] at the minimum.
    pub fn predecessor(&self, node: NodeRef) -> Result<NodeRef> {
        let arena = self.arena.borrow();
        let ptr = self.locate(&arena, node)?;
        let prev = arena.predecessor(ptr);
        if prev.is_null() {
            return Err(Error::EmptyTree);
        }
        Ok(arena.handle(prev))
    }

    /// Node at in-order position `index` (0-based).
    pub fn select(&self, index: usize) -> Option<NodeRef> {
        let arena = self.arena.borrow();
        if index >= arena.size(self.root) {
            return None;
        }
        let mut remaining = index;
        let mut cur = self.root;
        loop {
            let left = arena[cur].left;
            let left_size = arena.size(left);
            if remaining < left_size {
                cur = left;
            } else if remaining == left_size {
                return Some(arena.handle(cur));
            } else {
                remaining -= left_size + 1;
                cur = arena[cur].right;
            }
        }
    }

    /// In-order position of `node` (0-based).
    pub fn rank(&self, node: NodeRef) -> Result<usize> {
        let arena = self.arena.borrow();
        let ptr = self.locate(&arena, node)?;
        let mut rank = arena.size(arena[ptr].left);
        let mut child = ptr;
        let mut parent = arena[ptr].parent;
        while !parent.is_null() {
            if arena[parent].right == child {
                rank += arena.size(arena[parent].left) + 1;
            }
            child = parent;
            parent = arena[parent].parent;
        }
        Ok(rank)
    }

    pub fn key(&self, node: NodeRef) -> Result<K>
    where
        K: Clone,
    {
        let arena = self.arena.borrow();
        let ptr = self.locate(&arena, node)?;
        Ok(arena[ptr].key.clone())
    }

    pub fn value(&self, node: NodeRef) -> Result<V>
    where
        V: Clone,
    {
        let arena = self.arena.borrow();
        let ptr = self.locate(&arena, node)?;
        Ok(arena[ptr].value.clone())
    }

    /// Replace the payload of `node`, returning the previous one.
    pub fn set_value(&mut self, node: NodeRef, value: V) -> Result<V> {
        let mut arena = self.arena.borrow_mut();
        let ptr = self.locate(&arena, node)?;
        Ok(std::mem::replace(&mut arena[ptr].value, value))
    }

    /// Visit every entry in ascending key order.
    ///
    /// The storage is borrowed for the whole walk; `f` must not mutate a tree
    /// that shares it.
    pub fn for_each(&self, mut f: impl FnMut(&K, &V)) {
        let arena = self.arena.borrow();
        if self.root.is_null() {
            return;
        }
        let mut cur = arena[self.root].min;
        while !cur.is_null() {
            let node = &arena[cur];
            f(&node.key, &node.value);
            cur = arena.successor(cur);
        }
    }

    /// All entries in ascending key order.
    pub fn to_vec(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let mut out = Vec::with_capacity(self.len());
        self.for_each(|k, v| out.push((k.clone(), v.clone())));
        out
    }

    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        let mut out = Vec::with_capacity(self.len());
        self.for_each(|k, _| out.push(k.clone()));
        out
    }

    /// Resolve a handle to a slot of this tree.
    ///
    /// The handle must be live in this tree's storage and its node must hang
    /// under this tree's root: O(depth).
    fn locate(&self, arena: &NodeArena<K, V>, node: NodeRef) -> Result<Ptr> {
        let ptr = arena.resolve(node).ok_or(Error::NotFound)?;
        if self.root.is_null() || arena.top(ptr) != self.root {
            return Err(Error::NotFound);
        }
        Ok(ptr)
    }

    /// Detach the root from this handle so dropping it frees nothing.
    fn take_root(&mut self) -> Ptr {
        std::mem::replace(&mut self.root, Ptr::NULL)
    }

    /// Move every node of this tree into `arena`. Handles into this tree are
    /// invalidated.
    fn rehome(&mut self, arena: &Rc<RefCell<NodeArena<K, V>>>) {
        let root = self.take_root();
        let new_root = {
            let mut src = self.arena.borrow_mut();
            let mut dst = arena.borrow_mut();
            dst.transplant_from(&mut src, root, Ptr::NULL)
        };
        self.arena = Rc::clone(arena);
        self.root = new_root;
    }
}

impl<K: Ord, V> AvlTree<K, V> {
    #[inline]
    fn after_mutation(&self) {
        #[cfg(feature = "check-invariants")]
        self.assert_invariants();
    }

    /// Find the node holding `key`.
    ///
    /// Gives up as soon as `key` falls outside the cached `[min, max]` of the
    /// subtree being searched.
    pub fn search(&self, key: &K) -> Option<NodeRef> {
        let arena = self.arena.borrow();
        let ptr = arena.find(self.root, key);
        (!ptr.is_null()).then(|| arena.handle(ptr))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        !self.arena.borrow().find(self.root, key).is_null()
    }

    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let arena = self.arena.borrow();
        let ptr = arena.find(self.root, key);
        (!ptr.is_null()).then(|| arena[ptr].value.clone())
    }
}

impl<K: Ord, V> NodeArena<K, V> {
    pub(crate) fn find(&self, root: Ptr, key: &K) -> Ptr {
        let mut cur = root;
        while !cur.is_null() {
            let node = &self[cur];
            if *key < self[node.min].key || *key > self[node.max].key {
                return Ptr::NULL;
            }
            cur = match key.cmp(&node.key) {
                std::cmp::Ordering::Equal => return cur,
                std::cmp::Ordering::Less => node.left,
                std::cmp::Ordering::Greater => node.right,
            };
        }
        Ptr::NULL
    }
}

impl<K, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for AvlTree<K, V> {
    fn drop(&mut self) {
        // Sole owner: the arena goes away wholesale.
        if self.root.is_null() || Rc::strong_count(&self.arena) == 1 {
            return;
        }
        match self.arena.try_borrow_mut() {
            Ok(mut arena) => arena.free_subtree(self.root),
            // Storage is borrowed by a walk over a sibling; the slots stay
            // allocated until the storage itself is dropped.
            Err(_) => warn!(
                root = self.root.slot(),
                "tree dropped while its storage is borrowed, nodes not reclaimed"
            ),
        }
    }
}

impl<K: Clone, V: Clone> Clone for AvlTree<K, V> {
    /// Deep copy into fresh storage, preserving the shape.
    fn clone(&self) -> Self {
        let src = self.arena.borrow();
        let mut dst = NodeArena::with_capacity(src.size(self.root));
        let root = dst.copy_from(&src, self.root, Ptr::NULL);
        Self {
            arena: Rc::new(RefCell::new(dst)),
            root,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        self.for_each(|k, v| {
            map.entry(k, v);
        });
        map.finish()
    }
}
