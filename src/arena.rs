//! Slot storage for tree nodes.
//!
//! Nodes refer to each other through [`Ptr`], a 32-bit slot index with a
//! reserved `NULL` value standing in for the absent child. Freed slots are
//! recycled through a free list and carry a generation counter, so a stale
//! [`NodeRef`] is detected rather than resolving to whatever reuses its slot.

use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::node::Node;

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(0);

/// Slot index into a [`NodeArena`].
///
/// `Ptr::NULL` (all 32 bits set) is the sentinel: height -1, size 0.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct Ptr(u32);

impl Ptr {
    pub(crate) const NULL: Ptr = Ptr(u32::MAX);

    #[inline]
    fn from_slot(slot: usize) -> Self {
        debug_assert!(slot < u32::MAX as usize);
        Self(slot as u32)
    }

    #[inline]
    pub(crate) fn is_null(self) -> bool {
        self == Self::NULL
    }

    #[inline]
    pub(crate) fn slot(self) -> u32 {
        self.0
    }
}

/// Handle to a node of an [`AvlTree`](crate::AvlTree).
///
/// Handles stay valid while the node is in a tree: across inserts and deletes
/// of other keys, across `split`, and across a `join` whose inputs share
/// storage. Once the node is deleted the handle is rejected with
/// [`Error::NotFound`](crate::Error::NotFound).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeRef {
    arena: u64,
    slot: u32,
    generation: u32,
}

struct Slot<K, V> {
    generation: u32,
    node: Option<Node<K, V>>,
}

/// Node storage shared by every tree carved out of the same original tree.
pub(crate) struct NodeArena<K, V> {
    id: u64,
    slots: Vec<Slot<K, V>>,
    free: Vec<u32>,
    live: usize,
}

impl<K, V> NodeArena<K, V> {
    pub(crate) fn new() -> Self {
        Self::with_capacity(0)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            id: NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Number of live nodes across all trees using this arena.
    #[cfg_attr(not(any(test, feature = "check-invariants")), allow(dead_code))]
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Store a detached leaf and return its slot.
    ///
    /// # Panics
    ///
    /// Panics if the arena would exceed `u32::MAX - 1` slots.
    pub(crate) fn alloc(&mut self, key: K, value: V) -> Ptr {
        let node = Node::leaf(key, value);
        let ptr = match self.free.pop() {
            Some(slot) => {
                let entry = &mut self.slots[slot as usize];
                debug_assert!(entry.node.is_none());
                entry.node = Some(node);
                Ptr(slot)
            }
            None => {
                assert!(
                    self.slots.len() < u32::MAX as usize,
                    "node arena exhausted"
                );
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                Ptr::from_slot(self.slots.len() - 1)
            }
        };
        self.live += 1;
        self.reset_leaf(ptr);
        ptr
    }

    /// Release a slot, returning the node it held. Outstanding handles to it
    /// stop resolving.
    pub(crate) fn free(&mut self, ptr: Ptr) -> Node<K, V> {
        let entry = &mut self.slots[ptr.0 as usize];
        let node = entry.node.take().expect("freeing a vacant slot");
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(ptr.0);
        self.live -= 1;
        node
    }

    /// Free every node of the subtree rooted at `root`.
    pub(crate) fn free_subtree(&mut self, root: Ptr) {
        let mut stack = Vec::new();
        if !root.is_null() {
            stack.push(root);
        }
        while let Some(ptr) = stack.pop() {
            let node = self.free(ptr);
            if !node.left.is_null() {
                stack.push(node.left);
            }
            if !node.right.is_null() {
                stack.push(node.right);
            }
        }
    }

    pub(crate) fn handle(&self, ptr: Ptr) -> NodeRef {
        debug_assert!(!ptr.is_null());
        NodeRef {
            arena: self.id,
            slot: ptr.0,
            generation: self.slots[ptr.0 as usize].generation,
        }
    }

    /// Map a handle back to a live slot of this arena.
    pub(crate) fn resolve(&self, handle: NodeRef) -> Option<Ptr> {
        if handle.arena != self.id {
            return None;
        }
        let entry = self.slots.get(handle.slot as usize)?;
        (entry.generation == handle.generation && entry.node.is_some()).then_some(Ptr(handle.slot))
    }

    /// Move the subtree rooted at `ptr` out of `src` into this arena,
    /// hanging it under `parent`. Returns the new slot of the subtree root.
    pub(crate) fn transplant_from(&mut self, src: &mut NodeArena<K, V>, ptr: Ptr, parent: Ptr) -> Ptr {
        if ptr.is_null() {
            return Ptr::NULL;
        }
        let Node {
            key,
            value,
            left,
            right,
            ..
        } = src.free(ptr);
        let new = self.alloc(key, value);
        self[new].parent = parent;
        let left = self.transplant_from(src, left, new);
        let right = self.transplant_from(src, right, new);
        self[new].left = left;
        self[new].right = right;
        self.update_fields(new);
        new
    }

    /// Deep-copy the subtree rooted at `ptr` from `src` into this arena.
    pub(crate) fn copy_from(&mut self, src: &NodeArena<K, V>, ptr: Ptr, parent: Ptr) -> Ptr
    where
        K: Clone,
        V: Clone,
    {
        if ptr.is_null() {
            return Ptr::NULL;
        }
        let node = &src[ptr];
        let new = self.alloc(node.key.clone(), node.value.clone());
        self[new].parent = parent;
        let left = self.copy_from(src, node.left, new);
        let right = self.copy_from(src, node.right, new);
        self[new].left = left;
        self[new].right = right;
        self.update_fields(new);
        new
    }
}

impl<K, V> Default for NodeArena<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Index<Ptr> for NodeArena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, ptr: Ptr) -> &Self::Output {
        self.slots[ptr.0 as usize]
            .node
            .as_ref()
            .expect("dereferencing a vacant slot")
    }
}

impl<K, V> IndexMut<Ptr> for NodeArena<K, V> {
    fn index_mut(&mut self, ptr: Ptr) -> &mut Self::Output {
        self.slots[ptr.0 as usize]
            .node
            .as_mut()
            .expect("dereferencing a vacant slot")
    }
}
