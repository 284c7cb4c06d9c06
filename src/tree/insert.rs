use std::cmp::Ordering;

use super::rebalance::Cause;
use super::{AvlTree, OperationCount};
use crate::arena::{NodeArena, Ptr};
use crate::error::{Error, Result};
use crate::node::Direction;

impl<K: Ord, V> AvlTree<K, V> {
    /// Insert a new entry.
    ///
    /// Returns the number of rebalancing operations it took: each rotation
    /// counts once, as does each ancestor whose height changed without one.
    /// Fails with [`Error::DuplicateKey`] before touching the tree if `key` is
    /// present.
    pub fn insert(&mut self, key: K, value: V) -> Result<OperationCount> {
        let ops = self.arena.borrow_mut().insert_entry(&mut self.root, key, value)?;
        self.after_mutation();
        Ok(ops)
    }
}

impl<K: Ord, V> NodeArena<K, V> {
    pub(crate) fn insert_entry(&mut self, root: &mut Ptr, key: K, value: V) -> Result<OperationCount> {
        if root.is_null() {
            *root = self.alloc(key, value);
            return Ok(0);
        }
        let (parent, dir) = self.attach_point(*root, &key)?;
        let leaf = self.alloc(key, value);
        Ok(self.attach_leaf(root, parent, dir, leaf))
    }

    /// Where a new leaf for `key` hangs.
    ///
    /// Keys beyond either end go straight under the cached min/max node,
    /// which never has a child on the outer side.
    fn attach_point(&self, root: Ptr, key: &K) -> Result<(Ptr, Direction)> {
        let (min, max) = (self[root].min, self[root].max);
        match key.cmp(&self[min].key) {
            Ordering::Less => return Ok((min, Direction::Left)),
            Ordering::Equal => return Err(Error::DuplicateKey),
            Ordering::Greater => {}
        }
        match key.cmp(&self[max].key) {
            Ordering::Greater => return Ok((max, Direction::Right)),
            Ordering::Equal => return Err(Error::DuplicateKey),
            Ordering::Less => {}
        }

        let mut cur = root;
        loop {
            let dir = match key.cmp(&self[cur].key) {
                Ordering::Equal => return Err(Error::DuplicateKey),
                Ordering::Less => Direction::Left,
                Ordering::Greater => Direction::Right,
            };
            let next = self.child(cur, dir);
            if next.is_null() {
                return Ok((cur, dir));
            }
            cur = next;
        }
    }
}

impl<K, V> NodeArena<K, V> {
    /// Hang the detached leaf under `parent` and rebalance from there.
    ///
    /// `parent` is refreshed first, so its own growth is not counted.
    pub(crate) fn attach_leaf(&mut self, root: &mut Ptr, parent: Ptr, dir: Direction, leaf: Ptr) -> OperationCount {
        debug_assert!(self.child(parent, dir).is_null());
        self.set_child(parent, dir, leaf);
        self.update_fields(parent);
        self.rebalance(root, parent, Cause::Insertion)
    }
}
