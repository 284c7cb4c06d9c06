use std::fmt;

use thiserror::Error;

use crate::AvlTree;

/// Result alias for tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Caller-contract violations detected by [`AvlTree`] operations.
///
/// Every check happens before the tree is touched, so a failed call leaves
/// the tree exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// `insert` of a key that is already present.
    #[error("key is already present in the tree")]
    DuplicateKey,
    /// A node handle that does not belong to this tree (removed, stale, or
    /// from another tree).
    #[error("node does not belong to this tree")]
    NotFound,
    /// `join` arguments are not ordered `left < key < right`.
    #[error("join requires every left key < separator < every right key")]
    RangeViolation,
    /// Query with no answer: the tree is empty, or there is no neighbour.
    #[error("tree has no such node")]
    EmptyTree,
}

/// A rejected [`AvlTree::join`]. Hands the untouched inputs back.
#[derive(Error)]
#[error("{error}")]
pub struct JoinError<K, V> {
    pub(crate) error: Error,
    pub(crate) left: AvlTree<K, V>,
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) right: AvlTree<K, V>,
}

impl<K, V> JoinError<K, V> {
    pub fn error(&self) -> Error {
        self.error
    }

    /// Returns `(left, key, value, right)` as they were passed to `join`.
    pub fn into_parts(self) -> (AvlTree<K, V>, K, V, AvlTree<K, V>) {
        (self.left, self.key, self.value, self.right)
    }
}

impl<K, V> fmt::Debug for JoinError<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// A rejected [`AvlTree::split`]. Hands the untouched tree back.
#[derive(Error)]
#[error("{error}")]
pub struct SplitError<K, V> {
    pub(crate) error: Error,
    pub(crate) tree: AvlTree<K, V>,
}

impl<K, V> SplitError<K, V> {
    pub fn error(&self) -> Error {
        self.error
    }

    pub fn into_tree(self) -> AvlTree<K, V> {
        self.tree
    }
}

impl<K, V> fmt::Debug for SplitError<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
