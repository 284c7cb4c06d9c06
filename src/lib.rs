//! # avl-rs
//!
//! An ordered dictionary on an augmented, order-statistics AVL tree.
//!
//! Every node caches the height, size, minimum and maximum of its subtree.
//! Besides O(log n) search, insert and delete this gives O(log n) `split`
//! of a tree around one of its nodes and O(|Δh| + 1) `join` of two
//! key-disjoint trees around a separating entry.
//!
//! ## Example
//!
//! ```rust
//! use avl_rs::AvlTree;
//!
//! let mut tree: AvlTree<u32, &str> = AvlTree::new();
//! tree.insert(2, "two").unwrap();
//! tree.insert(1, "one").unwrap();
//! tree.insert(3, "three").unwrap();
//!
//! let two = tree.search(&2).unwrap();
//! let (left, right) = tree.split(two).unwrap();
//! assert_eq!(left.to_vec(), vec![(1, "one")]);
//!
//! let (joined, _) = left.join(2, "deux", right).unwrap();
//! assert_eq!(joined.keys(), vec![1, 2, 3]);
//! ```
//!
//! Mutating operations return an [`OperationCount`], the number of
//! rebalancing steps (or, for `join`, spine levels) they took.

mod arena;
mod error;
mod node;
mod tree;

pub use arena::NodeRef;
pub use error::{Error, JoinError, Result, SplitError};
pub use tree::{AvlTree, OperationCount};


#[cfg(test)]
mod proptests;
