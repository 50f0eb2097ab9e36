//! This crate provides two small in-memory trees and a set of traversals over each:
//!
//! * [`GeneralTree`]: every node has any number of children. Nodes are stored packed, in pre-order, in a
//!   single [`Vec`] (see [`PackedTree`]). It offers aggregate statistics: [`GeneralTree::sum_values`],
//!   [`GeneralTree::count_evens`] and [`GeneralTree::num_greater`].
//! * [`BinaryTree`]: every node has at most a left and a right child. Nodes live in an arena and are
//!   addressed by [`NodeId`], so two nodes with the same value are still different nodes. It offers
//!   depth queries, maximum path sum, next-larger search, cousin and lowest-common-ancestor queries, and
//!   a compact string encoding ([`BinaryTree::serialize`] / [`BinaryTree::deserialize`]).
//!
//! Trees are built in one go and their structure doesn't change afterwards. All queries are read-only.
//!
//! # Example
//! ```
//! use tree_walks::{BinaryTree, GeneralTree};
//!
//! let tree = GeneralTree::new(5, |node| {
//! 	node.add_child(3);
//! 	node.build_child(8, |node| {
//! 		node.add_child(2);
//! 	});
//! });
//! assert_eq!(tree.sum_values(), 18);
//! assert_eq!(tree.count_evens(), 2);
//! assert_eq!(tree.num_greater(4), 2);
//!
//! let (tree, (four, five)) = BinaryTree::build(1, |node| {
//! 	let four = node.build_left(2, |node| node.add_left(4));
//! 	let five = node.build_right(3, |node| node.add_right(5));
//! 	(four, five)
//! });
//! assert!(tree.are_cousins(four, five));
//! assert_eq!(tree.lowest_common_ancestor(four, five), tree.root());
//! assert_eq!(tree.serialize(), "1 2 4 # # # 3 # 5 # #");
//! ```

mod binary;
mod codec;
mod extra;
mod packed;
mod serde;
mod tree;

pub use crate::binary::*;
pub use crate::codec::{ParseTreeError, ABSENT_TOKEN, TOKEN_SEPARATOR};
pub use crate::packed::*;
pub use crate::tree::*;

/// The value stored in every node of both kinds of tree.
pub type Value = i64;

/// Sums over several node values ([`GeneralTree::sum_values`], [`BinaryTree::max_sum`]). Wide enough
/// that adding up every [`Value`] a tree can hold never overflows.
pub type Sum = i128;
