//! The BSP tree produced by a build.
//!
//! # Example
//!
//! ```ignore
//! use map_bsp::bsp::CollectingVisitor;
//! use nalgebra::Point2;
//!
//! let mut partitioner = Partitioner::default();
//! partitioner.build(&lines, &mut mesh)?;
//! let tree = partitioner.take_tree().unwrap_or_default();
//!
//! // Order leaves for drawing from the player's position
//! let mut visitor = CollectingVisitor::new();
//! tree.traverse_front_to_back(Point2::new(64.0, 64.0), &mut visitor);
//! ```
//!
//! # Architecture
//!
//! - [`BspTree`]: the container holding the root element
//! - [`BspTreeNode`]: either a [`BspNode`] (partition line and two children)
//!   or a [`BspLeaf`] (one convex subspace)
//! - [`BspVisitor`]: visitor trait for custom traversal behavior

mod node;
mod tree;
mod visitor;

pub use node::{BspLeaf, BspNode, BspTreeNode};
pub use tree::BspTree;
pub use visitor::{BspVisitor, CollectingVisitor, FnVisitor};
