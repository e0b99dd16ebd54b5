//! BSP tree nodes.

use crate::geom::AABox;
use crate::ids::LineId;
use crate::partition::Partition;
use crate::subspace::ConvexSubspace;

/// An element of the BSP tree: either an internal node or a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum BspTreeNode {
    Node(BspNode),
    Leaf(BspLeaf),
}

impl BspTreeNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, BspTreeNode::Leaf(_))
    }

    pub fn as_node(&self) -> Option<&BspNode> {
        match self {
            BspTreeNode::Node(node) => Some(node),
            BspTreeNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&BspLeaf> {
        match self {
            BspTreeNode::Leaf(leaf) => Some(leaf),
            BspTreeNode::Node(_) => None,
        }
    }

    /// Number of internal nodes in this subtree.
    pub fn node_count(&self) -> usize {
        match self {
            BspTreeNode::Node(node) => 1 + node.right.node_count() + node.left.node_count(),
            BspTreeNode::Leaf(_) => 0,
        }
    }

    /// Number of leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        match self {
            BspTreeNode::Node(node) => node.right.leaf_count() + node.left.leaf_count(),
            BspTreeNode::Leaf(_) => 1,
        }
    }

    /// Depth of this subtree (1 for a leaf).
    pub fn depth(&self) -> usize {
        match self {
            BspTreeNode::Node(node) => 1 + node.right.depth().max(node.left.depth()),
            BspTreeNode::Leaf(_) => 1,
        }
    }

    /// Bounding box of every leaf ring in this subtree.
    pub fn bounds(&self) -> Option<AABox> {
        match self {
            BspTreeNode::Node(node) => Some(node.right_bounds.unite(&node.left_bounds)),
            BspTreeNode::Leaf(leaf) => leaf.subspace.bounds(),
        }
    }
}

/// An internal node: a partition line and the two half-spaces it divides.
///
/// The right child holds everything on the right of the partition (positive
/// perpendicular distance), the left child everything on the left.
#[derive(Debug, Clone, PartialEq)]
pub struct BspNode {
    partition: Partition,
    line: Option<LineId>,
    right_bounds: AABox,
    left_bounds: AABox,
    right: Box<BspTreeNode>,
    left: Box<BspTreeNode>,
}

impl BspNode {
    pub fn new(
        partition: Partition,
        line: Option<LineId>,
        (right_bounds, right): (AABox, BspTreeNode),
        (left_bounds, left): (AABox, BspTreeNode),
    ) -> Self {
        Self {
            partition,
            line,
            right_bounds,
            left_bounds,
            right: Box::new(right),
            left: Box::new(left),
        }
    }

    #[inline]
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// The map line the partition was taken from.
    #[inline]
    pub fn line(&self) -> Option<LineId> {
        self.line
    }

    /// Bounds of the segments on the right, as seen when the node was made.
    #[inline]
    pub fn right_bounds(&self) -> &AABox {
        &self.right_bounds
    }

    #[inline]
    pub fn left_bounds(&self) -> &AABox {
        &self.left_bounds
    }

    #[inline]
    pub fn right(&self) -> &BspTreeNode {
        &self.right
    }

    #[inline]
    pub fn left(&self) -> &BspTreeNode {
        &self.left
    }
}

/// A leaf: one convex region.
#[derive(Debug, Clone, PartialEq)]
pub struct BspLeaf {
    subspace: ConvexSubspace,
}

impl BspLeaf {
    pub fn new(subspace: ConvexSubspace) -> Self {
        Self { subspace }
    }

    #[inline]
    pub fn subspace(&self) -> &ConvexSubspace {
        &self.subspace
    }

    pub fn into_subspace(self) -> ConvexSubspace {
        self.subspace
    }
}
