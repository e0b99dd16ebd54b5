//! BSP tree container, traversal and point location.

use nalgebra::Point2;

use super::node::{BspLeaf, BspNode, BspTreeNode};
use super::visitor::BspVisitor;

/// A finished Binary Space Partition of the map plane.
///
/// Internal nodes split the plane along a partition line; leaves are convex
/// regions bounded by a clockwise ring of sides.
///
/// # Traversal
///
/// The tree supports front-to-back and back-to-front traversal relative to a
/// viewpoint, which is what a renderer uses to order leaves:
///
/// ```ignore
/// tree.traverse_front_to_back(eye, &mut visitor);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BspTree {
    root: Option<BspTreeNode>,
}

impl BspTree {
    /// Creates an empty BSP tree.
    pub fn new() -> Self {
        Self { root: None }
    }

    pub(crate) fn from_root(root: Option<BspTreeNode>) -> Self {
        Self { root }
    }

    /// Returns `true` if the tree has no leaves.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    #[inline]
    pub fn root(&self) -> Option<&BspTreeNode> {
        self.root.as_ref()
    }

    /// Consumes the tree, returning its root.
    pub fn into_root(self) -> Option<BspTreeNode> {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.root.as_ref().map_or(0, BspTreeNode::node_count)
    }

    pub fn leaf_count(&self) -> usize {
        self.root.as_ref().map_or(0, BspTreeNode::leaf_count)
    }

    /// Returns the maximum depth of the tree (0 for an empty tree).
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, BspTreeNode::depth)
    }

    /// Every leaf, right subtrees first.
    pub fn leaves(&self) -> Vec<&BspLeaf> {
        let mut leaves = Vec::with_capacity(self.leaf_count());
        collect_leaves(self.root.as_ref(), &mut leaves);
        leaves
    }

    /// Visits leaves nearest the viewpoint first.
    ///
    /// At each node the half-space containing `eye` is visited before the
    /// other one; a viewpoint on the partition counts as right.
    pub fn traverse_front_to_back<V: BspVisitor>(&self, eye: Point2<f64>, visitor: &mut V) {
        if let Some(ref root) = self.root {
            traverse_front_to_back_node(root, eye, visitor);
        }
    }

    /// Visits leaves farthest from the viewpoint first.
    pub fn traverse_back_to_front<V: BspVisitor>(&self, eye: Point2<f64>, visitor: &mut V) {
        if let Some(ref root) = self.root {
            traverse_back_to_front_node(root, eye, visitor);
        }
    }

    /// Finds the leaf whose half-space chain contains `point`.
    pub fn locate(&self, point: Point2<f64>) -> Option<&BspLeaf> {
        let mut current = self.root.as_ref()?;
        loop {
            match current {
                BspTreeNode::Leaf(leaf) => return Some(leaf),
                BspTreeNode::Node(node) => {
                    current = if node.partition().perp_distance(point) >= 0.0 {
                        node.right()
                    } else {
                        node.left()
                    };
                }
            }
        }
    }
}

fn eye_is_right(node: &BspNode, eye: Point2<f64>) -> bool {
    node.partition().perp_distance(eye) >= 0.0
}

fn traverse_front_to_back_node<V: BspVisitor>(node: &BspTreeNode, eye: Point2<f64>, visitor: &mut V) {
    match node {
        BspTreeNode::Leaf(leaf) => visitor.visit(leaf),
        BspTreeNode::Node(node) => {
            let (near, far) = if eye_is_right(node, eye) {
                (node.right(), node.left())
            } else {
                (node.left(), node.right())
            };
            traverse_front_to_back_node(near, eye, visitor);
            traverse_front_to_back_node(far, eye, visitor);
        }
    }
}

fn traverse_back_to_front_node<V: BspVisitor>(node: &BspTreeNode, eye: Point2<f64>, visitor: &mut V) {
    match node {
        BspTreeNode::Leaf(leaf) => visitor.visit(leaf),
        BspTreeNode::Node(node) => {
            let (near, far) = if eye_is_right(node, eye) {
                (node.right(), node.left())
            } else {
                (node.left(), node.right())
            };
            traverse_back_to_front_node(far, eye, visitor);
            traverse_back_to_front_node(near, eye, visitor);
        }
    }
}

fn collect_leaves<'a>(node: Option<&'a BspTreeNode>, result: &mut Vec<&'a BspLeaf>) {
    match node {
        Some(BspTreeNode::Leaf(leaf)) => result.push(leaf),
        Some(BspTreeNode::Node(node)) => {
            collect_leaves(Some(node.right()), result);
            collect_leaves(Some(node.left()), result);
        }
        None => {}
    }
}
