//! Walking a BSP tree node by node.

use macroquad::prelude::*;
use map_bsp::{BspTree, BspTreeNode};

use crate::{draw_leaf, draw_partition};

/// Direction taken at each node in the navigation path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Right,
    Left,
}

/// Interactive navigator: the current element is reached from the root by
/// following `path`.
pub struct TreeNavigator {
    path: Vec<Direction>,
}

impl Default for TreeNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeNavigator {
    /// Creates a new navigator starting at the root.
    pub fn new() -> Self {
        Self { path: Vec::new() }
    }

    pub fn path(&self) -> &[Direction] {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Steps into a child of the current node. Leaves have no children.
    pub fn go(&mut self, tree: &BspTree, direction: Direction) -> bool {
        if matches!(self.current(tree), Some(BspTreeNode::Node(_))) {
            self.path.push(direction);
            return true;
        }
        false
    }

    /// Navigates to the parent node. Returns true if not already at root.
    pub fn go_parent(&mut self) -> bool {
        self.path.pop().is_some()
    }

    pub fn go_root(&mut self) {
        self.path.clear();
    }

    /// Handles keyboard input. Returns true if the position changed.
    pub fn update(&mut self, tree: &BspTree) -> bool {
        let mut changed = false;

        if is_key_pressed(KeyCode::R) {
            changed = self.go(tree, Direction::Right);
        }
        if is_key_pressed(KeyCode::L) {
            changed = self.go(tree, Direction::Left);
        }
        if is_key_pressed(KeyCode::P) {
            changed = self.go_parent();
        }
        if is_key_pressed(KeyCode::T) && !self.path.is_empty() {
            self.go_root();
            changed = true;
        }

        changed
    }

    /// The element at the end of the path, if the tree is non-empty.
    pub fn current<'a>(&self, tree: &'a BspTree) -> Option<&'a BspTreeNode> {
        let mut current = tree.root()?;
        for direction in &self.path {
            let BspTreeNode::Node(node) = current else {
                return None;
            };
            current = match direction {
                Direction::Right => node.right(),
                Direction::Left => node.left(),
            };
        }
        Some(current)
    }

    /// Highlights the leaves of the current subtree and the partition of
    /// the current node.
    pub fn render(&self, tree: &BspTree) {
        let Some(current) = self.current(tree) else {
            return;
        };
        render_subtree(current);
        if let BspTreeNode::Node(node) = current {
            draw_partition(node, YELLOW);
        }
    }

    pub fn draw_ui(&self, tree: &BspTree, y_offset: f32) {
        let current = self.current(tree);
        let leaves = current.map_or(0, BspTreeNode::leaf_count);
        let is_leaf = current.is_none_or(BspTreeNode::is_leaf);

        let path_str = if self.path.is_empty() {
            "root".to_string()
        } else {
            self.path
                .iter()
                .map(|d| match d {
                    Direction::Right => "R",
                    Direction::Left => "L",
                })
                .collect::<Vec<_>>()
                .join(" -> ")
        };

        draw_text(&format!("Subtree: {} leaves", leaves), 10.0, y_offset, 18.0, WHITE);
        draw_text(
            &format!("Path: {} (depth {})", path_str, self.path.len()),
            10.0,
            y_offset + 20.0,
            18.0,
            YELLOW,
        );

        let detail = match current {
            Some(BspTreeNode::Leaf(leaf)) => {
                let subspace = leaf.subspace();
                format!(
                    "Leaf {}: {} sides{}",
                    subspace.id(),
                    subspace.len(),
                    if subspace.is_discordant() { " (discordant)" } else { "" }
                )
            }
            Some(BspTreeNode::Node(node)) => match node.line() {
                Some(line) => format!("Children: [R]ight [L]eft | partition from {line}"),
                None => "Children: [R]ight [L]eft".to_string(),
            },
            None => "(empty tree)".to_string(),
        };
        draw_text(&detail, 10.0, y_offset + 40.0, 18.0, if is_leaf { ORANGE } else { GREEN });
        draw_text("[P]arent | [T]op", 10.0, y_offset + 60.0, 16.0, DARKGRAY);
    }
}

fn render_subtree(element: &BspTreeNode) {
    match element {
        BspTreeNode::Leaf(leaf) => draw_leaf(leaf.subspace(), 0.7),
        BspTreeNode::Node(node) => {
            render_subtree(node.right());
            render_subtree(node.left());
        }
    }
}
