//! Visitor pattern for BSP tree traversal.
//!
//! Visitors receive leaves in traversal order without coupling the walk to
//! any particular consumer (drawing, collecting, counting).

use super::node::BspLeaf;
use crate::ids::SubspaceId;

/// Visitor for processing leaves during BSP tree traversal.
pub trait BspVisitor {
    /// Called once per leaf, in traversal order.
    fn visit(&mut self, leaf: &BspLeaf);
}

/// A visitor that records the order in which leaves were visited.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    collected: Vec<SubspaceId>,
}

impl CollectingVisitor {
    /// Creates a new empty collecting visitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the visited subspace ids.
    pub fn into_subspaces(self) -> Vec<SubspaceId> {
        self.collected
    }

    pub fn subspaces(&self) -> &[SubspaceId] {
        &self.collected
    }
}

impl BspVisitor for CollectingVisitor {
    fn visit(&mut self, leaf: &BspLeaf) {
        self.collected.push(leaf.subspace().id());
    }
}

/// A visitor that calls a closure for each leaf.
pub struct FnVisitor<F>
where
    F: FnMut(&BspLeaf),
{
    func: F,
}

impl<F> FnVisitor<F>
where
    F: FnMut(&BspLeaf),
{
    /// Creates a new visitor from a closure.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> BspVisitor for FnVisitor<F>
where
    F: FnMut(&BspLeaf),
{
    fn visit(&mut self, leaf: &BspLeaf) {
        (self.func)(leaf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subspace::ConvexSubspace;

    fn make_leaf(id: usize) -> BspLeaf {
        BspLeaf::new(ConvexSubspace {
            id: SubspaceId(id),
            sides: Vec::new(),
            extra_sides: Vec::new(),
            region: None,
            face: None,
            discordant: false,
        })
    }

    #[test]
    fn collecting_visitor_records_order() {
        let mut visitor = CollectingVisitor::new();
        assert!(visitor.subspaces().is_empty());
        visitor.visit(&make_leaf(3));
        visitor.visit(&make_leaf(1));
        assert_eq!(visitor.into_subspaces(), vec![SubspaceId(3), SubspaceId(1)]);
    }

    #[test]
    fn fn_visitor_calls_closure() {
        let mut count = 0;
        {
            let mut visitor = FnVisitor::new(|_: &BspLeaf| count += 1);
            visitor.visit(&make_leaf(0));
            visitor.visit(&make_leaf(1));
        }
        assert_eq!(count, 2);
    }
}
