//! Bounding-box-recursive spatial index over the sides being partitioned.
//!
//! A [`SuperBlock`] is a box holding the sides that do not fit entirely in
//! either half of it, plus up to two child blocks for the halves. Blocks
//! bisect their longer axis and stop subdividing once they are no larger than
//! [`BLOCK_MIN_SIZE`] in both dimensions.
//!
//! Every block counts the map and partition sides of its whole subtree, so a
//! block that lies entirely on one side of a candidate partition can be
//! accounted for without looking at its contents.
//!
//! All blocks of all working sets live in one [`SuperBlockmap`] arena; a set
//! is identified by its root [`BlockId`].

use crate::geom::AABox;
use crate::ids::BlockId;
use crate::segment::{SegmentArena, SideId};

/// Blocks no larger than this (in both dimensions) hold sides directly.
pub const BLOCK_MIN_SIZE: f64 = 256.0;

/// One node of the spatial index.
#[derive(Debug, Clone)]
pub struct SuperBlock {
    bounds: AABox,
    parent: Option<BlockId>,
    /// Child covering the upper half of the split axis.
    right: Option<BlockId>,
    /// Child covering the lower half of the split axis.
    left: Option<BlockId>,
    sides: Vec<SideId>,
    map_count: usize,
    part_count: usize,
}

impl SuperBlock {
    fn new(bounds: AABox, parent: Option<BlockId>) -> Self {
        Self {
            bounds,
            parent,
            right: None,
            left: None,
            sides: Vec::new(),
            map_count: 0,
            part_count: 0,
        }
    }

    #[inline]
    pub fn bounds(&self) -> &AABox {
        &self.bounds
    }

    #[inline]
    pub fn parent(&self) -> Option<BlockId> {
        self.parent
    }

    #[inline]
    pub fn right(&self) -> Option<BlockId> {
        self.right
    }

    #[inline]
    pub fn left(&self) -> Option<BlockId> {
        self.left
    }

    /// Sides held directly by this block (not its descendants).
    #[inline]
    pub fn segments(&self) -> &[SideId] {
        &self.sides
    }

    /// Number of sides cut from map lines, in the whole subtree.
    #[inline]
    pub fn map_count(&self) -> usize {
        self.map_count
    }

    /// Number of synthesized partition sides, in the whole subtree.
    #[inline]
    pub fn part_count(&self) -> usize {
        self.part_count
    }

    #[inline]
    pub fn total_count(&self) -> usize {
        self.map_count + self.part_count
    }

    fn is_leaf_sized(&self) -> bool {
        self.bounds.width() <= BLOCK_MIN_SIZE && self.bounds.height() <= BLOCK_MIN_SIZE
    }
}

/// Arena of super blocks.
#[derive(Debug, Clone, Default)]
pub struct SuperBlockmap {
    blocks: Vec<SuperBlock>,
    free: Vec<BlockId>,
}

impl SuperBlockmap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty root block covering `bounds`.
    pub fn create_root(&mut self, bounds: AABox) -> BlockId {
        self.alloc(SuperBlock::new(bounds, None))
    }

    fn alloc(&mut self, block: SuperBlock) -> BlockId {
        match self.free.pop() {
            Some(id) => {
                self.blocks[id.0] = block;
                id
            }
            None => {
                self.blocks.push(block);
                BlockId(self.blocks.len() - 1)
            }
        }
    }

    #[inline]
    pub fn block(&self, id: BlockId) -> &SuperBlock {
        &self.blocks[id.0]
    }

    /// Number of blocks currently in use.
    pub fn live_count(&self) -> usize {
        self.blocks.len() - self.free.len()
    }

    /// Inserts `side` into the subtree rooted at `block`, descending into
    /// (and creating) child blocks while the side fits entirely within one
    /// half. Returns the block that now holds the side, which is also stored
    /// back into the side.
    pub fn push(&mut self, block: BlockId, side: SideId, arena: &mut SegmentArena) -> BlockId {
        let is_map = arena.has_map_line(side);
        let from = arena.from_point(side);
        let to = arena.to_point(side);

        let mut ancestor = self.blocks[block.0].parent;
        while let Some(id) = ancestor {
            self.count(id, is_map, true);
            ancestor = self.blocks[id.0].parent;
        }

        let mut current = block;
        loop {
            self.count(current, is_map, true);

            let node = &self.blocks[current.0];
            if node.is_leaf_sized() {
                break;
            }

            let bounds = *node.bounds();
            let center = bounds.center();
            let split_x = bounds.width() >= bounds.height();
            let (mid, a, b) = if split_x {
                (center.x, from.x, to.x)
            } else {
                (center.y, from.y, to.y)
            };

            let upper = if a >= mid && b >= mid {
                true
            } else if a < mid && b < mid {
                false
            } else {
                // Straddles the split line.
                break;
            };

            let existing = if upper { node.right } else { node.left };
            current = match existing {
                Some(child) => child,
                None => {
                    let (min, max) = (bounds.min(), bounds.max());
                    let child_bounds = match (split_x, upper) {
                        (true, true) => AABox::new(nalgebra::Point2::new(mid, min.y), max),
                        (true, false) => AABox::new(min, nalgebra::Point2::new(mid, max.y)),
                        (false, true) => AABox::new(nalgebra::Point2::new(min.x, mid), max),
                        (false, false) => AABox::new(min, nalgebra::Point2::new(max.x, mid)),
                    };
                    let child = self.alloc(SuperBlock::new(child_bounds, Some(current)));
                    if upper {
                        self.blocks[current.0].right = Some(child);
                    } else {
                        self.blocks[current.0].left = Some(child);
                    }
                    child
                }
            };
        }

        self.blocks[current.0].sides.push(side);
        arena.side_mut(side).set_block(Some(current));
        current
    }

    /// Removes and returns the most recently pushed side held directly by
    /// `block`, clearing the side's block reference.
    pub fn pop(&mut self, block: BlockId, arena: &mut SegmentArena) -> Option<SideId> {
        let side = self.blocks[block.0].sides.pop()?;
        let is_map = arena.has_map_line(side);

        let mut current = Some(block);
        while let Some(id) = current {
            self.count(id, is_map, false);
            current = self.blocks[id.0].parent;
        }

        arena.side_mut(side).set_block(None);
        Some(side)
    }

    fn count(&mut self, id: BlockId, is_map: bool, add: bool) {
        let block = &mut self.blocks[id.0];
        let counter = if is_map {
            &mut block.map_count
        } else {
            &mut block.part_count
        };
        if add {
            *counter += 1;
        } else {
            debug_assert!(*counter > 0, "super block count underflow");
            *counter -= 1;
        }
    }

    /// Walks the subtree rooted at `root` in pre-order (right child before
    /// left) without recursion.
    pub fn preorder(&self, root: BlockId) -> Preorder<'_> {
        Preorder {
            blockmap: self,
            stack: vec![root],
        }
    }

    /// Every side held anywhere in the subtree, in pre-order.
    pub fn collate_all_segments(&self, root: BlockId) -> Vec<SideId> {
        let mut sides = Vec::with_capacity(self.block(root).total_count());
        for id in self.preorder(root) {
            sides.extend_from_slice(self.block(id).segments());
        }
        sides
    }

    /// Bounding box of every side held in the subtree, or `None` if empty.
    pub fn find_segment_bounds(&self, root: BlockId, arena: &SegmentArena) -> Option<AABox> {
        AABox::from_points(
            self.collate_all_segments(root)
                .into_iter()
                .flat_map(|side| [arena.from_point(side), arena.to_point(side)]),
        )
    }

    /// Frees the subtree rooted at `root`. Sides still held lose their block
    /// reference.
    pub fn release(&mut self, root: BlockId, arena: &mut SegmentArena) {
        let ids: Vec<BlockId> = self.preorder(root).collect();
        for id in ids {
            let block = &mut self.blocks[id.0];
            for &side in &block.sides {
                arena.side_mut(side).set_block(None);
            }
            *block = SuperBlock::new(*block.bounds(), None);
            self.free.push(id);
        }
    }
}

/// Iterative pre-order walk over a block subtree. See
/// [`SuperBlockmap::preorder`].
pub struct Preorder<'a> {
    blockmap: &'a SuperBlockmap,
    stack: Vec<BlockId>,
}

impl Iterator for Preorder<'_> {
    type Item = BlockId;

    fn next(&mut self) -> Option<BlockId> {
        let id = self.stack.pop()?;
        let block = self.blockmap.block(id);
        // Pushed in reverse so the right child is visited first.
        self.stack.extend(block.left);
        self.stack.extend(block.right);
        Some(id)
    }
}
