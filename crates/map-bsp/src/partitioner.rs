//! Turns map lines into a BSP tree.
//!
//! A build runs in these phases:
//!
//! 1. One segment per usable map line; every side that faces a region is
//!    pushed into the root super block and both ends are registered as edge
//!    tips.
//! 2. `divide_space` recursively picks the cheapest partition, divides the
//!    working set against it, closes the gaps along the partition with new
//!    segments and recurses into both halves. A set without any acceptable
//!    partition is already convex and becomes a leaf.
//! 3. Overlapping collinear sides inside a leaf are split so they coincide.
//! 4. Every leaf gets a ring of half-edges (a mesh face) and every
//!    half-edge gets a twin.

use std::fmt;

use nalgebra::Point2;
use tracing::{debug, info, trace, warn};

use crate::bsp::{BspLeaf, BspNode, BspTree, BspTreeNode};
use crate::config::PartitionerConfig;
use crate::cost::{evaluate_partition, PartitionCost};
use crate::edge_tips::EdgeTipRegistry;
use crate::error::{BuildError, HalfSpace, Result};
use crate::geom::{AABox, DIST_EPSILON};
use crate::hplane::{HPlane, Intercept, OpenSide};
use crate::ids::{BlockId, FaceId, LineId, SegmentId, SubspaceId, VertexId};
use crate::line::{Line, RegionId};
use crate::mesh::Mesh;
use crate::partition::{LineRelationship, Partition};
use crate::segment::{SegmentArena, SideId};
use crate::subspace::{overlap_groups, ConvexSet, ConvexSubspace, LeafSide};
use crate::superblock::SuperBlockmap;

/// A region found to be open along a partition, where no neighbouring
/// region could be inferred.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnclosedRegion {
    pub region: RegionId,
    /// A point near the gap.
    pub point: Point2<f64>,
}

/// Summary of a finished build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub node_count: usize,
    pub leaf_count: usize,
    /// Sides ending up in leaves, overlapping duplicates included.
    pub segment_count: usize,
    /// Vertices added to the mesh by splits.
    pub new_vertex_count: usize,
    pub discordant_leaf_count: usize,
}

type UnclosedCallback = Box<dyn FnMut(&UnclosedRegion)>;

/// Builds BSP trees from map lines.
///
/// The partitioner keeps the last tree it built until it is claimed with
/// [`take_tree`](Self::take_tree); an unclaimed tree is dropped with the
/// partitioner or replaced by the next build.
///
/// # Example
///
/// ```ignore
/// let mut partitioner = Partitioner::new(PartitionerConfig::default());
/// partitioner.build(&lines, &mut mesh)?;
/// println!("{} leaves", partitioner.stats().leaf_count);
/// let tree = partitioner.take_tree();
/// ```
pub struct Partitioner {
    config: PartitionerConfig,
    tree: Option<BspTree>,
    stats: BuildStats,
    unclosed: Vec<UnclosedRegion>,
    on_unclosed: Option<UnclosedCallback>,
}

impl fmt::Debug for Partitioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partitioner")
            .field("config", &self.config)
            .field("tree", &self.tree)
            .field("stats", &self.stats)
            .field("unclosed", &self.unclosed)
            .finish_non_exhaustive()
    }
}

impl Default for Partitioner {
    fn default() -> Self {
        Self::new(PartitionerConfig::default())
    }
}

impl Partitioner {
    pub fn new(config: PartitionerConfig) -> Self {
        Self {
            config,
            tree: None,
            stats: BuildStats::default(),
            unclosed: Vec::new(),
            on_unclosed: None,
        }
    }

    /// Registers a function called once per unclosed region when a build
    /// finishes, whether it succeeded or not.
    pub fn with_unclosed_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&UnclosedRegion) + 'static,
    {
        self.on_unclosed = Some(Box::new(callback));
        self
    }

    #[inline]
    pub fn config(&self) -> &PartitionerConfig {
        &self.config
    }

    /// Partitions `lines`, whose vertices live in `mesh`.
    ///
    /// Vertices created by splits and the half-edges and faces of every
    /// leaf are appended to `mesh`. On failure no tree is kept.
    ///
    /// # Panics
    /// Panics if a line references a vertex missing from `mesh`.
    #[tracing::instrument(skip_all, fields(lines = lines.len()))]
    pub fn build(&mut self, lines: &[Line], mesh: &mut Mesh) -> Result<&BspTree> {
        if let Err(err) = self.config.validate() {
            return self.finish(Err(err), Vec::new());
        }

        let mut build = Build::new(lines, mesh, self.config);
        let result = build.run();
        let unclosed = std::mem::take(&mut build.unclosed);
        drop(build);
        self.finish(result, unclosed)
    }

    /// Reports the unclosed regions of a build, then keeps its tree if it
    /// succeeded. Whatever an earlier build left behind is dropped.
    fn finish(&mut self, result: Result<(BspTree, BuildStats)>, unclosed: Vec<UnclosedRegion>) -> Result<&BspTree> {
        self.tree = None;
        self.stats = BuildStats::default();
        self.unclosed = unclosed;
        if let Some(callback) = self.on_unclosed.as_mut() {
            for unclosed in &self.unclosed {
                callback(unclosed);
            }
        }

        let (tree, stats) = result?;
        info!(
            nodes = stats.node_count,
            leaves = stats.leaf_count,
            segments = stats.segment_count,
            new_vertices = stats.new_vertex_count,
            "BSP build complete"
        );
        self.stats = stats;
        let tree: &BspTree = self.tree.insert(tree);
        Ok(tree)
    }

    /// The tree of the last successful build, if not yet taken.
    #[inline]
    pub fn tree(&self) -> Option<&BspTree> {
        self.tree.as_ref()
    }

    /// Hands the built tree over to the caller.
    pub fn take_tree(&mut self) -> Option<BspTree> {
        self.tree.take()
    }

    #[inline]
    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Regions found open along a partition during the last build, each
    /// reported once.
    #[inline]
    pub fn unclosed_regions(&self) -> &[UnclosedRegion] {
        &self.unclosed
    }
}

/// Tree shape produced by `divide_space`, before leaves are frozen.
enum Subtree {
    Node {
        partition: Partition,
        line: Option<LineId>,
        right_bounds: AABox,
        left_bounds: AABox,
        right: Box<Subtree>,
        left: Box<Subtree>,
    },
    Leaf(SubspaceId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    From,
    To,
}

/// Face ring and leftover sides of one leaf.
struct LeafGeometry {
    ring: Vec<SideId>,
    extras: Vec<SideId>,
    face: Option<FaceId>,
}

/// State of a single build.
struct Build<'a> {
    lines: &'a [Line],
    mesh: &'a mut Mesh,
    split_cost_factor: i32,
    arena: SegmentArena,
    blockmap: SuperBlockmap,
    tips: EdgeTipRegistry,
    /// Generation of the current partition search.
    valid_count: u32,
    /// Generation in which each map line was last tried as a partition.
    line_marks: Vec<u32>,
    subspaces: Vec<ConvexSet>,
    unclosed: Vec<UnclosedRegion>,
}

impl<'a> Build<'a> {
    fn new(lines: &'a [Line], mesh: &'a mut Mesh, config: PartitionerConfig) -> Self {
        Self {
            lines,
            mesh,
            split_cost_factor: config.split_cost_factor,
            arena: SegmentArena::new(),
            blockmap: SuperBlockmap::new(),
            tips: EdgeTipRegistry::new(),
            valid_count: 0,
            line_marks: vec![0; lines.len()],
            subspaces: Vec::new(),
            unclosed: Vec::new(),
        }
    }

    fn run(&mut self) -> Result<(BspTree, BuildStats)> {
        let initial_vertices = self.mesh.vertex_count();

        let Some(root) = self.create_initial_segments() else {
            info!("nothing to partition");
            return Ok((BspTree::new(), BuildStats::default()));
        };

        let subtree = self.divide_space(root)?;

        self.split_overlapping_segments();
        let geometries = self.build_leaf_geometries();
        self.link_twin_half_edges();

        let mut stats = BuildStats::default();
        let mut leaves: Vec<Option<ConvexSubspace>> = geometries
            .into_iter()
            .enumerate()
            .map(|(index, geometry)| {
                let subspace = self.freeze_subspace(SubspaceId(index), geometry);
                stats.segment_count += subspace.all_sides().count();
                if subspace.is_discordant() {
                    stats.discordant_leaf_count += 1;
                }
                Some(subspace)
            })
            .collect();

        let tree = BspTree::from_root(subtree.and_then(|subtree| into_tree_node(subtree, &mut leaves)));
        stats.node_count = tree.node_count();
        stats.leaf_count = tree.leaf_count();
        stats.new_vertex_count = self.mesh.vertex_count() - initial_vertices;
        Ok((tree, stats))
    }

    /// Returns `true` if `side` was cut from a self-referencing map line.
    fn is_self_referencing(&self, side: SideId) -> bool {
        self.arena
            .line(side)
            .is_some_and(|line| self.lines[line.0].is_self_referencing())
    }

    fn create_initial_segments(&mut self) -> Option<BlockId> {
        let mut segments = Vec::new();
        for (index, line) in self.lines.iter().enumerate() {
            if line.is_polyobj() {
                trace!(line = index, "skipping polyobj line");
                continue;
            }
            let front = line.front();
            let back = line.effective_back();
            if front.is_none() && back.is_none() {
                continue;
            }
            let from = self.mesh.vertex(line.from());
            let to = self.mesh.vertex(line.to());
            if from == to {
                warn!(line = index, "skipping zero-length line");
                continue;
            }
            segments.push(self.arena.create(
                (line.from(), from),
                (line.to(), to),
                front,
                back,
                Some(LineId(index)),
                None,
            ));
        }

        let arena = &self.arena;
        let bounds = AABox::from_points(segments.iter().flat_map(|&seg| {
            let segment = arena.segment(seg);
            [segment.from_point(), segment.to_point()]
        }))?;
        let root = self.blockmap.create_root(bounds.to_blockmap_grid());

        for seg in segments {
            for side in [SideId::new(seg, false), SideId::new(seg, true)] {
                if self.arena.region(side).is_some() {
                    self.blockmap.push(root, side, &mut self.arena);
                }
            }
            self.tips.add_segment(&self.arena, seg);
        }
        debug!(
            segments = self.arena.len(),
            sides = self.blockmap.block(root).total_count(),
            "initial segments created"
        );
        Some(root)
    }

    /// Recursively partitions the sides under `block`. Returns `None` if
    /// the sides form no usable region.
    #[tracing::instrument(level = "trace", skip(self))]
    fn divide_space(&mut self, block: BlockId) -> Result<Option<Subtree>> {
        let Some(source) = self.choose_next_partition(block) else {
            let sides = self.blockmap.collate_all_segments(block);
            self.blockmap.release(block, &mut self.arena);
            return Ok(self.new_leaf(sides).map(Subtree::Leaf));
        };

        let partition = self.arena.partition(source);
        let line = self.arena.line(source);
        let mut hplane = HPlane::new(partition.clone(), line, Some(source));

        let bounds = *self.blockmap.block(block).bounds();
        let rights = self.blockmap.create_root(bounds);
        let lefts = self.blockmap.create_root(bounds);

        self.divide_segments(&mut hplane, block, rights, lefts)?;
        self.blockmap.release(block, &mut self.arena);
        self.add_partition_line_segments(&mut hplane, rights, lefts);

        let right_bounds = self.blockmap.find_segment_bounds(rights, &self.arena).unwrap_or(bounds);
        let left_bounds = self.blockmap.find_segment_bounds(lefts, &self.arena).unwrap_or(bounds);

        let right = self.divide_space(rights)?;
        let left = self.divide_space(lefts)?;

        Ok(match (right, left) {
            (Some(right), Some(left)) => Some(Subtree::Node {
                partition,
                line,
                right_bounds,
                left_bounds,
                right: Box::new(right),
                left: Box::new(left),
            }),
            (Some(only), None) | (None, Some(only)) => Some(only),
            (None, None) => None,
        })
    }

    /// Picks the cheapest map side under `block` to partition along, or
    /// `None` if no side divides the set.
    fn choose_next_partition(&mut self, block: BlockId) -> Option<SideId> {
        self.valid_count += 1;
        let mut best: Option<(SideId, PartitionCost)> = None;

        let blocks: Vec<BlockId> = self.blockmap.preorder(block).collect();
        for id in blocks {
            trace!(block = %id, "scanning for partition candidates");
            for &side in self.blockmap.block(id).segments() {
                let Some(line) = self.arena.line(side) else {
                    continue;
                };
                if self.line_marks[line.0] == self.valid_count {
                    continue;
                }
                self.line_marks[line.0] = self.valid_count;

                let best_total = best.map(|(_, cost)| cost.total);
                let Some(cost) = evaluate_partition(
                    &self.blockmap,
                    &self.arena,
                    block,
                    side,
                    self.split_cost_factor,
                    best_total,
                ) else {
                    continue;
                };
                if best_total.is_none_or(|total| cost.total < total) {
                    best = Some((side, cost));
                }
            }
        }

        if let Some((side, cost)) = best {
            debug!(
                side = %side,
                cost = cost.total,
                splits = cost.splits,
                map_right = cost.map_right,
                map_left = cost.map_left,
                "chose partition"
            );
        }
        best.map(|(side, _)| side)
    }

    /// Drains every side under `block` into `rights` or `lefts`, splitting
    /// sides that cross the partition.
    fn divide_segments(&mut self, hplane: &mut HPlane, block: BlockId, rights: BlockId, lefts: BlockId) -> Result<()> {
        let mut stack = vec![block];
        while let Some(id) = stack.pop() {
            while let Some(side) = self.blockmap.pop(id, &mut self.arena) {
                self.divide_one_segment(hplane, side, rights, lefts);
            }
            // Children are read after draining: splits may have created them.
            let current = self.blockmap.block(id);
            stack.extend(current.left());
            stack.extend(current.right());
        }

        for (half, set) in [(HalfSpace::Right, rights), (HalfSpace::Left, lefts)] {
            if self.blockmap.block(set).total_count() == 0 {
                return Err(BuildError::EmptyHalfSpace {
                    half,
                    partition: hplane.partition().clone(),
                });
            }
        }
        Ok(())
    }

    fn divide_one_segment(&mut self, hplane: &mut HPlane, side: SideId, rights: BlockId, lefts: BlockId) {
        let partition = hplane.partition().clone();
        let (mut relationship, from_dist, to_dist) = self.arena.relationship(side, &partition);
        if hplane.line().is_some() && self.arena.line(side) == hplane.line() {
            relationship = LineRelationship::Collinear;
        }

        match relationship {
            LineRelationship::Collinear => {
                self.intercept_partition(hplane, side, Edge::From);
                self.intercept_partition(hplane, side, Edge::To);
                let target = if self.arena.direction(side).dot(&partition.direction()) < 0.0 {
                    lefts
                } else {
                    rights
                };
                self.blockmap.push(target, side, &mut self.arena);
            }
            LineRelationship::Right | LineRelationship::RightIntercept => {
                if relationship == LineRelationship::RightIntercept {
                    let edge = if from_dist < DIST_EPSILON { Edge::From } else { Edge::To };
                    self.intercept_partition(hplane, side, edge);
                }
                self.blockmap.push(rights, side, &mut self.arena);
            }
            LineRelationship::Left | LineRelationship::LeftIntercept => {
                if relationship == LineRelationship::LeftIntercept {
                    let edge = if from_dist > -DIST_EPSILON { Edge::From } else { Edge::To };
                    self.intercept_partition(hplane, side, edge);
                }
                self.blockmap.push(lefts, side, &mut self.arena);
            }
            LineRelationship::Intersects => {
                let point = partition.intersection(
                    self.arena.from_point(side),
                    self.arena.to_point(side),
                    from_dist,
                    to_dist,
                );
                let vertex = self.mesh.add_vertex(point);
                let new_side = self.split_segment(side, vertex, point, true);
                self.intercept_partition(hplane, side, Edge::To);

                // `side` keeps its `from` end.
                let (right, left) = if from_dist < 0.0 { (new_side, side) } else { (side, new_side) };
                self.blockmap.push(rights, right, &mut self.arena);
                self.blockmap.push(lefts, left, &mut self.arena);
            }
        }
    }

    /// Records the vertex at one end of `side` as an intercept, noting which
    /// regions are open along the partition on either side of it.
    fn intercept_partition(&mut self, hplane: &mut HPlane, side: SideId, edge: Edge) {
        let vertex = match edge {
            Edge::From => self.arena.from_vertex(side),
            Edge::To => self.arena.to_vertex(side),
        };
        if hplane.is_intercepted(vertex) {
            return;
        }

        let point = self.mesh.vertex(vertex);
        let angle = hplane.partition().angle();
        let tips = self.tips.get(vertex);
        let before = self.open_side(tips.side_at((angle + 180.0) % 360.0));
        let after = self.open_side(tips.side_at(angle));

        hplane.add_intercept(Intercept::new(
            hplane.partition().para_distance(point),
            vertex,
            point,
            before,
            after,
            self.is_self_referencing(side),
        ));
    }

    fn open_side(&self, side: Option<SideId>) -> Option<OpenSide> {
        let side = side?;
        Some(OpenSide {
            side,
            region: self.arena.region(side)?,
        })
    }

    /// Closes every open gap between consecutive intercepts with a new
    /// segment lying on the partition.
    fn add_partition_line_segments(&mut self, hplane: &mut HPlane, rights: BlockId, lefts: BlockId) {
        hplane.sort_and_merge();

        // Never build on top of the partition's own source.
        let source_range = hplane.source().map(|source| {
            let partition = hplane.partition();
            (
                partition.para_distance(self.arena.from_point(source)),
                partition.para_distance(self.arena.to_point(source)),
            )
        });

        for pair in hplane.intercepts().windows(2) {
            let (cur, next) = (&pair[0], &pair[1]);

            if let Some((near, far)) = source_range
                && cur.distance() >= near
                && next.distance() <= far
            {
                continue;
            }

            let midpoint = nalgebra::center(&cur.point(), &next.point());
            let (after, before) = match (cur.after(), next.before()) {
                (None, None) => continue,
                (Some(after), None) => {
                    if !cur.is_self_referencing() {
                        self.notify_unclosed(after.region, midpoint);
                    }
                    continue;
                }
                (None, Some(before)) => {
                    if !next.is_self_referencing() {
                        self.notify_unclosed(before.region, midpoint);
                    }
                    continue;
                }
                (Some(after), Some(before)) => (after, before),
            };

            let region = self.choose_gap_region(cur, next, after, before);
            let seg = self.arena.create(
                (cur.vertex(), cur.point()),
                (next.vertex(), next.point()),
                Some(region),
                Some(region),
                None,
                hplane.line(),
            );
            self.tips.add_segment(&self.arena, seg);
            self.blockmap.push(rights, SideId::new(seg, false), &mut self.arena);
            self.blockmap.push(lefts, SideId::new(seg, true), &mut self.arena);
            trace!(segment = %seg, region = %region, "closed partition gap");
        }
    }

    /// Region of a new partition segment between `cur` and `next`. When
    /// the two ends disagree, a region seen across a real boundary wins
    /// over one seen across a self-referencing line or another gap.
    fn choose_gap_region(&self, cur: &Intercept, next: &Intercept, after: OpenSide, before: OpenSide) -> RegionId {
        if after.region == before.region {
            return after.region;
        }

        if !cur.is_self_referencing() && !next.is_self_referencing() {
            debug!(
                after = %after.region,
                before = %before.region,
                x = cur.point().x,
                y = cur.point().y,
                "region mismatch along partition"
            );
        }
        match (self.is_real_boundary(after.side), self.is_real_boundary(before.side)) {
            (true, false) => after.region,
            (false, true) => before.region,
            _ => {
                let next_before = next.before().map(|open| open.region);
                let next_after = next.after().map(|open| open.region);
                if cur.before().is_none() && next_before == next_after {
                    before.region
                } else {
                    after.region
                }
            }
        }
    }

    fn is_real_boundary(&self, side: SideId) -> bool {
        self.arena.has_map_line(side) && !self.is_self_referencing(side)
    }

    fn notify_unclosed(&mut self, region: RegionId, point: Point2<f64>) {
        if self.unclosed.iter().any(|unclosed| unclosed.region == region) {
            return;
        }
        warn!(region = %region, x = point.x, y = point.y, "unclosed region");
        self.unclosed.push(UnclosedRegion { region, point });
    }

    /// Turns the sides of a convex set into a new subspace. Sets with fewer
    /// than three distinct vertices are dropped.
    fn new_leaf(&mut self, sides: Vec<SideId>) -> Option<SubspaceId> {
        let set = ConvexSet::new(sides);
        if set.distinct_vertex_count(&self.arena) < 3 {
            debug!(sides = set.len(), "dropping degenerate leaf");
            return None;
        }

        let id = SubspaceId(self.subspaces.len());
        for &side in set.sides() {
            self.arena.side_mut(side).set_subspace(Some(id));
        }
        debug!(subspace = %id, sides = set.len(), "new leaf");
        self.subspaces.push(set);
        Some(id)
    }

    /// Splits `side` at `point` (the vertex `vertex`) and files the new
    /// pieces wherever their originals live.
    fn split_segment(&mut self, side: SideId, vertex: VertexId, point: Point2<f64>, update_tips: bool) -> SideId {
        let seg = side.segment();
        let (from, to) = {
            let segment = self.arena.segment(seg);
            (segment.from(), segment.to())
        };

        let new_side = self.arena.split(side, vertex, point);
        self.relink(side, new_side);
        self.relink(side.twin(), new_side.twin());

        if update_tips {
            self.update_tips(&[seg, new_side.segment()], &[from, to, vertex]);
        }
        new_side
    }

    /// Puts `new` into the super block or subspace holding `old`.
    fn relink(&mut self, old: SideId, new: SideId) {
        let state = self.arena.side(old);
        if let Some(block) = state.block() {
            self.blockmap.push(block, new, &mut self.arena);
        } else if let Some(subspace) = state.subspace() {
            self.subspaces[subspace.0].add(new);
            self.arena.side_mut(new).set_subspace(Some(subspace));
        }
    }

    /// Rebuilds the tips of `segments` at `vertices`.
    fn update_tips(&mut self, segments: &[SegmentId], vertices: &[VertexId]) {
        for &vertex in vertices {
            for &seg in segments {
                self.tips.remove_segment(vertex, seg);
            }
        }
        for &seg in segments {
            self.tips.add_segment(&self.arena, seg);
        }
    }

    /// Splits sides of a leaf that start at the same point but end at
    /// different ones, so that overlapping sides coincide exactly. Every
    /// longer side of a group is cut at the end of the group's shortest
    /// side; the remainders start a new group and are handled in turn.
    fn split_overlapping_segments(&mut self) {
        let mut segments = Vec::new();
        let mut vertices = Vec::new();

        for index in 0..self.subspaces.len() {
            loop {
                let ordered = self.subspaces[index].ordered(&self.arena);
                let mut split_any = false;

                for group in overlap_groups(&ordered) {
                    let Some(shortest) = group
                        .clone()
                        .map(|i| ordered[i].side)
                        .min_by(|&a, &b| self.side_length(a).total_cmp(&self.side_length(b)))
                    else {
                        continue;
                    };
                    let vertex = self.arena.to_vertex(shortest);
                    let point = self.arena.to_point(shortest);

                    for i in group {
                        let longer = ordered[i].side;
                        if longer == shortest {
                            continue;
                        }
                        let line = self.arena.partition(longer);
                        let along = line.para_distance(point);
                        if along <= DIST_EPSILON
                            || along >= self.side_length(longer) - DIST_EPSILON
                            || line.perp_distance(point).abs() > DIST_EPSILON
                        {
                            continue;
                        }

                        vertices.extend([self.arena.from_vertex(longer), self.arena.to_vertex(longer), vertex]);
                        let new_side = self.split_segment(longer, vertex, point, false);
                        segments.extend([longer.segment(), new_side.segment()]);
                        split_any = true;
                    }
                }

                if !split_any {
                    break;
                }
            }
        }

        if !segments.is_empty() {
            segments.sort();
            segments.dedup();
            vertices.sort();
            vertices.dedup();
            debug!(segments = segments.len(), "split overlapping segments");
            self.update_tips(&segments, &vertices);
        }
    }

    #[inline]
    fn side_length(&self, side: SideId) -> f64 {
        self.arena.segment(side.segment()).length()
    }

    /// Builds one mesh face per leaf from its clockwise ring of sides.
    /// Of several coinciding sides the ring uses one, preferring real
    /// boundaries; the rest get free-standing half-edges.
    fn build_leaf_geometries(&mut self) -> Vec<LeafGeometry> {
        let mut geometries = Vec::with_capacity(self.subspaces.len());

        for index in 0..self.subspaces.len() {
            let ordered = self.subspaces[index].ordered(&self.arena);
            let mut ring = Vec::new();
            let mut ring_edges = Vec::new();
            let mut extras = Vec::new();

            for group in overlap_groups(&ordered) {
                let pick = group
                    .clone()
                    .find(|&i| self.is_real_boundary(ordered[i].side))
                    .or_else(|| group.clone().find(|&i| self.arena.has_map_line(ordered[i].side)))
                    .unwrap_or(group.start);

                for i in group {
                    let side = ordered[i].side;
                    let half_edge = self
                        .mesh
                        .new_half_edge(self.arena.from_vertex(side), self.arena.map_side(side));
                    self.arena.side_mut(side).set_half_edge(Some(half_edge));
                    if i == pick {
                        ring.push(side);
                        ring_edges.push(half_edge);
                    } else {
                        extras.push(side);
                    }
                }
            }

            let face = self.mesh.new_face(&ring_edges);
            geometries.push(LeafGeometry { ring, extras, face });
        }
        geometries
    }

    /// Pairs up the half-edges of twin sides, creating the missing half of
    /// every edge that only one leaf sees.
    fn link_twin_half_edges(&mut self) {
        let sides: Vec<SideId> = self.arena.side_ids().collect();
        let mut created = 0usize;
        for side in sides {
            let Some(half_edge) = self.arena.side(side).half_edge() else {
                continue;
            };
            if self.mesh.half_edge(half_edge).twin().is_some() {
                continue;
            }

            let twin = side.twin();
            let twin_edge = match self.arena.side(twin).half_edge() {
                Some(twin_edge) => twin_edge,
                None => {
                    let twin_edge = self
                        .mesh
                        .new_half_edge(self.arena.from_vertex(twin), self.arena.map_side(twin));
                    self.arena.side_mut(twin).set_half_edge(Some(twin_edge));
                    created += 1;
                    twin_edge
                }
            };
            self.mesh.set_twins(half_edge, twin_edge);
        }
        trace!(created, "linked twin half-edges");
    }

    fn freeze_subspace(&self, id: SubspaceId, geometry: LeafGeometry) -> ConvexSubspace {
        let all = geometry.ring.iter().chain(&geometry.extras).copied();
        let (region, regions) = self.choose_leaf_region(all);
        let discordant = regions.len() > 1;
        if discordant {
            warn!(
                subspace = %id,
                regions = ?regions,
                "leaf is discordant: its sides disagree about its region"
            );
        }

        ConvexSubspace {
            id,
            sides: geometry
                .ring
                .iter()
                .map(|&side| LeafSide::from_arena(&self.arena, side))
                .collect(),
            extra_sides: geometry
                .extras
                .iter()
                .map(|&side| LeafSide::from_arena(&self.arena, side))
                .collect(),
            region,
            face: geometry.face,
            discordant,
        }
    }

    /// Picks the region of a leaf, preferring sides of real,
    /// non-self-referencing lines. Also returns every distinct region those
    /// sides name.
    fn choose_leaf_region(&self, sides: impl Iterator<Item = SideId>) -> (Option<RegionId>, Vec<RegionId>) {
        let mut preferred = None;
        let mut fallback = None;
        let mut regions = Vec::new();

        for side in sides {
            let Some(region) = self.arena.region(side) else {
                continue;
            };
            if self.arena.has_map_line(side) && !self.is_self_referencing(side) {
                preferred.get_or_insert(region);
                regions.push(region);
            } else {
                fallback.get_or_insert(region);
            }
        }

        regions.sort();
        regions.dedup();
        (preferred.or(fallback), regions)
    }
}

/// Converts the build-time tree into the public tree, moving each frozen
/// subspace into its leaf.
fn into_tree_node(subtree: Subtree, leaves: &mut [Option<ConvexSubspace>]) -> Option<BspTreeNode> {
    match subtree {
        Subtree::Leaf(id) => leaves
            .get_mut(id.0)?
            .take()
            .map(|subspace| BspTreeNode::Leaf(BspLeaf::new(subspace))),
        Subtree::Node {
            partition,
            line,
            right_bounds,
            left_bounds,
            right,
            left,
        } => {
            let right = into_tree_node(*right, leaves);
            let left = into_tree_node(*left, leaves);
            match (right, left) {
                (Some(right), Some(left)) => Some(BspTreeNode::Node(BspNode::new(
                    partition,
                    line,
                    (right_bounds, right),
                    (left_bounds, left),
                ))),
                (Some(only), None) | (None, Some(only)) => Some(only),
                (None, None) => None,
            }
        }
    }
}
