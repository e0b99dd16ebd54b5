//! Line segments and their two directed sides.
//!
//! A [`LineSegment`] is one physical edge between two vertices. It is seen
//! through two [`Side`]s: the front side runs `from -> to` with its region on
//! the right, the back side runs `to -> from`. Both live in the same arena
//! slot pair, so a [`SideId`] finds its twin with a single bit flip.
//!
//! Sides also carry non-owning back-references (super block, convex
//! subspace, half-edge) which the partitioner keeps in sync whenever a side
//! is split or moved.

use std::fmt;

use nalgebra::{Point2, Vector2};

use crate::geom::{direction_to_angle, AABox, Slope, DIST_EPSILON};
use crate::ids::{BlockId, HalfEdgeId, LineId, SegmentId, SubspaceId, VertexId};
use crate::line::RegionId;
use crate::mesh::MapSide;
use crate::partition::{line_relationship, BoxSide, LineRelationship, Partition};

/// One directed side of a [`LineSegment`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SideId(usize);

impl SideId {
    #[inline]
    pub fn new(segment: SegmentId, is_back: bool) -> Self {
        SideId(segment.0 << 1 | is_back as usize)
    }

    #[inline]
    pub fn segment(self) -> SegmentId {
        SegmentId(self.0 >> 1)
    }

    #[inline]
    pub fn is_back(self) -> bool {
        self.0 & 1 == 1
    }

    #[inline]
    pub fn is_front(self) -> bool {
        !self.is_back()
    }

    /// The other side of the same segment.
    #[inline]
    pub fn twin(self) -> SideId {
        SideId(self.0 ^ 1)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let which = if self.is_back() { "back" } else { "front" };
        write!(f, "Side({}:{})", self.segment().0, which)
    }
}

/// A physical edge between two vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSegment {
    from: VertexId,
    to: VertexId,
    from_point: Point2<f64>,
    to_point: Point2<f64>,
    slope: Slope,
    /// Source map line, `None` for segments synthesized along a partition.
    line: Option<LineId>,
    /// For synthesized segments: the map line of the partition that created
    /// them. Provenance only.
    partition_line: Option<LineId>,
}

impl LineSegment {
    #[inline]
    pub fn from(&self) -> VertexId {
        self.from
    }

    #[inline]
    pub fn to(&self) -> VertexId {
        self.to
    }

    #[inline]
    pub fn from_point(&self) -> Point2<f64> {
        self.from_point
    }

    #[inline]
    pub fn to_point(&self) -> Point2<f64> {
        self.to_point
    }

    #[inline]
    pub fn slope(&self) -> Slope {
        self.slope
    }

    #[inline]
    pub fn line(&self) -> Option<LineId> {
        self.line
    }

    #[inline]
    pub fn partition_line(&self) -> Option<LineId> {
        self.partition_line
    }

    /// Length of the segment.
    pub fn length(&self) -> f64 {
        (self.to_point - self.from_point).norm()
    }
}

/// Per-side state of a segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Side {
    region: Option<RegionId>,
    /// Previous piece of the same original side, after splits.
    left: Option<SideId>,
    /// Next piece of the same original side, after splits.
    right: Option<SideId>,
    block: Option<BlockId>,
    subspace: Option<SubspaceId>,
    half_edge: Option<HalfEdgeId>,
}

impl Side {
    /// Region on the right of this side, `None` for void.
    #[inline]
    pub fn region(&self) -> Option<RegionId> {
        self.region
    }

    #[inline]
    pub fn left(&self) -> Option<SideId> {
        self.left
    }

    #[inline]
    pub fn right(&self) -> Option<SideId> {
        self.right
    }

    /// The super block currently holding this side.
    #[inline]
    pub fn block(&self) -> Option<BlockId> {
        self.block
    }

    /// The convex subspace this side bounds, once assigned.
    #[inline]
    pub fn subspace(&self) -> Option<SubspaceId> {
        self.subspace
    }

    /// The leaf half-edge built for this side.
    #[inline]
    pub fn half_edge(&self) -> Option<HalfEdgeId> {
        self.half_edge
    }

    pub(crate) fn set_block(&mut self, block: Option<BlockId>) {
        self.block = block;
    }

    pub(crate) fn set_subspace(&mut self, subspace: Option<SubspaceId>) {
        self.subspace = subspace;
    }

    pub(crate) fn set_half_edge(&mut self, half_edge: Option<HalfEdgeId>) {
        self.half_edge = half_edge;
    }
}

/// Arena owning every segment and side created during a build.
#[derive(Debug, Clone, Default)]
pub struct SegmentArena {
    segments: Vec<LineSegment>,
    sides: Vec<Side>,
}

impl SegmentArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a segment from `from` to `to`, returning its id. The front
    /// side gets `front_region`, the back side `back_region`.
    pub fn create(
        &mut self,
        (from, from_point): (VertexId, Point2<f64>),
        (to, to_point): (VertexId, Point2<f64>),
        front_region: Option<RegionId>,
        back_region: Option<RegionId>,
        line: Option<LineId>,
        partition_line: Option<LineId>,
    ) -> SegmentId {
        debug_assert!(from_point != to_point, "Line segment must have non-zero length");
        self.segments.push(LineSegment {
            from,
            to,
            from_point,
            to_point,
            slope: Slope::of(to_point - from_point),
            line,
            partition_line,
        });
        self.sides.push(Side {
            region: front_region,
            ..Side::default()
        });
        self.sides.push(Side {
            region: back_region,
            ..Side::default()
        });
        SegmentId(self.segments.len() - 1)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    pub fn segment(&self, id: SegmentId) -> &LineSegment {
        &self.segments[id.0]
    }

    #[inline]
    pub fn side(&self, id: SideId) -> &Side {
        &self.sides[id.0]
    }

    #[inline]
    pub(crate) fn side_mut(&mut self, id: SideId) -> &mut Side {
        &mut self.sides[id.0]
    }

    /// Iterates over every side id in creation order.
    pub fn side_ids(&self) -> impl Iterator<Item = SideId> + '_ {
        (0..self.sides.len()).map(SideId)
    }

    #[inline]
    pub fn region(&self, side: SideId) -> Option<RegionId> {
        self.sides[side.0].region
    }

    pub fn from_vertex(&self, side: SideId) -> VertexId {
        let segment = self.segment(side.segment());
        if side.is_back() { segment.to } else { segment.from }
    }

    pub fn to_vertex(&self, side: SideId) -> VertexId {
        let segment = self.segment(side.segment());
        if side.is_back() { segment.from } else { segment.to }
    }

    pub fn from_point(&self, side: SideId) -> Point2<f64> {
        let segment = self.segment(side.segment());
        if side.is_back() { segment.to_point } else { segment.from_point }
    }

    pub fn to_point(&self, side: SideId) -> Point2<f64> {
        let segment = self.segment(side.segment());
        if side.is_back() { segment.from_point } else { segment.to_point }
    }

    pub fn direction(&self, side: SideId) -> Vector2<f64> {
        self.to_point(side) - self.from_point(side)
    }

    /// Direction angle of the side in degrees.
    pub fn angle(&self, side: SideId) -> f64 {
        direction_to_angle(self.direction(side))
    }

    /// The infinite line this side runs along.
    pub fn partition(&self, side: SideId) -> Partition {
        Partition::new(self.from_point(side), self.direction(side))
    }

    /// Source map line of the side's segment.
    #[inline]
    pub fn line(&self, side: SideId) -> Option<LineId> {
        self.segment(side.segment()).line
    }

    #[inline]
    pub fn has_map_line(&self, side: SideId) -> bool {
        self.line(side).is_some()
    }

    /// The map line side this side was cut from.
    pub fn map_side(&self, side: SideId) -> Option<MapSide> {
        self.line(side).map(|line| MapSide {
            line,
            is_back: side.is_back(),
        })
    }

    /// Classifies this side against a partition, also returning the signed
    /// distances of its `from` and `to` endpoints.
    pub fn relationship(&self, side: SideId, partition: &Partition) -> (LineRelationship, f64, f64) {
        let from_dist = partition.perp_distance(self.from_point(side));
        let to_dist = partition.perp_distance(self.to_point(side));
        (line_relationship(from_dist, to_dist, DIST_EPSILON), from_dist, to_dist)
    }

    /// Classifies a whole box against the line of this side.
    pub fn box_on_side(&self, side: SideId, bounds: &AABox) -> BoxSide {
        self.partition(side).box_on_side(bounds)
    }

    /// Splits the segment of `side` at `point` (the new vertex `vertex`).
    ///
    /// `side` keeps its `from` vertex and now ends at `point`; the returned
    /// side (same facing, new segment) runs from `point` to the old `to`.
    /// The twin is split to match and both split chains are relinked.
    /// Block, subspace and tip bookkeeping is left to the caller.
    pub fn split(&mut self, side: SideId, vertex: VertexId, point: Point2<f64>) -> SideId {
        let seg_id = side.segment();
        let old = self.segments[seg_id.0].clone();

        let new_segment = if side.is_front() {
            let segment = &mut self.segments[seg_id.0];
            segment.to = vertex;
            segment.to_point = point;
            segment.slope = Slope::of(point - segment.from_point);
            LineSegment {
                from: vertex,
                from_point: point,
                slope: Slope::of(old.to_point - point),
                ..old
            }
        } else {
            let segment = &mut self.segments[seg_id.0];
            segment.from = vertex;
            segment.from_point = point;
            segment.slope = Slope::of(segment.to_point - point);
            LineSegment {
                to: vertex,
                to_point: point,
                slope: Slope::of(point - old.from_point),
                ..old
            }
        };

        let front_region = self.sides[SideId::new(seg_id, false).0].region;
        let back_region = self.sides[SideId::new(seg_id, true).0].region;
        self.segments.push(new_segment);
        self.sides.push(Side {
            region: front_region,
            ..Side::default()
        });
        self.sides.push(Side {
            region: back_region,
            ..Side::default()
        });
        let new_seg_id = SegmentId(self.segments.len() - 1);
        let new_side = SideId::new(new_seg_id, side.is_back());

        // The new piece follows `side` along its direction.
        let old_right = self.sides[side.0].right;
        self.sides[new_side.0].left = Some(side);
        self.sides[new_side.0].right = old_right;
        self.sides[side.0].right = Some(new_side);
        if let Some(right) = old_right {
            self.sides[right.0].left = Some(new_side);
        }

        // Along the twin's direction the new piece comes first.
        let twin = side.twin();
        let new_twin = new_side.twin();
        let old_left = self.sides[twin.0].left;
        self.sides[new_twin.0].right = Some(twin);
        self.sides[new_twin.0].left = old_left;
        self.sides[twin.0].left = Some(new_twin);
        if let Some(left) = old_left {
            self.sides[left.0].right = Some(new_twin);
        }

        new_side
    }
}
