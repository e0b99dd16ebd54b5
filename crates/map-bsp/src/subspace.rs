//! Convex leaf regions.
//!
//! While the tree is being built a leaf is just a [`ConvexSet`] of sides.
//! Once every finishing pass has run it is frozen into a
//! [`ConvexSubspace`]: a clockwise ring of [`LeafSide`]s plus the mesh face
//! built for it.

use nalgebra::{Point2, Vector2};

use crate::geom::{direction_to_angle, AABox, ANG_EPSILON, DIST_EPSILON};
use crate::ids::{FaceId, HalfEdgeId, LineId, SubspaceId, VertexId};
use crate::line::RegionId;
use crate::mesh::MapSide;
use crate::partition::Partition;
use crate::segment::{SegmentArena, SideId};

/// A side positioned around the center of its subspace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedSide {
    pub side: SideId,
    /// Angle from the center to the side's `from` point.
    pub from_angle: f64,
    /// Angle from the center to the side's `to` point.
    pub to_angle: f64,
}

/// The unordered sides of one leaf under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvexSet {
    sides: Vec<SideId>,
}

impl ConvexSet {
    pub fn new(sides: Vec<SideId>) -> Self {
        Self { sides }
    }

    #[inline]
    pub fn sides(&self) -> &[SideId] {
        &self.sides
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sides.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sides.is_empty()
    }

    pub fn add(&mut self, side: SideId) {
        debug_assert!(!self.sides.contains(&side));
        self.sides.push(side);
    }

    /// Average of every side endpoint.
    pub fn center(&self, arena: &SegmentArena) -> Point2<f64> {
        if self.sides.is_empty() {
            return Point2::origin();
        }
        let sum: Vector2<f64> = self
            .sides
            .iter()
            .map(|&side| arena.from_point(side).coords + arena.to_point(side).coords)
            .sum();
        Point2::from(sum / (2 * self.sides.len()) as f64)
    }

    /// Sides sorted clockwise around the center. Sides starting at the same
    /// angle are ordered longest first.
    pub fn ordered(&self, arena: &SegmentArena) -> Vec<OrderedSide> {
        let center = self.center(arena);
        let mut ordered: Vec<OrderedSide> = self
            .sides
            .iter()
            .map(|&side| OrderedSide {
                side,
                from_angle: direction_to_angle(arena.from_point(side) - center),
                to_angle: direction_to_angle(arena.to_point(side) - center),
            })
            .collect();

        ordered.sort_by(|a, b| b.from_angle.total_cmp(&a.from_angle));
        let length = |o: &OrderedSide| arena.segment(o.side.segment()).length();
        for group in overlap_groups(&ordered) {
            ordered[group].sort_by(|a, b| length(b).total_cmp(&length(a)));
        }
        ordered
    }

    /// Number of distinct vertices referenced by the sides.
    pub fn distinct_vertex_count(&self, arena: &SegmentArena) -> usize {
        let mut vertices: Vec<VertexId> = self
            .sides
            .iter()
            .flat_map(|&side| [arena.from_vertex(side), arena.to_vertex(side)])
            .collect();
        vertices.sort();
        vertices.dedup();
        vertices.len()
    }
}

/// Groups consecutive ordered sides that start at the same angle.
pub fn overlap_groups(ordered: &[OrderedSide]) -> Vec<std::ops::Range<usize>> {
    let mut groups = Vec::new();
    let mut i = 0;
    while i < ordered.len() {
        let mut k = i;
        while k + 1 < ordered.len() && (ordered[k + 1].from_angle - ordered[i].from_angle).abs() < ANG_EPSILON {
            k += 1;
        }
        groups.push(i..k + 1);
        i = k + 1;
    }
    groups
}

/// One side of a finished leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafSide {
    pub(crate) side: SideId,
    pub(crate) from: VertexId,
    pub(crate) to: VertexId,
    pub(crate) from_point: Point2<f64>,
    pub(crate) to_point: Point2<f64>,
    pub(crate) line: Option<LineId>,
    pub(crate) partition_line: Option<LineId>,
    pub(crate) map_side: Option<MapSide>,
    pub(crate) region: Option<RegionId>,
    pub(crate) half_edge: Option<HalfEdgeId>,
}

impl LeafSide {
    pub(crate) fn from_arena(arena: &SegmentArena, side: SideId) -> Self {
        let segment = arena.segment(side.segment());
        Self {
            side,
            from: arena.from_vertex(side),
            to: arena.to_vertex(side),
            from_point: arena.from_point(side),
            to_point: arena.to_point(side),
            line: segment.line(),
            partition_line: segment.partition_line(),
            map_side: arena.map_side(side),
            region: arena.region(side),
            half_edge: arena.side(side).half_edge(),
        }
    }

    #[inline]
    pub fn side(&self) -> SideId {
        self.side
    }

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

    /// Source map line; `None` for sides synthesized along a partition.
    #[inline]
    pub fn line(&self) -> Option<LineId> {
        self.line
    }

    /// For synthesized sides, the map line of the partition that made them.
    #[inline]
    pub fn partition_line(&self) -> Option<LineId> {
        self.partition_line
    }

    #[inline]
    pub fn map_side(&self) -> Option<MapSide> {
        self.map_side
    }

    #[inline]
    pub fn region(&self) -> Option<RegionId> {
        self.region
    }

    #[inline]
    pub fn half_edge(&self) -> Option<HalfEdgeId> {
        self.half_edge
    }

    pub fn length(&self) -> f64 {
        (self.to_point - self.from_point).norm()
    }
}

/// The final boundary of one leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexSubspace {
    pub(crate) id: SubspaceId,
    /// Clockwise ring, one side per edge.
    pub(crate) sides: Vec<LeafSide>,
    /// Sides exactly overlapping a ring side; they get half-edges but are
    /// not part of the face ring.
    pub(crate) extra_sides: Vec<LeafSide>,
    pub(crate) region: Option<RegionId>,
    pub(crate) face: Option<FaceId>,
    pub(crate) discordant: bool,
}

impl ConvexSubspace {
    #[inline]
    pub fn id(&self) -> SubspaceId {
        self.id
    }

    #[inline]
    pub fn sides(&self) -> &[LeafSide] {
        &self.sides
    }

    #[inline]
    pub fn extra_sides(&self) -> &[LeafSide] {
        &self.extra_sides
    }

    /// Every side, ring first.
    pub fn all_sides(&self) -> impl Iterator<Item = &LeafSide> {
        self.sides.iter().chain(self.extra_sides.iter())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sides.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sides.is_empty()
    }

    /// The region this leaf belongs to.
    #[inline]
    pub fn region(&self) -> Option<RegionId> {
        self.region
    }

    /// The mesh face built for the ring.
    #[inline]
    pub fn face(&self) -> Option<FaceId> {
        self.face
    }

    /// Whether the map sides of this leaf disagree about its region.
    #[inline]
    pub fn is_discordant(&self) -> bool {
        self.discordant
    }

    /// Ring vertices in clockwise order.
    pub fn points(&self) -> impl Iterator<Item = Point2<f64>> + '_ {
        self.sides.iter().map(LeafSide::from_point)
    }

    /// Average of the ring vertices.
    pub fn center(&self) -> Point2<f64> {
        if self.sides.is_empty() {
            return Point2::origin();
        }
        let sum: Vector2<f64> = self.points().map(|p| p.coords).sum();
        Point2::from(sum / self.sides.len() as f64)
    }

    pub fn bounds(&self) -> Option<AABox> {
        AABox::from_points(self.points())
    }

    /// Returns `true` if `point` is inside or on the ring.
    pub fn contains(&self, point: Point2<f64>) -> bool {
        !self.sides.is_empty()
            && self.sides.iter().all(|side| {
                Partition::from_points(side.from_point, side.to_point).perp_distance(point) >= -DIST_EPSILON
            })
    }

    /// Returns `true` if no ring vertex lies to the left of any ring side,
    /// i.e. the ring has no reflex corner.
    pub fn is_convex(&self) -> bool {
        self.sides.iter().all(|side| {
            let line = Partition::from_points(side.from_point, side.to_point);
            self.points().all(|p| line.perp_distance(p) >= -DIST_EPSILON)
        })
    }

    /// Signed area of the ring; positive for a clockwise ring.
    pub fn area(&self) -> f64 {
        let twice: f64 = self
            .sides
            .iter()
            .map(|side| side.to_point.x * side.from_point.y - side.from_point.x * side.to_point.y)
            .sum();
        twice / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SegmentId;

    /// Creates a one-sided segment per consecutive pair of `points`, with the
    /// region on the right. Returns the front sides.
    fn make_ring(arena: &mut SegmentArena, points: &[[f64; 2]]) -> Vec<SideId> {
        let n = points.len();
        (0..n)
            .map(|i| {
                let (a, b) = (points[i], points[(i + 1) % n]);
                let seg = arena.create(
                    (VertexId(i), Point2::new(a[0], a[1])),
                    (VertexId((i + 1) % n), Point2::new(b[0], b[1])),
                    Some(RegionId(1)),
                    None,
                    Some(LineId(i)),
                    None,
                );
                SideId::new(seg, false)
            })
            .collect()
    }

    fn square(arena: &mut SegmentArena) -> Vec<SideId> {
        // Clockwise in a y-up plane.
        make_ring(arena, &[[0.0, 0.0], [0.0, 64.0], [64.0, 64.0], [64.0, 0.0]])
    }

    fn freeze(arena: &SegmentArena, set: &ConvexSet) -> ConvexSubspace {
        ConvexSubspace {
            id: SubspaceId(0),
            sides: set
                .ordered(arena)
                .iter()
                .map(|o| LeafSide::from_arena(arena, o.side))
                .collect(),
            extra_sides: Vec::new(),
            region: Some(RegionId(1)),
            face: None,
            discordant: false,
        }
    }

    #[test]
    fn center_is_endpoint_average() {
        let mut arena = SegmentArena::new();
        let set = ConvexSet::new(square(&mut arena));
        assert_eq!(set.center(&arena), Point2::new(32.0, 32.0));
        assert_eq!(set.distinct_vertex_count(&arena), 4);
    }

    #[test]
    fn ordering_is_clockwise() {
        let mut arena = SegmentArena::new();
        let mut sides = square(&mut arena);
        sides.reverse();
        let set = ConvexSet::new(sides);
        let ordered = set.ordered(&arena);

        for pair in ordered.windows(2) {
            assert!(pair[0].from_angle > pair[1].from_angle);
            // Consecutive sides share a vertex.
            assert_eq!(arena.to_vertex(pair[0].side), arena.from_vertex(pair[1].side));
        }
    }

    #[test]
    fn overlapping_sides_are_grouped_longest_first() {
        let mut arena = SegmentArena::new();
        let mut sides = square(&mut arena);
        // A shorter side starting where the top side starts.
        let short = arena.create(
            (VertexId(1), Point2::new(0.0, 64.0)),
            (VertexId(9), Point2::new(16.0, 64.0)),
            Some(RegionId(1)),
            None,
            None,
            None,
        );
        sides.push(SideId::new(short, false));
        let set = ConvexSet::new(sides);
        let ordered = set.ordered(&arena);
        let groups = overlap_groups(&ordered);

        assert_eq!(groups.len(), 4);
        let pair = groups.iter().find(|g| g.len() == 2).unwrap();
        assert_eq!(ordered[pair.start].side, SideId::new(SegmentId(1), false));
        assert_eq!(ordered[pair.end - 1].side, SideId::new(short, false));
    }

    #[test]
    fn longest_side_leads_group_when_end_angles_wrap() {
        let mut arena = SegmentArena::new();
        let mut sides = square(&mut arena);
        // Starts with the east wall but stops short; its end lies just
        // above the center while the wall's end lies well below it.
        let short = arena.create(
            (VertexId(2), Point2::new(64.0, 64.0)),
            (VertexId(9), Point2::new(64.0, 40.0)),
            Some(RegionId(1)),
            None,
            None,
            None,
        );
        sides.push(SideId::new(short, false));
        let set = ConvexSet::new(sides);
        let ordered = set.ordered(&arena);

        let pair = overlap_groups(&ordered).into_iter().find(|g| g.len() == 2).unwrap();
        assert!(ordered[pair.end - 1].to_angle < ordered[pair.start].to_angle);
        assert_eq!(ordered[pair.start].side, SideId::new(SegmentId(2), false));
        assert_eq!(ordered[pair.end - 1].side, SideId::new(short, false));
    }

    #[test]
    fn frozen_square_is_convex_and_contains_center() {
        let mut arena = SegmentArena::new();
        let set = ConvexSet::new(square(&mut arena));
        let subspace = freeze(&arena, &set);

        assert!(subspace.is_convex());
        assert!(subspace.contains(Point2::new(32.0, 32.0)));
        assert!(subspace.contains(Point2::new(0.0, 10.0)));
        assert!(!subspace.contains(Point2::new(-5.0, 10.0)));
        assert_eq!(subspace.area(), 64.0 * 64.0);
        assert_eq!(subspace.center(), Point2::new(32.0, 32.0));
    }

    #[test]
    fn reflex_ring_is_not_convex() {
        let mut arena = SegmentArena::new();
        let sides = make_ring(
            &mut arena,
            &[[0.0, 0.0], [0.0, 256.0], [128.0, 256.0], [128.0, 128.0], [256.0, 128.0], [256.0, 0.0]],
        );
        let subspace = ConvexSubspace {
            id: SubspaceId(0),
            sides: sides.iter().map(|&s| LeafSide::from_arena(&arena, s)).collect(),
            extra_sides: Vec::new(),
            region: None,
            face: None,
            discordant: false,
        };
        assert!(!subspace.is_convex());
    }
}
