//! Per-vertex registry of the segments meeting at that vertex.
//!
//! Each tip records the angle at which a segment leaves the vertex, the side
//! running away from the vertex (`front`, whose region is clockwise of the
//! tip) and its twin (`back`, whose region is anticlockwise). Tips are kept
//! sorted by angle so "which region lies in this direction" can be answered
//! by a linear scan.

use crate::geom::ANG_EPSILON;
use crate::ids::{SegmentId, VertexId};
use crate::segment::{SegmentArena, SideId};

/// One segment leaving a vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeTip {
    angle: f64,
    front: SideId,
}

impl EdgeTip {
    /// Creates a tip for a side leaving its `from` vertex.
    pub fn new(arena: &SegmentArena, front: SideId) -> Self {
        Self {
            angle: arena.angle(front),
            front,
        }
    }

    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// The side leaving the vertex.
    #[inline]
    pub fn front(&self) -> SideId {
        self.front
    }

    /// The side arriving at the vertex along the same edge.
    #[inline]
    pub fn back(&self) -> SideId {
        self.front.twin()
    }
}

/// Angle-ordered tips of a single vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeTips {
    tips: Vec<EdgeTip>,
}

impl EdgeTips {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a tip after any tips with an equal or smaller angle.
    pub fn insert(&mut self, tip: EdgeTip) {
        let at = self.tips.partition_point(|t| t.angle <= tip.angle);
        self.tips.insert(at, tip);
    }

    /// Removes every tip belonging to `segment`.
    pub fn clear_by_segment(&mut self, segment: SegmentId) {
        self.tips.retain(|t| t.front.segment() != segment);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tips.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tips.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EdgeTip> {
        self.tips.iter()
    }

    /// Returns the side whose region is open in direction `angle`, or
    /// `None` if a segment lies exactly along that direction (the way is
    /// blocked by an edge).
    ///
    /// A direction just clockwise of a tip sees that tip's front region; a
    /// direction anticlockwise of every tip sees the back region of the tip
    /// with the largest angle.
    pub fn side_at(&self, angle: f64) -> Option<SideId> {
        let blocked = self.tips.iter().any(|tip| {
            let diff = (tip.angle - angle).abs();
            diff < ANG_EPSILON || diff > 360.0 - ANG_EPSILON
        });
        if blocked {
            return None;
        }

        match self.tips.iter().find(|tip| angle + ANG_EPSILON < tip.angle) {
            Some(tip) => Some(tip.front()),
            None => self.tips.last().map(EdgeTip::back),
        }
    }
}

/// Tips for every vertex, indexed by [`VertexId`].
#[derive(Debug, Clone, Default)]
pub struct EdgeTipRegistry {
    by_vertex: Vec<EdgeTips>,
}

impl EdgeTipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tips of a vertex; empty if none were ever registered.
    pub fn get(&self, vertex: VertexId) -> &EdgeTips {
        static EMPTY: EdgeTips = EdgeTips { tips: Vec::new() };
        self.by_vertex.get(vertex.0).unwrap_or(&EMPTY)
    }

    /// Mutable tips of a vertex, growing the registry as needed.
    pub fn get_mut(&mut self, vertex: VertexId) -> &mut EdgeTips {
        if vertex.0 >= self.by_vertex.len() {
            self.by_vertex.resize_with(vertex.0 + 1, EdgeTips::new);
        }
        &mut self.by_vertex[vertex.0]
    }

    /// Registers both ends of a segment: its front side leaves `from`, its
    /// back side leaves `to`.
    pub fn add_segment(&mut self, arena: &SegmentArena, segment: SegmentId) {
        let front = SideId::new(segment, false);
        let back = front.twin();
        let from = arena.from_vertex(front);
        let to = arena.from_vertex(back);
        self.get_mut(from).insert(EdgeTip::new(arena, front));
        self.get_mut(to).insert(EdgeTip::new(arena, back));
    }

    /// Drops every tip of `segment` at `vertex`.
    pub fn remove_segment(&mut self, vertex: VertexId, segment: SegmentId) {
        self.get_mut(vertex).clear_by_segment(segment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::LineId;
    use approx::assert_relative_eq;
    use crate::line::RegionId;
    use nalgebra::Point2;

    /// Builds a segment leaving vertex 0 at the origin towards `to`.
    fn spoke(
        arena: &mut SegmentArena,
        to: [f64; 2],
        front: Option<RegionId>,
        back: Option<RegionId>,
    ) -> SegmentId {
        arena.create(
            (VertexId(0), Point2::new(0.0, 0.0)),
            (VertexId(1), Point2::new(to[0], to[1])),
            front,
            back,
            Some(LineId(0)),
            None,
        )
    }

    #[test]
    fn tips_stay_sorted() {
        let mut arena = SegmentArena::new();
        let mut tips = EdgeTips::new();
        for to in [[0.0, 1.0], [1.0, 0.0], [-1.0, -1.0], [-1.0, 0.0]] {
            let seg = spoke(&mut arena, to, None, None);
            tips.insert(EdgeTip::new(&arena, SideId::new(seg, false)));
        }
        let angles: Vec<f64> = tips.iter().map(EdgeTip::angle).collect();
        assert_eq!(&angles[..3], &[0.0, 90.0, 180.0]);
        assert_relative_eq!(angles[3], 225.0, epsilon = 1e-9);
    }

    #[test]
    fn open_side_lookup() {
        // Two walls enclosing region 1 in the north-east quadrant: one east
        // (void below, region 1 above), one north (region 1 to its east).
        let mut arena = SegmentArena::new();
        let east = spoke(&mut arena, [1.0, 0.0], None, Some(RegionId(1)));
        let north = spoke(&mut arena, [0.0, 1.0], Some(RegionId(1)), None);
        let mut tips = EdgeTips::new();
        tips.insert(EdgeTip::new(&arena, SideId::new(east, false)));
        tips.insert(EdgeTip::new(&arena, SideId::new(north, false)));

        // Between the walls (45 degrees) we are clockwise of north: its front.
        let side = tips.side_at(45.0).unwrap();
        assert_eq!(side, SideId::new(north, false));
        assert_eq!(arena.region(side), Some(RegionId(1)));

        // Beyond the north wall we are anticlockwise of the last tip.
        let side = tips.side_at(200.0).unwrap();
        assert_eq!(side, SideId::new(north, true));
        assert_eq!(arena.region(side), None);

        // Straight along a wall is blocked.
        assert!(tips.side_at(90.0).is_none());
        assert!(tips.side_at(359.9999).is_none());
    }

    #[test]
    fn registry_add_and_remove() {
        let mut arena = SegmentArena::new();
        let seg = spoke(&mut arena, [4.0, 0.0], Some(RegionId(1)), None);
        let mut registry = EdgeTipRegistry::new();
        registry.add_segment(&arena, seg);

        assert_eq!(registry.get(VertexId(0)).len(), 1);
        assert_eq!(registry.get(VertexId(1)).len(), 1);
        assert_eq!(registry.get(VertexId(1)).iter().next().unwrap().angle(), 180.0);
        assert!(registry.get(VertexId(42)).is_empty());

        registry.remove_segment(VertexId(1), seg);
        assert!(registry.get(VertexId(1)).is_empty());
        assert_eq!(registry.get(VertexId(0)).len(), 1);
    }
}
