//! The active partition and the points where the working set touches it.
//!
//! While sides are divided against a partition, every vertex lying on the
//! partition is recorded as an [`Intercept`], together with the region that
//! is open on each side of it along the partition. Once division is done the
//! intercepts are sorted and merged, and each open gap between neighbouring
//! intercepts is closed with a new segment.

use nalgebra::Point2;

use crate::geom::INTERCEPT_MERGE_EPSILON;
use crate::ids::{LineId, VertexId};
use crate::line::RegionId;
use crate::partition::Partition;
use crate::segment::SideId;

/// A region reachable from an intercept, and the side it was found through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenSide {
    pub side: SideId,
    pub region: RegionId,
}

/// A vertex on the partition line.
#[derive(Debug, Clone, PartialEq)]
pub struct Intercept {
    distance: f64,
    vertex: VertexId,
    point: Point2<f64>,
    before: Option<OpenSide>,
    after: Option<OpenSide>,
    self_referencing: bool,
}

impl Intercept {
    /// `before` is what is open looking back along the partition from the
    /// vertex, `after` what is open looking forward.
    pub fn new(
        distance: f64,
        vertex: VertexId,
        point: Point2<f64>,
        before: Option<OpenSide>,
        after: Option<OpenSide>,
        self_referencing: bool,
    ) -> Self {
        Self {
            distance,
            vertex,
            point,
            before,
            after,
            self_referencing,
        }
    }

    /// Distance along the partition from its origin.
    #[inline]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    #[inline]
    pub fn vertex(&self) -> VertexId {
        self.vertex
    }

    #[inline]
    pub fn point(&self) -> Point2<f64> {
        self.point
    }

    #[inline]
    pub fn before(&self) -> Option<OpenSide> {
        self.before
    }

    #[inline]
    pub fn after(&self) -> Option<OpenSide> {
        self.after
    }

    /// Whether the side that produced this intercept belongs to a
    /// self-referencing line.
    #[inline]
    pub fn is_self_referencing(&self) -> bool {
        self.self_referencing
    }

    /// Folds a near-coincident intercept into this one. A self-referencing
    /// intercept prefers the other's open sides.
    fn merge(&mut self, other: &Intercept) {
        if self.self_referencing && !other.self_referencing {
            if self.before.is_some() && other.before.is_some() {
                self.before = other.before;
            }
            if self.after.is_some() && other.after.is_some() {
                self.after = other.after;
            }
            self.self_referencing = false;
        }
        if self.before.is_none() {
            self.before = other.before;
        }
        if self.after.is_none() {
            self.after = other.after;
        }
    }
}

/// The current partition plus its intercepts.
#[derive(Debug, Clone)]
pub struct HPlane {
    partition: Partition,
    line: Option<LineId>,
    source: Option<SideId>,
    intercepts: Vec<Intercept>,
}

impl HPlane {
    /// Creates a half-plane with no intercepts.
    pub fn new(partition: Partition, line: Option<LineId>, source: Option<SideId>) -> Self {
        Self {
            partition,
            line,
            source,
            intercepts: Vec::new(),
        }
    }

    #[inline]
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Map line the partition was taken from.
    #[inline]
    pub fn line(&self) -> Option<LineId> {
        self.line
    }

    /// Side the partition was taken from.
    #[inline]
    pub fn source(&self) -> Option<SideId> {
        self.source
    }

    #[inline]
    pub fn intercepts(&self) -> &[Intercept] {
        &self.intercepts
    }

    /// Returns `true` if `vertex` was already intercepted.
    pub fn is_intercepted(&self, vertex: VertexId) -> bool {
        self.intercepts.iter().any(|i| i.vertex == vertex)
    }

    /// Records an intercept unless its vertex is already present. Returns
    /// `true` if it was added.
    pub fn add_intercept(&mut self, intercept: Intercept) -> bool {
        if self.is_intercepted(intercept.vertex) {
            return false;
        }
        self.intercepts.push(intercept);
        true
    }

    /// Sorts intercepts along the partition and merges any closer than
    /// [`INTERCEPT_MERGE_EPSILON`] into their predecessor.
    pub fn sort_and_merge(&mut self) {
        self.intercepts.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let mut i = 0;
        while i + 1 < self.intercepts.len() {
            let gap = self.intercepts[i + 1].distance - self.intercepts[i].distance;
            debug_assert!(gap >= 0.0);
            if gap <= INTERCEPT_MERGE_EPSILON {
                let next = self.intercepts.remove(i + 1);
                self.intercepts[i].merge(&next);
            } else {
                i += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SegmentId;

    fn open(segment: usize, region: u32) -> Option<OpenSide> {
        Some(OpenSide {
            side: SideId::new(SegmentId(segment), false),
            region: RegionId(region),
        })
    }

    fn hplane() -> HPlane {
        HPlane::new(
            Partition::from_points(Point2::new(0.0, 0.0), Point2::new(100.0, 0.0)),
            Some(LineId(0)),
            None,
        )
    }

    fn at(distance: f64, vertex: usize, before: Option<OpenSide>, after: Option<OpenSide>) -> Intercept {
        Intercept::new(distance, VertexId(vertex), Point2::new(distance, 0.0), before, after, false)
    }

    #[test]
    fn duplicate_vertices_are_ignored() {
        let mut plane = hplane();
        assert!(plane.add_intercept(at(10.0, 1, None, None)));
        assert!(!plane.add_intercept(at(10.0, 1, None, open(0, 1))));
        assert_eq!(plane.intercepts().len(), 1);
    }

    #[test]
    fn intercepts_are_sorted_by_distance() {
        let mut plane = hplane();
        plane.add_intercept(at(50.0, 1, None, None));
        plane.add_intercept(at(-20.0, 2, None, None));
        plane.add_intercept(at(10.0, 3, None, None));
        plane.sort_and_merge();
        let order: Vec<usize> = plane.intercepts().iter().map(|i| i.vertex().0).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn near_intercepts_are_merged() {
        let mut plane = hplane();
        plane.add_intercept(at(10.0, 1, open(0, 4), None));
        plane.add_intercept(at(10.1, 2, None, open(1, 5)));
        plane.add_intercept(at(30.0, 3, None, None));
        plane.sort_and_merge();

        assert_eq!(plane.intercepts().len(), 2);
        let merged = &plane.intercepts()[0];
        assert_eq!(merged.vertex(), VertexId(1));
        assert_eq!(merged.before().map(|o| o.region), Some(RegionId(4)));
        assert_eq!(merged.after().map(|o| o.region), Some(RegionId(5)));
    }

    #[test]
    fn self_referencing_intercept_takes_the_real_regions() {
        let mut plane = hplane();
        let mut window = at(10.0, 1, open(0, 7), open(0, 7));
        window.self_referencing = true;
        plane.add_intercept(window);
        plane.add_intercept(at(10.05, 2, open(1, 2), open(2, 3)));
        plane.sort_and_merge();

        let merged = &plane.intercepts()[0];
        assert!(!merged.is_self_referencing());
        assert_eq!(merged.before().map(|o| o.region), Some(RegionId(2)));
        assert_eq!(merged.after().map(|o| o.region), Some(RegionId(3)));
    }
}
