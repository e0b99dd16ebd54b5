//! Partition line representation and classification.

use nalgebra::{Point2, Vector2};

use crate::geom::{direction_to_angle, AABox, Slope, DIST_EPSILON, SHORT_EDGE_EPSILON};

/// Which side of a partition line a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSide {
    /// Positive perpendicular distance (clockwise of the direction).
    Right,
    /// Negative perpendicular distance.
    Left,
    /// Within epsilon of the line.
    On,
}

/// Relationship of a line segment to a partition line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRelationship {
    /// Both endpoints lie on the partition.
    Collinear,
    /// Both endpoints are clearly on the right.
    Right,
    /// On the right, with one endpoint touching the partition.
    RightIntercept,
    /// Both endpoints are clearly on the left.
    Left,
    /// On the left, with one endpoint touching the partition.
    LeftIntercept,
    /// The endpoints are on opposite sides: the segment crosses the line.
    Intersects,
}

/// Classifies a segment from the signed perpendicular distances of its two
/// endpoints.
pub fn line_relationship(from_dist: f64, to_dist: f64, epsilon: f64) -> LineRelationship {
    if from_dist.abs() <= epsilon && to_dist.abs() <= epsilon {
        return LineRelationship::Collinear;
    }

    if from_dist > -epsilon && to_dist > -epsilon {
        if from_dist < epsilon || to_dist < epsilon {
            return LineRelationship::RightIntercept;
        }
        return LineRelationship::Right;
    }

    if from_dist < epsilon && to_dist < epsilon {
        if from_dist > -epsilon || to_dist > -epsilon {
            return LineRelationship::LeftIntercept;
        }
        return LineRelationship::Left;
    }

    LineRelationship::Intersects
}

/// Classification of a whole bounding box against a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxSide {
    Right,
    Left,
    /// The line passes through (or very near) the box.
    Crosses,
}

/// An infinite directed line through the map plane.
///
/// Distances are signed: positive values are on the right of the direction,
/// which is where the front region of a map line lives.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    origin: Point2<f64>,
    direction: Vector2<f64>,
    length: f64,
    slope: Slope,
}

impl Partition {
    /// Creates a partition from a point on the line and a direction.
    ///
    /// # Panics
    /// Panics if the direction vector has zero length.
    pub fn new(origin: Point2<f64>, direction: Vector2<f64>) -> Self {
        let length = direction.norm();
        assert!(length > f64::EPSILON, "Partition direction cannot be zero");
        Self {
            origin,
            direction,
            length,
            slope: Slope::of(direction),
        }
    }

    /// Creates a partition running from `from` through `to`.
    ///
    /// # Panics
    /// Panics if the points coincide.
    pub fn from_points(from: Point2<f64>, to: Point2<f64>) -> Self {
        Self::new(from, to - from)
    }

    #[inline]
    pub fn origin(&self) -> Point2<f64> {
        self.origin
    }

    /// Returns the (unnormalized) direction vector.
    #[inline]
    pub fn direction(&self) -> Vector2<f64> {
        self.direction
    }

    #[inline]
    pub fn slope(&self) -> Slope {
        self.slope
    }

    /// Returns the direction angle in degrees, in `[0, 360)`.
    pub fn angle(&self) -> f64 {
        direction_to_angle(self.direction)
    }

    /// Signed perpendicular distance from the line to `point`.
    /// Positive on the right, negative on the left.
    #[inline]
    pub fn perp_distance(&self, point: Point2<f64>) -> f64 {
        let delta = point - self.origin;
        (delta.x * self.direction.y - delta.y * self.direction.x) / self.length
    }

    /// Distance of the projection of `point` along the line, measured from
    /// the origin.
    #[inline]
    pub fn para_distance(&self, point: Point2<f64>) -> f64 {
        (point - self.origin).dot(&self.direction) / self.length
    }

    /// Classifies which side of the line a point lies on, using
    /// [`DIST_EPSILON`].
    #[inline]
    pub fn classify_point(&self, point: Point2<f64>) -> LineSide {
        self.classify_point_with_epsilon(point, DIST_EPSILON)
    }

    /// Classifies which side of the line a point lies on, with a custom epsilon.
    pub fn classify_point_with_epsilon(&self, point: Point2<f64>, epsilon: f64) -> LineSide {
        let dist = self.perp_distance(point);
        if dist > epsilon {
            LineSide::Right
        } else if dist < -epsilon {
            LineSide::Left
        } else {
            LineSide::On
        }
    }

    /// Returns the same line running the other way.
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            direction: -self.direction,
            length: self.length,
            slope: self.slope,
        }
    }

    /// Classifies a whole box against the line.
    ///
    /// The box is padded by 1.5 short-edge lengths so that segments close to
    /// (but not touching) the line still get individual attention.
    pub fn box_on_side(&self, bounds: &AABox) -> BoxSide {
        let padded = bounds.expanded(SHORT_EDGE_EPSILON * 1.5);
        let (min, max) = (padded.min(), padded.max());

        let (p1, p2) = match self.slope {
            Slope::Vertical => {
                let mut p1 = if min.x > self.origin.x { 1 } else { -1 };
                let mut p2 = if max.x > self.origin.x { 1 } else { -1 };
                if self.direction.y < 0.0 {
                    p1 = -p1;
                    p2 = -p2;
                }
                (p1, p2)
            }
            Slope::Horizontal => {
                let mut p1 = if min.y < self.origin.y { 1 } else { -1 };
                let mut p2 = if max.y < self.origin.y { 1 } else { -1 };
                if self.direction.x < 0.0 {
                    p1 = -p1;
                    p2 = -p2;
                }
                (p1, p2)
            }
            Slope::Positive => (
                self.point_sign(Point2::new(min.x, max.y)),
                self.point_sign(Point2::new(max.x, min.y)),
            ),
            Slope::Negative => (
                self.point_sign(Point2::new(min.x, min.y)),
                self.point_sign(Point2::new(max.x, max.y)),
            ),
        };

        match (p1, p2) {
            (1, 1) => BoxSide::Right,
            (-1, -1) => BoxSide::Left,
            _ => BoxSide::Crosses,
        }
    }

    fn point_sign(&self, point: Point2<f64>) -> i32 {
        match self.classify_point(point) {
            LineSide::Right => 1,
            LineSide::Left => -1,
            LineSide::On => 0,
        }
    }

    /// Computes where the segment `from -> to` crosses this line, given the
    /// perpendicular distances of its endpoints (which must have opposite
    /// signs).
    ///
    /// Axis-aligned combinations are resolved exactly.
    pub fn intersection(
        &self,
        from: Point2<f64>,
        to: Point2<f64>,
        from_dist: f64,
        to_dist: f64,
    ) -> Point2<f64> {
        let delta = to - from;
        let seg_slope = Slope::of(delta);

        if self.slope == Slope::Horizontal && seg_slope == Slope::Vertical {
            return Point2::new(from.x, self.origin.y);
        }
        if self.slope == Slope::Vertical && seg_slope == Slope::Horizontal {
            return Point2::new(self.origin.x, from.y);
        }

        let t = from_dist / (from_dist - to_dist);
        let x = if delta.x == 0.0 { from.x } else { from.x + delta.x * t };
        let y = if delta.y == 0.0 { from.y } else { from.y + delta.y * t };
        Point2::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vertical_up() -> Partition {
        Partition::from_points(Point2::new(0.0, 0.0), Point2::new(0.0, 10.0))
    }

    #[test]
    fn right_is_clockwise_of_direction() {
        let partition = vertical_up();
        assert_eq!(partition.classify_point(Point2::new(5.0, 3.0)), LineSide::Right);
        assert_eq!(partition.classify_point(Point2::new(-5.0, 3.0)), LineSide::Left);
        assert_eq!(partition.classify_point(Point2::new(0.001, 3.0)), LineSide::On);
        assert_relative_eq!(partition.perp_distance(Point2::new(5.0, 3.0)), 5.0);
    }

    #[test]
    fn flipped_swaps_sides() {
        let partition = vertical_up().flipped();
        assert_eq!(partition.classify_point(Point2::new(5.0, 3.0)), LineSide::Left);
        assert_relative_eq!(partition.angle(), 270.0);
    }

    #[test]
    fn para_distance_is_measured_from_origin() {
        let partition = Partition::new(Point2::new(2.0, 2.0), Vector2::new(3.0, 4.0));
        assert_relative_eq!(partition.para_distance(Point2::new(5.0, 6.0)), 5.0);
        assert_relative_eq!(partition.para_distance(Point2::new(2.0, 2.0)), 0.0);
    }

    #[test]
    fn relationship_classes() {
        let eps = DIST_EPSILON;
        assert_eq!(line_relationship(0.0, 0.001, eps), LineRelationship::Collinear);
        assert_eq!(line_relationship(3.0, 8.0, eps), LineRelationship::Right);
        assert_eq!(line_relationship(0.0, 8.0, eps), LineRelationship::RightIntercept);
        assert_eq!(line_relationship(-3.0, -8.0, eps), LineRelationship::Left);
        assert_eq!(line_relationship(-3.0, 0.0, eps), LineRelationship::LeftIntercept);
        assert_eq!(line_relationship(-3.0, 8.0, eps), LineRelationship::Intersects);
    }

    #[test]
    fn box_classification() {
        let partition = vertical_up();
        let right = AABox::new(Point2::new(20.0, -5.0), Point2::new(40.0, 5.0));
        let left = AABox::new(Point2::new(-40.0, -5.0), Point2::new(-20.0, 5.0));
        let straddling = AABox::new(Point2::new(-4.0, -5.0), Point2::new(4.0, 5.0));
        assert_eq!(partition.box_on_side(&right), BoxSide::Right);
        assert_eq!(partition.box_on_side(&left), BoxSide::Left);
        assert_eq!(partition.box_on_side(&straddling), BoxSide::Crosses);

        // Within the padding the box is not trusted to be on one side.
        let near = AABox::new(Point2::new(2.0, -5.0), Point2::new(10.0, 5.0));
        assert_eq!(partition.box_on_side(&near), BoxSide::Crosses);
    }

    #[test]
    fn box_classification_diagonal() {
        let partition = Partition::from_points(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        let below = AABox::new(Point2::new(50.0, 0.0), Point2::new(60.0, 10.0));
        let above = AABox::new(Point2::new(0.0, 50.0), Point2::new(10.0, 60.0));
        assert_eq!(partition.box_on_side(&below), BoxSide::Right);
        assert_eq!(partition.box_on_side(&above), BoxSide::Left);
    }

    #[test]
    fn intersection_points() {
        let horizontal = Partition::from_points(Point2::new(0.0, 4.0), Point2::new(10.0, 4.0));
        let from = Point2::new(3.0, 0.0);
        let to = Point2::new(3.0, 10.0);
        let point = horizontal.intersection(
            from,
            to,
            horizontal.perp_distance(from),
            horizontal.perp_distance(to),
        );
        assert_eq!(point, Point2::new(3.0, 4.0));

        let diagonal = Partition::from_points(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        let from = Point2::new(0.0, 4.0);
        let to = Point2::new(4.0, 0.0);
        let point = diagonal.intersection(
            from,
            to,
            diagonal.perp_distance(from),
            diagonal.perp_distance(to),
        );
        assert_relative_eq!(point, Point2::new(2.0, 2.0), epsilon = 1e-12);
    }
}
