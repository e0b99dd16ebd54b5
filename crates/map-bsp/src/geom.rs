//! Tolerances, bounding boxes and angle helpers shared by the partitioner.

use nalgebra::{Point2, Vector2};

/// Points closer than this to a partition line are considered to lie on it.
pub const DIST_EPSILON: f64 = 1.0 / 128.0;

/// Angles (in degrees) closer than this are considered equal.
pub const ANG_EPSILON: f64 = 1.0 / 1024.0;

/// Segments shorter than this are "iffy": splits and near misses producing
/// them are penalised by the partition cost.
pub const SHORT_EDGE_EPSILON: f64 = 4.0;

/// Intercepts closer than this along a partition are merged into one.
pub const INTERCEPT_MERGE_EPSILON: f64 = 0.2;

/// Converts a direction vector into an angle in degrees, in `[0, 360)`,
/// measured anticlockwise from the positive x axis.
pub fn direction_to_angle(direction: Vector2<f64>) -> f64 {
    if direction.x == 0.0 {
        return if direction.y > 0.0 {
            90.0
        } else if direction.y < 0.0 {
            270.0
        } else {
            0.0
        };
    }
    if direction.y == 0.0 {
        return if direction.x > 0.0 { 0.0 } else { 180.0 };
    }
    let angle = direction.y.atan2(direction.x).to_degrees();
    if angle < 0.0 { angle + 360.0 } else { angle }
}

/// Slope classification of a direction vector.
///
/// Axis-aligned lines allow exact arithmetic in a few hot paths (box
/// classification and segment intersection).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slope {
    Horizontal,
    Vertical,
    /// `dx` and `dy` have the same sign.
    Positive,
    /// `dx` and `dy` have opposite signs.
    Negative,
}

impl Slope {
    /// Classifies a (non-zero) direction vector.
    pub fn of(direction: Vector2<f64>) -> Self {
        if direction.y == 0.0 {
            Slope::Horizontal
        } else if direction.x == 0.0 {
            Slope::Vertical
        } else if direction.x * direction.y > 0.0 {
            Slope::Positive
        } else {
            Slope::Negative
        }
    }

    /// Returns `true` for purely horizontal or vertical slopes.
    #[inline]
    pub fn is_axis_aligned(self) -> bool {
        matches!(self, Slope::Horizontal | Slope::Vertical)
    }
}

/// An axis-aligned bounding box in map space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABox {
    min: Point2<f64>,
    max: Point2<f64>,
}

impl AABox {
    /// Creates a box from two corners. The corners are sorted per axis.
    pub fn new(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Returns the smallest box containing every point, or `None` if the
    /// iterator is empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point2<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::new(first, first);
        for point in iter {
            bounds.add_point(point);
        }
        Some(bounds)
    }

    /// Grows the box to include `point`.
    pub fn add_point(&mut self, point: Point2<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// Returns the smallest box containing both boxes.
    pub fn unite(&self, other: &AABox) -> AABox {
        AABox {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    #[inline]
    pub fn min(&self) -> Point2<f64> {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Point2<f64> {
        self.max
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Point2<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns `true` if the point lies inside or on the edge of the box.
    pub fn contains(&self, point: Point2<f64>) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Returns a copy grown by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> AABox {
        AABox {
            min: self.min - Vector2::new(margin, margin),
            max: self.max + Vector2::new(margin, margin),
        }
    }

    /// Rounds the box outward onto the blockmap grid: the origin snaps down to
    /// a multiple of 8 and each dimension grows to a power-of-two number of
    /// 128-unit cells.
    pub fn to_blockmap_grid(&self) -> AABox {
        let min_x = self.min.x.floor() as i64;
        let min_y = self.min.y.floor() as i64;
        let max_x = self.max.x.ceil() as i64;
        let max_y = self.max.y.ceil() as i64;

        let block_x = min_x - min_x.rem_euclid(8);
        let block_y = min_y - min_y.rem_euclid(8);
        let cells_w = ((max_x - block_x) / 128 + 1) as u64;
        let cells_h = ((max_y - block_y) / 128 + 1) as u64;

        AABox {
            min: Point2::new(block_x as f64, block_y as f64),
            max: Point2::new(
                (block_x + 128 * cells_w.next_power_of_two() as i64) as f64,
                (block_y + 128 * cells_h.next_power_of_two() as i64) as f64,
            ),
        }
    }
}
