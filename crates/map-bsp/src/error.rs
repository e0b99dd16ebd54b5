//! Errors raised by a BSP build.

use std::fmt;

use crate::partition::Partition;

/// One of the two half-spaces produced by a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfSpace {
    Right,
    Left,
}

impl fmt::Display for HalfSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HalfSpace::Right => f.write_str("right"),
            HalfSpace::Left => f.write_str("left"),
        }
    }
}

/// All the ways a build can fail.
///
/// Unclosed regions are not errors; they are reported through
/// [`Partitioner::unclosed_regions`](crate::Partitioner::unclosed_regions).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    /// A chosen partition left one half-space without any segments. The
    /// input is not a valid arrangement of closed regions.
    #[error(
        "partition through {:?} along {:?} left the {half} half-space empty",
        .partition.origin(),
        .partition.direction()
    )]
    EmptyHalfSpace { half: HalfSpace, partition: Partition },

    /// The configured split cost factor is negative.
    #[error("split cost factor must not be negative, got {0}")]
    InvalidSplitCostFactor(i32),
}

pub type Result<T> = std::result::Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    #[test]
    fn messages_name_the_problem() {
        let partition = Partition::from_points(Point2::new(0.0, 0.0), Point2::new(0.0, 64.0));
        let err = BuildError::EmptyHalfSpace {
            half: HalfSpace::Left,
            partition,
        };
        assert!(err.to_string().contains("left half-space empty"));

        let err = BuildError::InvalidSplitCostFactor(-3);
        assert_eq!(err.to_string(), "split cost factor must not be negative, got -3");
    }
}
