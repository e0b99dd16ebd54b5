//! Binary Space Partitioning for 2D maps.
//!
//! A map is a set of [`Line`]s between vertices of a [`Mesh`]. Each line
//! separates up to two regions. The [`Partitioner`] recursively splits the
//! lines along chosen partition lines until every remaining set encloses a
//! convex area, producing a [`BspTree`] whose leaves are
//! [`ConvexSubspace`]s. Every leaf also gets a face in the mesh built from
//! half-edges.
//!
//! ```ignore
//! use map_bsp::{Line, Mesh, Partitioner, RegionId, VertexId};
//! use nalgebra::Point2;
//!
//! let mut mesh = Mesh::from_vertices([
//!     Point2::new(0.0, 0.0),
//!     Point2::new(0.0, 128.0),
//!     Point2::new(128.0, 128.0),
//!     Point2::new(128.0, 0.0),
//! ]);
//! let lines: Vec<Line> = (0..4)
//!     .map(|i| Line::one_sided(VertexId(i), VertexId((i + 1) % 4), RegionId(0)))
//!     .collect();
//!
//! let mut partitioner = Partitioner::default();
//! let tree = partitioner.build(&lines, &mut mesh)?;
//! assert_eq!(tree.leaf_count(), 1);
//! ```

pub mod bsp;
pub mod cost;
pub mod edge_tips;
pub mod hplane;
pub mod segment;
pub mod subspace;
pub mod superblock;

mod config;
mod error;
mod geom;
mod ids;
mod line;
mod mesh;
mod partition;
mod partitioner;

pub use bsp::{BspLeaf, BspNode, BspTree, BspTreeNode, BspVisitor};
pub use config::{PartitionerConfig, DEFAULT_SPLIT_COST_FACTOR};
pub use error::{BuildError, HalfSpace, Result};
pub use geom::{
    direction_to_angle, AABox, Slope, ANG_EPSILON, DIST_EPSILON, INTERCEPT_MERGE_EPSILON, SHORT_EDGE_EPSILON,
};
pub use ids::{BlockId, FaceId, HalfEdgeId, LineId, SegmentId, SubspaceId, VertexId};
pub use line::{Line, LineFlags, RegionId};
pub use mesh::{Face, FaceRing, HalfEdge, MapSide, Mesh};
pub use partition::{line_relationship, BoxSide, LineRelationship, LineSide, Partition};
pub use partitioner::{BuildStats, Partitioner, UnclosedRegion};
pub use subspace::{ConvexSubspace, LeafSide};
