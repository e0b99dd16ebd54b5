//! Index handles for the arenas used while building a tree.
//!
//! Every element is stored in a flat `Vec` and addressed by a strongly-typed
//! wrapper so that a vertex index can never be mistaken for a half-edge index.

use std::fmt;

macro_rules! idx {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl $name {
            /// Returns the raw arena index.
            #[inline]
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

idx!(
    /// A vertex in the [`Mesh`](crate::Mesh).
    VertexId
);
idx!(
    /// A line in the caller's input slice.
    LineId
);
idx!(
    /// A half-edge in the [`Mesh`](crate::Mesh).
    HalfEdgeId
);
idx!(
    /// A face (leaf polygon) in the [`Mesh`](crate::Mesh).
    FaceId
);
idx!(
    /// A line segment in the build arena.
    SegmentId
);
idx!(
    /// A block of the super blockmap.
    BlockId
);
idx!(
    /// A convex subspace collected while dividing space.
    SubspaceId
);
