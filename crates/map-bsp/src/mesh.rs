//! The geometry store shared between the caller and the partitioner.
//!
//! The caller fills it with the map vertices before a build. The partitioner
//! appends a vertex for every split, and one half-edge ring (a face) per
//! finished leaf.
//!
//! Each half-edge carries:
//!
//! * `origin`: the vertex it leaves from
//! * `twin`: the half-edge running the other way along the same edge
//! * `next` / `prev`: neighbours around the same face, clockwise
//! * `face`: the leaf face it bounds, if any
//! * `map_side`: the map line side it was cut from, if any

use nalgebra::Point2;

use crate::ids::{FaceId, HalfEdgeId, LineId, VertexId};

/// One side of an input [`Line`](crate::Line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapSide {
    pub line: LineId,
    /// `false` for the front (right-hand) side.
    pub is_back: bool,
}

/// A directed half-edge.
#[derive(Debug, Clone, PartialEq)]
pub struct HalfEdge {
    origin: VertexId,
    twin: Option<HalfEdgeId>,
    next: Option<HalfEdgeId>,
    prev: Option<HalfEdgeId>,
    face: Option<FaceId>,
    map_side: Option<MapSide>,
}

impl HalfEdge {
    #[inline]
    pub fn origin(&self) -> VertexId {
        self.origin
    }

    #[inline]
    pub fn twin(&self) -> Option<HalfEdgeId> {
        self.twin
    }

    #[inline]
    pub fn next(&self) -> Option<HalfEdgeId> {
        self.next
    }

    #[inline]
    pub fn prev(&self) -> Option<HalfEdgeId> {
        self.prev
    }

    #[inline]
    pub fn face(&self) -> Option<FaceId> {
        self.face
    }

    #[inline]
    pub fn map_side(&self) -> Option<MapSide> {
        self.map_side
    }
}

/// A closed ring of half-edges bounding one leaf.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Face {
    half_edge: Option<HalfEdgeId>,
}

impl Face {
    /// Any half-edge of the ring.
    #[inline]
    pub fn half_edge(&self) -> Option<HalfEdgeId> {
        self.half_edge
    }
}

/// Vertices, half-edges and faces addressed by index.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: Vec<Point2<f64>>,
    half_edges: Vec<HalfEdge>,
    faces: Vec<Face>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh holding the given vertices, in order.
    pub fn from_vertices<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point2<f64>>,
    {
        Self {
            vertices: points.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Appends a vertex.
    pub fn add_vertex(&mut self, point: Point2<f64>) -> VertexId {
        self.vertices.push(point);
        VertexId(self.vertices.len() - 1)
    }

    /// Returns the position of a vertex.
    ///
    /// # Panics
    /// Panics if the id does not belong to this mesh.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> Point2<f64> {
        self.vertices[id.0]
    }

    #[inline]
    pub fn vertices(&self) -> &[Point2<f64>] {
        &self.vertices
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn half_edge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.half_edges[id.0]
    }

    #[inline]
    pub fn half_edge_count(&self) -> usize {
        self.half_edges.len()
    }

    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.0]
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Allocates an unlinked half-edge leaving `origin`.
    pub fn new_half_edge(&mut self, origin: VertexId, map_side: Option<MapSide>) -> HalfEdgeId {
        self.half_edges.push(HalfEdge {
            origin,
            twin: None,
            next: None,
            prev: None,
            face: None,
            map_side,
        });
        HalfEdgeId(self.half_edges.len() - 1)
    }

    /// Makes `a` and `b` each other's twin.
    pub fn set_twins(&mut self, a: HalfEdgeId, b: HalfEdgeId) {
        self.half_edges[a.0].twin = Some(b);
        self.half_edges[b.0].twin = Some(a);
    }

    /// Creates a face from half-edges given in clockwise order, linking them
    /// into a closed ring.
    ///
    /// Returns `None` if `ring` is empty.
    pub fn new_face(&mut self, ring: &[HalfEdgeId]) -> Option<FaceId> {
        let first = *ring.first()?;
        let face = FaceId(self.faces.len());
        self.faces.push(Face {
            half_edge: Some(first),
        });

        let n = ring.len();
        for (i, &id) in ring.iter().enumerate() {
            let edge = &mut self.half_edges[id.0];
            edge.next = Some(ring[(i + 1) % n]);
            edge.prev = Some(ring[(i + n - 1) % n]);
            edge.face = Some(face);
        }
        Some(face)
    }

    /// Iterates the half-edges of a face ring, starting from its first
    /// half-edge.
    pub fn face_ring(&self, face: FaceId) -> FaceRing<'_> {
        let start = self.faces[face.0].half_edge;
        FaceRing {
            mesh: self,
            start,
            current: start,
            remaining: self.half_edges.len(),
        }
    }
}

/// Iterator over a face's half-edges. See [`Mesh::face_ring`].
pub struct FaceRing<'a> {
    mesh: &'a Mesh,
    start: Option<HalfEdgeId>,
    current: Option<HalfEdgeId>,
    // Guards against broken rings.
    remaining: usize,
}

impl Iterator for FaceRing<'_> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        let current = self.current?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let next = self.mesh.half_edges[current.0].next;
        self.current = if next == self.start { None } else { next };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Mesh {
        Mesh::from_vertices([
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
        ])
    }

    #[test]
    fn vertices_are_appended() {
        let mut mesh = square();
        assert_eq!(mesh.vertex_count(), 4);
        let id = mesh.add_vertex(Point2::new(0.5, 0.5));
        assert_eq!(id, VertexId(4));
        assert_eq!(mesh.vertex(id), Point2::new(0.5, 0.5));
    }

    #[test]
    fn face_ring_is_closed() {
        let mut mesh = square();
        let ring: Vec<HalfEdgeId> = (0..4)
            .map(|i| mesh.new_half_edge(VertexId(i), None))
            .collect();
        let face = mesh.new_face(&ring).unwrap();

        let walked: Vec<HalfEdgeId> = mesh.face_ring(face).collect();
        assert_eq!(walked, ring);
        assert_eq!(mesh.half_edge(ring[0]).prev(), Some(ring[3]));
        assert_eq!(mesh.half_edge(ring[3]).next(), Some(ring[0]));
        assert!(ring.iter().all(|&h| mesh.half_edge(h).face() == Some(face)));
    }

    #[test]
    fn twins_are_symmetric() {
        let mut mesh = square();
        let a = mesh.new_half_edge(VertexId(0), None);
        let b = mesh.new_half_edge(VertexId(1), None);
        mesh.set_twins(a, b);
        assert_eq!(mesh.half_edge(a).twin(), Some(b));
        assert_eq!(mesh.half_edge(b).twin(), Some(a));
    }

    #[test]
    fn empty_face_is_rejected() {
        let mut mesh = square();
        assert!(mesh.new_face(&[]).is_none());
        assert_eq!(mesh.face_count(), 0);
    }
}
