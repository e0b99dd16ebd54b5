//! Map construction shared by the integration tests.

#![allow(dead_code)]

use map_bsp::{BspTree, ConvexSubspace, Line, LineId, Mesh, Partitioner, RegionId, VertexId};
use nalgebra::Point2;

/// Builds a map from rooms and loose lines, reusing vertices at equal
/// coordinates.
#[derive(Debug, Default)]
pub struct MapBuilder {
    pub mesh: Mesh,
    pub lines: Vec<Line>,
}

impl MapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex(&mut self, x: f64, y: f64) -> VertexId {
        let point = Point2::new(x, y);
        match self.mesh.vertices().iter().position(|&p| p == point) {
            Some(index) => VertexId(index),
            None => self.mesh.add_vertex(point),
        }
    }

    /// Adds a one-sided line, returning its index.
    pub fn wall(&mut self, from: [f64; 2], to: [f64; 2], region: u32) -> LineId {
        let a = self.vertex(from[0], from[1]);
        let b = self.vertex(to[0], to[1]);
        self.push(Line::one_sided(a, b, RegionId(region)))
    }

    /// Adds a two-sided line, returning its index.
    pub fn two_sided(&mut self, from: [f64; 2], to: [f64; 2], front: u32, back: u32) -> LineId {
        let a = self.vertex(from[0], from[1]);
        let b = self.vertex(to[0], to[1]);
        self.push(Line::two_sided(a, b, RegionId(front), RegionId(back)))
    }

    /// Closes a clockwise ring of one-sided walls around `region`.
    pub fn room(&mut self, points: &[[f64; 2]], region: u32) -> &mut Self {
        for i in 0..points.len() {
            self.wall(points[i], points[(i + 1) % points.len()], region);
        }
        self
    }

    pub fn push(&mut self, line: Line) -> LineId {
        self.lines.push(line);
        LineId(self.lines.len() - 1)
    }

    /// Runs a default build, returning the partitioner holding the tree.
    pub fn build(&mut self) -> Partitioner {
        let mut partitioner = Partitioner::default();
        partitioner
            .build(&self.lines, &mut self.mesh)
            .expect("build should succeed");
        partitioner
    }
}

/// The L-shaped room: a 256x128 strip with a 128x128 block on its left end.
pub fn l_shape() -> MapBuilder {
    let mut map = MapBuilder::new();
    map.room(
        &[
            [0.0, 0.0],
            [0.0, 256.0],
            [128.0, 256.0],
            [128.0, 128.0],
            [256.0, 128.0],
            [256.0, 0.0],
        ],
        0,
    );
    map
}

pub fn leaves(tree: &BspTree) -> Vec<&ConvexSubspace> {
    tree.leaves().into_iter().map(|leaf| leaf.subspace()).collect()
}

/// Checks the half-edge structure: twins are mutual, a twin starts where
/// its partner ends, and every face ring is closed.
pub fn assert_mesh_consistent(mesh: &Mesh) {
    for index in 0..mesh.half_edge_count() {
        let id = map_bsp::HalfEdgeId(index);
        let edge = mesh.half_edge(id);
        let twin = edge.twin().expect("every half-edge has a twin");
        assert_eq!(mesh.half_edge(twin).twin(), Some(id));

        if let Some(next) = edge.next() {
            assert_eq!(mesh.half_edge(twin).origin(), mesh.half_edge(next).origin());
            assert_eq!(mesh.half_edge(next).prev(), Some(id));
        }
    }

    for index in 0..mesh.face_count() {
        let face = map_bsp::FaceId(index);
        let ring: Vec<_> = mesh.face_ring(face).collect();
        assert!(ring.len() >= 3, "face {face} has {} edges", ring.len());
        for id in ring {
            assert_eq!(mesh.half_edge(id).face(), Some(face));
        }
    }
}
