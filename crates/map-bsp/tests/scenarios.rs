//! End-to-end builds of small maps.

mod helpers;

use approx::assert_relative_eq;
use helpers::{assert_mesh_consistent, l_shape, leaves, MapBuilder};
use map_bsp::bsp::CollectingVisitor;
use map_bsp::{BuildError, LineId, Partitioner, PartitionerConfig, RegionId};
use nalgebra::Point2;

/// Two 128x128 rooms side by side, split by a two-sided line with region 1
/// in front (east) and region 0 behind.
fn divided_room() -> (MapBuilder, LineId) {
    let mut map = MapBuilder::new();
    map.wall([0.0, 0.0], [0.0, 128.0], 0);
    map.wall([0.0, 128.0], [128.0, 128.0], 0);
    map.wall([128.0, 0.0], [0.0, 0.0], 0);
    map.wall([128.0, 128.0], [256.0, 128.0], 1);
    map.wall([256.0, 128.0], [256.0, 0.0], 1);
    map.wall([256.0, 0.0], [128.0, 0.0], 1);
    let divider = map.two_sided([128.0, 0.0], [128.0, 128.0], 1, 0);
    (map, divider)
}

#[test]
fn rectangle_is_a_single_leaf() {
    let mut map = MapBuilder::new();
    map.room(&[[0.0, 0.0], [0.0, 64.0], [256.0, 64.0], [256.0, 0.0]], 2);
    let partitioner = map.build();
    let tree = partitioner.tree().unwrap();

    assert_eq!(tree.node_count(), 0);
    let leaves = leaves(tree);
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].region(), Some(RegionId(2)));
    assert_eq!(leaves[0].len(), 4);
    assert_relative_eq!(leaves[0].area(), 256.0 * 64.0);
    assert!(partitioner.unclosed_regions().is_empty());
    assert_mesh_consistent(&map.mesh);
}

#[test]
fn two_sided_line_divides_two_rooms() {
    let (mut map, divider) = divided_room();
    let partitioner = map.build();
    let tree = partitioner.tree().unwrap();

    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.leaf_count(), 2);
    let root = tree.root().and_then(|root| root.as_node()).unwrap();
    assert_eq!(root.line(), Some(divider));

    let west = tree.locate(Point2::new(64.0, 64.0)).unwrap().subspace();
    let east = tree.locate(Point2::new(192.0, 64.0)).unwrap().subspace();
    assert_eq!(west.region(), Some(RegionId(0)));
    assert_eq!(east.region(), Some(RegionId(1)));
    for leaf in [west, east] {
        assert!(leaf.is_convex());
        assert!(!leaf.is_discordant());
        assert_relative_eq!(leaf.area(), 128.0 * 128.0);
    }

    let stats = partitioner.stats();
    assert_eq!(stats.new_vertex_count, 0);
    assert_eq!(stats.segment_count, 8);
    assert_eq!(map.mesh.face_count(), 2);
    // Eight ring half-edges plus the void sides of the six walls.
    assert_eq!(map.mesh.half_edge_count(), 14);
    assert_mesh_consistent(&map.mesh);
}

#[test]
fn l_shape_is_split_into_convex_leaves() {
    let mut map = l_shape();
    let partitioner = map.build();
    let tree = partitioner.tree().unwrap();

    assert!(tree.node_count() >= 1);
    assert!(tree.depth() >= 2);

    let leaves = leaves(tree);
    let mut area = 0.0;
    for leaf in &leaves {
        assert!(leaf.is_convex(), "leaf {} is not convex", leaf.id());
        assert_eq!(leaf.region(), Some(RegionId(0)));
        area += leaf.area();
    }
    assert_relative_eq!(area, 256.0 * 128.0 + 128.0 * 128.0, epsilon = 1e-6);

    for point in [Point2::new(64.0, 200.0), Point2::new(200.0, 64.0), Point2::new(32.0, 32.0)] {
        let leaf = tree.locate(point).unwrap().subspace();
        assert!(leaf.contains(point));
    }

    assert!(partitioner.unclosed_regions().is_empty());
    assert_eq!(partitioner.stats().discordant_leaf_count, 0);
    assert_mesh_consistent(&map.mesh);
}

#[test]
fn every_line_is_covered_by_leaf_sides() {
    let (mut map, _) = divided_room();
    let tree = map.build().take_tree().unwrap();
    let mut lshape = l_shape();
    let ltree = lshape.build().take_tree().unwrap();

    for (lines, tree) in [(&map.lines, &tree), (&lshape.lines, &ltree)] {
        let leaves = leaves(tree);
        for index in 0..lines.len() {
            let covered = leaves
                .iter()
                .flat_map(|leaf| leaf.all_sides())
                .any(|side| side.line() == Some(LineId(index)));
            assert!(covered, "line {index} is missing from every leaf");
        }
    }
}

#[test]
fn split_pieces_keep_line_length() {
    let mut map = l_shape();
    let tree = map.build().take_tree().unwrap();
    let leaves = leaves(&tree);

    for (index, line) in map.lines.iter().enumerate() {
        let expected = (map.mesh.vertex(line.to()) - map.mesh.vertex(line.from())).norm();
        let total: f64 = leaves
            .iter()
            .flat_map(|leaf| leaf.all_sides())
            .filter(|side| side.line() == Some(LineId(index)))
            .filter(|side| side.map_side().is_some_and(|map_side| !map_side.is_back))
            .map(|side| side.length())
            .sum();
        assert_relative_eq!(total, expected, epsilon = 1e-6);
    }
}

#[test]
fn self_referencing_line_builds_cleanly() {
    let mut map = MapBuilder::new();
    map.room(&[[0.0, 0.0], [0.0, 128.0], [128.0, 128.0], [128.0, 0.0]], 0);
    map.two_sided([64.0, 32.0], [64.0, 96.0], 0, 0);
    let partitioner = map.build();
    let tree = partitioner.tree().unwrap();

    assert!(tree.leaf_count() >= 2);
    for leaf in leaves(tree) {
        assert!(leaf.is_convex());
        assert_eq!(leaf.region(), Some(RegionId(0)));
        assert!(!leaf.is_discordant());
    }
    assert!(partitioner.unclosed_regions().is_empty());
    assert_mesh_consistent(&map.mesh);
}

#[test]
fn builds_are_deterministic() {
    let mut first = l_shape();
    let mut second = l_shape();
    let a = first.build();
    let b = second.build();

    assert_eq!(a.tree(), b.tree());
    assert_eq!(a.stats(), b.stats());
    assert_eq!(first.mesh.vertices(), second.mesh.vertices());
}

#[test]
fn traversal_starts_in_the_viewers_leaf() {
    let (mut map, _) = divided_room();
    let tree = map.build().take_tree().unwrap();
    let eye = Point2::new(200.0, 64.0);

    let mut visitor = CollectingVisitor::new();
    tree.traverse_front_to_back(eye, &mut visitor);
    let order = visitor.into_subspaces();
    assert_eq!(order.len(), 2);
    assert_eq!(order[0], tree.locate(eye).unwrap().subspace().id());

    let mut visitor = CollectingVisitor::new();
    tree.traverse_back_to_front(eye, &mut visitor);
    assert_eq!(visitor.subspaces().last(), order.first());
}

#[test]
fn negative_split_cost_is_rejected() {
    let (mut map, _) = divided_room();
    let mut partitioner = Partitioner::new(PartitionerConfig::default().with_split_cost_factor(-1));
    let err = partitioner.build(&map.lines, &mut map.mesh).unwrap_err();
    assert_eq!(err, BuildError::InvalidSplitCostFactor(-1));
    assert!(partitioner.tree().is_none());
    assert_eq!(map.mesh.half_edge_count(), 0);
}

#[test]
fn zero_split_cost_still_builds() {
    let mut map = l_shape();
    let mut partitioner = Partitioner::new(PartitionerConfig::default().with_split_cost_factor(0));
    let tree = partitioner.build(&map.lines, &mut map.mesh).unwrap();
    assert!(leaves(tree).iter().all(|leaf| leaf.is_convex()));
}
