//! Shared drawing and input handling for the BSP viewer binaries.

use std::hash::{Hash, Hasher};

use macroquad::models::{draw_mesh, Mesh as DrawMesh, Vertex};
use macroquad::prelude::*;
use map_bsp::{AABox, BspNode, BspTree, BuildStats, ConvexSubspace, Line, LineFlags, Mesh, Partitioner, RegionId, VertexId};
use nalgebra::Point2;
use tracing::{info, warn};

pub mod navigator;
pub use navigator::TreeNavigator;

/// Generates a deterministic color for a region, so that every leaf of the
/// same region is drawn alike.
pub fn region_color(region: Option<RegionId>) -> Color {
    let Some(region) = region else {
        return DARKGRAY;
    };
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    region.hash(&mut hasher);
    let hash = hasher.finish();

    let r = ((hash >> 16) & 0xFF) as u8;
    let g = ((hash >> 8) & 0xFF) as u8;
    let b = (hash & 0xFF) as u8;

    // Keep colors readable on a dark background
    Color::from_rgba(r.max(60), g.max(60), b.max(60), 255)
}

fn to_vec2(point: Point2<f64>) -> Vec2 {
    vec2(point.x as f32, point.y as f32)
}

/// Fills a leaf ring with a fan of triangles and outlines its sides. Sides
/// cut from map lines are drawn solid, partition sides faint.
pub fn draw_leaf(subspace: &ConvexSubspace, alpha: f32) {
    let points: Vec<Vec2> = subspace.points().map(to_vec2).collect();
    if points.len() < 3 {
        return;
    }

    let mut fill = region_color(subspace.region());
    fill.a = alpha;
    let vertices: Vec<Vertex> = points
        .iter()
        .map(|p| Vertex::new2(vec3(p.x, p.y, 0.0), vec2(0.0, 0.0), fill))
        .collect();
    let mut indices: Vec<u16> = Vec::with_capacity((points.len() - 2) * 3);
    for i in 1..points.len() - 1 {
        indices.extend([0, i as u16, (i + 1) as u16]);
    }
    draw_mesh(&DrawMesh {
        vertices,
        indices,
        texture: None,
    });

    for side in subspace.sides() {
        let (a, b) = (to_vec2(side.from_point()), to_vec2(side.to_point()));
        let color = if side.line().is_some() { WHITE } else { Color::new(1.0, 1.0, 1.0, 0.25) };
        draw_line(a.x, a.y, b.x, b.y, 1.0, color);
    }
    if subspace.is_discordant() {
        let c = to_vec2(subspace.center());
        draw_circle(c.x, c.y, 3.0, RED);
    }
}

/// Draws a node's partition line across both child bounds, with an arrow
/// marking its direction and the child boxes outlined.
pub fn draw_partition(node: &BspNode, color: Color) {
    for (bounds, box_color) in [(node.right_bounds(), GREEN), (node.left_bounds(), ORANGE)] {
        let (min, max) = (to_vec2(bounds.min()), to_vec2(bounds.max()));
        draw_rectangle_lines(min.x, min.y, max.x - min.x, max.y - min.y, 1.0, box_color);
    }

    let bounds = node.right_bounds().unite(node.left_bounds());
    let partition = node.partition();
    let direction = partition.direction().normalize();
    let reach = bounds.width() + bounds.height();
    let along = partition.para_distance(bounds.center());
    let origin = partition.origin() + direction * along;
    let a = to_vec2(origin - direction * reach);
    let b = to_vec2(origin + direction * reach);
    draw_line(a.x, a.y, b.x, b.y, 2.0, color);

    let tip = to_vec2(origin);
    let head = tip + to_vec2(Point2::from(direction * 12.0));
    draw_line(tip.x, tip.y, head.x, head.y, 3.0, color);
}

/// Pan and zoom over map coordinates.
pub struct MapView {
    pub center: Vec2,
    /// Screen pixels per map unit.
    pub scale: f32,
    pub zoom_speed: f32,
}

impl MapView {
    pub fn new(center: Vec2, scale: f32) -> Self {
        Self {
            center,
            scale,
            zoom_speed: 1.1,
        }
    }

    /// A view showing all of `bounds` with a small margin.
    pub fn fit(bounds: &AABox) -> Self {
        let width = bounds.width().max(1.0) as f32;
        let height = bounds.height().max(1.0) as f32;
        let scale = (screen_width() / width).min(screen_height() / height) * 0.85;
        Self::new(to_vec2(bounds.center()), scale)
    }

    pub fn with_zoom_speed(mut self, speed: f32) -> Self {
        self.zoom_speed = speed;
        self
    }

    /// Drag with the left mouse button to pan, scroll to zoom.
    pub fn update(&mut self) {
        if is_mouse_button_down(MouseButton::Left) {
            // Normalized delta covers half the screen per unit
            let delta = mouse_delta_position();
            self.center.x += delta.x * screen_width() / 2.0 / self.scale;
            self.center.y -= delta.y * screen_height() / 2.0 / self.scale;
        }

        let scroll = mouse_wheel().1;
        if scroll > 0.0 {
            self.scale *= self.zoom_speed;
        } else if scroll < 0.0 {
            self.scale /= self.zoom_speed;
        }
    }

    /// A camera with map y pointing up the screen.
    pub fn to_camera2d(&self) -> Camera2D {
        Camera2D {
            target: self.center,
            zoom: vec2(self.scale * 2.0 / screen_width(), self.scale * 2.0 / screen_height()),
            ..Default::default()
        }
    }

    /// The map point under the mouse cursor.
    pub fn mouse_point(&self) -> Point2<f64> {
        let world = self.to_camera2d().screen_to_world(mouse_position().into());
        Point2::new(f64::from(world.x), f64::from(world.y))
    }
}

/// A map authored in code: vertices are shared by position.
#[derive(Debug, Default)]
pub struct MapSketch {
    pub mesh: Mesh,
    pub lines: Vec<Line>,
}

impl MapSketch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex(&mut self, point: [f64; 2]) -> VertexId {
        let point = Point2::new(point[0], point[1]);
        match self.mesh.vertices().iter().position(|&p| p == point) {
            Some(index) => VertexId(index),
            None => self.mesh.add_vertex(point),
        }
    }

    /// An open chain of one-sided walls with `region` on their right.
    pub fn walls(&mut self, points: &[[f64; 2]], region: u32) -> &mut Self {
        for pair in points.windows(2) {
            let (a, b) = (self.vertex(pair[0]), self.vertex(pair[1]));
            self.lines.push(Line::one_sided(a, b, RegionId(region)));
        }
        self
    }

    /// A clockwise ring of one-sided walls facing into `region`.
    pub fn room(&mut self, points: &[[f64; 2]], region: u32) -> &mut Self {
        let mut ring = points.to_vec();
        ring.extend(points.first().copied());
        self.walls(&ring, region)
    }

    /// An anticlockwise ring of walls: a solid pillar standing in `region`.
    pub fn pillar(&mut self, points: &[[f64; 2]], region: u32) -> &mut Self {
        let reversed: Vec<[f64; 2]> = points.iter().rev().copied().collect();
        self.room(&reversed, region)
    }

    pub fn two_sided(&mut self, from: [f64; 2], to: [f64; 2], front: u32, back: u32) -> &mut Self {
        let (a, b) = (self.vertex(from), self.vertex(to));
        self.lines.push(Line::two_sided(a, b, RegionId(front), RegionId(back)));
        self
    }

    pub fn window(&mut self, from: [f64; 2], to: [f64; 2], region: u32) -> &mut Self {
        let (a, b) = (self.vertex(from), self.vertex(to));
        self.lines
            .push(Line::one_sided(a, b, RegionId(region)).with_flags(LineFlags::WINDOW));
        self
    }
}

/// Everything a viewer frame needs: the built tree, its mesh and the input
/// lines.
pub struct Viewer {
    pub sketch: MapSketch,
    pub tree: BspTree,
    pub stats: BuildStats,
    pub view: MapView,
    pub navigator: TreeNavigator,
}

impl Viewer {
    /// Builds `sketch` with the default configuration. A failed build is
    /// logged and shown as an empty tree.
    pub fn build(mut sketch: MapSketch) -> Self {
        let mut partitioner = Partitioner::default()
            .with_unclosed_callback(|unclosed| warn!(region = %unclosed.region, "map has an unclosed region"));
        let (tree, stats) = match partitioner.build(&sketch.lines, &mut sketch.mesh) {
            Ok(_) => (partitioner.take_tree().unwrap_or_default(), partitioner.stats()),
            Err(err) => {
                warn!(%err, "BSP build failed");
                (BspTree::default(), BuildStats::default())
            }
        };
        info!(
            nodes = stats.node_count,
            leaves = stats.leaf_count,
            depth = tree.depth(),
            "tree ready"
        );

        let bounds = AABox::from_points(sketch.mesh.vertices().iter().copied())
            .unwrap_or_else(|| AABox::new(Point2::origin(), Point2::new(256.0, 256.0)));
        Self {
            sketch,
            tree,
            stats,
            view: MapView::fit(&bounds),
            navigator: TreeNavigator::new(),
        }
    }

    pub fn update(&mut self) {
        self.view.update();
        self.navigator.update(&self.tree);
    }

    pub fn draw(&self, title: &str) {
        clear_background(Color::from_rgba(20, 20, 30, 255));
        set_camera(&self.view.to_camera2d());

        for leaf in self.tree.leaves() {
            draw_leaf(leaf.subspace(), 0.2);
        }
        self.navigator.render(&self.tree);

        let hovered = self.tree.locate(self.view.mouse_point());
        if let Some(leaf) = hovered {
            let c = to_vec2(leaf.subspace().center());
            draw_circle_lines(c.x, c.y, 4.0, 1.0, YELLOW);
        }

        set_default_camera();

        draw_text(title, 10.0, 25.0, 20.0, WHITE);
        draw_text(
            &format!(
                "Nodes: {} | Leaves: {} | Depth: {} | New vertices: {}",
                self.stats.node_count,
                self.stats.leaf_count,
                self.tree.depth(),
                self.stats.new_vertex_count
            ),
            10.0,
            45.0,
            18.0,
            GRAY,
        );
        self.navigator.draw_ui(&self.tree, 70.0);

        let hover_text = match hovered {
            Some(leaf) => format!(
                "Under cursor: {} region {}",
                leaf.subspace().id(),
                leaf.subspace()
                    .region()
                    .map_or_else(|| "none".to_string(), |region| region.to_string())
            ),
            None => "Under cursor: nothing".to_string(),
        };
        draw_text(&hover_text, 10.0, 155.0, 16.0, LIGHTGRAY);
        draw_text("Drag mouse to pan, scroll to zoom", 10.0, 175.0, 16.0, DARKGRAY);
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 195.0, 16.0, DARKGRAY);
    }
}
