use bsp_viz::{MapSketch, Viewer};
use macroquad::prelude::*;

/// Two rooms joined through a doorway, the eastern one L-shaped.
fn demo_map() -> MapSketch {
    let mut sketch = MapSketch::new();
    sketch.walls(
        &[
            [256.0, 96.0],
            [256.0, 0.0],
            [0.0, 0.0],
            [0.0, 256.0],
            [256.0, 256.0],
            [256.0, 160.0],
        ],
        0,
    );
    sketch.walls(
        &[
            [256.0, 160.0],
            [384.0, 160.0],
            [384.0, 384.0],
            [512.0, 384.0],
            [512.0, 0.0],
            [384.0, 0.0],
            [384.0, 96.0],
            [256.0, 96.0],
        ],
        1,
    );
    sketch.two_sided([256.0, 96.0], [256.0, 160.0], 1, 0);
    sketch
}

#[macroquad::main("BSP Visualization")]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut viewer = Viewer::build(demo_map());
    loop {
        viewer.update();
        viewer.draw("BSP Visualization");
        next_frame().await
    }
}
