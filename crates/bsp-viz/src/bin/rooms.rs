use bsp_viz::{MapSketch, Viewer};
use macroquad::prelude::*;

/// A hall with a pillar, a side room behind a two-sided line and a one-way
/// window inside the hall.
fn rooms_map() -> MapSketch {
    let mut sketch = MapSketch::new();

    // Hall
    sketch.walls(
        &[
            [320.0, 64.0],
            [320.0, 0.0],
            [0.0, 0.0],
            [0.0, 320.0],
            [320.0, 320.0],
            [320.0, 192.0],
        ],
        0,
    );
    sketch.pillar(&[[128.0, 128.0], [128.0, 192.0], [192.0, 192.0], [192.0, 128.0]], 0);
    sketch.window([64.0, 256.0], [64.0, 288.0], 0);

    // Side room, reached through an opening closed by a two-sided line
    sketch.walls(&[[320.0, 192.0], [448.0, 192.0]], 1);
    sketch.walls(&[[448.0, 64.0], [320.0, 64.0]], 1);
    sketch.two_sided([320.0, 64.0], [320.0, 192.0], 1, 0);

    // A pointed alcove off the side room
    sketch.walls(&[[448.0, 192.0], [512.0, 128.0], [448.0, 64.0]], 2);
    sketch.two_sided([448.0, 64.0], [448.0, 192.0], 2, 1);
    sketch
}

#[macroquad::main("BSP Rooms")]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut viewer = Viewer::build(rooms_map());
    loop {
        viewer.update();
        viewer.draw("BSP Rooms - hall, pillar, window and side rooms");
        next_frame().await
    }
}
