//! Game domain: canvas, scenario and canvas files

pub mod canvas;
pub mod io;
pub mod scenario;

pub use canvas::Canvas;
pub use io::{load_canvas_from_file, save_canvas_to_file, create_example_canvases};
pub use scenario::{Ball, Direction, Orientation, Position, Scenario};
