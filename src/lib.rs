pub mod engine;
pub mod error;
pub mod flock;
pub mod loader;
pub mod render_loop;
pub mod renderer;
pub mod window;

pub use error::Error;

/// Identifier of the drawable surface; used as the window title.
pub const CANVAS_ID: &str = "anim-canvas";

/// Number of frames in the wing-beat cycle.
pub const DEFAULT_FRAME_COUNT: usize = 8;

/// Directory holding `frame-{i}.png`, relative to the working directory.
pub const DEFAULT_FRAME_DIR: &str = "images/webgl";

/// Default flock embedded at compile time (see `Flock::from_json`).
pub const DEFAULT_FLOCK: &str = include_str!("../resources/flock.json");
