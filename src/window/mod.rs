pub mod config;

pub use config::{WindowConfig, WindowMode};

use winit::dpi::PhysicalSize;
use winit::window::{Fullscreen, Window, WindowAttributes};

/// Attributes for the window that hosts the animation surface.
///
/// `Borderless` covers whichever monitor the window opens on.  The requested
/// size still applies when the platform ignores fullscreen; either way the
/// resulting `WindowEvent::Resized` is what drives the viewport.
pub fn window_attributes(config: &WindowConfig) -> WindowAttributes {
    let fullscreen = match config.mode {
        WindowMode::Windowed => None,
        WindowMode::Borderless => Some(Fullscreen::Borderless(None)),
    };
    Window::default_attributes()
        .with_title(&config.title)
        .with_inner_size(PhysicalSize::new(config.width.max(1), config.height.max(1)))
        .with_transparent(config.transparent)
        .with_fullscreen(fullscreen)
        .with_resizable(true)
}
