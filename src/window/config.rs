// ── WindowMode ────────────────────────────────────────────────────────────────

/// How the drawable surface is presented.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WindowMode {
    /// Decorated, resizable window at the configured size.
    Windowed,
    /// Borderless window covering the current monitor.
    Borderless,
}

// ── WindowConfig ──────────────────────────────────────────────────────────────

/// Initial window setup.  The surface follows the window's inner size
/// afterwards, so `width`/`height` only matter until the first resize.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    /// Requested inner width in physical pixels.
    pub width: u32,
    /// Requested inner height in physical pixels.
    pub height: u32,
    pub mode: WindowMode,
    /// Ask the compositor for a see-through background.
    pub transparent: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: crate::CANVAS_ID.to_string(),
            width: 1280,
            height: 720,
            mode: WindowMode::Windowed,
            transparent: true,
        }
    }
}
