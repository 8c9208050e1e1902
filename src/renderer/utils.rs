// ── Viewport tracking ─────────────────────────────────────────────────────────
//
// The animation always fills the whole drawable surface, so the viewport is
// simply `(0, 0, width, height)` of the window's inner size.  The manager
// remembers the last applied size so repeated identical resize events are
// no-ops for the GPU.

use winit::dpi::PhysicalSize;

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Viewport rectangle in physical pixels, ready for `RenderPass::set_viewport`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Full-surface rectangle anchored at the origin.
    pub fn full(width: u32, height: u32) -> Self {
        Self { x: 0.0, y: 0.0, width: width as f32, height: height as f32 }
    }

    /// `width / height`, or `0.0` for a zero-height surface.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0.0 {
            return 0.0;
        }
        self.width / self.height
    }
}

// ── ViewportManager ───────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct ViewportManager {
    size: PhysicalSize<u32>,
    viewport: Viewport,
}

impl ViewportManager {
    pub fn new(size: PhysicalSize<u32>) -> Self {
        Self { size, viewport: Viewport::full(size.width, size.height) }
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Apply a resize notification.  Returns `true` when the surface needs
    /// reconfiguring; identical or zero-sized (minimised) sizes return `false`.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) -> bool {
        if new_size.width == 0 || new_size.height == 0 || new_size == self.size {
            return false;
        }
        self.size = new_size;
        self.viewport = Viewport::full(new_size.width, new_size.height);
        true
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
