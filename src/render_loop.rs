use std::sync::Arc;

use winit::window::Window;

use crate::flock::{Flock, frame_index};
use crate::loader::{FrameGate, GateStatus};

/// "Run before next repaint" facility.  The window implementation requests a
/// redraw; tests count calls.
pub trait FrameScheduler {
    fn schedule(&mut self);
}

impl FrameScheduler for Arc<Window> {
    fn schedule(&mut self) {
        self.request_redraw();
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Frame textures still loading; nothing is drawn.
    Waiting,
    /// Every tick draws and reschedules the next one.
    Running,
}

/// Everything the GPU needs for one sprite draw.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpriteDraw {
    /// Column-major model matrix.
    pub model: [[f32; 4]; 4],
    pub alpha: f32,
    /// Uploaded alongside each draw; the fragment stage does not read it yet.
    pub aspect_ratio: f32,
    /// Index into the frame texture set.
    pub frame: usize,
}

#[derive(Debug)]
pub struct RenderLoop {
    state: LoopState,
    gate: FrameGate,
    flock: Flock,
    rng: fastrand::Rng,
}

impl RenderLoop {
    pub fn new(flock: Flock, frame_count: usize, rng: fastrand::Rng) -> Self {
        Self { state: LoopState::Waiting, gate: FrameGate::new(frame_count), flock, rng }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn gate(&self) -> &FrameGate {
        &self.gate
    }

    pub fn flock(&self) -> &Flock {
        &self.flock
    }

    /// Report that frame `index` is resident on the GPU.  The first tick is
    /// scheduled when the last frame arrives and never again from here.
    /// Returns `true` on the Waiting → Running transition.
    pub fn frame_loaded(&mut self, index: usize, scheduler: &mut impl FrameScheduler) -> bool {
        match self.gate.record(index) {
            GateStatus::Opened => {
                self.state = LoopState::Running;
                scheduler.schedule();
                true
            }
            GateStatus::Pending { .. } | GateStatus::Ignored => false,
        }
    }

    /// One tick: update every sprite, then build its draw in flock order, then
    /// reschedule.  Returns `None` (and schedules nothing) while Waiting.
    pub fn tick(
        &mut self,
        elapsed_ms: f64,
        aspect_ratio: f32,
        scheduler: &mut impl FrameScheduler,
    ) -> Option<Vec<SpriteDraw>> {
        if self.state != LoopState::Running {
            return None;
        }

        self.flock.update(&mut self.rng);

        let frame_count = self.gate.frame_count();
        let draws = self
            .flock
            .sprites()
            .iter()
            .map(|s| SpriteDraw {
                model: s.model_matrix().to_cols_array_2d(),
                alpha: s.alpha,
                aspect_ratio,
                frame: frame_index(elapsed_ms, s.anim_speed, frame_count),
            })
            .collect();

        scheduler.schedule();
        Some(draws)
    }
}
