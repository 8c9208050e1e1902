use std::path::{Path, PathBuf};
use std::thread;

use image::RgbaImage;
use winit::event_loop::EventLoopProxy;

use crate::Error;

/// Path of frame `number` (1-based) inside `dir`: `dir/frame-{number}.png`.
pub fn frame_path(dir: impl AsRef<Path>, number: usize) -> PathBuf {
    dir.as_ref().join(format!("frame-{number}.png"))
}

// ── FrameGate ───────────────────────────────────────────────────────────────

/// Result of reporting a loaded frame to a [`FrameGate`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GateStatus {
    /// Still waiting on `remaining` frames.
    Pending { remaining: usize },
    /// This completion was the last one; returned exactly once.
    Opened,
    /// The gate had already opened, or the index was already counted.
    Ignored,
}

/// Counting barrier that opens once every frame index has been loaded.
///
/// Completions may arrive in any order.  Only distinct, in-range indices
/// count, so a repeated or bogus completion can never open the gate early
/// or open it twice.
#[derive(Clone, Debug)]
pub struct FrameGate {
    loaded: Vec<bool>,
    count: usize,
    open: bool,
}

impl FrameGate {
    pub fn new(frame_count: usize) -> Self {
        Self { loaded: vec![false; frame_count], count: 0, open: false }
    }

    pub fn frame_count(&self) -> usize {
        self.loaded.len()
    }

    pub fn loaded(&self) -> usize {
        self.count
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Record a successful load of the 0-based frame `index`.
    pub fn record(&mut self, index: usize) -> GateStatus {
        if self.open {
            return GateStatus::Ignored;
        }
        match self.loaded.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            _ => return GateStatus::Ignored,
        }
        self.count += 1;
        if self.count == self.loaded.len() {
            self.open = true;
            GateStatus::Opened
        } else {
            GateStatus::Pending { remaining: self.loaded.len() - self.count }
        }
    }
}

// ── FrameLoader ─────────────────────────────────────────────────────────────

/// Completion of one frame decode, delivered to the event loop.
#[derive(Debug)]
pub enum LoadEvent {
    Decoded { index: usize, image: RgbaImage },
    Failed { index: usize, path: PathBuf, source: image::ImageError },
}

impl LoadEvent {
    pub fn index(&self) -> usize {
        match self {
            LoadEvent::Decoded { index, .. } | LoadEvent::Failed { index, .. } => *index,
        }
    }

    /// The failure as a crate error, for reporting.
    pub fn into_error(self) -> Option<Error> {
        match self {
            LoadEvent::Decoded { .. } => None,
            LoadEvent::Failed { path, source, .. } => Some(Error::Decode { path, source }),
        }
    }
}

/// Decode a single frame from disk into RGBA8.
pub fn decode_frame(path: &Path) -> Result<RgbaImage, image::ImageError> {
    image::open(path).map(|img| img.to_rgba8())
}

/// Starts one background decode per frame.  Results come back through the
/// event loop proxy, so textures are only ever touched on the loop thread.
pub struct FrameLoader {
    dir: PathBuf,
    frame_count: usize,
}

impl FrameLoader {
    pub fn new(dir: impl Into<PathBuf>, frame_count: usize) -> Self {
        Self { dir: dir.into(), frame_count }
    }

    pub fn paths(&self) -> impl Iterator<Item = (usize, PathBuf)> + '_ {
        (0..self.frame_count).map(|i| (i, frame_path(&self.dir, i + 1)))
    }

    pub fn spawn(&self, proxy: &EventLoopProxy<LoadEvent>) {
        for (index, path) in self.paths() {
            let proxy = proxy.clone();
            thread::spawn(move || {
                let event = match decode_frame(&path) {
                    Ok(image) => LoadEvent::Decoded { index, image },
                    Err(source) => LoadEvent::Failed { index, path, source },
                };
                // A closed loop means the window is gone; nothing left to do.
                let _ = proxy.send_event(event);
            });
        }
    }
}
