use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy};
use winit::window::WindowId;

use crate::Error;
use crate::flock::{Flock, Sprite};
use crate::loader::{FrameLoader, LoadEvent};
use crate::render_loop::RenderLoop;
use crate::renderer::Renderer;
use crate::window::{WindowConfig, WindowMode, window_attributes};

// ── FlockBuilder ────────────────────────────────────────────────────────────

pub struct FlockBuilder {
    window: WindowConfig,
    frame_count: usize,
    frame_dir: PathBuf,
    /// `None` uses the embedded default flock.
    sprites: Option<Vec<Sprite>>,
    /// Fixed seed for reproducible flight paths; random when `None`.
    seed: Option<u64>,
}

impl Default for FlockBuilder {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            frame_count: crate::DEFAULT_FRAME_COUNT,
            frame_dir: PathBuf::from(crate::DEFAULT_FRAME_DIR),
            sprites: None,
            seed: None,
        }
    }
}

impl FlockBuilder {
    pub fn with_title(mut self, title: &str) -> Self { self.window.title = title.into(); self }
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width; self.window.height = height; self
    }
    pub fn with_mode(mut self, mode: WindowMode) -> Self { self.window.mode = mode; self }
    pub fn with_frame_count(mut self, frame_count: usize) -> Self { self.frame_count = frame_count; self }
    /// Directory holding `frame-1.png ..= frame-N.png`.
    pub fn with_frame_dir(mut self, dir: impl Into<PathBuf>) -> Self { self.frame_dir = dir.into(); self }
    pub fn with_sprites(mut self, sprites: Vec<Sprite>) -> Self { self.sprites = Some(sprites); self }
    pub fn with_seed(mut self, seed: u64) -> Self { self.seed = Some(seed); self }

    pub fn window_config(&self) -> &WindowConfig {
        &self.window
    }

    pub fn frame_loader(&self) -> FrameLoader {
        FrameLoader::new(self.frame_dir.clone(), self.frame_count)
    }

    /// Validate the configuration and produce a render loop in `Waiting`.
    pub fn build_loop(&self) -> Result<RenderLoop, Error> {
        if self.frame_count == 0 {
            return Err(Error::InvalidConfig("frame count must be at least 1".into()));
        }
        let flock = match &self.sprites {
            Some(sprites) => Flock::new(sprites.clone())?,
            None => Flock::default_flock()?,
        };
        let rng = match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Ok(RenderLoop::new(flock, self.frame_count, rng))
    }

    /// Open the window and animate until it is closed.
    ///
    /// A missing rendering backend is not an error: it is logged and the call
    /// returns `Ok(())` without animating.  Shader failures are returned.
    pub fn run(self) -> Result<(), Error> {
        let render_loop = self.build_loop()?;
        let event_loop = EventLoop::<LoadEvent>::with_user_event().build()?;
        let proxy = event_loop.create_proxy();

        let mut app = App {
            config: self,
            proxy,
            render_loop,
            renderer: None,
            started: Instant::now(),
            fatal: None,
        };
        event_loop.run_app(&mut app)?;

        match app.fatal {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// ── App ─────────────────────────────────────────────────────────────────────

struct App {
    config: FlockBuilder,
    proxy: EventLoopProxy<LoadEvent>,
    render_loop: RenderLoop,
    renderer: Option<Renderer>,
    /// Elapsed time for frame selection counts from here.
    started: Instant,
    fatal: Option<Error>,
}

impl App {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<Renderer, Error> {
        let window = Arc::new(event_loop.create_window(window_attributes(&self.config.window))?);
        pollster::block_on(Renderer::new(
            window,
            self.config.frame_count,
            self.render_loop.flock().len(),
        ))
    }

    fn on_load_event(&mut self, event: LoadEvent) {
        let Some(renderer) = self.renderer.as_mut() else { return };
        match event {
            LoadEvent::Decoded { index, image } => {
                if !renderer.upload_frame(index, &image) {
                    log::warn!("ignoring frame {} outside the configured range", index + 1);
                    return;
                }
                log::debug!("frame {} uploaded ({}x{})", index + 1, image.width(), image.height());

                let mut scheduler = Arc::clone(&renderer.window);
                if self.render_loop.frame_loaded(index, &mut scheduler) {
                    log::info!(
                        "all {} frames loaded, starting animation",
                        self.render_loop.gate().frame_count()
                    );
                }
            }
            failed @ LoadEvent::Failed { .. } => {
                let index = failed.index();
                if let Some(error) = failed.into_error() {
                    log::error!("{error}");
                }
                log::error!(
                    "frame {} will never load; animation stays paused ({}/{} frames ready)",
                    index + 1,
                    self.render_loop.gate().loaded(),
                    self.render_loop.gate().frame_count()
                );
            }
        }
    }
}

impl ApplicationHandler<LoadEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                self.config.frame_loader().spawn(&self.proxy);
            }
            Err(err) if err.is_backend_unavailable() => {
                log::warn!("rendering backend unavailable, animation disabled: {err}");
                event_loop.exit();
            }
            Err(err) => {
                log::error!("{err}");
                self.fatal = Some(err);
                event_loop.exit();
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: LoadEvent) {
        self.on_load_event(event);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(renderer) = self.renderer.as_mut() else { return };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => renderer.resize(size),

            WindowEvent::RedrawRequested => {
                let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
                let aspect_ratio = renderer.aspect_ratio();
                let mut scheduler = Arc::clone(&renderer.window);

                let Some(draws) = self.render_loop.tick(elapsed_ms, aspect_ratio, &mut scheduler)
                else {
                    return;
                };

                match renderer.render(&draws) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        renderer.reconfigure();
                    }
                    Err(e) => log::error!("render error: {e}"),
                }
            }

            _ => {}
        }
    }
}
