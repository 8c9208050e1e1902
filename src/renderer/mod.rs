pub mod batch;
pub mod frames;
pub mod pipeline;
pub mod utils;

use std::sync::Arc;

use image::RgbaImage;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use batch::SpriteBatch;
use utils::ViewportManager;

use crate::Error;
use crate::render_loop::SpriteDraw;

pub struct Renderer {
    pub window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    viewport: ViewportManager,
    batch: SpriteBatch,
}

impl Renderer {
    /// Acquire the GPU, configure the surface and build the sprite program.
    /// `sprite_capacity` sizes the uniform buffer up front; it grows on demand.
    pub async fn new(
        window: Arc<Window>,
        frame_count: usize,
        sprite_capacity: usize,
    ) -> Result<Self, Error> {
        let size = window.inner_size();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(Arc::clone(&window))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await?;
        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("flock_device"),
                ..Default::default()
            })
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = *caps.formats.first().ok_or(Error::UnsupportedSurface)?;
        let alpha_mode = pick_alpha_mode(&caps.alpha_modes).ok_or(Error::UnsupportedSurface)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let batch = SpriteBatch::new(&device, format, frame_count, sprite_capacity).await?;

        Ok(Self {
            viewport: ViewportManager::new(PhysicalSize::new(config.width, config.height)),
            window,
            surface,
            device,
            queue,
            config,
            batch,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if !self.viewport.resize(new_size) {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        log::debug!("viewport now {}x{}", new_size.width, new_size.height);
    }

    /// Re-apply the current configuration after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.viewport.viewport().aspect_ratio()
    }

    /// Fill frame slot `index` with a decoded image.
    pub fn upload_frame(&mut self, index: usize, image: &RgbaImage) -> bool {
        self.batch.upload_frame(&self.device, &self.queue, index, image)
    }

    /// Clear to transparent and draw every sprite in the order given.
    pub fn render(&mut self, draws: &[SpriteDraw]) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.batch.draw(&self.device, &self.queue, &view, self.viewport.viewport(), draws);
        frame.present();
        Ok(())
    }
}

/// Prefer a compositor mode that honours the transparent clear colour.
fn pick_alpha_mode(modes: &[wgpu::CompositeAlphaMode]) -> Option<wgpu::CompositeAlphaMode> {
    [wgpu::CompositeAlphaMode::PreMultiplied, wgpu::CompositeAlphaMode::PostMultiplied]
        .into_iter()
        .find(|m| modes.contains(m))
        .or_else(|| modes.first().copied())
}
