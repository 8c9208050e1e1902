use image::RgbaImage;

use super::frames::FrameTextureSet;
use super::pipeline::{
    QUAD_VERTEX_COUNT, QuadBuffers, SpritePipeline, SpriteUniform, create_sprite_pipeline,
    pack_uniforms, uniform_stride,
};
use super::utils::Viewport;
use crate::Error;
use crate::render_loop::SpriteDraw;

/// Everything needed to draw the flock into a colour target, independent of
/// where that target comes from (window surface or offscreen texture).
pub struct SpriteBatch {
    pipeline: SpritePipeline,
    quad: QuadBuffers,
    frames: FrameTextureSet,
    /// One `SpriteUniform` per draw, addressed with dynamic offsets.
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_stride: wgpu::BufferAddress,
    /// Number of uniform blocks the current buffer can hold.
    uniform_capacity: usize,
    /// Scratch bytes reused for the per-frame uniform upload.
    uniform_staging: Vec<u8>,
}

impl SpriteBatch {
    /// `sprite_capacity` sizes the uniform buffer up front; it grows on demand.
    pub async fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        frame_count: usize,
        sprite_capacity: usize,
    ) -> Result<Self, Error> {
        let pipeline = create_sprite_pipeline(device, target_format).await?;
        let quad = QuadBuffers::new(device);
        let frames = FrameTextureSet::new(device, frame_count);

        let stride = uniform_stride(device.limits().min_uniform_buffer_offset_alignment);
        let capacity = sprite_capacity.max(1);
        let (uniform_buffer, uniform_bind_group) =
            create_uniform_storage(device, &pipeline.uniform_bind_group_layout, stride, capacity);

        Ok(Self {
            pipeline,
            quad,
            frames,
            uniform_buffer,
            uniform_bind_group,
            uniform_stride: stride,
            uniform_capacity: capacity,
            uniform_staging: Vec::new(),
        })
    }

    pub fn uniform_stride(&self) -> wgpu::BufferAddress {
        self.uniform_stride
    }

    pub fn uniform_capacity(&self) -> usize {
        self.uniform_capacity
    }

    pub fn frame_ready(&self, index: usize) -> bool {
        self.frames.get(index).is_some()
    }

    /// Fill frame slot `index` with a decoded image.  `false` if out of range.
    pub fn upload_frame(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        index: usize,
        image: &RgbaImage,
    ) -> bool {
        self.frames.upload(device, queue, &self.pipeline.frame_bind_group_layout, index, image)
    }

    fn ensure_uniform_capacity(&mut self, device: &wgpu::Device, count: usize) {
        if count <= self.uniform_capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        let (buffer, bind_group) = create_uniform_storage(
            device,
            &self.pipeline.uniform_bind_group_layout,
            self.uniform_stride,
            capacity,
        );
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
        self.uniform_capacity = capacity;
        log::debug!("uniform buffer grown to {capacity} sprites");
    }

    /// Clear `target` to transparent, then draw every sprite in the order
    /// given and submit.  Draws whose frame has no texture yet are skipped;
    /// returns how many sprites were actually drawn.
    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        viewport: Viewport,
        draws: &[SpriteDraw],
    ) -> usize {
        if !draws.is_empty() {
            self.ensure_uniform_capacity(device, draws.len());
            pack_uniforms(draws, self.uniform_stride, &mut self.uniform_staging);
            queue.write_buffer(&self.uniform_buffer, 0, &self.uniform_staging);
        }

        let mut encoder = device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("flock_encoder") });

        let mut drawn = 0;
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("flock_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_viewport(viewport.x, viewport.y, viewport.width, viewport.height, 0.0, 1.0);
            pass.set_pipeline(&self.pipeline.render_pipeline);
            pass.set_vertex_buffer(0, self.quad.positions.slice(..));
            pass.set_vertex_buffer(1, self.quad.tex_coords.slice(..));

            for (i, draw) in draws.iter().enumerate() {
                let Some(texture) = self.frames.get(draw.frame) else { continue };
                let offset = (i as wgpu::BufferAddress * self.uniform_stride) as u32;
                pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
                pass.set_bind_group(1, &texture.bind_group, &[]);
                pass.draw(0..QUAD_VERTEX_COUNT, 0..1);
                drawn += 1;
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        drawn
    }
}

fn create_uniform_storage(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: wgpu::BufferAddress,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("sprite_uniforms"),
        size: stride * capacity as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("sprite_uniforms_bg"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<SpriteUniform>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}
