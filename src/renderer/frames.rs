use image::RgbaImage;
use wgpu::util::DeviceExt;

/// One uploaded animation frame, ready to bind as group 1.
pub struct FrameTexture {
    pub bind_group: wgpu::BindGroup,
}

/// Ordered frame slots shared read-only by every sprite.  Slots start empty
/// and are filled as decodes complete, in whatever order they arrive.
pub struct FrameTextureSet {
    slots: Vec<Option<FrameTexture>>,
    sampler: wgpu::Sampler,
}

impl FrameTextureSet {
    pub fn new(device: &wgpu::Device, frame_count: usize) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("frame_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self { slots: (0..frame_count).map(|_| None).collect(), sampler }
    }

    pub fn get(&self, index: usize) -> Option<&FrameTexture> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Upload `image` into slot `index`.  Returns `false` if out of range.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        index: usize,
        image: &RgbaImage,
    ) -> bool {
        let Some(slot) = self.slots.get_mut(index) else { return false };
        let (width, height) = image.dimensions();

        // Linear RGBA8: the cutout threshold in the shader works on raw values.
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("frame_texture"),
                size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            image.as_raw(),
        );
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bg"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        *slot = Some(FrameTexture { bind_group });
        true
    }
}
