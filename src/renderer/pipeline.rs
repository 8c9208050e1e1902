use wgpu::util::DeviceExt;

use crate::Error;
use crate::render_loop::SpriteDraw;

/// Unit quad centred on the origin, two triangles.
pub const QUAD_POSITIONS: [[f32; 2]; 6] = [
    [-0.5, -0.5],
    [0.5, -0.5],
    [-0.5, 0.5],
    [-0.5, 0.5],
    [0.5, -0.5],
    [0.5, 0.5],
];

/// Texture coordinates matching `QUAD_POSITIONS`; image rows run top-down.
pub const QUAD_TEX_COORDS: [[f32; 2]; 6] = [
    [0.0, 1.0],
    [1.0, 1.0],
    [0.0, 0.0],
    [0.0, 0.0],
    [1.0, 1.0],
    [1.0, 0.0],
];

pub const QUAD_VERTEX_COUNT: u32 = QUAD_POSITIONS.len() as u32;

/// Per-draw uniform block.  Layout mirrors `SpriteUniform` in `sprite.wgsl`
/// (80 bytes: the WGSL struct rounds up to 16-byte alignment).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteUniform {
    pub model: [[f32; 4]; 4],
    pub alpha: f32,
    pub aspect_ratio: f32,
    pub _pad: [f32; 2],
}

impl From<&SpriteDraw> for SpriteUniform {
    fn from(draw: &SpriteDraw) -> Self {
        Self {
            model: draw.model,
            alpha: draw.alpha,
            aspect_ratio: draw.aspect_ratio,
            _pad: [0.0; 2],
        }
    }
}

/// Distance between consecutive uniform blocks in the dynamic-offset buffer.
pub fn uniform_stride(min_offset_alignment: u32) -> wgpu::BufferAddress {
    let size = std::mem::size_of::<SpriteUniform>() as wgpu::BufferAddress;
    let align = min_offset_alignment.max(1) as wgpu::BufferAddress;
    size.div_ceil(align) * align
}

const POSITION_ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const TEX_COORD_ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];

fn vec2_layout(attributes: &'static [wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

/// Static geometry shared by every draw: slot 0 positions, slot 1 tex coords.
pub struct QuadBuffers {
    pub positions: wgpu::Buffer,
    pub tex_coords: wgpu::Buffer,
}

impl QuadBuffers {
    pub fn new(device: &wgpu::Device) -> Self {
        let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_positions"),
            contents: bytemuck::cast_slice(&QUAD_POSITIONS),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let tex_coords = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_tex_coords"),
            contents: bytemuck::cast_slice(&QUAD_TEX_COORDS),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self { positions, tex_coords }
    }
}

pub struct SpritePipeline {
    pub render_pipeline: wgpu::RenderPipeline,
    pub uniform_bind_group_layout: wgpu::BindGroupLayout,
    pub frame_bind_group_layout: wgpu::BindGroupLayout,
}

/// WGSL source of the sprite program.
pub const SPRITE_SHADER: &str = include_str!("shaders/sprite.wgsl");

/// Pack one `SpriteUniform` per draw at `stride`-byte offsets into `out`.
/// Bytes between blocks are zeroed.
pub fn pack_uniforms(draws: &[SpriteDraw], stride: wgpu::BufferAddress, out: &mut Vec<u8>) {
    let stride = stride as usize;
    out.clear();
    out.resize(stride * draws.len(), 0);
    for (block, draw) in out.chunks_exact_mut(stride).zip(draws) {
        let uniform = SpriteUniform::from(draw);
        let bytes = bytemuck::bytes_of(&uniform);
        block[..bytes.len()].copy_from_slice(bytes);
    }
}

/// Build the sprite program from the bundled shader.
pub async fn create_sprite_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
) -> Result<SpritePipeline, Error> {
    create_pipeline_from_source(device, surface_format, SPRITE_SHADER).await
}

/// Build the sprite program from `source`.
///
/// Shader and pipeline creation run inside validation error scopes, so a
/// broken program aborts setup with the backend's diagnostic text instead of
/// reaching the device's uncaptured-error handler.
pub async fn create_pipeline_from_source(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    source: &str,
) -> Result<SpritePipeline, Error> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("sprite_shader"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let diagnostics = compilation_errors(&shader).await;
    if let Some(err) = scope.pop().await {
        let message = if diagnostics.is_empty() { err.to_string() } else { diagnostics };
        return Err(Error::ShaderCompile(message));
    }

    let uniform_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprite_uniform_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<SpriteUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

    let frame_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("sprite_pipeline_layout"),
        bind_group_layouts: &[&uniform_bind_group_layout, &frame_bind_group_layout],
        ..Default::default()
    });

    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("sprite_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[vec2_layout(&POSITION_ATTRIBS), vec2_layout(&TEX_COORD_ATTRIBS)],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                // src_alpha / one_minus_src_alpha
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });
    if let Some(err) = scope.pop().await {
        return Err(Error::ShaderCompile(err.to_string()));
    }

    Ok(SpritePipeline {
        render_pipeline,
        uniform_bind_group_layout,
        frame_bind_group_layout,
    })
}

/// Error-level compilation messages, one per line with their location.
async fn compilation_errors(shader: &wgpu::ShaderModule) -> String {
    let info = shader.get_compilation_info().await;
    info.messages
        .iter()
        .filter(|m| matches!(m.message_type, wgpu::CompilationMessageType::Error))
        .map(|m| match &m.location {
            Some(loc) => format!("{}:{}: {}", loc.line_number, loc.line_position, m.message),
            None => m.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
