use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats for this adapter")]
    UnsupportedSurface,

    #[error("shader program failed to build:\n{0}")]
    ShaderCompile(String),

    #[error("failed to decode frame {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid flock preset: {0}")]
    Preset(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// True for every failure to acquire a usable rendering backend.
    /// These degrade gracefully instead of being reported as hard errors.
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(
            self,
            Error::CreateSurface(_)
                | Error::NoAdapter(_)
                | Error::RequestDevice(_)
                | Error::UnsupportedSurface
        )
    }
}
