//! wgpu rendering for the orrery: device and surface setup, depth buffering,
//! body textures, the body shader program, and per-frame drawing.

pub mod body_pipeline;
pub mod buffer;
pub mod depth;
pub mod gpu;
pub mod mipmap;
pub mod pass;
pub mod renderer;
pub mod shader;
pub mod surface;
pub mod texture;

pub use body_pipeline::{BodyPipeline, MATRIX_UNIFORM_SIZE};
pub use buffer::MeshBuffer;
pub use depth::DepthBuffer;
pub use gpu::{
    ContextOptions, RenderContext, RenderContextError, SurfaceError, init_render_context_blocking,
};
pub use mipmap::{MipmapGenerator, mip_level_count};
pub use pass::{FrameEncoder, RenderPassBuilder, SPACE_BLACK};
pub use renderer::{SceneAssets, SceneRenderer, SceneRendererDescriptor};
pub use shader::{ShaderError, ShaderProgram, ShaderSources, ShaderStage};
pub use surface::{PhysicalSize, SurfaceResizeEvent, SurfaceWrapper, Viewport};
pub use texture::{
    BODY_TEXTURE_FORMAT, BodyTexture, BodyTextures, DecodedImage, TextureError, TextureManager,
    decode_image,
};

/// Create a headless device and queue for tests. Returns `None` without a GPU.
#[cfg(test)]
pub(crate) fn create_test_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;

        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: Default::default(),
                ..Default::default()
            })
            .await
            .ok()
    })
}
