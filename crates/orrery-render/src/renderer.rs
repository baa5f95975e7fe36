//! The scene renderer: owns every GPU resource the bodies need and draws one
//! frame from a set of [`FrameMatrices`].

use std::path::PathBuf;

use glam::Mat4;
use orrery_mesh::{SphereParams, generate_sphere_with};
use orrery_scene::{Body, FrameMatrices};

use crate::body_pipeline::BodyPipeline;
use crate::buffer::{MeshBuffer, create_matrix_uniform, write_matrix_uniform};
use crate::depth::DepthBuffer;
use crate::gpu::{RenderContext, SurfaceError};
use crate::pass::{FrameEncoder, RenderPassBuilder};
use crate::shader::{ShaderProgram, ShaderSources};
use crate::surface::Viewport;
use crate::texture::{BodyTextures, TextureManager};

/// Where the renderer finds its shaders and textures.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneAssets {
    pub shader_dir: PathBuf,
    pub vertex_shader: String,
    pub fragment_shader: String,
    /// Texture file per body, in [`Body::ALL`] order.
    pub textures: [PathBuf; Body::COUNT],
}

impl SceneAssets {
    pub fn texture_path(&self, body: Body) -> PathBuf {
        self.textures[body.index()].clone()
    }
}

/// Everything needed to set up a [`SceneRenderer`].
pub struct SceneRendererDescriptor<'a> {
    pub surface_format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
    pub wireframe: bool,
    pub sphere: SphereParams,
    pub assets: &'a SceneAssets,
}

/// Pipeline plus per-body matrix bind groups. Absent when the shader program
/// failed to build.
struct DrawState {
    pipeline: BodyPipeline,
    matrix_bind_groups: [wgpu::BindGroup; Body::COUNT],
}

pub struct SceneRenderer {
    mesh: MeshBuffer,
    textures: BodyTextures,
    model_buffers: [wgpu::Buffer; Body::COUNT],
    view_buffer: wgpu::Buffer,
    projection_buffer: wgpu::Buffer,
    depth: DepthBuffer,
    draw_state: Option<DrawState>,
}

impl SceneRenderer {
    /// Generate the mesh, load textures and build the shader program.
    ///
    /// Missing textures and shader failures are logged and degrade the
    /// output; they never make this fail.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, desc: &SceneRendererDescriptor) -> Self {
        let mut vertices = generate_sphere_with(&desc.sphere);
        log::info!(
            "Generated sphere mesh: {} vertices ({}x{} bands)",
            vertices.len(),
            desc.sphere.latitude_bands,
            desc.sphere.longitude_segments
        );
        let mesh_bytes = std::mem::size_of_val(vertices.as_slice()) as u64;
        let max_bytes = device.limits().max_buffer_size;
        if mesh_bytes > max_bytes {
            log::error!(
                "Sphere mesh needs {mesh_bytes} bytes, over the {max_bytes} byte buffer limit; bodies will not be drawn"
            );
            vertices.clear();
        }
        let mesh = MeshBuffer::from_vertices(device, "sphere", &vertices);

        let texture_manager = TextureManager::new(device);
        let textures = BodyTextures::load(&texture_manager, device, queue, |body| {
            desc.assets.texture_path(body)
        });

        let model_buffers = Body::ALL.map(|body| {
            create_matrix_uniform(device, &format!("{body}-model"), &Mat4::IDENTITY)
        });
        let view_buffer = create_matrix_uniform(device, "view", &Mat4::IDENTITY);
        let projection_buffer = create_matrix_uniform(device, "projection", &Mat4::IDENTITY);

        let sources = ShaderSources::read(
            &desc.assets.shader_dir,
            &desc.assets.vertex_shader,
            &desc.assets.fragment_shader,
        );
        let draw_state = ShaderProgram::build(device, &sources).ok().map(|program| {
            let pipeline = BodyPipeline::new(
                device,
                &program,
                desc.surface_format,
                texture_manager.bind_group_layout(),
                desc.wireframe,
            );
            let matrix_bind_groups = model_buffers.each_ref().map(|model| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("body-matrix-bind-group"),
                    layout: &pipeline.matrix_bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: model.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: view_buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: projection_buffer.as_entire_binding(),
                        },
                    ],
                })
            });
            DrawState {
                pipeline,
                matrix_bind_groups,
            }
        });
        if draw_state.is_none() {
            log::warn!("No usable shader program, bodies will not be drawn");
        }

        Self {
            mesh,
            textures,
            model_buffers,
            view_buffer,
            projection_buffer,
            depth: DepthBuffer::new(device, desc.width, desc.height),
            draw_state,
        }
    }

    /// Whether a working pipeline exists.
    pub fn can_draw(&self) -> bool {
        self.draw_state.is_some()
    }

    pub fn vertex_count(&self) -> u32 {
        self.mesh.vertex_count
    }

    /// Follow a framebuffer resize.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth.resize(device, width, height);
    }

    /// Write the view, projection and every model matrix.
    pub fn upload(&self, queue: &wgpu::Queue, frame: &FrameMatrices) {
        write_matrix_uniform(queue, &self.view_buffer, &frame.view);
        write_matrix_uniform(queue, &self.projection_buffer, &frame.projection);
        for (body, model) in &frame.bodies {
            write_matrix_uniform(queue, &self.model_buffers[body.index()], model);
        }
    }

    /// Record the clear and the body draws into `encoder`. Returns the number
    /// of draw calls issued.
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        viewport: Viewport,
        frame: &FrameMatrices,
    ) -> usize {
        let builder = RenderPassBuilder::new()
            .clear_depth(DepthBuffer::CLEAR_VALUE)
            .label("bodies");
        let mut pass = builder.begin(encoder, color_view, Some(&self.depth.view));

        let Some(state) = &self.draw_state else {
            return 0;
        };
        if self.mesh.is_empty() {
            return 0;
        }

        viewport.apply(&mut pass);
        pass.set_pipeline(&state.pipeline.pipeline);
        self.mesh.bind(&mut pass);

        let mut draws = 0;
        for (body, _) in &frame.bodies {
            pass.set_bind_group(0, &state.matrix_bind_groups[body.index()], &[]);
            pass.set_bind_group(1, &self.textures.get(*body).bind_group, &[]);
            self.mesh.draw(&mut pass);
            draws += 1;
        }
        draws
    }

    /// Acquire the next surface texture, draw the bodies and present.
    pub fn render_frame(
        &self,
        ctx: &RenderContext,
        viewport: Viewport,
        frame: &FrameMatrices,
    ) -> Result<usize, SurfaceError> {
        let surface_texture = ctx.acquire_frame()?;
        let mut frame_encoder = FrameEncoder::new(&ctx.device, surface_texture);

        self.upload(&ctx.queue, frame);
        let draws = self.record(
            &mut frame_encoder.encoder,
            &frame_encoder.surface_view,
            viewport,
            frame,
        );
        frame_encoder.submit(&ctx.queue);
        Ok(draws)
    }

    /// Release every GPU resource owned by the renderer.
    pub fn shutdown(self) {
        self.mesh.destroy();
        for buffer in &self.model_buffers {
            buffer.destroy();
        }
        self.view_buffer.destroy();
        self.projection_buffer.destroy();
        self.depth.texture.destroy();
        log::info!("Released mesh, textures and shader program");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_test_device_queue;
    use orrery_scene::{SceneCamera, SceneState};
    use std::path::Path;

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    fn assets_in(dir: &Path) -> SceneAssets {
        SceneAssets {
            shader_dir: dir.to_path_buf(),
            vertex_shader: "earth.vert.wgsl".into(),
            fragment_shader: "earth.frag.wgsl".into(),
            textures: ["sun.jpg", "earth.bmp", "moon.jpg", "jupiter.jpg"].map(|f| dir.join(f)),
        }
    }

    fn write_bundled_shaders(dir: &Path) {
        std::fs::write(
            dir.join("earth.vert.wgsl"),
            include_str!("../../../assets/earth.vert.wgsl"),
        )
        .unwrap();
        std::fs::write(
            dir.join("earth.frag.wgsl"),
            include_str!("../../../assets/earth.frag.wgsl"),
        )
        .unwrap();
    }

    fn descriptor(assets: &SceneAssets) -> SceneRendererDescriptor<'_> {
        SceneRendererDescriptor {
            surface_format: FORMAT,
            width: 64,
            height: 64,
            wireframe: false,
            sphere: SphereParams {
                radius: 1.0,
                latitude_bands: 8,
                longitude_segments: 8,
            },
            assets,
        }
    }

    fn offscreen_target(device: &wgpu::Device) -> wgpu::TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("offscreen"),
                size: wgpu::Extent3d {
                    width: 64,
                    height: 64,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn draw_once(device: &wgpu::Device, queue: &wgpu::Queue, renderer: &SceneRenderer) -> usize {
        let view = offscreen_target(device);
        let mut state = SceneState::default();
        state.advance();
        let frame = state.frame_matrices(&SceneCamera::default(), 1.0);
        let viewport = Viewport {
            x: 0,
            y: 0,
            width: 64,
            height: 64,
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("test-frame"),
        });
        renderer.upload(queue, &frame);
        let draws = renderer.record(&mut encoder, &view, viewport, &frame);
        queue.submit([encoder.finish()]);
        draws
    }

    #[test]
    fn test_draws_each_body_once() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        write_bundled_shaders(dir.path());
        let assets = assets_in(dir.path());

        let renderer = SceneRenderer::new(&device, &queue, &descriptor(&assets));
        assert!(renderer.can_draw());
        assert_eq!(renderer.vertex_count(), 2 * 7 * 8);
        assert_eq!(draw_once(&device, &queue, &renderer), Body::COUNT);
        renderer.shutdown();
    }

    #[test]
    fn test_missing_shaders_draw_nothing_but_keep_running() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let assets = assets_in(dir.path());

        let renderer = SceneRenderer::new(&device, &queue, &descriptor(&assets));
        assert!(!renderer.can_draw());
        assert_eq!(draw_once(&device, &queue, &renderer), 0);
        assert_eq!(draw_once(&device, &queue, &renderer), 0);
        renderer.shutdown();
    }

    #[test]
    fn test_empty_mesh_draws_nothing() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        write_bundled_shaders(dir.path());
        let assets = assets_in(dir.path());
        let mut desc = descriptor(&assets);
        desc.sphere.latitude_bands = 1;

        let renderer = SceneRenderer::new(&device, &queue, &desc);
        assert!(renderer.can_draw());
        assert_eq!(renderer.vertex_count(), 0);
        assert_eq!(draw_once(&device, &queue, &renderer), 0);
        renderer.shutdown();
    }

    #[test]
    fn test_resize_tracks_depth_buffer() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let assets = assets_in(dir.path());
        let mut renderer = SceneRenderer::new(&device, &queue, &descriptor(&assets));

        renderer.resize(&device, 128, 32);
        assert_eq!(
            renderer.depth.size(),
            crate::surface::PhysicalSize::clamped(128, 32)
        );
    }

    #[test]
    fn test_texture_path_per_body() {
        let assets = assets_in(Path::new("assets"));
        assert_eq!(assets.texture_path(Body::Earth), Path::new("assets/earth.bmp"));
        assert_eq!(assets.texture_path(Body::Jupiter), Path::new("assets/jupiter.jpg"));
    }
}
