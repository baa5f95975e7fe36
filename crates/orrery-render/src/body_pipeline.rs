//! Render pipeline for the textured bodies.

use std::num::NonZeroU64;

use orrery_mesh::SphereVertex;

use crate::depth::DepthBuffer;
use crate::shader::{FRAGMENT_ENTRY_POINT, ShaderProgram, VERTEX_ENTRY_POINT};

/// Size of one `mat4x4<f32>` uniform.
pub const MATRIX_UNIFORM_SIZE: u64 = 64;

/// Triangle-strip pipeline drawing the shared sphere with one texture bound.
pub struct BodyPipeline {
    pub pipeline: wgpu::RenderPipeline,
    /// Group 0: `model`, `view`, `projection`.
    pub matrix_bind_group_layout: wgpu::BindGroupLayout,
}

fn matrix_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(MATRIX_UNIFORM_SIZE),
        },
        count: None,
    }
}

impl BodyPipeline {
    /// `texture_bind_group_layout` is group 1 (texture + sampler).
    pub fn new(
        device: &wgpu::Device,
        program: &ShaderProgram,
        surface_format: wgpu::TextureFormat,
        texture_bind_group_layout: &wgpu::BindGroupLayout,
        wireframe: bool,
    ) -> Self {
        let matrix_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("body-matrix-bind-group-layout"),
                entries: &[matrix_entry(0), matrix_entry(1), matrix_entry(2)],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("body-pipeline-layout"),
            bind_group_layouts: &[&matrix_bind_group_layout, texture_bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("body-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &program.vertex,
                entry_point: Some(VERTEX_ENTRY_POINT),
                buffers: &[SphereVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: primitive_state(wireframe),
            depth_stencil: Some(DepthBuffer::depth_stencil_state()),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &program.fragment,
                entry_point: Some(FRAGMENT_ENTRY_POINT),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            matrix_bind_group_layout,
        }
    }
}

/// Non-indexed strip with no culling; the generated sphere mixes windings at the poles.
fn primitive_state(wireframe: bool) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleStrip,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        unclipped_depth: false,
        polygon_mode: if wireframe {
            wgpu::PolygonMode::Line
        } else {
            wgpu::PolygonMode::Fill
        },
        conservative: false,
    }
}
