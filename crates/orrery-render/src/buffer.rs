//! GPU buffers for the shared sphere mesh and the matrix uniforms.

use glam::Mat4;
use orrery_mesh::{SphereVertex, vertex_count_of_floats};
use wgpu::util::DeviceExt;

/// The shared sphere mesh on the GPU: one non-indexed vertex buffer drawn as
/// a triangle strip.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

impl MeshBuffer {
    /// Upload `vertices` in emission order.
    pub fn from_vertices(device: &wgpu::Device, label: &str, vertices: &[SphereVertex]) -> Self {
        let floats = orrery_mesh::as_floats(vertices);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(floats),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            vertex_buffer,
            vertex_count: vertex_count_of_floats(floats.len()),
        }
    }

    /// True for a mesh with no vertices, e.g. fewer than two latitude bands.
    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    /// Does nothing for an empty mesh; wgpu cannot slice an empty buffer.
    pub fn bind<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        if self.is_empty() {
            return;
        }
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
    }

    /// One draw over every vertex. Nothing for an empty mesh.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass) {
        if self.is_empty() {
            return;
        }
        render_pass.draw(0..self.vertex_count, 0..1);
    }

    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
    }
}

/// A 64-byte uniform buffer holding one column-major matrix.
pub fn create_matrix_uniform(device: &wgpu::Device, label: &str, matrix: &Mat4) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&matrix.to_cols_array()),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

/// Overwrite a matrix uniform created by [`create_matrix_uniform`].
pub fn write_matrix_uniform(queue: &wgpu::Queue, buffer: &wgpu::Buffer, matrix: &Mat4) {
    queue.write_buffer(buffer, 0, bytemuck::cast_slice(&matrix.to_cols_array()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_test_device_queue;
    use orrery_mesh::{SphereParams, generate_sphere_with};

    #[test]
    fn test_vertex_count_matches_generated_mesh() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let params = SphereParams {
            radius: 1.0,
            latitude_bands: 8,
            longitude_segments: 6,
        };
        let vertices = generate_sphere_with(&params);
        let mesh = MeshBuffer::from_vertices(&device, "test-sphere", &vertices);

        assert_eq!(mesh.vertex_count as usize, vertices.len());
        assert_eq!(mesh.vertex_count, 2 * 7 * 6);
        assert_eq!(
            mesh.vertex_buffer.size(),
            (vertices.len() * std::mem::size_of::<SphereVertex>()) as u64
        );
    }

    #[test]
    fn test_degenerate_mesh_is_empty() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let vertices = generate_sphere_with(&SphereParams {
            radius: 1.0,
            latitude_bands: 1,
            longitude_segments: 6,
        });
        let mesh = MeshBuffer::from_vertices(&device, "flat-sphere", &vertices);
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count, 0);
    }

    #[test]
    fn test_matrix_uniform_is_64_bytes() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let buffer = create_matrix_uniform(&device, "test-matrix", &Mat4::IDENTITY);
        assert_eq!(buffer.size(), 64);
        assert!(buffer.usage().contains(wgpu::BufferUsages::UNIFORM));
        write_matrix_uniform(&queue, &buffer, &Mat4::from_scale(glam::Vec3::splat(2.0)));
    }
}
