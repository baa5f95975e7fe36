//! Vertex record for the sphere mesh and its canonical GPU layout.
//!
//! | Location | Offset | Format    | Field            |
//! |----------|--------|-----------|------------------|
//! | 0        | 0      | Float32x3 | position xyz     |
//! | 1        | 12     | Float32x2 | texture coordinate |

use std::mem;

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;
use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

/// Number of `f32` components in one vertex (3 position + 2 texcoord).
pub const FLOATS_PER_VERTEX: usize = 5;

/// One sphere vertex: position followed by texture coordinate.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

const_assert_eq!(
    mem::size_of::<SphereVertex>(),
    FLOATS_PER_VERTEX * mem::size_of::<f32>()
);

const SPHERE_VERTEX_ATTRIBUTES: [VertexAttribute; 2] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: (3 * mem::size_of::<f32>()) as u64,
        shader_location: 1,
    },
];

/// The vertex buffer layout used by the body pipeline.
pub const SPHERE_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<SphereVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &SPHERE_VERTEX_ATTRIBUTES,
};

impl SphereVertex {
    /// Get the vertex buffer layout for this vertex type.
    pub fn layout() -> VertexBufferLayout<'static> {
        SPHERE_VERTEX_LAYOUT
    }
}

/// Views a vertex slice as its flat `f32` components, five per vertex.
pub fn as_floats(vertices: &[SphereVertex]) -> &[f32] {
    bytemuck::cast_slice(vertices)
}

/// Number of vertices described by a flat buffer of `float_len` components.
pub fn vertex_count_of_floats(float_len: usize) -> u32 {
    (float_len / FLOATS_PER_VERTEX) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_five_floats() {
        assert_eq!(mem::size_of::<SphereVertex>(), 20);
        assert_eq!(SPHERE_VERTEX_LAYOUT.array_stride, 20);
    }

    #[test]
    fn test_layout_locations() {
        let layout = SphereVertex::layout();
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].shader_location, 1);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.step_mode, VertexStepMode::Vertex);
    }

    #[test]
    fn test_as_floats_interleaves_components() {
        let verts = [
            SphereVertex {
                position: [1.0, 2.0, 3.0],
                uv: [4.0, 5.0],
            },
            SphereVertex {
                position: [6.0, 7.0, 8.0],
                uv: [9.0, 10.0],
            },
        ];
        let floats = as_floats(&verts);
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        assert_eq!(vertex_count_of_floats(floats.len()), 2);
    }
}
