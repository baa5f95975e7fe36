//! Reverse-Z depth buffer.
//!
//! The near plane maps to 1.0 and the far plane to 0.0, matching the
//! projection built by `SceneCamera`. Clearing to 0.0 and passing fragments
//! with `GreaterEqual` keeps the nearer body in front.

use crate::surface::PhysicalSize;

/// Depth attachment sized to the framebuffer.
pub struct DepthBuffer {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    size: PhysicalSize,
}

impl DepthBuffer {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Far plane in reverse-Z.
    pub const CLEAR_VALUE: f32 = 0.0;

    pub const COMPARE_FUNCTION: wgpu::CompareFunction = wgpu::CompareFunction::GreaterEqual;

    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = PhysicalSize::clamped(width, height);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("orrery-depth"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            size,
        }
    }

    /// Recreate the attachment for a new framebuffer size. No-op if unchanged.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if PhysicalSize::clamped(width, height) == self.size {
            return;
        }
        log::debug!("Depth buffer now {width}x{height}");
        self.texture.destroy();
        *self = Self::new(device, width, height);
    }

    /// Depth state for pipelines drawing into this buffer.
    pub fn depth_stencil_state() -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: Self::FORMAT,
            depth_write_enabled: true,
            depth_compare: Self::COMPARE_FUNCTION,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }

    pub fn size(&self) -> PhysicalSize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_test_device_queue;

    #[test]
    fn test_reverse_z_constants() {
        assert_eq!(DepthBuffer::FORMAT, wgpu::TextureFormat::Depth32Float);
        assert_eq!(DepthBuffer::CLEAR_VALUE, 0.0);
        assert_eq!(
            DepthBuffer::COMPARE_FUNCTION,
            wgpu::CompareFunction::GreaterEqual
        );
    }

    #[test]
    fn test_depth_state_writes_and_compares() {
        let state = DepthBuffer::depth_stencil_state();
        assert!(state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::GreaterEqual);
        assert_eq!(state.format, DepthBuffer::FORMAT);
    }

    #[test]
    fn test_depth_dimensions_follow_resize() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let mut depth = DepthBuffer::new(&device, 1500, 1500);
        assert_eq!(depth.size(), PhysicalSize::clamped(1500, 1500));

        depth.resize(&device, 800, 600);
        assert_eq!(depth.size(), PhysicalSize::clamped(800, 600));
        assert!(
            depth
                .texture
                .usage()
                .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
        );
    }

    #[test]
    fn test_zero_size_clamped() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let depth = DepthBuffer::new(&device, 0, 0);
        assert_eq!(
            depth.size(),
            PhysicalSize {
                width: 1,
                height: 1
            }
        );
    }
}
