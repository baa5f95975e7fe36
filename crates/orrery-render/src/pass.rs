//! Render pass setup and per-frame command encoding.

/// Background colour: opaque black.
pub const SPACE_BLACK: wgpu::Color = wgpu::Color::BLACK;

/// Describes the main pass: colour clear plus an optional reverse-Z depth clear.
#[derive(Debug, Clone, Copy)]
pub struct RenderPassBuilder {
    clear_color: wgpu::Color,
    clear_depth: Option<f32>,
    label: Option<&'static str>,
}

impl Default for RenderPassBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPassBuilder {
    pub fn new() -> Self {
        Self {
            clear_color: SPACE_BLACK,
            clear_depth: None,
            label: None,
        }
    }

    /// Clear the depth attachment to `value` at the start of the pass.
    pub fn clear_depth(mut self, value: f32) -> Self {
        self.clear_depth = Some(value);
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Begin a pass on `encoder`. `depth_view` is ignored unless a depth
    /// clear was configured.
    pub fn begin<'encoder>(
        &self,
        encoder: &'encoder mut wgpu::CommandEncoder,
        color_view: &'encoder wgpu::TextureView,
        depth_view: Option<&'encoder wgpu::TextureView>,
    ) -> wgpu::RenderPass<'encoder> {
        let color_attachment = wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(self.clear_color),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        };

        let depth_stencil_attachment = self.clear_depth.zip(depth_view).map(|(clear, view)| {
            wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }
        });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: self.label,
            color_attachments: &[Some(color_attachment)],
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// One frame's command encoder and the surface texture it will present.
pub struct FrameEncoder {
    pub encoder: wgpu::CommandEncoder,
    pub surface_view: wgpu::TextureView,
    surface_texture: wgpu::SurfaceTexture,
}

impl FrameEncoder {
    pub fn new(device: &wgpu::Device, surface_texture: wgpu::SurfaceTexture) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame-encoder"),
        });
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            encoder,
            surface_view,
            surface_texture,
        }
    }

    /// Submit the recorded commands and present. Consuming `self` rules out
    /// a second submit.
    pub fn submit(self, queue: &wgpu::Queue) {
        queue.submit([self.encoder.finish()]);
        self.surface_texture.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_clear_is_opaque_black() {
        let builder = RenderPassBuilder::new();
        assert_eq!(builder.clear_color, wgpu::Color::BLACK);
        assert_eq!(builder.clear_color.a, 1.0);
        assert!(builder.clear_depth.is_none());
    }

    #[test]
    fn test_builder_stores_settings() {
        let builder = RenderPassBuilder::new().clear_depth(0.0).label("bodies");
        assert_eq!(builder.clear_color, SPACE_BLACK);
        assert_eq!(builder.clear_depth, Some(0.0));
        assert_eq!(builder.label, Some("bodies"));
    }
}
