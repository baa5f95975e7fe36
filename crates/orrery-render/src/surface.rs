//! Framebuffer size tracking and the viewport derived from it.
//!
//! winit reports physical sizes that can be zero (minimized windows, Wayland
//! before the first configure). [`SurfaceWrapper`] clamps those to 1×1 so the
//! surface, depth buffer and projection aspect always stay valid.

/// Smallest width or height the surface is ever configured with.
pub const MIN_SURFACE_DIMENSION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

impl PhysicalSize {
    /// Size with both dimensions raised to [`MIN_SURFACE_DIMENSION`].
    pub fn clamped(width: u32, height: u32) -> Self {
        Self {
            width: width.max(MIN_SURFACE_DIMENSION),
            height: height.max(MIN_SURFACE_DIMENSION),
        }
    }
}

/// Rectangle of the framebuffer the bodies are drawn into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn covering(size: PhysicalSize) -> Self {
        Self {
            x: 0,
            y: 0,
            width: size.width,
            height: size.height,
        }
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(MIN_SURFACE_DIMENSION) as f32
    }

    /// Set this rectangle on `pass`, depth range `0..1`.
    pub fn apply(&self, pass: &mut wgpu::RenderPass<'_>) {
        let Viewport {
            x,
            y,
            width,
            height,
        } = *self;
        pass.set_viewport(x as f32, y as f32, width as f32, height as f32, 0.0, 1.0);
    }
}

/// Emitted when the tracked framebuffer size actually changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceResizeEvent {
    pub physical: PhysicalSize,
    pub scale_factor: f64,
}

/// Framebuffer size of the window, in physical pixels.
pub struct SurfaceWrapper {
    size: PhysicalSize,
    scale_factor: f64,
    configured: bool,
}

impl SurfaceWrapper {
    /// A zero initial dimension leaves the wrapper unconfigured until the
    /// first real resize.
    pub fn new(physical_width: u32, physical_height: u32, scale_factor: f64) -> Self {
        Self {
            size: PhysicalSize::clamped(physical_width, physical_height),
            scale_factor,
            configured: physical_width > 0 && physical_height > 0,
        }
    }

    /// Record a framebuffer resize. `None` when the clamped size is unchanged.
    pub fn handle_resize(
        &mut self,
        physical_width: u32,
        physical_height: u32,
    ) -> Option<SurfaceResizeEvent> {
        let size = PhysicalSize::clamped(physical_width, physical_height);
        if size == self.size {
            return None;
        }
        self.size = size;
        self.configured = true;
        Some(SurfaceResizeEvent {
            physical: size,
            scale_factor: self.scale_factor,
        })
    }

    pub fn handle_scale_factor_changed(
        &mut self,
        scale_factor: f64,
        physical_width: u32,
        physical_height: u32,
    ) -> Option<SurfaceResizeEvent> {
        self.scale_factor = scale_factor;
        self.handle_resize(physical_width, physical_height)
    }

    pub fn physical_size(&self) -> PhysicalSize {
        self.size
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// `(0, 0, width, height)`.
    pub fn viewport(&self) -> Viewport {
        Viewport::covering(self.size)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.viewport().aspect_ratio()
    }
}
