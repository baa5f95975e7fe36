//! wgpu setup for the orrery window: adapter, device, queue and the
//! configured surface, plus per-frame surface acquisition.

use std::sync::Arc;
use winit::window::Window;

/// GPU setup failures. The app treats every one of them as fatal.
#[derive(Debug, thiserror::Error)]
pub enum RenderContextError {
    #[error("no GPU adapter can present to this window")]
    NoAdapter,

    #[error("GPU device request failed: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("cannot create a surface for the window: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
}

/// Why a frame could not be acquired.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// Still lost after one reconfigure; the frame is skipped.
    #[error("surface lost")]
    Lost,

    #[error("out of GPU memory")]
    OutOfMemory,

    /// The frame is skipped.
    #[error("timed out acquiring a frame")]
    Timeout,
}

/// Presentation choices taken from the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContextOptions {
    pub vsync: bool,
    /// Ask for line polygon mode. Ignored when the adapter lacks it.
    pub wireframe: bool,
}

pub struct RenderContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub adapter_info: wgpu::AdapterInfo,
    /// True only if wireframe was requested and `POLYGON_MODE_LINE` was granted.
    pub wireframe: bool,
}

impl RenderContext {
    pub async fn new(
        window: Arc<Window>,
        options: ContextOptions,
    ) -> Result<Self, RenderContextError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let size = window.inner_size();
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderContextError::NoAdapter)?;
        let adapter_info = adapter.get_info();
        log::info!(
            "GPU adapter: {} ({:?}, {:?})",
            adapter_info.name,
            adapter_info.backend,
            adapter_info.device_type
        );

        let required_features = wireframe_features(options.wireframe, adapter.features());
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("orrery-device"),
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_config = surface_configuration(
            &surface.get_capabilities(&adapter),
            size.width,
            size.height,
            options.vsync,
        );
        surface.configure(&device, &surface_config);
        log::debug!(
            "Surface {}x{} {:?} {:?}",
            surface_config.width,
            surface_config.height,
            surface_config.format,
            surface_config.present_mode
        );

        let wireframe = required_features.contains(wgpu::Features::POLYGON_MODE_LINE);
        if wireframe {
            log::info!("Drawing bodies as wireframes");
        }

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            adapter_info,
            wireframe,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    /// Follow a framebuffer size change. Zero sizes become 1.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Next texture to draw into. A lost or outdated surface is reconfigured
    /// and asked once more.
    pub fn acquire_frame(&self) -> Result<wgpu::SurfaceTexture, SurfaceError> {
        let err = match self.surface.get_current_texture() {
            Ok(texture) => return Ok(texture),
            Err(err) => err,
        };
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                log::warn!("Surface {err}, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                self.surface
                    .get_current_texture()
                    .map_err(|_| SurfaceError::Lost)
            }
            wgpu::SurfaceError::OutOfMemory => Err(SurfaceError::OutOfMemory),
            wgpu::SurfaceError::Timeout => Err(SurfaceError::Timeout),
            wgpu::SurfaceError::Other => {
                log::error!("Unrecognised surface error");
                Err(SurfaceError::Lost)
            }
        }
    }
}

/// Blocking wrapper around [`RenderContext::new`] for the winit event loop.
pub fn init_render_context_blocking(
    window: Arc<Window>,
    options: ContextOptions,
) -> Result<RenderContext, RenderContextError> {
    pollster::block_on(RenderContext::new(window, options))
}

fn wireframe_features(requested: bool, available: wgpu::Features) -> wgpu::Features {
    match (requested, available.contains(wgpu::Features::POLYGON_MODE_LINE)) {
        (false, _) => wgpu::Features::empty(),
        (true, true) => wgpu::Features::POLYGON_MODE_LINE,
        (true, false) => {
            log::warn!("Adapter cannot draw lines, wireframe request ignored");
            wgpu::Features::empty()
        }
    }
}

/// Surface configuration for a `width`×`height` framebuffer.
///
/// Format: an sRGB 8-bit format if offered, else any sRGB format, else the
/// first one. Present mode: Fifo with vsync; without it Immediate, then
/// Mailbox, then Fifo.
fn surface_configuration(
    caps: &wgpu::SurfaceCapabilities,
    width: u32,
    height: u32,
    vsync: bool,
) -> wgpu::SurfaceConfiguration {
    const PREFERRED: [wgpu::TextureFormat; 2] = [
        wgpu::TextureFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Rgba8UnormSrgb,
    ];
    let format = PREFERRED
        .into_iter()
        .find(|f| caps.formats.contains(f))
        .or_else(|| caps.formats.iter().copied().find(|f| f.is_srgb()))
        .or_else(|| caps.formats.first().copied())
        .unwrap_or(PREFERRED[0]);

    let present_mode = if vsync {
        wgpu::PresentMode::Fifo
    } else {
        [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]
            .into_iter()
            .find(|mode| caps.present_modes.contains(mode))
            .unwrap_or(wgpu::PresentMode::Fifo)
    };

    wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: width.max(1),
        height: height.max(1),
        present_mode,
        alpha_mode: caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    }
}
