//! The orrery window and its winit event handling.
//!
//! [`OrreryApp`] owns the window, the GPU context, the scene renderer and the
//! animation state. Every `RedrawRequested` is one iteration of the render
//! loop: check for exit, advance the angle, draw the four bodies, present,
//! pause, and ask for the next redraw.

use std::sync::Arc;

use orrery_config::{AssetConfig, Config, MeshConfig, WindowConfig};
use orrery_mesh::SphereParams;
use orrery_render::{
    ContextOptions, RenderContext, SceneAssets, SceneRenderer, SceneRendererDescriptor,
    SurfaceError, SurfaceWrapper, init_render_context_blocking,
};
use orrery_scene::{SceneCamera, SceneState};
use tracing::{debug, error, info, instrument, trace, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::frame_pacer::FramePacer;
use crate::input::KeyboardState;
use crate::run_state::RunState;

/// How the process ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitStatus {
    /// Window closed normally.
    Clean = 0,
    /// Window, event loop or GPU setup failed.
    InitFailed = -1,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    /// `-1` wraps to 255, the same status a C `exit(-1)` produces on Unix.
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.code() as u8)
    }
}

/// Build window attributes (title, inner size) from config.
pub fn window_attributes_from_config(config: &WindowConfig) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.title.clone())
        .with_inner_size(PhysicalSize::new(config.width, config.height))
}

/// Map the asset section of the config onto the renderer's asset paths.
pub fn scene_assets_from_config(config: &AssetConfig) -> SceneAssets {
    SceneAssets {
        shader_dir: config.dir.clone(),
        vertex_shader: config.vertex_shader.clone(),
        fragment_shader: config.fragment_shader.clone(),
        textures: config.texture_paths(),
    }
}

pub fn sphere_params_from_config(config: &MeshConfig) -> SphereParams {
    SphereParams {
        radius: config.radius,
        latitude_bands: config.latitude_bands,
        longitude_segments: config.longitude_segments,
    }
}

pub struct OrreryApp {
    config: Config,
    window: Option<Arc<Window>>,
    gpu: Option<RenderContext>,
    renderer: Option<SceneRenderer>,
    surface_wrapper: SurfaceWrapper,
    keyboard: KeyboardState,
    scene: SceneState,
    camera: SceneCamera,
    pacer: FramePacer,
    run_state: RunState,
    exit_status: ExitStatus,
}

impl OrreryApp {
    pub fn new(config: Config) -> Self {
        let surface_wrapper = SurfaceWrapper::new(config.window.width, config.window.height, 1.0);
        let scene = SceneState::new(config.animation.step_degrees);
        let pacer = FramePacer::from_millis(config.animation.frame_pause_ms);
        Self {
            config,
            window: None,
            gpu: None,
            renderer: None,
            surface_wrapper,
            keyboard: KeyboardState::new(),
            scene,
            camera: SceneCamera::default(),
            pacer,
            run_state: RunState::Running,
            exit_status: ExitStatus::Clean,
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn exit_status(&self) -> ExitStatus {
        self.exit_status
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    fn fail_init(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_status = ExitStatus::InitFailed;
        self.run_state.request_close();
        self.shutdown(event_loop);
    }

    /// Create the window, the GPU context and every scene resource.
    fn initialize(&mut self, event_loop: &ActiveEventLoop) {
        let attrs = window_attributes_from_config(&self.config.window);
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                self.fail_init(event_loop);
                return;
            }
        };

        let inner_size = window.inner_size();
        self.surface_wrapper =
            SurfaceWrapper::new(inner_size.width, inner_size.height, window.scale_factor());
        info!(
            "Window created: {}x{} (scale: {:.2})",
            inner_size.width,
            inner_size.height,
            window.scale_factor()
        );

        let options = ContextOptions {
            vsync: self.config.window.vsync,
            wireframe: self.config.debug.wireframe,
        };
        let ctx = match init_render_context_blocking(window.clone(), options) {
            Ok(ctx) => ctx,
            Err(e) => {
                error!("GPU initialization failed: {e}");
                self.window = Some(window);
                self.fail_init(event_loop);
                return;
            }
        };

        let assets = scene_assets_from_config(&self.config.assets);
        let size = self.surface_wrapper.physical_size();
        let renderer = SceneRenderer::new(
            &ctx.device,
            &ctx.queue,
            &SceneRendererDescriptor {
                surface_format: ctx.surface_format(),
                width: size.width,
                height: size.height,
                wireframe: ctx.wireframe,
                sphere: sphere_params_from_config(&self.config.mesh),
                assets: &assets,
            },
        );
        info!(
            "Scene ready: {} vertices per body, drawing {}",
            renderer.vertex_count(),
            if renderer.can_draw() {
                "enabled"
            } else {
                "disabled"
            }
        );

        window.request_redraw();
        self.renderer = Some(renderer);
        self.gpu = Some(ctx);
        self.window = Some(window);
    }

    fn apply_resize(&mut self, width: u32, height: u32) {
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(width, height);
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(&gpu.device, width, height);
            }
        }
    }

    /// One iteration of the render loop.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if !self.run_state.is_running() {
            return;
        }
        if self.keyboard.exit_requested() {
            info!("Escape pressed, closing");
            self.run_state.request_close();
            self.shutdown(event_loop);
            return;
        }
        self.keyboard.clear_transients();

        self.scene.advance();
        let frame = self
            .scene
            .frame_matrices(&self.camera, self.surface_wrapper.aspect_ratio());

        let outcome = match (&self.gpu, &self.renderer) {
            (Some(gpu), Some(renderer)) => {
                Some(renderer.render_frame(gpu, self.surface_wrapper.viewport(), &frame))
            }
            _ => None,
        };
        match outcome {
            Some(Ok(draws)) => trace!(
                "Frame {} at {:.1}°: {draws} draws",
                self.scene.frame(),
                self.scene.angle()
            ),
            Some(Err(SurfaceError::OutOfMemory)) => {
                error!("GPU out of memory, closing");
                self.run_state.request_close();
                self.shutdown(event_loop);
                return;
            }
            Some(Err(e)) => warn!("Skipping frame: {e}"),
            None => {}
        }

        self.pacer.frame_presented();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    /// Release GPU resources, then the context and window, and leave the
    /// event loop. Only acts in the `Closing` state.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if self.run_state != RunState::Closing {
            return;
        }
        if let Some(renderer) = self.renderer.take() {
            renderer.shutdown();
        }
        self.gpu = None;
        self.window = None;
        self.run_state.finish_shutdown();
        info!(
            "Shut down after {} frames ({})",
            self.pacer.frame_count(),
            self.run_state
        );
        event_loop.exit();
    }
}

impl ApplicationHandler for OrreryApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() && self.run_state.is_running() {
            self.initialize(event_loop);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                self.run_state.request_close();
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(new_size) => {
                if let Some(resize) = self
                    .surface_wrapper
                    .handle_resize(new_size.width, new_size.height)
                {
                    let (w, h) = (resize.physical.width, resize.physical.height);
                    self.apply_resize(w, h);
                    debug!("Framebuffer resized to {w}x{h}");
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let inner = self.window.as_ref().map(|window| window.inner_size());
                if let Some(inner) = inner
                    && let Some(resize) = self.surface_wrapper.handle_scale_factor_changed(
                        scale_factor,
                        inner.width,
                        inner.height,
                    )
                {
                    let (w, h) = (resize.physical.width, resize.physical.height);
                    self.apply_resize(w, h);
                    debug!("Scale factor changed to {scale_factor:.2}, resized to {w}x{h}");
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.keyboard.process_event(&event);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Open the window and run the render loop until it closes.
#[instrument(skip_all)]
pub fn run(config: Config) -> ExitStatus {
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("Failed to create event loop: {e}");
            return ExitStatus::InitFailed;
        }
    };

    let mut app = OrreryApp::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        error!("Event loop failed: {e}");
        return ExitStatus::InitFailed;
    }
    app.exit_status()
}
