//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Bytes per sphere vertex: three position floats and two texture floats.
pub const SPHERE_VERTEX_BYTES: u64 = 20;

/// Largest vertex buffer the mesh may need. Matches wgpu's default
/// `max_buffer_size`.
pub const MAX_MESH_BUFFER_BYTES: u64 = 256 << 20;

/// `<platform config dir>/orrery`, if the platform has one.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("orrery"))
}

/// Where [`Config::load_or_create`] got its config from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    Loaded(PathBuf),
    /// No file existed; defaults were written here.
    Created(PathBuf),
}

impl std::fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigOrigin::Loaded(path) => write!(f, "Loaded config from {}", path.display()),
            ConfigOrigin::Created(path) => {
                write!(f, "Created default config at {}", path.display())
            }
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub animation: AnimationConfig,
    pub mesh: MeshConfig,
    pub assets: AssetConfig,
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial width in physical pixels.
    pub width: u32,
    /// Initial height in physical pixels.
    pub height: u32,
    pub title: String,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
}

/// Animation timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Degrees added to the shared animation angle every frame.
    pub step_degrees: f32,
    /// Sleep after presenting each frame, in milliseconds. 0 disables it.
    pub frame_pause_ms: u64,
}

/// Sphere mesh resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshConfig {
    pub radius: f32,
    pub latitude_bands: u32,
    pub longitude_segments: u32,
}

/// Shader and texture files, relative to `dir`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    pub dir: PathBuf,
    pub vertex_shader: String,
    pub fragment_shader: String,
    pub sun_texture: String,
    pub earth_texture: String,
    pub moon_texture: String,
    pub jupiter_texture: String,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter (e.g. "debug", "info,orrery_render=trace").
    pub log_level: String,
    /// Draw bodies as line meshes.
    pub wireframe: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 1500,
            title: "Orrery".to_string(),
            vsync: true,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            step_degrees: 1.0,
            frame_pause_ms: 10,
        }
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            latitude_bands: 200,
            longitude_segments: 200,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets"),
            vertex_shader: "earth.vert.wgsl".to_string(),
            fragment_shader: "earth.frag.wgsl".to_string(),
            sun_texture: "sun.jpg".to_string(),
            earth_texture: "earth.bmp".to_string(),
            moon_texture: "moon.jpg".to_string(),
            jupiter_texture: "jupiter.jpg".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            wireframe: false,
        }
    }
}

impl MeshConfig {
    /// Size of the triangle-strip vertex buffer, `2·(P-1)·M` vertices.
    pub fn vertex_buffer_bytes(&self) -> u64 {
        2 * u64::from(self.latitude_bands.saturating_sub(1))
            * u64::from(self.longitude_segments)
            * SPHERE_VERTEX_BYTES
    }
}

impl AssetConfig {
    /// Texture file paths in sun, earth, moon, jupiter order.
    pub fn texture_paths(&self) -> [PathBuf; 4] {
        [
            &self.sun_texture,
            &self.earth_texture,
            &self.moon_texture,
            &self.jupiter_texture,
        ]
        .map(|file| self.dir.join(file))
    }
}

// --- Load / Save ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    ///
    /// Nothing is logged here; the returned [`ConfigOrigin`] says which of
    /// the two happened so the caller can report it once logging is up.
    pub fn load_or_create(config_dir: &Path) -> Result<(Self, ConfigOrigin), ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
                    path: config_path.clone(),
                    source,
                })?;
            let config: Config =
                ron::from_str(&contents).map_err(|source| ConfigError::Parse {
                    path: config_path.clone(),
                    source,
                })?;
            config.validate()?;
            Ok((config, ConfigOrigin::Loaded(config_path)))
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            Ok((config, ConfigOrigin::Created(config_path)))
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: config_dir.join(CONFIG_FILE_NAME),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_error)?;

        let pretty = ron::ser::PrettyConfig::new().depth_limit(2);
        let serialized = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(config_dir.join(CONFIG_FILE_NAME), serialized).map_err(write_error)
    }

    /// Reject values that parse but would break the render loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.animation.step_degrees.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "animation.step_degrees",
                reason: "must be a finite number".to_string(),
            });
        }
        if !self.mesh.radius.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "mesh.radius",
                reason: "must be a finite number".to_string(),
            });
        }
        if self.mesh.latitude_bands < 2 {
            return Err(ConfigError::InvalidValue {
                field: "mesh.latitude_bands",
                reason: format!("must be at least 2, got {}", self.mesh.latitude_bands),
            });
        }
        if self.mesh.longitude_segments == 0 {
            return Err(ConfigError::InvalidValue {
                field: "mesh.longitude_segments",
                reason: "must be non-zero".to_string(),
            });
        }
        let mesh_bytes = self.mesh.vertex_buffer_bytes();
        if mesh_bytes > MAX_MESH_BUFFER_BYTES {
            return Err(ConfigError::InvalidValue {
                field: "mesh",
                reason: format!(
                    "{}x{} needs a {mesh_bytes} byte vertex buffer, the limit is {MAX_MESH_BUFFER_BYTES}",
                    self.mesh.latitude_bands, self.mesh.longitude_segments
                ),
            });
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window",
                reason: format!(
                    "size must be non-zero, got {}x{}",
                    self.window.width, self.window.height
                ),
            });
        }
        Ok(())
    }
}
