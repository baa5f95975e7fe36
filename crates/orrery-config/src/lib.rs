//! Configuration for the orrery.
//!
//! Settings persist to disk as a RON file and can be overridden from the
//! command line. Every section falls back to defaults for missing fields.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AnimationConfig, AssetConfig, CONFIG_FILE_NAME, Config, ConfigOrigin, DebugConfig,
    MAX_MESH_BUFFER_BYTES, MeshConfig, SPHERE_VERTEX_BYTES, WindowConfig, default_config_dir,
};
pub use error::ConfigError;
