//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Sun, earth, moon and jupiter in motion")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Degrees the animation advances per frame.
    #[arg(long, allow_negative_numbers = true)]
    pub step: Option<f32>,

    /// Pause after each frame in milliseconds.
    #[arg(long)]
    pub pause_ms: Option<u64>,

    /// Directory holding shaders and textures.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Draw bodies as wireframes.
    #[arg(long)]
    pub wireframe: bool,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(step) = args.step {
            self.animation.step_degrees = step;
        }
        if let Some(pause) = args.pause_ms {
            self.animation.frame_pause_ms = pause;
        }
        if let Some(ref dir) = args.assets {
            self.assets.dir = dir.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if args.wireframe {
            self.debug.wireframe = true;
        }
    }
}
