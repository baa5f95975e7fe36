//! The `orrery` binary: sun, earth, moon and jupiter in motion.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p orrery-app -- --step 0.5 --wireframe`.

use std::process::ExitCode;

use clap::Parser;
use orrery_config::{CliArgs, Config, default_config_dir};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().or_else(default_config_dir);

    // Logging is not up yet, so config problems go straight to stderr.
    let (mut config, origin) = match &config_dir {
        Some(dir) => match Config::load_or_create(dir) {
            Ok((config, origin)) => (config, Some(origin)),
            Err(e) => {
                eprintln!("Failed to load config: {e}, using defaults");
                (Config::default(), None)
            }
        },
        None => {
            eprintln!("No config directory on this platform, using defaults");
            (Config::default(), None)
        }
    };
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.as_ref().map(|dir| dir.join("logs"));
    if let Err(e) =
        orrery_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config))
    {
        eprintln!("Failed to initialize logging: {e}");
    }
    if let Some(origin) = origin {
        tracing::info!("{origin}");
    }

    if let Err(e) = config.validate() {
        tracing::error!("Invalid settings: {e}");
        return orrery_app::ExitStatus::InitFailed.into();
    }

    tracing::info!(
        "Starting orrery: {}x{}, {}° per frame, {} ms pause",
        config.window.width,
        config.window.height,
        config.animation.step_degrees,
        config.animation.frame_pause_ms
    );

    orrery_app::run(config).into()
}
