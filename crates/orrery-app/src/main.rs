//! Opens a window and animates the sun, earth and moon.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p orrery-app -- --width 1920 --height 1080` to override size.

use clap::Parser;
use orrery_config::{CliArgs, Config, default_config_dir};
use tracing::error;

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    orrery_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = orrery_app::window::run_with_config(config) {
        error!("Event loop failed: {e}");
        std::process::exit(1);
    }
}
