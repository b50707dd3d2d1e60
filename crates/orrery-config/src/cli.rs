//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Animated Sun-Earth-Moon renderer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Sun spin in degrees per frame.
    #[arg(long)]
    pub sun_speed: Option<f32>,

    /// Earth orbit in degrees per frame.
    #[arg(long)]
    pub earth_orbit_speed: Option<f32>,

    /// Moon orbit in degrees per frame.
    #[arg(long)]
    pub moon_orbit_speed: Option<f32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

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
        if let Some(speed) = args.sun_speed {
            self.scene.sun_rotation_speed = speed;
        }
        if let Some(speed) = args.earth_orbit_speed {
            self.scene.earth_orbital_speed = speed;
        }
        if let Some(speed) = args.moon_orbit_speed {
            self.scene.moon_orbital_speed = speed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
