//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const APP_NAME: &str = "orrery";

/// Top-level orrery configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Static camera placement and projection.
    pub camera: CameraConfig,
    /// Body sizes, tessellation and orbital speeds.
    pub scene: SceneConfig,
    /// Texture sources for the three bodies.
    pub textures: TextureConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Camera configuration. The camera never moves between resizes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
    /// Eye position in world space.
    pub eye: [f32; 3],
    /// Point the camera looks at.
    pub target: [f32; 3],
    /// Up direction.
    pub up: [f32; 3],
}

/// Scene layout and per-frame orbital choreography.
///
/// Speeds are in degrees per rendered frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Latitude bands per sphere.
    pub stack_count: u32,
    /// Longitude bands per sphere.
    pub sector_count: u32,
    pub sun_radius: f32,
    pub earth_radius: f32,
    pub moon_radius: f32,
    /// Distance from the world origin to the earth's center.
    pub earth_orbit_radius: f32,
    /// Distance from the earth's center to the moon's center.
    pub moon_orbit_radius: f32,
    pub sun_rotation_speed: f32,
    pub earth_rotation_speed: f32,
    pub earth_orbital_speed: f32,
    pub moon_orbital_speed: f32,
    /// RGBA tint blended with every body's texture sample.
    pub tint: [f32; 4],
    /// Clear color for the color buffer.
    pub clear_color: [f32; 4],
}

/// Texture sources. A missing or unreadable file falls back to a generated
/// checkerboard in `fallback_color`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextureConfig {
    pub sun: BodyTextureConfig,
    pub earth: BodyTextureConfig,
    pub moon: BodyTextureConfig,
}

/// Texture source for a single body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BodyTextureConfig {
    /// Image file (PNG or JPEG).
    pub path: Option<PathBuf>,
    /// RGBA8 color used for the generated fallback texture.
    pub fallback_color: [u8; 4],
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Orrery".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            eye: [0.0, 0.0, 30.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            stack_count: 26,
            sector_count: 26,
            sun_radius: 2.0,
            earth_radius: 1.0,
            moon_radius: 0.5,
            earth_orbit_radius: 5.0,
            moon_orbit_radius: 2.0,
            sun_rotation_speed: 0.5,
            earth_rotation_speed: 2.0,
            earth_orbital_speed: 1.0,
            moon_orbital_speed: 2.0,
            tint: [0.560_784_3, 0.843_137, 0.858_823, 1.0],
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            sun: BodyTextureConfig::with_fallback([250, 200, 60, 255]),
            earth: BodyTextureConfig::with_fallback([40, 90, 200, 255]),
            moon: BodyTextureConfig::with_fallback([170, 170, 170, 255]),
        }
    }
}

impl Default for BodyTextureConfig {
    fn default() -> Self {
        Self::with_fallback([255, 255, 255, 255])
    }
}

impl BodyTextureConfig {
    fn with_fallback(fallback_color: [u8; 4]) -> Self {
        Self {
            path: None,
            fallback_color,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for the orrery (`<config_dir>/orrery`).
///
/// Falls back to the working directory when the OS exposes none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

// --- Load / Save ---

/// File name of the persisted config inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE_NAME);

        if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            let config: Config = ron::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
            log::info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = config_dir.join(CONFIG_FILE_NAME);
        let write_error = |source| ConfigError::Write {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(config_dir).map_err(write_error)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty)?;

        std::fs::write(&path, serialized).map_err(write_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("stack_count: 26"));
    }

    #[test]
    fn test_default_scene_matches_reference_choreography() {
        let scene = SceneConfig::default();
        assert_eq!(scene.sun_rotation_speed, 0.5);
        assert_eq!(scene.earth_rotation_speed, 2.0);
        assert_eq!(scene.earth_orbital_speed, 1.0);
        assert_eq!(scene.moon_orbital_speed, 2.0);
        assert_eq!(scene.earth_orbit_radius, 5.0);
        assert_eq!(scene.moon_orbit_radius, 2.0);
    }

    #[test]
    fn test_default_camera() {
        let camera = CameraConfig::default();
        assert_eq!(camera.fov_y_degrees, 45.0);
        assert_eq!(camera.eye, [0.0, 0.0, 30.0]);
        assert_eq!(camera.up, [0.0, 1.0, 0.0]);
        assert!(camera.near < camera.far);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.textures.earth.path = Some(PathBuf::from("textures/earth.png"));
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.scene, SceneConfig::default());
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_fields() {
        let ron_str = "(scene: (moon_orbital_speed: 4.0))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.scene.moon_orbital_speed, 4.0);
        assert_eq!(config.scene.stack_count, 26);
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.scene.earth_orbital_speed = 0.25;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn test_malformed_file_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "(scene: (stack_count: \"many\"))").unwrap();

        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), Some(path.as_path()));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_unreadable_path_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be cannot be read as text.
        std::fs::create_dir(dir.path().join(CONFIG_FILE_NAME)).unwrap();

        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert_eq!(err.path(), Some(dir.path().join(CONFIG_FILE_NAME).as_path()));
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_config_dir_ends_with_app_name() {
        assert!(default_config_dir().ends_with(APP_NAME));
    }
}
