//! The animated sun, earth and moon scene.

pub mod body;
pub mod error;
pub mod solar_system;
pub mod transform;

pub use body::{BODY_TEXTURE_UNIT, CelestialBody};
pub use error::SceneError;
pub use solar_system::{SceneTextures, SolarSystem, camera_from_config};
pub use transform::TransformNode;
