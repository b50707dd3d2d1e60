//! Sun, earth and moon, animated one step per frame.
//!
//! The sun spins in place at the origin. The earth spins and orbits the sun.
//! The moon orbits the earth: every frame it copies the earth's freshly
//! updated model matrix as its origin before applying its own orbital step,
//! so it never lags a frame behind.

use glam::{Mat4, Vec3};
use log::info;
use orrery_config::{CameraConfig, SceneConfig, TextureConfig};
use orrery_render::{
    Camera, Capability, ClearMask, RenderBackend, SPHERE_FRAGMENT_SHADER, SPHERE_VERTEX_SHADER,
    ShaderService, TextureImage, TextureService, report_backend_errors,
};

use crate::body::CelestialBody;
use crate::error::SceneError;

/// Decoded images for the three bodies.
#[derive(Clone, Debug)]
pub struct SceneTextures {
    pub sun: TextureImage,
    pub earth: TextureImage,
    pub moon: TextureImage,
}

impl SceneTextures {
    /// Decode the configured files, substituting a generated checkerboard
    /// for any that is unset or unreadable.
    pub fn from_config(config: &TextureConfig) -> Self {
        let load = |body: &orrery_config::BodyTextureConfig| {
            TextureImage::open_or_fallback(body.path.as_deref(), body.fallback_color)
        };
        Self {
            sun: load(&config.sun),
            earth: load(&config.earth),
            moon: load(&config.moon),
        }
    }
}

pub fn camera_from_config(config: &CameraConfig) -> Camera {
    Camera {
        eye: Vec3::from_array(config.eye),
        target: Vec3::from_array(config.target),
        up: Vec3::from_array(config.up),
        fov_y_degrees: config.fov_y_degrees,
        aspect_ratio: 1.0,
        near: config.near,
        far: config.far,
    }
}

pub struct SolarSystem {
    scene: SceneConfig,
    camera: Camera,
    view_projection: Mat4,
    sun: CelestialBody,
    earth: CelestialBody,
    moon: CelestialBody,
    frame_count: u64,
}

impl SolarSystem {
    /// Set up backend state, compile the sphere program, upload the textures
    /// and build the three bodies in their starting positions.
    pub fn on_created<B>(
        backend: &mut B,
        scene: &SceneConfig,
        camera: &CameraConfig,
        textures: &SceneTextures,
    ) -> Result<Self, SceneError>
    where
        B: RenderBackend + ShaderService + TextureService + ?Sized,
    {
        backend.set_clear_color(scene.clear_color);
        backend.enable(Capability::DepthTest);
        backend.enable(Capability::CullFace);

        let program = backend.compile_program(SPHERE_VERTEX_SHADER, SPHERE_FRAGMENT_SHADER)?;
        let sun_texture = backend.load_texture("sun", &textures.sun)?;
        let earth_texture = backend.load_texture("earth", &textures.earth)?;
        let moon_texture = backend.load_texture("moon", &textures.moon)?;

        let (stacks, sectors) = (scene.stack_count, scene.sector_count);
        let sun = CelestialBody::new(
            backend,
            "sun",
            Vec3::ZERO,
            scene.sun_radius,
            stacks,
            sectors,
            program,
            sun_texture,
            scene.tint,
        )?;

        let mut earth = CelestialBody::new(
            backend,
            "earth",
            Vec3::ZERO,
            scene.earth_radius,
            stacks,
            sectors,
            program,
            earth_texture,
            scene.tint,
        )?;
        earth
            .transform_mut()
            .translate(0.0, 0.0, scene.earth_orbit_radius);

        let mut moon = CelestialBody::new(
            backend,
            "moon",
            Vec3::ZERO,
            scene.moon_radius,
            stacks,
            sectors,
            program,
            moon_texture,
            scene.tint,
        )?;
        let earth_model = earth.model_matrix();
        let moon_transform = moon.transform_mut();
        moon_transform.apply_origin_transformation(earth_model);
        moon_transform.translate(0.0, 0.0, scene.moon_orbit_radius);

        let camera = camera_from_config(camera);
        let view_projection = camera.view_projection_matrix();
        report_backend_errors("setup", &backend.drain_errors());
        info!("Solar system created ({stacks}x{sectors} spheres)");

        Ok(Self {
            scene: scene.clone(),
            camera,
            view_projection,
            sun,
            earth,
            moon,
            frame_count: 0,
        })
    }

    /// Match the viewport and projection to a new surface size.
    pub fn on_resized<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, width: u32, height: u32) {
        backend.set_viewport(width, height);
        self.camera.set_aspect_ratio(width, height);
        self.view_projection = self.camera.view_projection_matrix();
        info!("Resized to {width}x{height}");
    }

    /// Advance every body one step and draw the frame. Returns the number of
    /// backend errors reported along the way.
    pub fn on_draw_frame<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) -> usize {
        let scene = &self.scene;
        let mut errors = 0;

        backend.begin_frame();
        backend.clear(ClearMask::ALL);

        self.sun
            .transform_mut()
            .rotate_self(scene.sun_rotation_speed, Vec3::Y);
        errors += self.sun.draw(backend, self.view_projection);

        let earth_orbit = scene.earth_orbit_radius;
        let earth = self.earth.transform_mut();
        earth.rotate_self(scene.earth_rotation_speed, Vec3::Y);
        earth.translate(0.0, 0.0, -earth_orbit);
        earth.rotate(scene.earth_orbital_speed, Vec3::Y);
        earth.translate(0.0, 0.0, earth_orbit);

        let moon_orbit = scene.moon_orbit_radius;
        let earth_model = self.earth.model_matrix();
        let moon = self.moon.transform_mut();
        moon.apply_origin_transformation(earth_model);
        moon.translate(0.0, 0.0, -moon_orbit);
        moon.rotate(scene.moon_orbital_speed, Vec3::Y);
        moon.translate(0.0, 0.0, moon_orbit);

        errors += self.earth.draw(backend, self.view_projection);
        errors += self.moon.draw(backend, self.view_projection);

        backend.end_frame();
        errors += report_backend_errors("frame", &backend.drain_errors());
        self.frame_count += 1;
        errors
    }

    pub fn sun(&self) -> &CelestialBody {
        &self.sun
    }

    pub fn earth(&self) -> &CelestialBody {
        &self.earth
    }

    pub fn moon(&self) -> &CelestialBody {
        &self.moon
    }

    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    /// Frames drawn so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
