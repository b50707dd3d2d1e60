use glam::{Mat4, Vec3};
use orrery_config::{CameraConfig, SceneConfig};
use orrery_render::{ErrorCode, RecordingBackend, RenderBackend, TextureImage};
use orrery_scene::{SceneTextures, SolarSystem};

const EPS: f32 = 1e-4;

fn textures() -> SceneTextures {
    SceneTextures {
        sun: TextureImage::solid(4, [255, 220, 80, 255]),
        earth: TextureImage::checkerboard(8, [30, 80, 200, 255], [20, 140, 60, 255]),
        moon: TextureImage::solid(4, [160, 160, 160, 255]),
    }
}

fn create(backend: &mut RecordingBackend, scene: &SceneConfig) -> SolarSystem {
    let mut system =
        SolarSystem::on_created(backend, scene, &CameraConfig::default(), &textures()).unwrap();
    system.on_resized(backend, 1280, 720);
    system
}

#[test]
fn test_first_step_moves_earth_and_moon() {
    let scene = SceneConfig::default();
    let mut backend = RecordingBackend::new();
    let mut system = create(&mut backend, &scene);

    assert_eq!(system.on_draw_frame(&mut backend), 0);

    // Earth's origin orbits 1° about world Y.
    let earth_position = system.earth().transform().world_position();
    let expected_earth = Mat4::from_rotation_y(scene.earth_orbital_speed.to_radians())
        .transform_point3(Vec3::new(0.0, 0.0, 5.0));
    assert!(earth_position.abs_diff_eq(expected_earth, EPS));

    // The moon's offset is rotated by its orbital step, then carried by the
    // earth's updated frame, spin included.
    let moon_offset = Mat4::from_rotation_y(scene.moon_orbital_speed.to_radians())
        .transform_point3(Vec3::new(0.0, 0.0, 2.0));
    let expected_moon = system.earth().model_matrix().transform_point3(moon_offset);
    let moon_position = system.moon().transform().world_position();
    assert!(moon_position.abs_diff_eq(expected_moon, EPS));

    // Distance to the earth is the moon's orbit radius.
    assert!((moon_position.distance(earth_position) - 2.0).abs() < EPS);
}

#[test]
fn test_moon_follows_earth_in_the_same_frame() {
    let mut backend = RecordingBackend::new();
    let mut system = create(&mut backend, &SceneConfig::default());

    for _ in 0..2 {
        system.on_draw_frame(&mut backend);
        assert_eq!(
            system.moon().transform().origin_matrix(),
            system.earth().model_matrix()
        );
    }
}

#[test]
fn test_uploaded_mvp_matches_model_matrices() {
    let mut backend = RecordingBackend::new();
    let mut system = create(&mut backend, &SceneConfig::default());
    backend.clear_log();
    system.on_draw_frame(&mut backend);

    let view_projection = system.view_projection();
    let bodies = [system.sun(), system.earth(), system.moon()];
    for (draw, body) in backend.draws().iter().zip(bodies) {
        assert_eq!(draw.uniforms.mvp, view_projection * body.model_matrix());
        assert_eq!(draw.index_count, body.index_count());
    }
}

#[test]
fn test_earth_orbit_closes_after_full_turn() {
    let mut backend = RecordingBackend::new();
    let mut system = create(&mut backend, &SceneConfig::default());
    for _ in 0..360 {
        system.on_draw_frame(&mut backend);
    }
    let position = system.earth().transform().world_position();
    assert!(position.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-2));
    assert_eq!(system.frame_count(), 360);
}

#[test]
fn test_same_size_resize_is_deterministic() {
    let mut backend = RecordingBackend::new();
    let mut system = create(&mut backend, &SceneConfig::default());

    system.on_resized(&mut backend, 800, 600);
    let first = system.view_projection();
    system.on_resized(&mut backend, 1920, 1080);
    system.on_resized(&mut backend, 800, 600);
    let second = system.view_projection();

    assert_eq!(
        first.to_cols_array().map(f32::to_bits),
        second.to_cols_array().map(f32::to_bits)
    );
}

#[test]
fn test_zero_height_resize_keeps_projection_finite() {
    let mut backend = RecordingBackend::new();
    let mut system = create(&mut backend, &SceneConfig::default());
    system.on_resized(&mut backend, 640, 0);
    assert!(system.view_projection().is_finite());
}

#[test]
fn test_minimized_window_keeps_projection_finite() {
    let mut backend = RecordingBackend::new();
    let mut system = create(&mut backend, &SceneConfig::default());
    system.on_resized(&mut backend, 0, 720);
    assert!(system.view_projection().is_finite());

    system.on_resized(&mut backend, 0, 0);
    assert!(system.view_projection().is_finite());
    system.on_draw_frame(&mut backend);
    assert!(backend.draws().iter().all(|d| d.uniforms.mvp.is_finite()));
}

#[test]
fn test_frame_leaves_backend_unbound_and_error_free() {
    let mut backend = RecordingBackend::new();
    let mut system = create(&mut backend, &SceneConfig::default());
    for _ in 0..3 {
        assert_eq!(system.on_draw_frame(&mut backend), 0);
        assert!(backend.state().is_unbound());
    }
    assert_eq!(backend.drain_errors(), Vec::<ErrorCode>::new());
    assert_eq!(backend.frames(), 3);
}

#[test]
fn test_custom_speeds_are_applied() {
    let scene = SceneConfig {
        earth_orbital_speed: 90.0,
        earth_rotation_speed: 0.0,
        ..SceneConfig::default()
    };
    let mut backend = RecordingBackend::new();
    let mut system = create(&mut backend, &scene);
    system.on_draw_frame(&mut backend);

    let position = system.earth().transform().world_position();
    assert!(position.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), EPS));
}

#[test]
fn test_invalid_resolution_fails_setup() {
    let scene = SceneConfig {
        stack_count: 0,
        ..SceneConfig::default()
    };
    let mut backend = RecordingBackend::new();
    let result =
        SolarSystem::on_created(&mut backend, &scene, &CameraConfig::default(), &textures());
    assert!(result.is_err());
}
