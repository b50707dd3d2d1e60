//! Window creation and event handling via winit.
//!
//! [`OrreryApp`] implements winit's [`ApplicationHandler`] and maps the surface
//! lifecycle onto the solar system: `resumed` creates it, `Resized` resizes it
//! and `RedrawRequested` draws one frame.

use std::sync::Arc;

use orrery_config::Config;
use orrery_render::WgpuBackend;
use orrery_scene::{SceneTextures, SolarSystem};
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::error::EventLoopError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

/// Frames between periodic progress logs.
const FRAME_LOG_INTERVAL: u64 = 600;

/// Builds [`WindowAttributes`] from the window section of `config`.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

/// Everything that only exists while the window does.
struct Surface {
    window: Arc<Window>,
    backend: WgpuBackend,
    system: SolarSystem,
}

impl Surface {
    fn create(event_loop: &ActiveEventLoop, config: &Config) -> Option<Self> {
        let window = match event_loop.create_window(window_attributes_from_config(config)) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                return None;
            }
        };

        let mut backend = match WgpuBackend::new(window.clone(), config.window.vsync) {
            Ok(backend) => backend,
            Err(e) => {
                error!("GPU initialization failed: {e}");
                return None;
            }
        };

        let textures = SceneTextures::from_config(&config.textures);
        let mut system =
            match SolarSystem::on_created(&mut backend, &config.scene, &config.camera, &textures) {
                Ok(system) => system,
                Err(e) => {
                    error!("Scene setup failed: {e}");
                    return None;
                }
            };

        let size = window.inner_size();
        system.on_resized(&mut backend, size.width, size.height);

        Some(Self {
            window,
            backend,
            system,
        })
    }
}

/// Application state: the loaded config plus the live surface, if any.
pub struct OrreryApp {
    config: Config,
    surface: Option<Surface>,
}

impl OrreryApp {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            surface: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether the window and scene have been created.
    pub fn is_running(&self) -> bool {
        self.surface.is_some()
    }
}

impl ApplicationHandler for OrreryApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_some() {
            return;
        }
        match Surface::create(event_loop, &self.config) {
            Some(surface) => {
                info!(
                    "Window created: {}x{}",
                    self.config.window.width, self.config.window.height
                );
                self.surface = Some(surface);
            }
            None => event_loop.exit(),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if surface.window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                surface
                    .system
                    .on_resized(&mut surface.backend, new_size.width, new_size.height);
            }
            WindowEvent::RedrawRequested => {
                let errors = surface.system.on_draw_frame(&mut surface.backend);
                let frame = surface.system.frame_count();
                if errors > 0 {
                    warn!("Frame {frame} reported {errors} backend errors");
                }
                if frame % FRAME_LOG_INTERVAL == 0 {
                    info!("Rendered {frame} frames");
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(surface) = &self.surface {
            surface.window.request_redraw();
        }
    }
}

/// Creates an event loop and runs the orrery until the window is closed.
#[instrument(skip(config))]
pub fn run_with_config(config: Config) -> Result<(), EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = OrreryApp::new(config);
    event_loop.run_app(&mut app)
}
