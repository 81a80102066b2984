use std::sync::Arc;

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::AppConfig,
    gfx::{
        camera::{Camera, CameraController, ControllerAction},
        rendering::{render_engine::RenderEngine, renderer::Renderer},
        scene::scene::Scene,
    },
    performance::PerformanceMonitor,
    ui::{viewer_ui, TruckSettings, UiActions, UiManager, ViewerState},
};

/// Application context: everything the frame loop reads or mutates.
///
/// GPU-side members are created in [`ApplicationHandler::resumed`], once a
/// window exists. A fatal error is parked in `fatal` and the event loop is
/// asked to exit; [`LorryApp::run`] hands it back to the caller.
pub struct LorryApp {
    config: AppConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    scene: Scene,
    camera: Camera,
    controller: CameraController,
    renderer: Renderer,
    truck: TruckSettings,
    performance: PerformanceMonitor,
    fatal: Option<anyhow::Error>,
}

impl LorryApp {
    pub fn new(config: AppConfig) -> Self {
        let camera = Camera::arc_rotate(&config.camera);
        let renderer = Renderer::new(config.lighting);

        Self {
            config,
            window: None,
            render_engine: None,
            ui_manager: None,
            scene: Scene::new(),
            camera,
            controller: CameraController::new(),
            renderer,
            truck: TruckSettings::default(),
            performance: PerformanceMonitor::new(),
            fatal: None,
        }
    }

    /// Runs the event loop until the window closes or startup fails.
    pub fn run(config: AppConfig) -> anyhow::Result<()> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = LorryApp::new(config);
        event_loop
            .run_app(&mut app)
            .context("event loop terminated abnormally")?;

        match app.fatal.take() {
            Some(err) => Err(err),
            None => {
                log::info!("Shutting down");
                Ok(())
            }
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let (width, height) = self.config.window_size;
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title(self.config.window_title.clone())
                    .with_inner_size(LogicalSize::new(width, height)),
            )
            .context("failed to create window")?;
        let window = Arc::new(window);

        let PhysicalSize { width, height } = window.inner_size();
        let render_engine = pollster::block_on(RenderEngine::new(window.clone(), width, height))
            .context("failed to initialise the GPU")?;

        self.scene
            .load_truck_model(&self.config.truck_model_path)
            .context("failed to load truck model")?;
        self.scene
            .load_wheel_model(&self.config.wheel_model_path)
            .context("failed to load wheel model")?;
        render_engine.prepare_scene(&mut self.scene);

        let ui_manager = UiManager::new(
            render_engine.device(),
            render_engine.queue(),
            render_engine.surface_format(),
            &window,
        );

        self.window = Some(window);
        self.render_engine = Some(render_engine);
        self.ui_manager = Some(ui_manager);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let delta = self.performance.tick();
        self.scene.update(delta.as_secs_f32());

        let mut actions = UiActions::default();
        let result = {
            let Self {
                window,
                render_engine,
                ui_manager,
                scene,
                camera,
                controller,
                renderer,
                truck,
                performance,
                ..
            } = self;
            let (Some(window), Some(render_engine), Some(ui_manager)) =
                (window.as_ref(), render_engine.as_mut(), ui_manager.as_mut())
            else {
                return;
            };

            let camera: &Camera = camera;
            let state = ViewerState {
                camera,
                camera_control_enabled: controller.control_enabled(),
                performance,
            };
            let actions = &mut actions;

            render_engine.render_frame(
                scene,
                camera,
                renderer,
                Some(
                    |device: &wgpu::Device,
                     queue: &wgpu::Queue,
                     encoder: &mut wgpu::CommandEncoder,
                     view: &wgpu::TextureView| {
                        *actions =
                            ui_manager.update_logic(window, |ui| viewer_ui(ui, truck, &state));
                        ui_manager.render_display_only(device, queue, encoder, view);
                    },
                ),
            )
        };

        match result {
            Ok(stats) => self.performance.update_render_stats(stats),
            Err(err) => {
                self.fail(event_loop, anyhow::Error::new(err).context("rendering failed"));
                return;
            }
        }

        if let Some(preset) = actions.camera_preset {
            log::debug!("Camera preset: {}", preset.label());
            preset.apply(&mut self.camera);
        }
        if actions.exit_requested {
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for LorryApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.fatal.is_some() {
            return;
        }

        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let ui_captured = match (self.window.as_ref(), self.ui_manager.as_mut()) {
            (Some(window), Some(ui_manager)) => ui_manager.handle_input(window, window_id, &event),
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            ref other => {
                if ui_captured {
                    return;
                }
                if self.controller.process_window_event(other, &mut self.camera)
                    == ControllerAction::Exit
                {
                    event_loop.exit();
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::EuclideanSpace;

    use super::*;

    #[test]
    fn camera_starts_from_configured_pose() {
        let config = AppConfig::default();
        let app = LorryApp::new(config.clone());

        let arc = app.camera().as_arc_rotate().expect("arc-rotate camera");
        assert_eq!(arc.target().to_vec(), config.camera.target);
        assert!((arc.radius() - config.camera.radius).abs() < 1e-5);
        assert!(app.scene().objects().is_empty());
    }
}
