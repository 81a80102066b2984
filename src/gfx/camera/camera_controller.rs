use cgmath::{Deg, Point3};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::camera::Camera;

/// Scroll distance of one wheel notch on pixel-precise devices.
const PIXELS_PER_LINE: f64 = 20.0;

/// Fixed arc-rotate poses bound to the number keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPreset {
    Top,
    Left,
    Right,
    Isometric,
}

impl ViewPreset {
    pub const ALL: [ViewPreset; 4] = [
        ViewPreset::Top,
        ViewPreset::Left,
        ViewPreset::Right,
        ViewPreset::Isometric,
    ];

    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::Digit1 => Some(ViewPreset::Top),
            KeyCode::Digit2 => Some(ViewPreset::Left),
            KeyCode::Digit3 => Some(ViewPreset::Right),
            KeyCode::Digit4 => Some(ViewPreset::Isometric),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewPreset::Top => "Top",
            ViewPreset::Left => "Left",
            ViewPreset::Right => "Right",
            ViewPreset::Isometric => "Isometric",
        }
    }

    /// Target, radius, alpha and beta of this pose.
    fn pose(self) -> (Point3<f32>, f32, Deg<f32>, Deg<f32>) {
        let origin = Point3::new(0.0, 0.0, 0.0);
        match self {
            ViewPreset::Top => (origin, 20.0, Deg(90.0), Deg(5.0)),
            ViewPreset::Left => (origin, 20.0, Deg(0.0), Deg(90.0)),
            ViewPreset::Right => (origin, 20.0, Deg(180.0), Deg(90.0)),
            ViewPreset::Isometric => (Point3::new(0.0, 3.0, 0.0), 20.0, Deg(45.0), Deg(60.0)),
        }
    }

    /// Moves an arc-rotate camera to this pose. Setters clamp, so the side
    /// views end at the camera's maximum beta.
    pub fn apply(self, camera: &mut Camera) {
        let (target, radius, alpha, beta) = self.pose();
        camera.set_target(target);
        camera.set_radius(radius);
        camera.set_alpha(alpha);
        camera.set_beta(beta);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerAction {
    None,
    Exit,
}

/// Turns window input into camera operations.
///
/// Rotation needs the right mouse button held; both rotation and zoom are
/// suspended while camera control is disabled (F1 toggles it).
pub struct CameraController {
    control_enabled: bool,
    rotating: bool,
    last_cursor: Option<PhysicalPosition<f64>>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            control_enabled: true,
            rotating: false,
            last_cursor: None,
        }
    }

    pub fn control_enabled(&self) -> bool {
        self.control_enabled
    }

    pub fn process_window_event(&mut self, event: &WindowEvent, camera: &mut Camera) -> ControllerAction {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(*position, camera);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state,
                ..
            } => {
                self.rotating = *state == ElementState::Pressed;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => {
                        (*y / PIXELS_PER_LINE) as f32
                    }
                };
                self.scroll(lines, camera);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => return self.key_pressed(*key, camera),
            _ => {}
        }
        ControllerAction::None
    }

    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>, camera: &mut Camera) {
        if !self.control_enabled {
            return;
        }

        // The first event after startup only records the cursor.
        let last = self.last_cursor.replace(position).unwrap_or(position);
        let x_offset = (position.x - last.x) as f32;
        let y_offset = (last.y - position.y) as f32;

        if self.rotating {
            camera.process_mouse_movement(x_offset, y_offset, true);
        }
    }

    pub fn set_rotating(&mut self, pressed: bool) {
        self.rotating = pressed;
    }

    pub fn scroll(&mut self, lines: f32, camera: &mut Camera) {
        if self.control_enabled {
            camera.process_mouse_scroll(lines);
        }
    }

    pub fn key_pressed(&mut self, key: KeyCode, camera: &mut Camera) -> ControllerAction {
        match key {
            KeyCode::Escape => return ControllerAction::Exit,
            KeyCode::F1 => {
                self.control_enabled = !self.control_enabled;
                log::info!(
                    "Camera control {}",
                    if self.control_enabled { "enabled" } else { "disabled" }
                );
            }
            _ => {
                if let Some(preset) = ViewPreset::from_key(key) {
                    log::debug!("Camera preset: {}", preset.label());
                    preset.apply(camera);
                }
            }
        }
        ControllerAction::None
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{EuclideanSpace, MetricSpace};

    use super::*;
    use crate::{config::ArcRotateConfig, gfx::camera::camera::MIN_BETA};

    fn camera() -> Camera {
        Camera::arc_rotate(&ArcRotateConfig::default())
    }

    #[test]
    fn first_cursor_event_only_latches() {
        let mut controller = CameraController::new();
        let mut cam = camera();
        let before = cam;

        controller.set_rotating(true);
        controller.cursor_moved(PhysicalPosition::new(500.0, 300.0), &mut cam);
        assert_eq!(cam, before);

        controller.cursor_moved(PhysicalPosition::new(600.0, 250.0), &mut cam);
        let arc = cam.as_arc_rotate().unwrap();
        let start = before.as_arc_rotate().unwrap();
        // +100 px in x, and y is inverted so moving up by 50 px is +50.
        assert!((arc.alpha().0 - start.alpha().0 - 0.1).abs() < 1e-5);
        assert!((arc.beta().0 - start.beta().0 - 0.05).abs() < 1e-5);
    }

    #[test]
    fn rotation_requires_right_button() {
        let mut controller = CameraController::new();
        let mut cam = camera();
        let before = cam;

        controller.cursor_moved(PhysicalPosition::new(0.0, 0.0), &mut cam);
        controller.cursor_moved(PhysicalPosition::new(200.0, 100.0), &mut cam);
        assert_eq!(cam, before);
    }

    #[test]
    fn f1_suspends_camera_control() {
        let mut controller = CameraController::new();
        let mut cam = camera();
        let before = cam;

        controller.key_pressed(KeyCode::F1, &mut cam);
        assert!(!controller.control_enabled());

        controller.set_rotating(true);
        controller.cursor_moved(PhysicalPosition::new(0.0, 0.0), &mut cam);
        controller.cursor_moved(PhysicalPosition::new(50.0, 50.0), &mut cam);
        controller.scroll(3.0, &mut cam);
        assert_eq!(cam, before);

        controller.key_pressed(KeyCode::F1, &mut cam);
        controller.scroll(2.0, &mut cam);
        assert!((cam.as_arc_rotate().unwrap().radius() - 19.0).abs() < 1e-5);
    }

    #[test]
    fn escape_requests_exit() {
        let mut controller = CameraController::new();
        let mut cam = camera();
        assert_eq!(
            controller.key_pressed(KeyCode::Escape, &mut cam),
            ControllerAction::Exit
        );
        assert_eq!(
            controller.key_pressed(KeyCode::KeyQ, &mut cam),
            ControllerAction::None
        );
    }

    #[test]
    fn presets_land_on_clamped_poses() {
        let mut cam = camera();

        controller_key(&mut cam, KeyCode::Digit1);
        let arc = *cam.as_arc_rotate().unwrap();
        assert_eq!(arc.target(), Point3::origin());
        assert_eq!(arc.beta().0, MIN_BETA);

        controller_key(&mut cam, KeyCode::Digit3);
        let arc = *cam.as_arc_rotate().unwrap();
        assert!((arc.alpha().0 - 180f32.to_radians()).abs() < 1e-6);
        assert_eq!(arc.beta(), arc.max_beta());

        controller_key(&mut cam, KeyCode::Digit4);
        let arc = *cam.as_arc_rotate().unwrap();
        assert_eq!(arc.target(), Point3::new(0.0, 3.0, 0.0));
        assert!((cam.position().distance(arc.target()) - 20.0).abs() < 1e-4);
    }

    fn controller_key(cam: &mut Camera, key: KeyCode) {
        CameraController::new().key_pressed(key, cam);
    }
}
