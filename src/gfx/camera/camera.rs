//! Dual-mode viewpoint: free-fly or arc-rotate.
//!
//! The mode is chosen at construction and never changes. Each mode carries
//! only its own state, so e.g. a free-fly camera has no target or radius.

use cgmath::{perspective, Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3};

use crate::config::ArcRotateConfig;

/// Lower polar-angle bound of the arc-rotate camera, in radians.
pub const MIN_BETA: f32 = 0.1;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 1000.0;

const MIN_ZOOM: f32 = 1.0;
const MAX_ZOOM: f32 = 45.0;
const MAX_PITCH: f32 = 89.0;
/// Radians of arc rotation per unit of (sensitivity-scaled) mouse offset.
const ARC_ROTATE_SCALE: f32 = 0.01;
/// Radius change per scroll unit.
const ARC_ZOOM_STEP: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// First-person camera state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeFly {
    pub position: Point3<f32>,
    front: Vector3<f32>,
    up: Vector3<f32>,
    right: Vector3<f32>,
    world_up: Vector3<f32>,
    /// Degrees.
    yaw: f32,
    /// Degrees.
    pitch: f32,
    pub movement_speed: f32,
}

impl FreeFly {
    pub fn new(position: Point3<f32>, world_up: Vector3<f32>, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vector3::new(0.0, 0.0, -1.0),
            up: world_up,
            right: Vector3::unit_x(),
            world_up,
            yaw,
            pitch,
            movement_speed: 2.5,
        };
        camera.update_vectors();
        camera
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (Rad::from(Deg(self.yaw)), Rad::from(Deg(self.pitch)));
        let front = Vector3::new(
            yaw.0.cos() * pitch.0.cos(),
            pitch.0.sin(),
            yaw.0.sin() * pitch.0.cos(),
        );
        self.front = front.normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for FreeFly {
    fn default() -> Self {
        Self::new(Point3::new(0.0, 0.0, 3.0), Vector3::unit_y(), -90.0, 0.0)
    }
}

/// Camera orbiting a target on a sphere.
///
/// `position` is always `target + radius * (sin β cos α, cos β, sin β sin α)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcRotate {
    target: Point3<f32>,
    radius: f32,
    /// Azimuth, radians.
    alpha: f32,
    /// Polar angle from +Y, radians.
    beta: f32,
    min_radius: f32,
    max_radius: f32,
    max_beta: f32,
    position: Point3<f32>,
}

impl ArcRotate {
    pub fn new(config: &ArcRotateConfig) -> Self {
        let mut camera = Self {
            target: Point3::from_vec(config.target),
            radius: 0.0,
            alpha: config.alpha.0,
            beta: 0.0,
            min_radius: config.min_radius,
            max_radius: config.max_radius,
            max_beta: config.max_beta.0,
            position: Point3::origin(),
        };
        camera.radius = camera.clamp_radius(config.radius);
        camera.beta = camera.clamp_beta(config.beta.0);
        camera.update_position();
        camera
    }

    pub fn target(&self) -> Point3<f32> {
        self.target
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn alpha(&self) -> Rad<f32> {
        Rad(self.alpha)
    }

    pub fn beta(&self) -> Rad<f32> {
        Rad(self.beta)
    }

    pub fn radius_limits(&self) -> (f32, f32) {
        (self.min_radius, self.max_radius)
    }

    pub fn max_beta(&self) -> Rad<f32> {
        Rad(self.max_beta)
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    fn clamp_radius(&self, radius: f32) -> f32 {
        radius.clamp(self.min_radius, self.max_radius)
    }

    fn clamp_beta(&self, beta: f32) -> f32 {
        beta.clamp(MIN_BETA, self.max_beta)
    }

    fn update_position(&mut self) {
        let (sin_b, cos_b) = self.beta.sin_cos();
        let (sin_a, cos_a) = self.alpha.sin_cos();
        self.position = self.target
            + self.radius * Vector3::new(sin_b * cos_a, cos_b, sin_b * sin_a);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraMode {
    FreeFly(FreeFly),
    ArcRotate(ArcRotate),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    mode: CameraMode,
    /// Vertical field of view in degrees.
    zoom: f32,
    pub mouse_sensitivity: f32,
}

impl Camera {
    fn with_mode(mode: CameraMode) -> Self {
        Self {
            mode,
            zoom: MAX_ZOOM,
            mouse_sensitivity: 0.1,
        }
    }

    pub fn free_fly(camera: FreeFly) -> Self {
        Self::with_mode(CameraMode::FreeFly(camera))
    }

    pub fn arc_rotate(config: &ArcRotateConfig) -> Self {
        Self::with_mode(CameraMode::ArcRotate(ArcRotate::new(config)))
    }

    pub fn mode(&self) -> &CameraMode {
        &self.mode
    }

    pub fn as_arc_rotate(&self) -> Option<&ArcRotate> {
        match &self.mode {
            CameraMode::ArcRotate(arc) => Some(arc),
            CameraMode::FreeFly(_) => None,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn position(&self) -> Point3<f32> {
        match &self.mode {
            CameraMode::FreeFly(fly) => fly.position,
            CameraMode::ArcRotate(arc) => arc.position,
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        match &self.mode {
            CameraMode::FreeFly(fly) => {
                Matrix4::look_at_rh(fly.position, fly.position + fly.front, fly.up)
            }
            CameraMode::ArcRotate(arc) => {
                Matrix4::look_at_rh(arc.position, arc.target, Vector3::unit_y())
            }
        }
    }

    /// OpenGL-convention perspective projection; the render engine converts
    /// it to wgpu clip space.
    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
        perspective(Deg(self.zoom), aspect, near, far)
    }

    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        let sensitivity = self.mouse_sensitivity;
        match &mut self.mode {
            CameraMode::ArcRotate(arc) => {
                arc.alpha += x_offset * sensitivity * ARC_ROTATE_SCALE;
                arc.beta += y_offset * sensitivity * ARC_ROTATE_SCALE;
                if constrain_pitch {
                    arc.beta = arc.clamp_beta(arc.beta);
                }
                arc.update_position();
            }
            CameraMode::FreeFly(fly) => {
                fly.yaw += x_offset * sensitivity;
                fly.pitch += y_offset * sensitivity;
                if constrain_pitch {
                    fly.pitch = fly.pitch.clamp(-MAX_PITCH, MAX_PITCH);
                }
                fly.update_vectors();
            }
        }
    }

    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        match &mut self.mode {
            CameraMode::ArcRotate(arc) => {
                arc.radius = arc.clamp_radius(arc.radius - y_offset * ARC_ZOOM_STEP);
                arc.update_position();
            }
            CameraMode::FreeFly(_) => {
                self.zoom = (self.zoom - y_offset).clamp(MIN_ZOOM, MAX_ZOOM);
            }
        }
    }

    /// Moves a free-fly camera; arc-rotate cameras ignore the keyboard.
    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let CameraMode::FreeFly(fly) = &mut self.mode else {
            return;
        };

        let velocity = fly.movement_speed * delta_time;
        let offset = match direction {
            CameraMovement::Forward => fly.front,
            CameraMovement::Backward => -fly.front,
            CameraMovement::Left => -fly.right,
            CameraMovement::Right => fly.right,
            CameraMovement::Up => fly.up,
            CameraMovement::Down => -fly.up,
        };
        fly.position += offset * velocity;
    }

    fn arc_mut(&mut self, setter: &str) -> Option<&mut ArcRotate> {
        match &mut self.mode {
            CameraMode::ArcRotate(arc) => Some(arc),
            CameraMode::FreeFly(_) => {
                log::warn!("{setter} ignored: camera is in free-fly mode");
                None
            }
        }
    }

    pub fn set_target(&mut self, target: Point3<f32>) {
        if let Some(arc) = self.arc_mut("set_target") {
            arc.target = target;
            arc.update_position();
        }
    }

    pub fn set_radius(&mut self, radius: f32) {
        if let Some(arc) = self.arc_mut("set_radius") {
            arc.radius = arc.clamp_radius(radius);
            arc.update_position();
        }
    }

    pub fn set_alpha(&mut self, alpha: impl Into<Rad<f32>>) {
        let alpha = alpha.into();
        if let Some(arc) = self.arc_mut("set_alpha") {
            arc.alpha = alpha.0;
            arc.update_position();
        }
    }

    pub fn set_beta(&mut self, beta: impl Into<Rad<f32>>) {
        let beta = beta.into();
        if let Some(arc) = self.arc_mut("set_beta") {
            arc.beta = arc.clamp_beta(beta.0);
            arc.update_position();
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{MetricSpace, Transform};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    const EPS: f32 = 1e-4;

    fn arc(camera: &Camera) -> &ArcRotate {
        camera.as_arc_rotate().unwrap()
    }

    fn expected_position(target: Point3<f32>, radius: f32, alpha: f32, beta: f32) -> Point3<f32> {
        target
            + radius
                * Vector3::new(
                    beta.sin() * alpha.cos(),
                    beta.cos(),
                    beta.sin() * alpha.sin(),
                )
    }

    #[test]
    fn default_arc_pose_matches_formula() {
        let camera = Camera::arc_rotate(&ArcRotateConfig::default());
        let alpha = 90f32.to_radians();
        let beta = 60f32.to_radians();
        let expected = expected_position(Point3::new(0.0, 3.0, 0.0), 20.0, alpha, beta);

        assert!(camera.position().distance(expected) < EPS);
    }

    #[test]
    fn arc_view_looks_at_target() {
        let camera = Camera::arc_rotate(&ArcRotateConfig::default());
        let target_in_view = camera.view_matrix().transform_point(arc(&camera).target());

        assert!(target_in_view.x.abs() < EPS);
        assert!(target_in_view.y.abs() < EPS);
        assert!((target_in_view.z + 20.0).abs() < EPS);
    }

    #[test]
    fn setters_keep_camera_on_sphere() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut camera = Camera::arc_rotate(&ArcRotateConfig::default());

        for _ in 0..200 {
            match rng.random_range(0..4) {
                0 => camera.set_target(Point3::new(
                    rng.random_range(-10.0..10.0),
                    rng.random_range(-10.0..10.0),
                    rng.random_range(-10.0..10.0),
                )),
                1 => camera.set_radius(rng.random_range(-5.0..80.0)),
                2 => camera.set_alpha(Rad(rng.random_range(-10.0f32..10.0))),
                _ => camera.set_beta(Rad(rng.random_range(-2.0f32..4.0))),
            }
            let a = arc(&camera);
            let distance = camera.position().distance(a.target());
            assert!((distance - a.radius()).abs() < EPS * a.radius().max(1.0));
        }
    }

    #[test]
    fn arc_bounds_hold_under_input() {
        let mut rng = StdRng::seed_from_u64(42);
        let config = ArcRotateConfig::default();
        let mut camera = Camera::arc_rotate(&config);

        for _ in 0..500 {
            if rng.random_bool(0.5) {
                camera.process_mouse_scroll(rng.random_range(-20.0..20.0));
            } else {
                camera.process_mouse_movement(
                    rng.random_range(-800.0..800.0),
                    rng.random_range(-800.0..800.0),
                    true,
                );
            }
            let a = arc(&camera);
            assert!(a.beta().0 >= MIN_BETA && a.beta().0 <= config.max_beta.0);
            assert!(a.radius() >= config.min_radius && a.radius() <= config.max_radius);
        }
    }

    #[test]
    fn free_fly_bounds_hold_under_input() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut camera = Camera::free_fly(FreeFly::default());

        for _ in 0..500 {
            camera.process_mouse_scroll(rng.random_range(-10.0..10.0));
            camera.process_mouse_movement(
                rng.random_range(-2000.0..2000.0),
                rng.random_range(-2000.0..2000.0),
                true,
            );
            let CameraMode::FreeFly(fly) = camera.mode() else {
                unreachable!()
            };
            assert!(fly.pitch() >= -89.0 && fly.pitch() <= 89.0);
            assert!(camera.zoom() >= 1.0 && camera.zoom() <= 45.0);
        }
    }

    #[test]
    fn scroll_moves_arc_radius_in_half_steps() {
        let mut camera = Camera::arc_rotate(&ArcRotateConfig::default());
        camera.process_mouse_scroll(2.0);
        assert!((arc(&camera).radius() - 19.0).abs() < EPS);
        // Zoom is a free-fly concept.
        assert_eq!(camera.zoom(), 45.0);
    }

    #[test]
    fn mouse_movement_scales_arc_angles() {
        let mut camera = Camera::arc_rotate(&ArcRotateConfig::default());
        let before = *arc(&camera);
        camera.process_mouse_movement(100.0, -50.0, true);
        let after = arc(&camera);

        assert!((after.alpha().0 - before.alpha().0 - 0.1).abs() < EPS);
        assert!((after.beta().0 - before.beta().0 + 0.05).abs() < EPS);
    }

    #[test]
    fn keyboard_only_moves_free_fly() {
        let mut arc_camera = Camera::arc_rotate(&ArcRotateConfig::default());
        let before = arc_camera.position();
        arc_camera.process_keyboard(CameraMovement::Forward, 1.0);
        assert_eq!(arc_camera.position(), before);

        let mut fly = Camera::free_fly(FreeFly::default());
        fly.process_keyboard(CameraMovement::Forward, 2.0);
        // Default yaw of -90° looks down -Z; speed 2.5 for 2 s.
        assert!(fly.position().distance(Point3::new(0.0, 0.0, -2.0)) < EPS);

        fly.process_keyboard(CameraMovement::Right, 1.0);
        assert!(fly.position().distance(Point3::new(2.5, 0.0, -2.0)) < EPS);
    }

    #[test]
    fn arc_setters_do_nothing_in_free_fly() {
        let mut camera = Camera::free_fly(FreeFly::default());
        let before = camera;
        camera.set_target(Point3::new(1.0, 2.0, 3.0));
        camera.set_radius(5.0);
        camera.set_alpha(Deg(10.0));
        camera.set_beta(Deg(10.0));
        assert_eq!(camera, before);
    }

    #[test]
    fn beta_setter_clamps_to_max() {
        let mut camera = Camera::arc_rotate(&ArcRotateConfig::default());
        camera.set_beta(Deg(90.0));
        assert!((arc(&camera).beta().0 - 85f32.to_radians()).abs() < EPS);
        camera.set_beta(Rad(0.0));
        assert_eq!(arc(&camera).beta().0, MIN_BETA);
    }
}
