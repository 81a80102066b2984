//! Application configuration
//!
//! Plain structs with `Default` impls. Only the model paths can be overridden
//! from the environment.

use std::{env, path::PathBuf};

use cgmath::{Deg, Rad, Vector3, Vector4};

pub const TRUCK_MODEL_ENV: &str = "LORRY_TRUCK_MODEL";
pub const WHEEL_MODEL_ENV: &str = "LORRY_WHEEL_MODEL";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub window_title: String,
    pub window_size: (u32, u32),
    pub truck_model_path: PathBuf,
    pub wheel_model_path: PathBuf,
    pub camera: ArcRotateConfig,
    pub lighting: LightingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_title: "Truck Loading Simulator".to_string(),
            window_size: (1920, 1080),
            truck_model_path: PathBuf::from("assets/models/lorry.obj"),
            wheel_model_path: PathBuf::from("assets/models/weel.obj"),
            camera: ArcRotateConfig::default(),
            lighting: LightingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults with model paths taken from `LORRY_TRUCK_MODEL` and
    /// `LORRY_WHEEL_MODEL` when set.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| env::var_os(key).map(PathBuf::from))
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<PathBuf>) -> Self {
        if let Some(path) = lookup(TRUCK_MODEL_ENV) {
            self.truck_model_path = path;
        }
        if let Some(path) = lookup(WHEEL_MODEL_ENV) {
            self.wheel_model_path = path;
        }
        self
    }
}

/// Initial pose and limits of the arc-rotate camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcRotateConfig {
    /// Azimuth around the target.
    pub alpha: Rad<f32>,
    /// Polar angle measured from +Y.
    pub beta: Rad<f32>,
    pub radius: f32,
    pub target: Vector3<f32>,
    pub min_radius: f32,
    pub max_radius: f32,
    pub max_beta: Rad<f32>,
}

impl Default for ArcRotateConfig {
    fn default() -> Self {
        Self {
            alpha: Deg(90.0).into(),
            beta: Deg(60.0).into(),
            radius: 20.0,
            target: Vector3::new(0.0, 3.0, 0.0),
            min_radius: 1.5,
            max_radius: 50.0,
            max_beta: Deg(85.0).into(),
        }
    }
}

/// Per-frame lighting uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingConfig {
    pub light_position: Vector3<f32>,
    pub light_color: Vector3<f32>,
    pub ambient_strength: Vector3<f32>,
    pub material_brightness: f32,
    pub enhance_contrast: bool,
    pub clear_color: Vector4<f32>,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            light_position: Vector3::new(10.0, 15.0, 10.0),
            light_color: Vector3::new(1.2, 1.2, 1.0),
            ambient_strength: Vector3::new(0.3, 0.3, 0.3),
            material_brightness: 1.0,
            enhance_contrast: true,
            clear_color: Vector4::new(0.35, 0.35, 0.35, 1.0),
        }
    }
}

impl LightingConfig {
    pub fn clear_color(&self) -> wgpu::Color {
        let c = self.clear_color.cast::<f64>().unwrap_or(Vector4::new(0.0, 0.0, 0.0, 1.0));
        wgpu::Color {
            r: c.x,
            g: c.y,
            b: c.z,
            a: c.w,
        }
    }
}
