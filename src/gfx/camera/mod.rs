pub mod camera;
pub mod camera_controller;
pub mod camera_utils;

// Re-export main types
pub use camera::{ArcRotate, Camera, CameraMode, CameraMovement, FreeFly};
pub use camera_controller::{CameraController, ControllerAction, ViewPreset};
