//! Lorry: a truck loading viewer
//!
//! Loads a truck and a wheel from OBJ files, lights them with a Phong
//! shader and shows them under an arc-rotate camera, with an ImGui panel
//! for choosing the trailer size.

pub mod app;
pub mod config;
pub mod gfx;
pub mod performance;
pub mod ui;
pub mod wgpu_utils;

pub use app::LorryApp;
