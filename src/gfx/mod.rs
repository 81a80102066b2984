//! # Graphics
//!
//! - [`camera`]: free-fly and arc-rotate cameras plus input handling
//! - [`scene`]: transforms, meshes, models and the objects placing them
//! - [`resources`]: materials, textures and uniform bindings
//! - [`rendering`]: the shader seam, the frame recorder and the wgpu engine

pub mod camera;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::Camera;
pub use rendering::{RenderEngine, Renderer};
pub use scene::Scene;
