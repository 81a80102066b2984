//! GPU resource management
//!
//! Materials, textures and the bind groups holding per-frame and per-draw
//! uniforms.

pub mod global_bindings;
pub mod material;
pub mod texture;
pub mod texture_resource;

pub use global_bindings::{GlobalBindings, GlobalUniform, ObjectBindings, ObjectUniform};
pub use material::Material;
pub use texture::{Texture, TextureCache, TextureError, TextureKind};
pub use texture_resource::TextureResource;
