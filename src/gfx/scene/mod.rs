//! # Scene management
//!
//! A [`Scene`] owns a [`ModelRegistry`] of imported assets and a list of
//! [`GameObject`]s, each placing a shared [`Model`] with its own
//! [`Transform`]. Models are split into [`Mesh`]es built from
//! [`Vertex3D`] data.

pub mod bounds;
pub mod game_object;
pub mod mesh;
pub mod model;
pub mod registry;
pub mod scene;
pub mod transform;
pub mod vertex;

pub use bounds::BoundingBox;
pub use game_object::GameObject;
pub use mesh::{DrawMesh, Mesh, MeshError};
pub use model::{Model, ModelError};
pub use registry::{ModelHandle, ModelRegistry};
pub use scene::Scene;
pub use transform::Transform;
pub use vertex::Vertex3D;
