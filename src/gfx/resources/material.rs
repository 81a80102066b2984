//! Phong surface reflectance
//!
//! A material is four coefficients consumed by the lighting shader. Meshes own
//! a copy of their material; nothing shares or mutates one after import.

use cgmath::Vector3;

/// Ambient / diffuse / specular reflectance plus the specular exponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    /// Specular exponent, never negative.
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vector3::new(0.3, 0.3, 0.3),
            diffuse: Vector3::new(0.8, 0.8, 0.8),
            specular: Vector3::new(0.5, 0.5, 0.5),
            shininess: 32.0,
        }
    }
}

impl Material {
    pub fn new(
        ambient: Vector3<f32>,
        diffuse: Vector3<f32>,
        specular: Vector3<f32>,
        shininess: f32,
    ) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            shininess: shininess.max(0.0),
        }
    }

    /// Low ambient, strong white highlight.
    pub fn metallic(color: Vector3<f32>) -> Self {
        Self::new(color * 0.1, color * 0.7, Vector3::new(0.8, 0.8, 0.8), 64.0)
    }

    pub fn plastic(color: Vector3<f32>) -> Self {
        Self::new(color * 0.3, color, Vector3::new(0.3, 0.3, 0.3), 16.0)
    }

    /// Almost no highlight.
    pub fn rubber(color: Vector3<f32>) -> Self {
        Self::new(color * 0.2, color, Vector3::new(0.1, 0.1, 0.1), 4.0)
    }

    /// Builds a material from MTL channels, falling back to [`Material::default`]
    /// for every channel the library leaves out.
    pub fn from_mtl(mtl: &tobj::Material) -> Self {
        let fallback = Self::default();
        let channel = |value: Option<[f32; 3]>, default: Vector3<f32>| {
            value.map(Vector3::from).unwrap_or(default)
        };

        Self::new(
            channel(mtl.ambient, fallback.ambient),
            channel(mtl.diffuse, fallback.diffuse),
            channel(mtl.specular, fallback.specular),
            mtl.shininess.unwrap_or(fallback.shininess),
        )
    }
}
