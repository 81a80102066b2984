//! Position / rotation / scale triple and its model matrix.

use cgmath::{Deg, Matrix4, Vector3, Zero};

/// Object placement in world space.
///
/// Rotation is stored as Euler angles in degrees and composed in a fixed
/// Y → X → Z order:
///
/// `model = T(position) * Ry * Rx * Rz * S(scale)`
///
/// `rotate` accumulates without wrapping the angles back into `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    /// Euler angles in degrees.
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Vector3::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn new(position: Vector3<f32>, rotation: Vector3<f32>, scale: Vector3<f32>) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Transform with only a translation.
    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.position);
        let ry = Matrix4::from_angle_y(Deg(self.rotation.y));
        let rx = Matrix4::from_angle_x(Deg(self.rotation.x));
        let rz = Matrix4::from_angle_z(Deg(self.rotation.z));
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        t * ry * rx * rz * s
    }

    pub fn translate(&mut self, offset: Vector3<f32>) {
        self.position += offset;
    }

    /// Adds `euler_delta` (degrees) to the stored rotation.
    pub fn rotate(&mut self, euler_delta: Vector3<f32>) {
        self.rotation += euler_delta;
    }

    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.scale = scale;
    }
}
