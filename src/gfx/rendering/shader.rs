//! The seam between scene composition and the graphics API.
//!
//! Scene objects never talk to wgpu directly. They push named uniforms,
//! texture bindings and draws through [`Shader`], which the render engine
//! implements with [`FrameRecorder`](super::frame_recorder::FrameRecorder).

use cgmath::{Matrix4, Vector3};

use crate::gfx::{resources::texture::Texture, scene::mesh::Mesh};

/// A bound lighting program that accepts named uniforms and draws.
///
/// `'a` is the lifetime of the scene being drawn: implementations may keep
/// references to meshes and textures until the frame is submitted.
pub trait Shader<'a> {
    /// Makes this program current. Called once per frame before any uniform.
    fn use_program(&mut self);

    fn set_mat4(&mut self, name: &str, value: Matrix4<f32>);
    fn set_vec3(&mut self, name: &str, value: Vector3<f32>);
    fn set_float(&mut self, name: &str, value: f32);
    fn set_bool(&mut self, name: &str, value: bool);
    fn set_int(&mut self, name: &str, value: i32);

    /// Binds `texture` to texture unit `unit` for the next draw.
    fn bind_texture(&mut self, unit: u32, texture: &'a Texture);

    /// Issues an indexed triangle-list draw of `mesh` with `instances`
    /// instances, using the uniforms and textures set so far.
    fn draw_indexed(&mut self, mesh: &'a Mesh, instances: u32);

    /// Drops texture bindings made since the last reset, leaving unit 0 active.
    fn reset_texture_units(&mut self);
}

#[cfg(test)]
pub(crate) mod recording {
    //! Shader double that records every call in order.

    use std::path::PathBuf;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        UseProgram,
        Mat4(String, Matrix4<f32>),
        Vec3(String, Vector3<f32>),
        Float(String, f32),
        Bool(String, bool),
        Int(String, i32),
        BindTexture(u32, PathBuf),
        Draw { indices: usize, instances: u32 },
        ResetTextureUnits,
    }

    #[derive(Debug, Default)]
    pub struct RecordingShader {
        pub calls: Vec<Call>,
    }

    impl RecordingShader {
        pub fn draws(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, Call::Draw { .. }))
                .count()
        }

        /// Last value pushed to the mat4 uniform `name`.
        pub fn last_mat4(&self, name: &str) -> Option<Matrix4<f32>> {
            self.calls.iter().rev().find_map(|c| match c {
                Call::Mat4(n, m) if n == name => Some(*m),
                _ => None,
            })
        }

        pub fn position_of(&self, wanted: &Call) -> Option<usize> {
            self.calls.iter().position(|c| c == wanted)
        }
    }

    impl<'a> Shader<'a> for RecordingShader {
        fn use_program(&mut self) {
            self.calls.push(Call::UseProgram);
        }

        fn set_mat4(&mut self, name: &str, value: Matrix4<f32>) {
            self.calls.push(Call::Mat4(name.into(), value));
        }

        fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
            self.calls.push(Call::Vec3(name.into(), value));
        }

        fn set_float(&mut self, name: &str, value: f32) {
            self.calls.push(Call::Float(name.into(), value));
        }

        fn set_bool(&mut self, name: &str, value: bool) {
            self.calls.push(Call::Bool(name.into(), value));
        }

        fn set_int(&mut self, name: &str, value: i32) {
            self.calls.push(Call::Int(name.into(), value));
        }

        fn bind_texture(&mut self, unit: u32, texture: &'a Texture) {
            self.calls
                .push(Call::BindTexture(unit, texture.path.clone()));
        }

        fn draw_indexed(&mut self, mesh: &'a Mesh, instances: u32) {
            self.calls.push(Call::Draw {
                indices: mesh.indices().len(),
                instances,
            });
        }

        fn reset_texture_units(&mut self) {
            self.calls.push(Call::ResetTextureUnits);
        }
    }
}
