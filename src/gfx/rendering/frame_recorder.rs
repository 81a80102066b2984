//! wgpu implementation of [`Shader`]
//!
//! WGSL has no name-addressed uniforms, so the recorder collects everything
//! the scene pushes during one frame: named uniforms land in a
//! [`GlobalUniform`] or in the current [`ObjectUniform`], and every draw
//! snapshots the current object state into a [`DrawCommand`]. The render
//! engine then uploads both and replays the commands in one render pass.

use std::collections::HashMap;

use cgmath::{Matrix4, Vector3};

use super::{shader::Shader, uniforms};
use crate::gfx::{
    camera::camera_utils::{convert_matrix4_to_array, OPENGL_TO_WGPU_MATRIX},
    resources::{
        global_bindings::{GlobalUniform, ObjectUniform},
        texture::{Texture, TextureKind},
    },
    scene::mesh::Mesh,
};

/// One recorded draw: what to draw and the object state it was issued with.
#[derive(Clone)]
pub struct DrawCommand<'a> {
    pub mesh: &'a Mesh,
    /// Texture bound to the first diffuse sampler, if any.
    pub diffuse_texture: Option<&'a Texture>,
    pub uniform: ObjectUniform,
    pub instances: u32,
}

#[derive(Default)]
pub struct FrameRecorder<'a> {
    program_in_use: bool,
    globals: GlobalUniform,
    object: ObjectUniform,
    sampler_units: HashMap<String, i32>,
    bound_textures: HashMap<u32, &'a Texture>,
    draws: Vec<DrawCommand<'a>>,
    unknown_uniforms: Vec<String>,
}

impl<'a> FrameRecorder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn globals(&self) -> &GlobalUniform {
        &self.globals
    }

    pub fn draws(&self) -> &[DrawCommand<'a>] {
        &self.draws
    }

    /// Uniform names pushed this frame that the lighting shader does not have.
    pub fn unknown_uniforms(&self) -> &[String] {
        &self.unknown_uniforms
    }

    pub fn vertex_count(&self) -> usize {
        self.draws
            .iter()
            .map(|d| d.mesh.vertex_count() * d.instances as usize)
            .sum()
    }

    fn unknown(&mut self, name: &str) {
        if !self.unknown_uniforms.iter().any(|n| n == name) {
            self.unknown_uniforms.push(name.to_owned());
        }
    }

    fn diffuse_texture(&self) -> Option<&'a Texture> {
        let unit = *self
            .sampler_units
            .get(&TextureKind::Diffuse.sampler_name(1))?;
        let texture = *self.bound_textures.get(&u32::try_from(unit).ok()?)?;
        (texture.kind == TextureKind::Diffuse).then_some(texture)
    }
}

impl<'a> Shader<'a> for FrameRecorder<'a> {
    fn use_program(&mut self) {
        self.program_in_use = true;
    }

    fn set_mat4(&mut self, name: &str, value: Matrix4<f32>) {
        match name {
            uniforms::PROJECTION => {
                self.globals.projection = convert_matrix4_to_array(OPENGL_TO_WGPU_MATRIX * value)
            }
            uniforms::VIEW => self.globals.view = convert_matrix4_to_array(value),
            uniforms::MODEL => self.object.set_model(value),
            _ => self.unknown(name),
        }
    }

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
        let value: [f32; 3] = value.into();
        match name {
            uniforms::LIGHT_POS => self.globals.light_pos = value,
            uniforms::LIGHT_COLOR => self.globals.light_color = value,
            uniforms::VIEW_POS => self.globals.view_pos = value,
            uniforms::AMBIENT_STRENGTH => self.globals.ambient_strength = value,
            uniforms::MATERIAL_AMBIENT => self.object.ambient = value,
            uniforms::MATERIAL_DIFFUSE => self.object.diffuse = value,
            uniforms::MATERIAL_SPECULAR => self.object.specular = value,
            _ => self.unknown(name),
        }
    }

    fn set_float(&mut self, name: &str, value: f32) {
        match name {
            uniforms::MATERIAL_BRIGHTNESS => self.globals.material_brightness = value,
            uniforms::MATERIAL_SHININESS => self.object.shininess = value,
            _ => self.unknown(name),
        }
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        let value = u32::from(value);
        match name {
            uniforms::ENHANCE_CONTRAST => self.globals.enhance_contrast = value,
            uniforms::HAS_DIFFUSE_TEXTURE => self.object.has_diffuse_texture = value,
            uniforms::USE_MATERIAL_OVERRIDE => self.object.use_material_override = value,
            _ => self.unknown(name),
        }
    }

    fn set_int(&mut self, name: &str, value: i32) {
        let is_sampler = TextureKind::ALL
            .iter()
            .any(|kind| name.starts_with(kind.sampler_prefix()));
        if is_sampler {
            self.sampler_units.insert(name.to_owned(), value);
        } else {
            self.unknown(name);
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: &'a Texture) {
        self.bound_textures.insert(unit, texture);
    }

    fn draw_indexed(&mut self, mesh: &'a Mesh, instances: u32) {
        if !self.program_in_use {
            log::warn!("draw issued before use_program, ignored");
            return;
        }
        if instances == 0 {
            return;
        }

        let diffuse_texture = self.diffuse_texture();
        self.draws.push(DrawCommand {
            mesh,
            diffuse_texture,
            uniform: self.object,
            instances,
        });
    }

    fn reset_texture_units(&mut self) {
        self.sampler_units.clear();
        self.bound_textures.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use cgmath::SquareMatrix;

    use super::*;
    use crate::gfx::{
        resources::{material::Material, texture::TextureCache},
        scene::vertex::Vertex3D,
    };

    fn triangle(textures: Vec<crate::gfx::resources::texture::TextureId>) -> Mesh {
        let v = |x, y| Vertex3D::new([x, y, 0.0], [0.0, 0.0, 1.0], [x, y]);
        Mesh::new(
            vec![v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0)],
            vec![0, 1, 2],
            textures,
            Material::metallic(Vector3::new(1.0, 1.0, 1.0)),
        )
        .unwrap()
    }

    #[test]
    fn globals_are_routed_by_name() {
        let mut recorder = FrameRecorder::new();
        recorder.use_program();
        recorder.set_mat4(uniforms::VIEW, Matrix4::from_scale(2.0));
        recorder.set_vec3(uniforms::LIGHT_POS, Vector3::new(10.0, 15.0, 10.0));
        recorder.set_float(uniforms::MATERIAL_BRIGHTNESS, 1.5);
        recorder.set_bool(uniforms::ENHANCE_CONTRAST, true);

        let globals = recorder.globals();
        assert_eq!(globals.view, convert_matrix4_to_array(Matrix4::from_scale(2.0)));
        assert_eq!(globals.light_pos, [10.0, 15.0, 10.0]);
        assert_eq!(globals.material_brightness, 1.5);
        assert_eq!(globals.enhance_contrast, 1);
        assert!(recorder.unknown_uniforms().is_empty());
    }

    #[test]
    fn projection_is_converted_to_wgpu_depth() {
        let mut recorder = FrameRecorder::new();
        recorder.set_mat4(uniforms::PROJECTION, Matrix4::identity());
        assert_eq!(
            recorder.globals().projection,
            convert_matrix4_to_array(OPENGL_TO_WGPU_MATRIX)
        );
    }

    #[test]
    fn draws_snapshot_object_state() {
        let mesh = triangle(Vec::new());
        let cache = TextureCache::new();
        let mut recorder = FrameRecorder::new();
        recorder.use_program();

        recorder.set_mat4(uniforms::MODEL, Matrix4::from_scale(3.0));
        mesh.draw(&mut recorder, &cache);
        recorder.set_mat4(uniforms::MODEL, Matrix4::identity());
        recorder.draw_indexed(&mesh, 4);

        let draws = recorder.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].uniform.model_matrix(), Matrix4::from_scale(3.0));
        assert_eq!(draws[0].uniform.diffuse(), Vector3::new(0.7, 0.7, 0.7));
        assert_eq!(draws[0].uniform.has_diffuse_texture, 0);
        assert_eq!(draws[1].uniform.model_matrix(), Matrix4::identity());
        assert_eq!(draws[1].instances, 4);
        assert_eq!(recorder.vertex_count(), 3 + 12);
    }

    #[test]
    fn first_diffuse_sampler_picks_the_texture() {
        let mut cache = TextureCache::new();
        let diffuse = cache.get_or_insert(Path::new("wood.png"), TextureKind::Diffuse);
        let specular = cache.get_or_insert(Path::new("spec.png"), TextureKind::Specular);
        let mesh = triangle(vec![specular, diffuse]);

        let mut recorder = FrameRecorder::new();
        recorder.use_program();
        mesh.draw(&mut recorder, &cache);
        mesh.draw(&mut recorder, &cache);

        for draw in recorder.draws() {
            let texture = draw.diffuse_texture.unwrap();
            assert_eq!(texture.path, Path::new("wood.png"));
            assert_eq!(draw.uniform.has_diffuse_texture, 1);
        }

        // Texture units are reset after each mesh.
        recorder.draw_indexed(&mesh, 1);
        assert!(recorder.draws()[2].diffuse_texture.is_none());
    }

    #[test]
    fn draws_need_a_program_and_instances() {
        let mesh = triangle(Vec::new());
        let mut recorder = FrameRecorder::new();
        recorder.draw_indexed(&mesh, 1);
        assert!(recorder.draws().is_empty());

        recorder.use_program();
        recorder.draw_indexed(&mesh, 0);
        assert!(recorder.draws().is_empty());
    }

    #[test]
    fn unknown_names_are_collected_once() {
        let mut recorder = FrameRecorder::new();
        recorder.set_float("fog_density", 0.1);
        recorder.set_float("fog_density", 0.2);
        recorder.set_int("shadowMap", 3);
        assert_eq!(recorder.unknown_uniforms(), ["fog_density", "shadowMap"]);
    }
}
