use cgmath::EuclideanSpace;

use crate::{
    config::LightingConfig,
    gfx::{
        camera::{camera::{DEFAULT_FAR, DEFAULT_NEAR}, Camera},
        scene::scene::Scene,
    },
};

use super::{shader::Shader, uniforms};

/// Per-frame uniform setup followed by the scene's draws.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    pub lighting: LightingConfig,
}

impl Renderer {
    pub fn new(lighting: LightingConfig) -> Self {
        Self { lighting }
    }

    /// Binds the program, pushes camera and lighting uniforms once, then
    /// lets the scene issue its draws.
    pub fn render<'a>(
        &self,
        scene: &'a Scene,
        camera: &Camera,
        aspect: f32,
        shader: &mut dyn Shader<'a>,
    ) {
        let lighting = &self.lighting;

        shader.use_program();
        shader.set_mat4(
            uniforms::PROJECTION,
            camera.projection_matrix(aspect, DEFAULT_NEAR, DEFAULT_FAR),
        );
        shader.set_mat4(uniforms::VIEW, camera.view_matrix());
        shader.set_vec3(uniforms::LIGHT_POS, lighting.light_position);
        shader.set_vec3(uniforms::LIGHT_COLOR, lighting.light_color);
        shader.set_vec3(uniforms::VIEW_POS, camera.position().to_vec());
        shader.set_vec3(uniforms::AMBIENT_STRENGTH, lighting.ambient_strength);
        shader.set_float(uniforms::MATERIAL_BRIGHTNESS, lighting.material_brightness);
        shader.set_bool(uniforms::ENHANCE_CONTRAST, lighting.enhance_contrast);

        scene.render(shader);
    }
}
