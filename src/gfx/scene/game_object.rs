use super::{
    registry::{ModelHandle, ModelRegistry},
    transform::Transform,
};
use crate::gfx::rendering::{shader::Shader, uniforms};

/// Named scene entity: a transform plus an optional shared model.
#[derive(Debug, Clone)]
pub struct GameObject {
    pub name: String,
    pub transform: Transform,
    active: bool,
    model: Option<ModelHandle>,
}

impl Default for GameObject {
    fn default() -> Self {
        Self::new("GameObject")
    }
}

impl GameObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            active: true,
            model: None,
        }
    }

    pub fn with_model(name: impl Into<String>, model: ModelHandle, transform: Transform) -> Self {
        Self {
            transform,
            model: Some(model),
            ..Self::new(name)
        }
    }

    pub fn model(&self) -> Option<ModelHandle> {
        self.model
    }

    pub fn set_model(&mut self, model: Option<ModelHandle>) {
        self.model = model;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Per-frame logic hook. Objects carry no behaviour yet, so this only
    /// reports whether the object took part in the frame.
    pub fn update(&mut self, _delta_time: f32) -> bool {
        self.active
    }

    /// True when [`GameObject::render`] would draw something.
    pub fn is_renderable(&self, models: &ModelRegistry) -> bool {
        self.active && self.model.and_then(|h| models.get(h)).is_some()
    }

    /// Pushes this object's model matrix and draws its model.
    pub fn render<'a>(&self, shader: &mut dyn Shader<'a>, models: &'a ModelRegistry) {
        if !self.active {
            return;
        }
        let Some(model) = self.model.and_then(|h| models.get(h)) else {
            return;
        };

        shader.set_mat4(uniforms::MODEL, self.transform.model_matrix());
        model.draw(shader);
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use cgmath::Vector3;

    use super::*;
    use crate::gfx::rendering::shader::recording::RecordingShader;

    fn registry_with_triangle() -> (ModelRegistry, ModelHandle) {
        let mut registry = ModelRegistry::new();
        let handle = registry
            .load(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/triangle.obj"))
            .unwrap();
        (registry, handle)
    }

    #[test]
    fn renders_with_its_own_transform() {
        let (models, handle) = registry_with_triangle();
        let transform = Transform::from_position(Vector3::new(1.0, 2.0, 3.0));
        let object = GameObject::with_model("crate", handle, transform);

        let mut shader = RecordingShader::default();
        object.render(&mut shader, &models);

        assert_eq!(shader.draws(), 1);
        assert_eq!(shader.last_mat4(uniforms::MODEL), Some(transform.model_matrix()));
    }

    #[test]
    fn inactive_or_empty_objects_draw_nothing() {
        let (models, handle) = registry_with_triangle();
        let mut object = GameObject::with_model("crate", handle, Transform::default());
        object.set_active(false);
        assert!(!object.update(0.016));

        let mut shader = RecordingShader::default();
        object.render(&mut shader, &models);
        assert!(shader.calls.is_empty());
        assert!(!object.is_renderable(&models));

        let empty = GameObject::default();
        empty.render(&mut shader, &models);
        assert!(shader.calls.is_empty());
        assert_eq!(empty.name, "GameObject");
    }
}
