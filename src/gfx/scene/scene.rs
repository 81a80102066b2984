use std::path::Path;

use cgmath::Vector3;

use super::{
    game_object::GameObject,
    model::ModelError,
    registry::{ModelHandle, ModelRegistry},
    transform::Transform,
};
use crate::gfx::rendering::{shader::Shader, uniforms};

pub const TRUCK_NAME: &str = "truck";
pub const WHEEL_NAME: &str = "wheel";

const TRUCK_POSITION: Vector3<f32> = Vector3::new(-4.0, -1.25, 0.0);
const WHEEL_POSITION: Vector3<f32> = Vector3::new(0.5, -1.25, 0.0);

/// Models and the objects placing them in the world
#[derive(Default)]
pub struct Scene {
    models: ModelRegistry,
    objects: Vec<GameObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the truck and places it at its fixed spot. Loading again
    /// replaces the truck's model.
    pub fn load_truck_model(&mut self, path: impl AsRef<Path>) -> Result<ModelHandle, ModelError> {
        self.load_placed(TRUCK_NAME, path.as_ref(), TRUCK_POSITION)
    }

    pub fn load_wheel_model(&mut self, path: impl AsRef<Path>) -> Result<ModelHandle, ModelError> {
        self.load_placed(WHEEL_NAME, path.as_ref(), WHEEL_POSITION)
    }

    fn load_placed(
        &mut self,
        name: &str,
        path: &Path,
        position: Vector3<f32>,
    ) -> Result<ModelHandle, ModelError> {
        let handle = self.models.load(path)?;
        match self.object_mut(name) {
            Some(object) => object.set_model(Some(handle)),
            None => self.add_object(GameObject::with_model(
                name,
                handle,
                Transform::from_position(position),
            )),
        }
        Ok(handle)
    }

    pub fn add_object(&mut self, object: GameObject) {
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    pub fn object(&self, name: &str) -> Option<&GameObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut GameObject> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut ModelRegistry {
        &mut self.models
    }

    /// Unloads models no object refers to any more.
    pub fn prune_models(&mut self) -> usize {
        let referenced: Vec<_> = self.objects.iter().filter_map(GameObject::model).collect();
        self.models.prune(referenced)
    }

    pub fn update(&mut self, delta_time: f32) {
        for object in &mut self.objects {
            object.update(delta_time);
        }
    }

    /// Draws every active object with a model, in insertion order.
    pub fn render<'a>(&'a self, shader: &mut dyn Shader<'a>) {
        for object in self.objects.iter().filter(|o| o.is_renderable(&self.models)) {
            shader.set_bool(uniforms::USE_MATERIAL_OVERRIDE, false);
            object.render(shader, &self.models);
        }
    }

    /// Vertices drawn by one [`Scene::render`] call.
    pub fn rendered_vertex_count(&self) -> usize {
        self.objects
            .iter()
            .filter(|o| o.is_active())
            .filter_map(|o| o.model().and_then(|h| self.models.get(h)))
            .map(|m| m.vertex_count())
            .sum()
    }

    pub fn init_gpu_resources(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture_layout: &wgpu::BindGroupLayout,
    ) {
        self.models.init_gpu_resources(device, queue, texture_layout);
    }
}
