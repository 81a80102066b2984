//! Uniform bindings shared by the lighting pipeline
//!
//! `@group(0)` holds per-frame globals (camera matrices and lighting knobs),
//! `@group(1)` holds per-draw object data addressed with a dynamic offset.
//! The layouts of [`GlobalUniform`] and [`ObjectUniform`] MUST match the
//! `Globals` and `Object` structs in `phong.wgsl`.

use cgmath::{Matrix, Matrix4, SquareMatrix, Vector3};

use crate::{
    gfx::{camera::camera_utils::convert_matrix4_to_array, resources::material::Material},
    wgpu_utils::{binding_types, DynamicUniformBuffer, UniformBuffer},
};

/// Per-frame uniform data. 192 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    pub view: [[f32; 4]; 4],
    /// Already converted to wgpu clip space.
    pub projection: [[f32; 4]; 4],
    pub view_pos: [f32; 3],
    pub material_brightness: f32,
    pub light_pos: [f32; 3],
    pub enhance_contrast: u32,
    pub light_color: [f32; 3],
    _padding0: f32,
    pub ambient_strength: [f32; 3],
    _padding1: f32,
}

impl Default for GlobalUniform {
    fn default() -> Self {
        let identity = convert_matrix4_to_array(Matrix4::identity());
        Self {
            view: identity,
            projection: identity,
            view_pos: [0.0; 3],
            material_brightness: 1.0,
            light_pos: [0.0; 3],
            enhance_contrast: 0,
            light_color: [1.0; 3],
            _padding0: 0.0,
            ambient_strength: [0.0; 3],
            _padding1: 0.0,
        }
    }
}

/// Per-draw uniform data. 176 bytes, padded to the device's dynamic offset
/// alignment inside [`ObjectUBO`].
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, kept as a mat4 to avoid mat3 padding rules.
    pub normal_matrix: [[f32; 4]; 4],
    pub ambient: [f32; 3],
    pub shininess: f32,
    pub diffuse: [f32; 3],
    pub has_diffuse_texture: u32,
    pub specular: [f32; 3],
    pub use_material_override: u32,
}

impl Default for ObjectUniform {
    fn default() -> Self {
        let identity = convert_matrix4_to_array(Matrix4::identity());
        let mut uniform = Self {
            model: identity,
            normal_matrix: identity,
            ambient: [0.0; 3],
            shininess: 0.0,
            diffuse: [0.0; 3],
            has_diffuse_texture: 0,
            specular: [0.0; 3],
            use_material_override: 0,
        };
        uniform.set_material(&Material::default());
        uniform
    }
}

impl ObjectUniform {
    /// Stores `model` together with its normal matrix. A singular model
    /// matrix falls back to an identity normal matrix.
    pub fn set_model(&mut self, model: Matrix4<f32>) {
        let normal = model
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);
        self.model = convert_matrix4_to_array(model);
        self.normal_matrix = convert_matrix4_to_array(normal);
    }

    pub fn set_material(&mut self, material: &Material) {
        self.ambient = material.ambient.into();
        self.diffuse = material.diffuse.into();
        self.specular = material.specular.into();
        self.shininess = material.shininess;
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from(self.model)
    }

    pub fn diffuse(&self) -> Vector3<f32> {
        Vector3::from(self.diffuse)
    }
}

pub type GlobalUBO = UniformBuffer<GlobalUniform>;
pub type ObjectUBO = DynamicUniformBuffer<ObjectUniform>;

/// Layout and bind group for [`GlobalUniform`], bound at slot 0.
pub struct GlobalBindings {
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[binding_types::rendering_entry(0, binding_types::uniform())],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        });

        Self { layout, bind_group }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Layout and bind group for per-draw [`ObjectUniform`]s, bound at slot 1
/// with one dynamic offset per draw.
pub struct ObjectBindings {
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl ObjectBindings {
    pub fn new(device: &wgpu::Device, ubo: &ObjectUBO) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Bind Group Layout"),
            entries: &[binding_types::rendering_entry(
                0,
                binding_types::uniform_dynamic(std::mem::size_of::<ObjectUniform>() as u64),
            )],
        });
        let bind_group = Self::create_bind_group(device, &layout, ubo);

        Self { layout, bind_group }
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        ubo: &ObjectUBO,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        })
    }

    /// Must be called after the buffer behind `ubo` was reallocated.
    pub fn rebind(&mut self, device: &wgpu::Device, ubo: &ObjectUBO) {
        self.bind_group = Self::create_bind_group(device, &self.layout, ubo);
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;

    #[test]
    fn uniform_sizes_match_shader_structs() {
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 192);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 176);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let mut uniform = ObjectUniform::default();
        uniform.set_model(Matrix4::from_nonuniform_scale(2.0, 1.0, 4.0));

        let normal = Matrix4::from(uniform.normal_matrix);
        assert_eq!(normal, Matrix4::from_nonuniform_scale(0.5, 1.0, 0.25));
    }

    #[test]
    fn normal_matrix_is_transposed_inverse() {
        let mut uniform = ObjectUniform::default();
        uniform.set_model(Matrix4::from_translation(Vector3::new(3.0, -2.0, 5.0)));

        let normal = Matrix4::from(uniform.normal_matrix);
        let last_row = [normal.x.w, normal.y.w, normal.z.w];
        for (got, want) in last_row.iter().zip([-3.0, 2.0, -5.0]) {
            assert!((got - want).abs() < 1e-6);
        }
        assert!(normal.w.truncate().magnitude() < 1e-6);
    }

    #[test]
    fn singular_model_gets_identity_normals() {
        let mut uniform = ObjectUniform::default();
        uniform.set_model(Matrix4::from_scale(0.0));
        assert_eq!(Matrix4::from(uniform.normal_matrix), Matrix4::identity());
    }

    #[test]
    fn default_object_carries_default_material() {
        let uniform = ObjectUniform::default();
        assert_eq!(uniform.diffuse(), Material::default().diffuse);
        assert_eq!(uniform.shininess, Material::default().shininess);
    }
}
