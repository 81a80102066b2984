use cgmath::Matrix4;

/// Maps OpenGL clip-space depth (-1..1) to wgpu's (0..1).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}

#[cfg(test)]
mod tests {
    use cgmath::{perspective, Deg, Vector4};

    use super::*;

    #[test]
    fn near_and_far_planes_map_to_unit_depth() {
        let (near, far) = (0.1, 1000.0);
        let proj = OPENGL_TO_WGPU_MATRIX * perspective(Deg(45.0), 1.5, near, far);

        let on_near = proj * Vector4::new(0.0, 0.0, -near, 1.0);
        let on_far = proj * Vector4::new(0.0, 0.0, -far, 1.0);

        assert!((on_near.z / on_near.w).abs() < 1e-4);
        assert!((on_far.z / on_far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn array_is_column_major() {
        let m = Matrix4::from_translation(cgmath::Vector3::new(1.0, 2.0, 3.0));
        let a = convert_matrix4_to_array(m);
        assert_eq!(a[3], [1.0, 2.0, 3.0, 1.0]);
    }
}
