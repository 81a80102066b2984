//! # Vertex Data Structures
//!
//! GPU-compatible vertex layout shared by every mesh in the viewer.

use std::mem;

/// A mesh vertex as uploaded to the GPU.
///
/// # Memory Layout
///
/// `#[repr(C)]` keeps the field order stable so [`Vertex3D::desc`] can use
/// fixed byte offsets.
///
/// # Identity
///
/// Two vertices are the same vertex for welding purposes when position,
/// normal and texture coordinate match bit for bit. Tangent and bitangent are
/// derived data and do not take part (see [`Vertex3D::weld_key`]).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

/// Bit pattern of position + normal + texture coordinate.
pub type WeldKey = [u32; 8];

impl Vertex3D {
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coords,
            ..Default::default()
        }
    }

    /// Exact-equality key used by vertex welding.
    pub fn weld_key(&self) -> WeldKey {
        let p = self.position;
        let n = self.normal;
        let t = self.tex_coords;
        [
            p[0].to_bits(),
            p[1].to_bits(),
            p[2].to_bits(),
            n[0].to_bits(),
            n[1].to_bits(),
            n[2].to_bits(),
            t[0].to_bits(),
            t[1].to_bits(),
        ]
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x3,
        4 => Float32x3
    ];

    /// Vertex buffer layout:
    /// - location 0: position
    /// - location 1: normal
    /// - location 2: texture coordinate
    /// - location 3: tangent
    /// - location 4: bitangent
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weld_key_ignores_tangent_space() {
        let a = Vertex3D::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.5, 0.5]);
        let mut b = a;
        b.tangent = [1.0, 0.0, 0.0];
        b.bitangent = [0.0, 0.0, 1.0];
        assert_eq!(a.weld_key(), b.weld_key());

        let mut c = a;
        c.tex_coords = [0.5, 0.25];
        assert_ne!(a.weld_key(), c.weld_key());
    }

    #[test]
    fn layout_covers_whole_vertex() {
        let layout = Vertex3D::desc();
        assert_eq!(layout.array_stride, 56);
        let last = layout.attributes.last().unwrap();
        assert_eq!(last.offset + 12, layout.array_stride);
    }
}
