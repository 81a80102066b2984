use std::{collections::HashMap, ops::Range};

use cgmath::{InnerSpace, Vector2, Vector3, Zero};
use thiserror::Error;
use wgpu::Device;

use super::vertex::{Vertex3D, WeldKey};
use crate::gfx::{
    rendering::{shader::Shader, uniforms},
    resources::{
        material::Material,
        texture::{SamplerCounters, TextureCache, TextureId, TextureKind},
    },
};

/// Triangles considered ahead of the current slot by the cache reorder.
const REORDER_LOOKAHEAD: usize = 12;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("index count {0} is not a multiple of 3")]
    IncompleteTriangle(usize),
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

/// Indexed triangle list with its material and texture references.
///
/// CPU-side arrays are the source of truth; the GPU buffers are a cache of
/// them, dropped whenever the arrays change and recreated by
/// [`Mesh::init_gpu_resources`].
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    textures: Vec<TextureId>,
    pub material: Material,
    optimized: bool,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
}

impl Mesh {
    pub fn new(
        vertices: Vec<Vertex3D>,
        indices: Vec<u32>,
        textures: Vec<TextureId>,
        material: Material,
    ) -> Result<Self, MeshError> {
        validate_indices(&indices, vertices.len())?;

        Ok(Self {
            vertices,
            indices,
            textures,
            material,
            optimized: false,
            vertex_buffer: None,
            index_buffer: None,
        })
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn textures(&self) -> &[TextureId] {
        &self.textures
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_optimized(&self) -> bool {
        self.optimized
    }

    /// Welds identical vertices, then reorders triangles for vertex cache
    /// reuse. Runs at most once per mesh.
    pub fn optimize(&mut self) {
        if self.optimized {
            return;
        }

        let before = self.vertices.len();
        self.weld_vertices();
        self.reorder_for_vertex_cache();

        self.vertex_buffer = None;
        self.index_buffer = None;
        self.optimized = true;

        log::debug!(
            "Optimized mesh: {} -> {} vertices, {} triangles",
            before,
            self.vertices.len(),
            self.triangle_count()
        );
    }

    /// Merges vertices with equal position, normal and texture coordinate.
    ///
    /// Surviving vertices keep the order in which the index list first
    /// references them; unreferenced vertices are dropped.
    fn weld_vertices(&mut self) {
        let mut unique: HashMap<WeldKey, u32> = HashMap::with_capacity(self.vertices.len());
        let mut welded = Vec::with_capacity(self.vertices.len());

        for index in self.indices.iter_mut() {
            let vertex = self.vertices[*index as usize];
            *index = *unique.entry(vertex.weld_key()).or_insert_with(|| {
                welded.push(vertex);
                (welded.len() - 1) as u32
            });
        }

        self.vertices = welded;
    }

    /// Greedy reorder: each triangle slot takes the candidate within the
    /// lookahead window that touches the most already-emitted vertices. The
    /// displaced triangle moves to the candidate's old slot, so no triangle is
    /// lost or duplicated.
    fn reorder_for_vertex_cache(&mut self) {
        let mut used = vec![false; self.vertices.len()];
        let len = self.indices.len();

        for slot in (0..len).step_by(3) {
            let mut best = slot;
            let mut best_score = -1i32;

            for candidate in (slot..(slot + REORDER_LOOKAHEAD).min(len)).step_by(3) {
                let score = self.indices[candidate..candidate + 3]
                    .iter()
                    .filter(|&&i| used[i as usize])
                    .count() as i32;
                if score > best_score {
                    best_score = score;
                    best = candidate;
                }
            }

            if best != slot {
                for k in 0..3 {
                    self.indices.swap(slot + k, best + k);
                }
            }
            for k in 0..3 {
                used[self.indices[slot + k] as usize] = true;
            }
        }
    }

    /// Binds this mesh's textures, returning whether one of them is diffuse.
    fn bind_textures<'a>(&'a self, shader: &mut dyn Shader<'a>, cache: &'a TextureCache) -> bool {
        let mut counters = SamplerCounters::default();
        let mut has_diffuse = false;

        for (unit, id) in self.textures.iter().enumerate() {
            let Some(texture) = cache.get(*id) else {
                continue;
            };
            let sampler = counters.next_name(texture.kind);
            shader.set_int(&sampler, unit as i32);
            shader.bind_texture(unit as u32, texture);
            has_diffuse |= texture.kind == TextureKind::Diffuse;
        }

        has_diffuse
    }

    /// Sets material uniforms, binds textures and draws once.
    pub fn draw<'a>(&'a self, shader: &mut dyn Shader<'a>, cache: &'a TextureCache) {
        shader.set_vec3(uniforms::MATERIAL_AMBIENT, self.material.ambient);
        shader.set_vec3(uniforms::MATERIAL_DIFFUSE, self.material.diffuse);
        shader.set_vec3(uniforms::MATERIAL_SPECULAR, self.material.specular);
        shader.set_float(uniforms::MATERIAL_SHININESS, self.material.shininess);

        let has_diffuse = self.bind_textures(shader, cache);
        shader.set_bool(uniforms::HAS_DIFFUSE_TEXTURE, has_diffuse);

        shader.draw_indexed(self, 1);
        shader.reset_texture_units();
    }

    /// Binds textures and draws `amount` instances. Per-instance data comes
    /// from whoever supplies the instance buffer.
    pub fn draw_instanced<'a>(
        &'a self,
        shader: &mut dyn Shader<'a>,
        cache: &'a TextureCache,
        amount: u32,
    ) {
        self.bind_textures(shader, cache);
        shader.draw_indexed(self, amount);
        shader.reset_texture_units();
    }

    /// Uploads vertex and index buffers unless they are already current.
    pub fn init_gpu_resources(&mut self, device: &Device) {
        if self.vertex_buffer.is_some() && self.index_buffer.is_some() {
            return;
        }

        self.vertex_buffer = Some(wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));
        self.index_buffer = Some(wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&self.indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        ));
    }
}

/// Checks that `indices` is a whole triangle list addressing `vertex_count`
/// vertices.
pub fn validate_indices(indices: &[u32], vertex_count: usize) -> Result<(), MeshError> {
    if indices.len() % 3 != 0 {
        return Err(MeshError::IncompleteTriangle(indices.len()));
    }
    match indices.iter().find(|&&i| i as usize >= vertex_count) {
        Some(&index) => Err(MeshError::IndexOutOfRange {
            index,
            vertex_count,
        }),
        None => Ok(()),
    }
}

/// Fills in smooth vertex normals by averaging the face normals of every
/// triangle touching each vertex.
pub fn calculate_face_normals(vertices: &mut [Vertex3D], indices: &[u32]) {
    let mut sums = vec![Vector3::<f32>::zero(); vertices.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let v0 = Vector3::from(vertices[i0].position);
        let v1 = Vector3::from(vertices[i1].position);
        let v2 = Vector3::from(vertices[i2].position);

        let face_normal = (v1 - v0).cross(v2 - v0);
        for i in [i0, i1, i2] {
            sums[i] += face_normal;
        }
    }

    for (vertex, sum) in vertices.iter_mut().zip(sums) {
        if sum.magnitude2() > 0.0 {
            vertex.normal = sum.normalize().into();
        }
    }
}

/// Computes per-vertex tangent and bitangent from positions and texture
/// coordinates. Triangles with degenerate UVs contribute nothing, so meshes
/// without texture coordinates end up with zero tangents.
pub fn calculate_tangents(vertices: &mut [Vertex3D], indices: &[u32]) {
    let mut tangents = vec![Vector3::<f32>::zero(); vertices.len()];
    let mut bitangents = vec![Vector3::<f32>::zero(); vertices.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let p0 = Vector3::from(vertices[i0].position);
        let edge1 = Vector3::from(vertices[i1].position) - p0;
        let edge2 = Vector3::from(vertices[i2].position) - p0;

        let uv0 = Vector2::from(vertices[i0].tex_coords);
        let duv1 = Vector2::from(vertices[i1].tex_coords) - uv0;
        let duv2 = Vector2::from(vertices[i2].tex_coords) - uv0;

        let det = duv1.x * duv2.y - duv2.x * duv1.y;
        if det.abs() <= f32::EPSILON {
            continue;
        }
        let r = 1.0 / det;
        let tangent = (edge1 * duv2.y - edge2 * duv1.y) * r;
        let bitangent = (edge2 * duv1.x - edge1 * duv2.x) * r;

        for i in [i0, i1, i2] {
            tangents[i] += tangent;
            bitangents[i] += bitangent;
        }
    }

    for ((vertex, t), b) in vertices.iter_mut().zip(tangents).zip(bitangents) {
        if t.magnitude2() > 0.0 {
            vertex.tangent = t.normalize().into();
        }
        if b.magnitude2() > 0.0 {
            vertex.bitangent = b.normalize().into();
        }
    }
}

/// Encodes mesh draws into a render pass. Both methods return false when
/// the mesh has no GPU buffers yet and nothing was encoded.
pub trait DrawMesh<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh) -> bool;
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instances: Range<u32>) -> bool;
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) -> bool {
        self.draw_mesh_instanced(mesh, 0..1)
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instances: Range<u32>) -> bool {
        // Not uploaded yet
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            return false;
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.indices.len() as u32, 0, instances);
        true
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::gfx::rendering::shader::recording::{Call, RecordingShader};

    fn vertex(x: f32, y: f32, z: f32) -> Vertex3D {
        Vertex3D::new([x, y, z], [0.0, 0.0, 1.0], [x, y])
    }

    fn mesh(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Mesh {
        Mesh::new(vertices, indices, Vec::new(), Material::default()).unwrap()
    }

    fn triangle_multiset(mesh: &Mesh) -> Vec<[WeldKey; 3]> {
        let mut triangles: Vec<_> = mesh
            .indices()
            .chunks_exact(3)
            .map(|t| [0, 1, 2].map(|k| mesh.vertices()[t[k] as usize].weld_key()))
            .collect();
        triangles.sort();
        triangles
    }

    #[test]
    fn rejects_malformed_index_lists() {
        let vertices = vec![vertex(0.0, 0.0, 0.0); 3];
        assert_eq!(
            Mesh::new(vertices.clone(), vec![0, 1], Vec::new(), Material::default()).err(),
            Some(MeshError::IncompleteTriangle(2))
        );
        assert_eq!(
            Mesh::new(vertices, vec![0, 1, 3], Vec::new(), Material::default()).err(),
            Some(MeshError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            })
        );
    }

    #[test]
    fn welding_merges_shared_quad_corners() {
        // Two triangles of a quad, each with its own copy of the shared edge.
        let a = vertex(0.0, 0.0, 0.0);
        let b = vertex(1.0, 0.0, 0.0);
        let c = vertex(1.0, 1.0, 0.0);
        let d = vertex(0.0, 1.0, 0.0);
        let mut m = mesh(vec![a, b, c, a, c, d], vec![0, 1, 2, 3, 4, 5]);

        m.optimize();

        assert_eq!(m.vertex_count(), 4);
        assert_eq!(m.triangle_count(), 2);
        assert_eq!(m.indices(), &[0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn reorder_pulls_neighbouring_triangle_forward() {
        let vertices = (0..7).map(|i| vertex(i as f32, 0.0, 0.0)).collect();
        let mut m = mesh(vertices, vec![0, 1, 2, 3, 4, 5, 1, 2, 6]);

        m.optimize();

        assert_eq!(m.indices(), &[0, 1, 2, 1, 2, 6, 3, 4, 5]);
    }

    #[test]
    fn optimize_runs_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let (vertices, indices) = random_soup(&mut rng, 60);
        let mut m = mesh(vertices, indices);

        m.optimize();
        let once = (m.vertices().to_vec(), m.indices().to_vec());
        m.optimize();

        assert!(m.is_optimized());
        assert_eq!((m.vertices().to_vec(), m.indices().to_vec()), once);
    }

    #[test]
    fn optimize_keeps_geometry_and_never_grows() {
        let mut rng = StdRng::seed_from_u64(0x1077);
        for _ in 0..50 {
            let triangles = rng.random_range(1..80);
            let (vertices, indices) = random_soup(&mut rng, triangles);
            let mut m = mesh(vertices, indices);
            let before = triangle_multiset(&m);
            let vertex_count = m.vertex_count();

            m.optimize();

            assert!(m.vertex_count() <= vertex_count);
            assert_eq!(triangle_multiset(&m), before);
            assert!(m.indices().iter().all(|&i| (i as usize) < m.vertex_count()));
        }
    }

    /// Triangles drawn from a small pool of corners, so duplicates are common.
    fn random_soup(rng: &mut StdRng, triangles: usize) -> (Vec<Vertex3D>, Vec<u32>) {
        let pool: Vec<_> = (0..10)
            .map(|i| vertex(i as f32, (i % 3) as f32, 0.0))
            .collect();
        let vertices: Vec<_> = (0..triangles * 3)
            .map(|_| pool[rng.random_range(0..pool.len())])
            .collect();
        let indices = (0..vertices.len() as u32).collect();
        (vertices, indices)
    }

    #[test]
    fn draw_names_samplers_per_kind() {
        let mut cache = TextureCache::new();
        let d1 = cache.get_or_insert(Path::new("body.png"), TextureKind::Diffuse);
        let s1 = cache.get_or_insert(Path::new("body_spec.png"), TextureKind::Specular);
        let d2 = cache.get_or_insert(Path::new("decal.png"), TextureKind::Diffuse);

        let m = Mesh::new(
            vec![vertex(0.0, 0.0, 0.0); 3],
            vec![0, 1, 2],
            vec![d1, s1, d2],
            Material::default(),
        )
        .unwrap();

        let mut shader = RecordingShader::default();
        m.draw(&mut shader, &cache);

        let calls = &shader.calls;
        assert!(calls.contains(&Call::Int("texture_diffuse1".into(), 0)));
        assert!(calls.contains(&Call::Int("texture_specular1".into(), 1)));
        assert!(calls.contains(&Call::Int("texture_diffuse2".into(), 2)));
        assert!(calls.contains(&Call::BindTexture(2, "decal.png".into())));
        assert!(calls.contains(&Call::Bool(uniforms::HAS_DIFFUSE_TEXTURE.into(), true)));
        assert!(calls.contains(&Call::Float(uniforms::MATERIAL_SHININESS.into(), 32.0)));

        let draw = shader
            .position_of(&Call::Draw {
                indices: 3,
                instances: 1,
            })
            .unwrap();
        assert_eq!(calls.last(), Some(&Call::ResetTextureUnits));
        assert_eq!(draw, calls.len() - 2);
    }

    #[test]
    fn untextured_mesh_reports_no_diffuse() {
        let m = mesh(vec![vertex(0.0, 0.0, 0.0); 3], vec![0, 1, 2]);
        let mut shader = RecordingShader::default();
        m.draw(&mut shader, &TextureCache::new());

        assert!(shader
            .calls
            .contains(&Call::Bool(uniforms::HAS_DIFFUSE_TEXTURE.into(), false)));
    }

    #[test]
    fn instanced_draw_forwards_amount() {
        let m = mesh(vec![vertex(0.0, 0.0, 0.0); 3], vec![0, 1, 2]);
        let mut shader = RecordingShader::default();
        m.draw_instanced(&mut shader, &TextureCache::new(), 4);

        assert_eq!(
            shader.calls,
            vec![
                Call::Draw {
                    indices: 3,
                    instances: 4
                },
                Call::ResetTextureUnits
            ]
        );
    }

    #[test]
    fn generated_normal_faces_winding() {
        let mut vertices = vec![
            Vertex3D::default(),
            Vertex3D {
                position: [1.0, 0.0, 0.0],
                ..Default::default()
            },
            Vertex3D {
                position: [0.0, 1.0, 0.0],
                ..Default::default()
            },
        ];
        calculate_face_normals(&mut vertices, &[0, 1, 2]);
        for v in &vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn tangents_follow_uv_axes() {
        let mut vertices = vec![
            Vertex3D::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
            Vertex3D::new([2.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex3D::new([0.0, 2.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
        ];
        calculate_tangents(&mut vertices, &[0, 1, 2]);
        for v in &vertices {
            assert_eq!(v.tangent, [1.0, 0.0, 0.0]);
            assert_eq!(v.bitangent, [0.0, 1.0, 0.0]);
        }

        let mut flat = vec![Vertex3D::default(); 3];
        flat[1].position = [1.0, 0.0, 0.0];
        flat[2].position = [0.0, 1.0, 0.0];
        calculate_tangents(&mut flat, &[0, 1, 2]);
        assert!(flat.iter().all(|v| v.tangent == [0.0; 3]));
    }
}
