//! Imported 3D assets
//!
//! A [`Model`] is one OBJ file decomposed into [`Mesh`]es, plus the textures
//! those meshes reference. Import is all-or-nothing: either every sub-mesh
//! converts or [`Model::load`] returns an error and nothing is kept.

use std::path::{Path, PathBuf};

use cgmath::Vector3;
use thiserror::Error;

use super::{
    bounds::BoundingBox,
    mesh::{self, Mesh, MeshError},
    vertex::Vertex3D,
};
use crate::gfx::{
    rendering::shader::Shader,
    resources::{
        material::Material,
        texture::{TextureCache, TextureId, TextureKind},
    },
};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to import '{path}': {source}")]
    Import {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("'{path}' contains no meshes")]
    EmptyScene { path: PathBuf },
    #[error("mesh '{mesh}' in '{path}' is invalid: {reason}")]
    InvalidMesh {
        path: PathBuf,
        mesh: String,
        #[source]
        reason: MeshError,
    },
}

pub struct Model {
    path: PathBuf,
    meshes: Vec<Mesh>,
    textures: TextureCache,
    bounds: BoundingBox,
}

impl Model {
    /// Imports an OBJ file (and its MTL library when present).
    ///
    /// Faces are triangulated, missing normals are generated, tangents are
    /// derived from texture coordinates and every mesh is optimized once.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let (shapes, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| ModelError::Import {
            path: path.to_path_buf(),
            source,
        })?;

        let materials = materials.unwrap_or_else(|err| {
            log::warn!("No MTL library for '{}' ({err}), using default materials", path.display());
            Vec::new()
        });

        let directory = path.parent().unwrap_or(Path::new(""));
        let mut textures = TextureCache::new();
        let mut meshes = Vec::with_capacity(shapes.len());

        for shape in shapes.iter().filter(|s| !s.mesh.indices.is_empty()) {
            let mesh = process_mesh(shape, &materials, directory, &mut textures).map_err(|reason| {
                ModelError::InvalidMesh {
                    path: path.to_path_buf(),
                    mesh: shape.name.clone(),
                    reason,
                }
            })?;
            log::debug!(
                "  mesh '{}': {} vertices, {} triangles, {} textures",
                shape.name,
                mesh.vertex_count(),
                mesh.triangle_count(),
                mesh.textures().len()
            );
            meshes.push(mesh);
        }

        if meshes.is_empty() {
            return Err(ModelError::EmptyScene {
                path: path.to_path_buf(),
            });
        }

        let mut model = Self {
            path: path.to_path_buf(),
            meshes,
            textures,
            bounds: BoundingBox::default(),
        };
        model.optimize_meshes();

        log::info!(
            "Loaded model '{}': {} meshes, {} vertices, {} triangles",
            path.display(),
            model.mesh_count(),
            model.vertex_count(),
            model.triangle_count()
        );
        Ok(model)
    }

    /// Optimizes every mesh (a no-op for meshes already optimized) and
    /// recomputes the bounding box from the resulting vertices.
    pub fn optimize_meshes(&mut self) {
        for mesh in &mut self.meshes {
            mesh.optimize();
        }
        self.update_bounds();
    }

    fn update_bounds(&mut self) {
        self.bounds = BoundingBox::from_positions(
            self.meshes
                .iter()
                .flat_map(|m| m.vertices().iter().map(|v| &v.position)),
        );
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn min_bounds(&self) -> Vector3<f32> {
        self.bounds.min
    }

    pub fn max_bounds(&self) -> Vector3<f32> {
        self.bounds.max
    }

    pub fn center(&self) -> Vector3<f32> {
        self.bounds.center()
    }

    pub fn size(&self) -> Vector3<f32> {
        self.bounds.size()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(Mesh::vertex_count).sum()
    }

    pub fn draw<'a>(&'a self, shader: &mut dyn Shader<'a>) {
        for mesh in &self.meshes {
            mesh.draw(shader, &self.textures);
        }
    }

    pub fn draw_instanced<'a>(&'a self, shader: &mut dyn Shader<'a>, amount: u32) {
        for mesh in &self.meshes {
            mesh.draw_instanced(shader, &self.textures, amount);
        }
    }

    /// Uploads mesh buffers and textures that are not on the GPU yet.
    pub fn init_gpu_resources(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture_layout: &wgpu::BindGroupLayout,
    ) {
        for mesh in &mut self.meshes {
            mesh.init_gpu_resources(device);
        }
        self.textures.init_gpu_resources(device, queue, texture_layout);
    }
}

fn process_mesh(
    shape: &tobj::Model,
    materials: &[tobj::Material],
    directory: &Path,
    textures: &mut TextureCache,
) -> Result<Mesh, MeshError> {
    let raw = &shape.mesh;
    let vertex_count = raw.positions.len() / 3;
    mesh::validate_indices(&raw.indices, vertex_count)?;

    let has_normals = raw.normals.len() == raw.positions.len();
    let has_tex_coords = raw.texcoords.len() / 2 == vertex_count;

    let mut vertices: Vec<Vertex3D> = (0..vertex_count)
        .map(|i| {
            let position = [
                raw.positions[i * 3],
                raw.positions[i * 3 + 1],
                raw.positions[i * 3 + 2],
            ];
            let normal = if has_normals {
                [raw.normals[i * 3], raw.normals[i * 3 + 1], raw.normals[i * 3 + 2]]
            } else {
                [0.0; 3]
            };
            // OBJ texture space has v pointing up; wgpu samples with v pointing down.
            let tex_coords = if has_tex_coords {
                [raw.texcoords[i * 2], 1.0 - raw.texcoords[i * 2 + 1]]
            } else {
                [0.0; 2]
            };
            Vertex3D::new(position, normal, tex_coords)
        })
        .collect();

    if !has_normals {
        log::debug!("'{}' has no normals, generating", shape.name);
        mesh::calculate_face_normals(&mut vertices, &raw.indices);
    }
    mesh::calculate_tangents(&mut vertices, &raw.indices);

    let mtl = raw.material_id.and_then(|id| materials.get(id));
    let material = mtl.map(Material::from_mtl).unwrap_or_default();
    let texture_ids = mtl
        .map(|mtl| material_textures(mtl, directory, textures))
        .unwrap_or_default();

    Mesh::new(vertices, raw.indices.clone(), texture_ids, material)
}

/// Texture slots of an MTL material, registered in the model's cache in
/// diffuse, specular, normal, height order.
fn material_textures(
    mtl: &tobj::Material,
    directory: &Path,
    cache: &mut TextureCache,
) -> Vec<TextureId> {
    let height = mtl
        .unknown_param
        .get("disp")
        .or_else(|| mtl.unknown_param.get("map_disp"));

    [
        (mtl.diffuse_texture.as_ref(), TextureKind::Diffuse),
        (mtl.specular_texture.as_ref(), TextureKind::Specular),
        (mtl.normal_texture.as_ref(), TextureKind::Normal),
        (height, TextureKind::Height),
    ]
    .into_iter()
    .filter_map(|(file, kind)| {
        let file = file?.trim();
        (!file.is_empty()).then(|| cache.get_or_insert(&directory.join(file), kind))
    })
    .collect()
}
