//! Material textures and the per-model texture cache
//!
//! Meshes refer to textures through [`TextureId`] handles into the
//! [`TextureCache`] owned by their model. The cache is keyed by resolved file
//! path, so a file referenced by several sub-meshes is decoded and uploaded
//! once per model.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use thiserror::Error;

use super::texture_resource::{fit_within_limit, TextureResource};

/// Semantic slot a texture fills in the lighting shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
    Normal,
    Height,
}

impl TextureKind {
    pub const ALL: [TextureKind; 4] = [
        TextureKind::Diffuse,
        TextureKind::Specular,
        TextureKind::Normal,
        TextureKind::Height,
    ];

    /// Sampler name prefix; the shader expects `<prefix><n>` with `n` starting at 1.
    pub fn sampler_prefix(self) -> &'static str {
        match self {
            TextureKind::Diffuse => "texture_diffuse",
            TextureKind::Specular => "texture_specular",
            TextureKind::Normal => "texture_normal",
            TextureKind::Height => "texture_height",
        }
    }

    /// Sampler uniform name for the `number`-th texture of this kind (1-based).
    pub fn sampler_name(self, number: u32) -> String {
        format!("{}{}", self.sampler_prefix(), number)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Running 1-based counters used to name samplers while binding a mesh.
#[derive(Debug, Default)]
pub struct SamplerCounters([u32; 4]);

impl SamplerCounters {
    /// Returns the sampler name for the next texture of `kind`.
    pub fn next_name(&mut self, kind: TextureKind) -> String {
        let counter = &mut self.0[kind.index()];
        *counter += 1;
        kind.sampler_name(*counter)
    }
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode texture '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Opaque handle into a model's [`TextureCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub(crate) usize);

/// GPU side of a texture, created by [`TextureCache::init_gpu_resources`].
pub struct GpuTexture {
    pub resource: TextureResource,
    pub bind_group: wgpu::BindGroup,
    /// False when decoding failed and the placeholder was uploaded instead.
    pub decoded: bool,
}

/// A material texture referenced by one or more meshes.
pub struct Texture {
    pub id: TextureId,
    pub kind: TextureKind,
    pub path: PathBuf,
    gpu: Option<GpuTexture>,
}

impl Texture {
    pub fn gpu(&self) -> Option<&GpuTexture> {
        self.gpu.as_ref()
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("path", &self.path)
            .field("uploaded", &self.gpu.is_some())
            .finish()
    }
}

/// Path-keyed texture store owned by a single model.
#[derive(Debug, Default)]
pub struct TextureCache {
    textures: Vec<Texture>,
    by_path: HashMap<PathBuf, TextureId>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `path`, registering it on first use.
    ///
    /// A path already in the cache keeps the kind it was first registered
    /// with.
    pub fn get_or_insert(&mut self, path: &Path, kind: TextureKind) -> TextureId {
        if let Some(&id) = self.by_path.get(path) {
            return id;
        }

        let id = TextureId(self.textures.len());
        self.textures.push(Texture {
            id,
            kind,
            path: path.to_path_buf(),
            gpu: None,
        });
        self.by_path.insert(path.to_path_buf(), id);
        id
    }

    pub fn get(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Texture> {
        self.textures.iter()
    }

    /// Decodes and uploads every texture that has no GPU resource yet.
    ///
    /// A decode failure is logged and the texture gets a 1x1 white
    /// placeholder, so it stays bindable but shows no image. Images larger
    /// than the device's 2D texture limit are downscaled before upload.
    pub fn init_gpu_resources(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
    ) {
        let max_dimension = device.limits().max_texture_dimension_2d;
        for texture in self.textures.iter_mut().filter(|t| t.gpu.is_none()) {
            let label = texture.path.to_string_lossy();
            let (resource, decoded) = match decode_image(&texture.path) {
                Ok(image) => {
                    let image = match fit_within_limit(&image, max_dimension) {
                        Some(fitted) => {
                            log::warn!(
                                "Texture '{label}' is {}x{}, above the device limit of {max_dimension}; downscaled to {}x{}",
                                image.width(),
                                image.height(),
                                fitted.width(),
                                fitted.height()
                            );
                            fitted
                        }
                        None => image,
                    };
                    (
                        TextureResource::create_mipmapped_from_image(device, queue, &image, &label),
                        true,
                    )
                }
                Err(err) => {
                    log::warn!("{err}; using blank placeholder");
                    (TextureResource::create_blank(device, queue, &label), false)
                }
            };

            let bind_group = resource.create_bind_group(device, layout, &label);
            texture.gpu = Some(GpuTexture {
                resource,
                bind_group,
                decoded,
            });
        }
    }
}

/// Decodes an image file into RGBA8 pixels.
pub fn decode_image(path: &Path) -> Result<image::RgbaImage, TextureError> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })
}
