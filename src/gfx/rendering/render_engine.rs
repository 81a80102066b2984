//! WGPU-based rendering engine
//!
//! Owns the surface, device, depth buffer, the lighting pipeline and the
//! uniform buffers it reads. Each frame the scene is recorded through a
//! [`FrameRecorder`], the recorded uniforms are uploaded, and the draws are
//! replayed in a single render pass followed by an optional UI overlay.

use std::{collections::HashSet, sync::Arc};

use thiserror::Error;
use wgpu::TextureFormat;

use super::{
    frame_recorder::FrameRecorder,
    pipeline_manager::{PipelineConfig, PipelineManager},
    renderer::Renderer,
};
use crate::gfx::{
    camera::Camera,
    resources::{
        global_bindings::{GlobalBindings, GlobalUBO, ObjectBindings, ObjectUBO, ObjectUniform},
        texture_resource::TextureResource,
    },
    scene::{mesh::DrawMesh, scene::Scene},
};

const PHONG_PIPELINE: &str = "Phong";
const INITIAL_DRAW_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,
    #[error("pipeline setup failed: {0}")]
    Pipeline(String),
    #[error("lost the surface for good: {0}")]
    Frame(wgpu::SurfaceError),
}

/// What one frame drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub vertices: u32,
}

impl FrameStats {
    /// Counts one encoded draw. Counters saturate instead of wrapping.
    pub fn record_draw(&mut self, vertex_count: usize, instances: u32) {
        let vertex_count = u32::try_from(vertex_count).unwrap_or(u32::MAX);
        self.draw_calls = self.draw_calls.saturating_add(1);
        self.vertices = self
            .vertices
            .saturating_add(vertex_count.saturating_mul(instances));
    }
}

pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    object_ubo: ObjectUBO,
    object_bindings: ObjectBindings,
    texture_layout: wgpu::BindGroupLayout,
    blank_texture_bind_group: wgpu::BindGroup,
    warned_uniforms: HashSet<String>,
}

impl RenderEngine {
    /// Creates the GPU context for `window` and builds the lighting pipeline.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<RenderEngine, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let info = adapter.get_info();
        log::info!("Using adapter '{}' ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let mut config = surface
            .get_default_config(&adapter, width.max(1), height.max(1))
            .ok_or(RenderError::UnsupportedSurface)?;
        let capabilities = surface.get_capabilities(&adapter);
        if let Some(linear) = capabilities.formats.iter().copied().find(|f| !f.is_srgb()) {
            config.format = linear;
        }
        config.present_mode = wgpu::PresentMode::AutoVsync;
        surface.configure(&device, &config);
        let format = config.format;

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);
        let object_ubo = ObjectUBO::new(&device, INITIAL_DRAW_CAPACITY);
        let object_bindings = ObjectBindings::new(&device, &object_ubo);

        let texture_layout = TextureResource::bind_group_layout(&device);
        let blank_texture = TextureResource::create_blank(&device, &queue, "blank_texture");
        let blank_texture_bind_group =
            blank_texture.create_bind_group(&device, &texture_layout, "blank_texture");

        let device: Arc<wgpu::Device> = device.into();
        let queue: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device.clone());

        pipeline_manager.load_shader("phong", include_str!("phong.wgsl"));
        pipeline_manager.register_pipeline(
            PHONG_PIPELINE,
            PipelineConfig::default()
                .with_label(PHONG_PIPELINE)
                .with_shader("phong")
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_alpha_blended_target(format)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    object_bindings.bind_group_layout().clone(),
                    texture_layout.clone(),
                ]),
        );
        pipeline_manager
            .create_all_pipelines()
            .map_err(|errors| RenderError::Pipeline(errors.join("; ")))?;

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_texture,
            format,
            pipeline_manager,
            global_ubo,
            global_bindings,
            object_ubo,
            object_bindings,
            texture_layout,
            blank_texture_bind_group,
            warned_uniforms: HashSet::new(),
        })
    }

    /// Renders `scene` from `camera`, then the optional UI overlay.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped
    /// (returning empty stats); only running out of memory is an error.
    pub fn render_frame<F>(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        renderer: &Renderer,
        ui_callback: Option<F>,
    ) -> Result<FrameStats, RenderError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let Some(pipeline) = self.pipeline_manager.pipeline(PHONG_PIPELINE) else {
            return Err(RenderError::Pipeline(format!(
                "'{PHONG_PIPELINE}' was never built"
            )));
        };

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(FrameStats::default());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(RenderError::Frame(wgpu::SurfaceError::OutOfMemory));
            }
            Err(e) => {
                log::warn!("Skipping frame: {e}");
                return Ok(FrameStats::default());
            }
        };
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut recorder = FrameRecorder::new();
        renderer.render(scene, camera, self.aspect_ratio(), &mut recorder);

        for name in recorder.unknown_uniforms() {
            if self.warned_uniforms.insert(name.clone()) {
                log::warn!("Lighting shader has no uniform named '{name}'");
            }
        }

        self.global_ubo.update_content(&self.queue, *recorder.globals());
        let objects: Vec<ObjectUniform> = recorder.draws().iter().map(|d| d.uniform).collect();
        if self.object_ubo.write_all(&self.device, &self.queue, &objects) {
            log::debug!("Per-draw uniform buffer grew to {} draws", objects.len());
            self.object_bindings.rebind(&self.device, &self.object_ubo);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let mut stats = FrameStats::default();
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(renderer.lighting.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            for (i, draw) in recorder.draws().iter().enumerate() {
                let texture_bind_group = draw
                    .diffuse_texture
                    .and_then(|t| t.gpu())
                    .map(|gpu| &gpu.bind_group)
                    .unwrap_or(&self.blank_texture_bind_group);

                render_pass.set_bind_group(
                    1,
                    self.object_bindings.bind_group(),
                    &[self.object_ubo.offset(i)],
                );
                render_pass.set_bind_group(2, texture_bind_group, &[]);
                if render_pass.draw_mesh_instanced(draw.mesh, 0..draw.instances) {
                    stats.record_draw(draw.mesh.vertex_count(), draw.instances);
                }
            }
        }
        log::trace!(
            "Frame: {} draw calls, {} vertices",
            stats.draw_calls,
            stats.vertices
        );

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(stats)
    }

    /// Reconfigures the surface and recreates the depth buffer. Zero-sized
    /// windows (minimized) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Uploads any mesh buffers and textures the scene does not have on the
    /// GPU yet.
    pub fn prepare_scene(&self, scene: &mut Scene) {
        scene.init_gpu_resources(&self.device, &self.queue, &self.texture_layout);
    }

    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}
