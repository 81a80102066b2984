//! Core rendering functionality
//!
//! Scene code talks to the GPU only through the [`Shader`] trait. The
//! [`FrameRecorder`] implementation collects a frame's uniforms and draws,
//! which [`RenderEngine`] then replays with wgpu.

pub mod frame_recorder;
pub mod pipeline_manager;
pub mod render_engine;
pub mod renderer;
pub mod shader;
pub mod uniforms;

pub use frame_recorder::{DrawCommand, FrameRecorder};
pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::{FrameStats, RenderEngine, RenderError};
pub use renderer::Renderer;
pub use shader::Shader;
