//! GPU resource and pipeline-state abstraction over OpenGL 3.3 - 4.6.
#![deny(unused_must_use)]

#[macro_use]
pub mod error;
#[macro_use]
pub mod handle;

pub mod api;
pub mod buffer;
pub mod caps;
pub mod config;
pub mod context;
pub mod format;
pub mod framebuffer;
pub mod mapping;
pub mod pipeline;
pub mod program;
pub mod provider;
pub mod renderbuffer;
pub mod shader;
pub mod texture;
pub mod types;
pub mod vertex_array;

pub use crate::api::{Driver, Gl, NativeDriver, RecordingDriver};
pub use crate::caps::Caps;
pub use crate::config::ProviderConfig;
pub use crate::context::Context;
pub use crate::error::{ErrorCode, ErrorKind, GlError, GlResult};
pub use crate::format::PixelFormat;
pub use crate::handle::{Category, ResourceHandle};
pub use crate::mapping::{ShaderStage, Usage};
pub use crate::pipeline::{ComputePipelineState, PipelineDesc, PipelineState};
pub use crate::provider::{CommandList, ContextId, GraphicsInterface, Pipeline, PipelineId, Provider, ShaderId};
pub use crate::types::*;
