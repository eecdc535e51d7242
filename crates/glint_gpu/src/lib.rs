//! Glint GPU Layer
//!
//! Shader programs and sprite geometry on top of wgpu.
//!
//! - [`ShaderProgram`]: compiles and links a WGSL vertex/fragment pair, then
//!   resolves uniforms and vertex attributes by name
//! - [`RenderContext`]: the graphics context a program is bound to, backed by
//!   wgpu ([`WgpuContext`]) or by an in-memory recorder ([`RecordingContext`])
//! - [`make_quad`]: two-triangle textured quads for sprites

pub mod compile;
pub mod config;
pub mod context;
pub mod error;
pub mod program;
pub mod quad;
pub mod shaders;

pub use compile::{
    Attribute, LinkedShaders, ShaderStage, UniformBinding, UniformSlot, UniformType,
};
pub use config::ProgramConfig;
pub use context::{ProgramId, RecordingContext, RenderContext, WgpuContext};
pub use error::{ContextError, ProgramError, Result};
pub use program::ShaderProgram;
pub use quad::{make_quad, quad_floats, QuadVertex};
