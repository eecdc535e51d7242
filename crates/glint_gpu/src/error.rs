//! GPU layer error types

use thiserror::Error;

use crate::compile::{ShaderStage, UniformType};

/// Errors from building or driving a shader program
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProgramError {
    /// A shader stage failed to parse or validate
    #[error("{stage} shader compilation failed:\n{log}")]
    Compile { stage: ShaderStage, log: String },

    /// The stages compiled but do not fit together
    #[error("Program link failed: {0}")]
    Link(String),

    /// No uniform with this name is declared by either stage
    #[error("Invalid uniform: {0}")]
    UnknownUniform(String),

    /// No vertex input with this name is declared by the vertex stage
    #[error("Invalid attribute: {0}")]
    UnknownAttribute(String),

    /// The setter does not match the uniform's declared type
    #[error("Uniform {name} is declared as {found}, cannot set it as {expected}")]
    UniformType {
        name: String,
        expected: UniformType,
        found: UniformType,
    },
}

/// Errors from creating a GPU-backed context
#[derive(Error, Debug)]
pub enum ContextError {
    /// No adapter satisfied the request
    #[error("No suitable GPU adapter found")]
    AdapterNotFound,

    /// The adapter refused to create a device
    #[error("Failed to request GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// Result type for program operations
pub type Result<T> = std::result::Result<T, ProgramError>;
