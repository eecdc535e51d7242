//! Math error types

use thiserror::Error;

/// Errors raised by matrix operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// The matrix has a zero determinant and cannot be inverted
    #[error("Matrix is not invertible")]
    SingularMatrix,

    /// An operation was called with unusable arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for math operations
pub type Result<T> = std::result::Result<T, MathError>;
