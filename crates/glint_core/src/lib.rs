//! Glint Core
//!
//! Foundational math for the Glint 2D rendering toolkit:
//!
//! - **Mat3**: column-major 3x3 matrices for 2D affine transforms
//! - **MathError**: failures of matrix operations (singular inversion, bad arity)
//!
//! # Example
//!
//! ```rust
//! use glint_core::Mat3;
//!
//! let m = Mat3::multiply(&[
//!     Mat3::translation(5.0, 7.0),
//!     Mat3::scale(2.0, 2.0),
//! ])
//! .unwrap();
//!
//! assert_eq!(m.transform_point(1.0, 1.0), [7.0, 9.0]);
//! ```

pub mod error;
pub mod mat3;

pub use error::{MathError, Result};
pub use mat3::Mat3;
