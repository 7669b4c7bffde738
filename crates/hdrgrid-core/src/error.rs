//! Error types for hdrgrid-core
//!
//! Provides a unified error type for all operations in the core crate.
//! Each variant captures enough context for diagnostics without exposing
//! internal implementation details.

use thiserror::Error;

/// hdrgrid core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid image dimensions
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Incompatible image sizes
    #[error("incompatible image sizes: {0}x{1} vs {2}x{3}")]
    IncompatibleSizes(u32, u32, u32, u32),

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
