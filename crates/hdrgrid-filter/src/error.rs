//! Error types for hdrgrid-filter

use thiserror::Error;

/// Errors that can occur during filtering operations
#[derive(Debug, Error)]
pub enum FilterError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] hdrgrid_core::Error),

    /// Invalid kernel
    #[error("invalid kernel: {0}")]
    InvalidKernel(String),

    /// Signal and edge map differ in shape
    #[error("invalid shape: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    InvalidShape {
        /// Shape of the signal (width, height)
        expected: (u32, u32),
        /// Shape of the offending input (width, height)
        actual: (u32, u32),
    },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// No finite sample reached the grid, so nothing can be reconstructed
    #[error("interpolation gap: the grid holds no samples")]
    InterpolationGap,
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;
