//! Error types for hdrgrid-hdr

use thiserror::Error;

/// Errors that can occur during radiance recovery
#[derive(Debug, Error)]
pub enum HdrError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] hdrgrid_core::Error),

    /// Inputs whose sizes do not fit together
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The iterative solver used up its iteration budget
    #[error("solver did not converge after {iterations} iterations (residual {residual:e})")]
    SolverDivergence {
        /// Iterations performed
        iterations: usize,
        /// Residual norm at the last iterate
        residual: f64,
    },

    /// NaN or infinity in a computed result
    #[error("numerical error: {0}")]
    NumericalError(String),

    /// No defined sample to interpolate from
    #[error("interpolation gap: no defined sample")]
    InterpolationGap,
}

/// Result type for HDR operations
pub type HdrResult<T> = Result<T, HdrError>;
