//! I/O error types
//!
//! Provides a unified error type for all image I/O operations. Codec
//! errors from the `image` crate are mapped into `IoError` variants so that
//! callers only need to handle one error type.

use thiserror::Error;

/// Error type for image I/O operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// Standard I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The decoder rejected the input
    #[error("decode error: {0}")]
    DecodeError(String),

    /// The encoder rejected the output
    #[error("encode error: {0}")]
    EncodeError(String),

    /// An error from the core library (e.g. invalid dimensions)
    #[error("core error: {0}")]
    Core(#[from] hdrgrid_core::Error),
}

/// Convenience alias for I/O results.
pub type IoResult<T> = Result<T, IoError>;
