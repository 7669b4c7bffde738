//! hdrgrid Core - Basic data structures for computational photography
//!
//! This crate provides the fundamental data structures used throughout
//! the hdrgrid workspace:
//!
//! - [`FPix`] - Floating-point single-channel image
//! - [`FPixRgb`] - Planar three-channel floating-point image
//! - [`Error`] / [`Result`] - Shared error type

pub mod error;
pub mod fpix;

pub use error::{Error, Result};
pub use fpix::{FPix, FPixRgb};
