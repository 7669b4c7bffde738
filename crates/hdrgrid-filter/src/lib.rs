//! hdrgrid-filter - Edge-preserving filtering
//!
//! This crate provides:
//!
//! - Bilateral and cross-bilateral filtering on a bilateral grid
//! - The exact (brute-force) bilateral filter
//! - 2D convolution and Gaussian blur of floating-point images
//! - 3D convolution of sparse grids

pub mod bilateral;
pub mod convolve;
mod error;
pub mod grid;
pub mod kernel;
pub mod reconstruct;

pub use error::{FilterError, FilterResult};
pub use kernel::{Kernel, Kernel3};

// Re-export commonly used functions
pub use bilateral::{
    BilateralGridParams, ResolvedParams, bilateral_exact, bilateral_filter, bilateral_grid,
    cross_bilateral_filter,
};
pub use convolve::{convolve3, fpix_convolve, gaussian_blur};
pub use grid::{BilateralGrid, Grid3, GridGeometry};
pub use reconstruct::{ActiveCell, ActiveCells, reconstruct};
