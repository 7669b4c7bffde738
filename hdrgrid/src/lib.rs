//! hdrgrid - Bilateral grid filtering and HDR radiance recovery for Rust
//!
//! # Overview
//!
//! hdrgrid provides two independent computational-photography pipelines:
//!
//! - Edge-preserving smoothing with the bilateral grid, including the cross
//!   (joint) bilateral filter
//! - HDR radiance recovery: camera response curve solving, radiance map
//!   merging, rescaling for display, and equirectangular environment maps
//!   from mirror-ball images
//!
//! plus image I/O to and from normalized floating-point RGB.
//!
//! # Example
//!
//! ```
//! use hdrgrid::FPix;
//! use hdrgrid::filter::{BilateralGridParams, bilateral_filter};
//!
//! // Smooth a step edge without blurring it
//! let pix = FPix::from_fn(64, 48, |x, _| if x < 32 { 0.0 } else { 1.0 }).unwrap();
//! let params = BilateralGridParams::new().with_sigma_spatial(4.0);
//! let out = bilateral_filter(&pix, &params).unwrap();
//! assert_eq!(out.dimensions(), (64, 48));
//! ```

// Re-export core types (primary data structures used everywhere)
pub use hdrgrid_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use hdrgrid_filter as filter;
pub use hdrgrid_hdr as hdr;
pub use hdrgrid_io as io;
