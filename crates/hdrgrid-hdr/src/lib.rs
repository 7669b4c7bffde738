//! hdrgrid-hdr - High dynamic range radiance recovery
//!
//! This crate provides:
//!
//! - Camera response curve recovery from an exposure stack (`gsolve`)
//! - Sparse matrices and the LSMR least-squares solver behind it
//! - Weighting functions and sample selection
//! - Radiance map merging
//! - Linear rescaling of log radiance for display
//! - Equirectangular environment maps from mirror-ball images
//!
//! # Example
//!
//! ```ignore
//! use hdrgrid_hdr::{Observations, gsolve, hat_weight, radiance_map};
//!
//! let z = Observations::sample_grid(&images, 10, 10)?;
//! let curve = gsolve(&z, &log_exposures, 50.0, hat_weight)?;
//! let log_radiance = radiance_map(&images, &log_exposures, &curve.g, hat_weight)?;
//! ```

pub mod equirect;
mod error;
pub mod gsolve;
pub mod lsmr;
pub mod radiance;
pub mod rescale;
pub mod sparse;
pub mod weight;

pub use error::{HdrError, HdrResult};

// Re-export commonly used items
pub use equirect::{
    EQUIRECT_HEIGHT, EQUIRECT_WIDTH, ScatteredInterpolator, equirectangular,
    mirror_ball_reflections, reflection_angles,
};
pub use gsolve::{LEVELS, MID_LEVEL, Observations, ResponseCurve, gsolve, gsolve_with_options};
pub use lsmr::{LsmrOptions, LsmrSolution, solve_least_squares};
pub use radiance::{radiance_map, radiance_map_rgb};
pub use rescale::{rescale_linear, rescale_linear_rgb, rescale_nonzero, rescale_nonzero_rgb};
pub use sparse::{Triplet, TripletMatrix};
pub use weight::{hat_weight, quantize, uniform_weight};
