//! Camera response curve recovery
//!
//! Given the same scene pixels observed under several exposure times, the
//! log inverse response `g` satisfies `g(Z_ij) = ln E_j + ln dt_i`. `gsolve`
//! recovers the 256 values of `g` and the log irradiance `ln E_j` of every
//! sampled pixel from one sparse least-squares system:
//!
//! ```text
//! w(Z_ij) * (g(Z_ij) - lE_j)        = w(Z_ij) * B_i     (N * P data rows)
//! g(128)                            = 0                 (scale fixing row)
//! lambda * (g(k) - 2 g(k+1) + g(k+2)) = 0               (254 smoothness rows)
//! ```
//!
//! Unknowns are ordered `[g(0..256), lE(0..P)]`.

use crate::lsmr::{LsmrOptions, solve_least_squares};
use crate::sparse::TripletMatrix;
use crate::weight::{quantize, weight_table};
use crate::{HdrError, HdrResult};
use hdrgrid_core::FPix;

/// Number of intensity levels
pub const LEVELS: usize = 256;

/// Level pinned to `g = 0`
pub const MID_LEVEL: usize = 128;

/// N x P matrix of observed 8-bit intensities: P pixels in each of N images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observations {
    n_images: usize,
    n_samples: usize,
    /// Row-major, one row per image
    data: Vec<u8>,
}

impl Observations {
    /// Create from row-major data (`n_images` rows of `n_samples`)
    pub fn new(n_images: usize, n_samples: usize, data: Vec<u8>) -> HdrResult<Self> {
        if n_images == 0 || n_samples == 0 {
            return Err(HdrError::InvalidShape(format!(
                "observations must be non-empty, got {}x{}",
                n_images, n_samples
            )));
        }
        if data.len() != n_images * n_samples {
            return Err(HdrError::InvalidShape(format!(
                "expected {} observations, got {}",
                n_images * n_samples,
                data.len()
            )));
        }
        Ok(Observations {
            n_images,
            n_samples,
            data,
        })
    }

    /// Create from one row per image; all rows must have the same length
    pub fn from_rows(rows: &[Vec<u8>]) -> HdrResult<Self> {
        let n_samples = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != n_samples) {
            return Err(HdrError::InvalidShape(
                "observation rows differ in length".to_string(),
            ));
        }
        Self::new(rows.len(), n_samples, rows.concat())
    }

    /// Sample an `nx` x `ny` lattice of pixels from an exposure stack
    ///
    /// `images` hold intensities in [0, 1]. Lattice points sit at the
    /// centers of an `nx` x `ny` partition of the image.
    pub fn sample_grid(images: &[FPix], nx: u32, ny: u32) -> HdrResult<Self> {
        let first = images
            .first()
            .ok_or_else(|| HdrError::InvalidShape("empty exposure stack".to_string()))?;
        let (w, h) = first.dimensions();
        for img in images {
            first.check_same_size(img)?;
        }
        if nx == 0 || ny == 0 || nx > w || ny > h {
            return Err(HdrError::InvalidParameter(format!(
                "sample lattice {}x{} does not fit a {}x{} image",
                nx, ny, w, h
            )));
        }

        let xs: Vec<u32> = (0..nx).map(|k| lattice(k, nx, w)).collect();
        let ys: Vec<u32> = (0..ny).map(|k| lattice(k, ny, h)).collect();

        let mut data = Vec::with_capacity(images.len() * xs.len() * ys.len());
        for img in images {
            for &y in &ys {
                for &x in &xs {
                    data.push(quantize(img.get_pixel_unchecked(x, y))?);
                }
            }
        }
        Self::new(images.len(), xs.len() * ys.len(), data)
    }

    /// Number of images (N)
    pub fn n_images(&self) -> usize {
        self.n_images
    }

    /// Number of sampled pixels (P)
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Intensity of sample `j` in image `i`
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> u8 {
        self.data[i * self.n_samples + j]
    }

    /// Observations of image `i`
    pub fn row(&self, i: usize) -> &[u8] {
        &self.data[i * self.n_samples..(i + 1) * self.n_samples]
    }
}

fn lattice(k: u32, n: u32, size: u32) -> u32 {
    ((2 * k as u64 + 1) * size as u64 / (2 * n as u64)) as u32
}

/// Solved response curve
#[derive(Debug, Clone)]
pub struct ResponseCurve {
    /// Log inverse response `g(z)` for z in 0..=255; `g(128) == 0`
    pub g: Vec<f64>,
    /// Log irradiance of each sampled pixel
    pub log_irradiance: Vec<f64>,
    /// Solver iterations
    pub iterations: usize,
    /// Residual norm of the least-squares system
    pub residual_norm: f64,
}

impl ResponseCurve {
    /// `g(z)`
    #[inline]
    pub fn response(&self, z: u8) -> f64 {
        self.g[z as usize]
    }
}

/// Solve for the response curve with default solver options
///
/// # Arguments
/// * `z` - Observed intensities, N images x P pixels
/// * `log_exposures` - Log exposure time of each image (length N)
/// * `lambda` - Smoothness weight (>= 0)
/// * `weight` - Weighting function over intensities
pub fn gsolve(
    z: &Observations,
    log_exposures: &[f64],
    lambda: f64,
    weight: impl Fn(u8) -> f64,
) -> HdrResult<ResponseCurve> {
    gsolve_with_options(z, log_exposures, lambda, weight, &LsmrOptions::default())
}

/// Solve for the response curve
///
/// # Errors
///
/// - `HdrError::InvalidShape` if `log_exposures.len() != z.n_images()`
/// - `HdrError::InvalidParameter` for a negative or non-finite `lambda`,
///   non-finite exposures, or a weight that is negative or non-finite
/// - `HdrError::SolverDivergence` if LSMR exhausts its iterations
/// - `HdrError::NumericalError` if the solution is not finite
pub fn gsolve_with_options(
    z: &Observations,
    log_exposures: &[f64],
    lambda: f64,
    weight: impl Fn(u8) -> f64,
    options: &LsmrOptions,
) -> HdrResult<ResponseCurve> {
    let n = z.n_images();
    let p = z.n_samples();
    if log_exposures.len() != n {
        return Err(HdrError::InvalidShape(format!(
            "{} log exposures for {} images",
            log_exposures.len(),
            n
        )));
    }
    if log_exposures.iter().any(|b| !b.is_finite()) {
        return Err(HdrError::InvalidParameter(
            "log exposures must be finite".to_string(),
        ));
    }
    if !(lambda >= 0.0 && lambda.is_finite()) {
        return Err(HdrError::InvalidParameter(format!(
            "lambda must be non-negative and finite, got {}",
            lambda
        )));
    }
    let w = weight_table(weight)?;

    let rows = n * p + 1 + (LEVELS - 2);
    let cols = LEVELS + p;
    let mut a = TripletMatrix::with_capacity(rows, cols, 2 * n * p + 1 + 3 * (LEVELS - 2));
    let mut b = vec![0.0; rows];

    let mut k = 0;
    for (i, &bi) in log_exposures.iter().enumerate() {
        for j in 0..p {
            let zij = z.get(i, j);
            let wij = w[zij as usize];
            a.add(k, zij as usize, wij)?;
            a.add(k, LEVELS + j, -wij)?;
            b[k] = wij * bi;
            k += 1;
        }
    }

    a.add(k, MID_LEVEL, 1.0)?;
    k += 1;

    for level in 0..LEVELS - 2 {
        a.add(k, level, lambda)?;
        a.add(k, level + 1, -2.0 * lambda)?;
        a.add(k, level + 2, lambda)?;
        k += 1;
    }

    let solution = solve_least_squares(&a, &b, options)?;
    let mut x = solution.x;
    if x.iter().any(|v| !v.is_finite()) {
        return Err(HdrError::NumericalError(
            "response curve solution is not finite".to_string(),
        ));
    }

    // Every other row is unchanged by a common shift of g and lE
    let offset = x[MID_LEVEL];
    for v in &mut x {
        *v -= offset;
    }

    let log_irradiance = x.split_off(LEVELS);
    Ok(ResponseCurve {
        g: x,
        log_irradiance,
        iterations: solution.iterations,
        residual_norm: solution.residual_norm,
    })
}
