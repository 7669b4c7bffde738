//! Bilateral filtering (edge-preserving smoothing)
//!
//! The bilateral filter averages each pixel with its neighbors, weighting
//! them by a spatial Gaussian and by a range Gaussian on the difference of
//! their edge values. Smooth regions are flattened while edges survive.
//!
//! Two implementations are provided:
//!
//! - [`bilateral_grid`]: the fast approximation on a downsampled 3D
//!   bilateral grid (splat, blur, reconstruct). Its cost depends on the grid
//!   size, not on the spatial sigma.
//! - [`bilateral_exact`]: the brute-force filter, used as a reference.
//!
//! Passing a separate edge image gives the cross (joint) bilateral filter:
//! the signal is smoothed wherever the edge image is smooth.
//!
//! # Example
//!
//! ```ignore
//! use hdrgrid_filter::{BilateralGridParams, bilateral_filter};
//!
//! let params = BilateralGridParams::new().with_sigma_spatial(8.0);
//! let smoothed = bilateral_filter(&fpix, &params)?;
//! ```

use crate::grid::{BilateralGrid, GridGeometry};
use crate::reconstruct::reconstruct;
use crate::{FilterError, FilterResult, Kernel, Kernel3};
use hdrgrid_core::FPix;

/// Parameters of the bilateral grid filter
///
/// Every field is optional; missing values are derived from the input at
/// the start of each call (see [`BilateralGridParams::resolve`]).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BilateralGridParams {
    /// Lower end of the edge range; defaults to the edge image minimum
    pub edge_min: Option<f32>,
    /// Upper end of the edge range; defaults to the edge image maximum
    pub edge_max: Option<f32>,
    /// Spatial standard deviation in pixels; defaults to `min(w, h) / 16`
    pub sigma_spatial: Option<f32>,
    /// Range standard deviation; defaults to `0.1 * (edge_max - edge_min)`
    pub sigma_range: Option<f32>,
    /// Pixels per grid cell; defaults to `sigma_spatial`
    pub sampling_spatial: Option<f32>,
    /// Edge units per grid cell; defaults to `sigma_range`
    pub sampling_range: Option<f32>,
}

impl BilateralGridParams {
    /// All parameters derived from the input
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lower end of the edge range
    pub fn with_edge_min(mut self, edge_min: f32) -> Self {
        self.edge_min = Some(edge_min);
        self
    }

    /// Set the upper end of the edge range
    pub fn with_edge_max(mut self, edge_max: f32) -> Self {
        self.edge_max = Some(edge_max);
        self
    }

    /// Set the spatial standard deviation
    pub fn with_sigma_spatial(mut self, sigma: f32) -> Self {
        self.sigma_spatial = Some(sigma);
        self
    }

    /// Set the range standard deviation
    pub fn with_sigma_range(mut self, sigma: f32) -> Self {
        self.sigma_range = Some(sigma);
        self
    }

    /// Set the spatial sampling rate
    pub fn with_sampling_spatial(mut self, sampling: f32) -> Self {
        self.sampling_spatial = Some(sampling);
        self
    }

    /// Set the range sampling rate
    pub fn with_sampling_range(mut self, sampling: f32) -> Self {
        self.sampling_range = Some(sampling);
        self
    }

    /// Fill in the missing parameters from `edge` and validate the result
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidParameters` if a sigma or sampling rate is
    /// not positive and finite (a constant edge image with a derived range
    /// sigma ends up here), if an explicit edge range is empty, or if the
    /// edge image has no finite value.
    pub fn resolve(&self, edge: &FPix) -> FilterResult<ResolvedParams> {
        let observed = edge.finite_range();
        let edge_min = match (self.edge_min, observed) {
            (Some(v), _) => v as f64,
            (None, Some((lo, _))) => lo as f64,
            (None, None) => return Err(no_finite_edge()),
        };
        let edge_max = match (self.edge_max, observed) {
            (Some(v), _) => v as f64,
            (None, Some((_, hi))) => hi as f64,
            (None, None) => return Err(no_finite_edge()),
        };
        if !edge_min.is_finite() || !edge_max.is_finite() {
            return Err(FilterError::InvalidParameters(format!(
                "edge range [{}, {}] is not finite",
                edge_min, edge_max
            )));
        }
        if (self.edge_min.is_some() || self.edge_max.is_some()) && edge_max <= edge_min {
            return Err(FilterError::InvalidParameters(format!(
                "edge_max ({}) must exceed edge_min ({})",
                edge_max, edge_min
            )));
        }

        let sigma_spatial = match self.sigma_spatial {
            Some(v) => v as f64,
            None => edge.width().min(edge.height()) as f64 / 16.0,
        };
        let sigma_range = match self.sigma_range {
            Some(v) => v as f64,
            None => 0.1 * (edge_max - edge_min),
        };
        let sampling_spatial = self.sampling_spatial.map_or(sigma_spatial, f64::from);
        let sampling_range = self.sampling_range.map_or(sigma_range, f64::from);

        for (name, value) in [
            ("sigma_spatial", sigma_spatial),
            ("sigma_range", sigma_range),
            ("sampling_spatial", sampling_spatial),
            ("sampling_range", sampling_range),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(FilterError::InvalidParameters(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }

        Ok(ResolvedParams {
            edge_min,
            edge_max,
            sigma_spatial,
            sigma_range,
            sampling_spatial,
            sampling_range,
        })
    }
}

fn no_finite_edge() -> FilterError {
    FilterError::InvalidParameters("edge image has no finite value".to_string())
}

/// Fully specified, validated filter parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedParams {
    pub edge_min: f64,
    pub edge_max: f64,
    pub sigma_spatial: f64,
    pub sigma_range: f64,
    pub sampling_spatial: f64,
    pub sampling_range: f64,
}

impl ResolvedParams {
    /// Spatial sigma in grid cells
    pub fn derived_sigma_spatial(&self) -> f64 {
        self.sigma_spatial / self.sampling_spatial
    }

    /// Range sigma in grid cells
    pub fn derived_sigma_range(&self) -> f64 {
        self.sigma_range / self.sampling_range
    }

    /// Empty cells on each side of the spatial axes
    pub fn padding_xy(&self) -> usize {
        (2.0 * self.derived_sigma_spatial()).floor() as usize + 1
    }

    /// Empty cells on each side of the range axis
    pub fn padding_z(&self) -> usize {
        (2.0 * self.derived_sigma_range()).floor() as usize + 1
    }
}

/// Bilateral grid filter of `data` guided by `edge`
///
/// With `edge` omitted the filter is the ordinary bilateral filter. Pixels
/// of `data` that are NaN or infinite do not contribute to the result, but
/// still receive an output value.
///
/// # Errors
///
/// - `FilterError::InvalidShape` if `edge` and `data` differ in size
/// - `FilterError::InvalidParameters` for invalid parameters, non-finite
///   edge values or a grid larger than 2^24 cells
/// - `FilterError::InterpolationGap` if `data` has no finite value
pub fn bilateral_grid(
    data: &FPix,
    edge: Option<&FPix>,
    params: &BilateralGridParams,
) -> FilterResult<FPix> {
    let edge = edge.unwrap_or(data);
    check_shape(data, edge)?;
    if !edge.is_all_finite() {
        return Err(FilterError::InvalidParameters(
            "edge image contains non-finite values".to_string(),
        ));
    }

    let resolved = params.resolve(edge)?;
    let geometry = GridGeometry::new(data.width(), data.height(), &resolved)?;
    let grid = BilateralGrid::splat(data, edge, geometry)?;
    if grid.total_weight() == 0.0 {
        return Err(FilterError::InterpolationGap);
    }

    let kernel = Kernel3::bilateral_gaussian(
        resolved.derived_sigma_spatial(),
        resolved.derived_sigma_range(),
    )?;
    let blurred = grid.blur(&kernel);
    reconstruct(&blurred.active_cells(), blurred.geometry(), edge)
}

/// Bilateral filter: the grid filter with the signal as its own edge image
pub fn bilateral_filter(data: &FPix, params: &BilateralGridParams) -> FilterResult<FPix> {
    bilateral_grid(data, None, params)
}

/// Cross bilateral filter: smooth `data` while preserving the edges of `edge`
pub fn cross_bilateral_filter(
    data: &FPix,
    edge: &FPix,
    params: &BilateralGridParams,
) -> FilterResult<FPix> {
    bilateral_grid(data, Some(edge), params)
}

/// Apply the exact (brute-force) bilateral filter
///
/// The window half-width is `floor(2 * sigma_spatial)`; samples outside the
/// image replicate the border. Non-finite data values are ignored; a pixel
/// whose whole window is non-finite keeps its input value.
///
/// # Arguments
/// * `data` - Signal to smooth
/// * `edge` - Edge image; `None` uses `data`
/// * `sigma_spatial` - Spatial standard deviation in pixels (must be > 0.0)
/// * `sigma_range` - Range standard deviation in edge units (must be > 0.0)
pub fn bilateral_exact(
    data: &FPix,
    edge: Option<&FPix>,
    sigma_spatial: f32,
    sigma_range: f32,
) -> FilterResult<FPix> {
    let edge = edge.unwrap_or(data);
    check_shape(data, edge)?;
    if !(sigma_range > 0.0 && sigma_range.is_finite()) {
        return Err(FilterError::InvalidParameters(
            "sigma_range must be positive".to_string(),
        ));
    }
    if !(sigma_spatial > 0.0 && sigma_spatial.is_finite()) {
        return Err(FilterError::InvalidParameters(
            "sigma_spatial must be positive".to_string(),
        ));
    }

    let halfwidth = (2.0 * sigma_spatial) as u32;
    let spatial_kernel = Kernel::gaussian(2 * halfwidth + 1, sigma_spatial)?;
    let kw = spatial_kernel.width();
    let kcx = spatial_kernel.center_x() as i32;
    let kcy = spatial_kernel.center_y() as i32;
    let range_denom = 2.0 * sigma_range * sigma_range;

    let w = data.width() as i32;
    let h = data.height() as i32;
    let mut out = data.create_template();

    for y in 0..h {
        for x in 0..w {
            let center_edge = edge.get_pixel_unchecked(x as u32, y as u32);

            let mut sum = 0.0f64;
            let mut weight_sum = 0.0f64;

            for ky in 0..kw {
                for kx in 0..kw {
                    // Clamp to image boundaries (replicate border)
                    let sx = (x + kx as i32 - kcx).clamp(0, w - 1) as u32;
                    let sy = (y + ky as i32 - kcy).clamp(0, h - 1) as u32;

                    let value = data.get_pixel_unchecked(sx, sy);
                    if !value.is_finite() {
                        continue;
                    }
                    let diff = edge.get_pixel_unchecked(sx, sy) - center_edge;
                    let spatial_weight = spatial_kernel.get(kx, ky).unwrap_or(0.0);
                    let range_weight = (-diff * diff / range_denom).exp();

                    let weight = (spatial_weight * range_weight) as f64;
                    sum += value as f64 * weight;
                    weight_sum += weight;
                }
            }

            let result = if weight_sum > 0.0 {
                (sum / weight_sum) as f32
            } else {
                data.get_pixel_unchecked(x as u32, y as u32)
            };
            out.set_pixel_unchecked(x as u32, y as u32, result);
        }
    }

    Ok(out)
}

fn check_shape(data: &FPix, edge: &FPix) -> FilterResult<()> {
    if data.dimensions() != edge.dimensions() {
        return Err(FilterError::InvalidShape {
            expected: data.dimensions(),
            actual: edge.dimensions(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: u32, h: u32) -> FPix {
        FPix::from_fn(w, h, |x, y| (x + y) as f32 / (w + h - 2) as f32).unwrap()
    }

    #[test]
    fn test_resolve_defaults() {
        let edge = FPix::from_fn(32, 48, |x, _| x as f32 / 31.0 * 2.0 - 1.0).unwrap();
        let r = BilateralGridParams::new().resolve(&edge).unwrap();
        assert_eq!(r.edge_min, -1.0);
        assert_eq!(r.edge_max, 1.0);
        assert_eq!(r.sigma_spatial, 2.0);
        assert!((r.sigma_range - 0.2).abs() < 1e-12);
        assert_eq!(r.sampling_spatial, r.sigma_spatial);
        assert_eq!(r.sampling_range, r.sigma_range);
        assert_eq!(r.derived_sigma_spatial(), 1.0);
        assert_eq!(r.padding_xy(), 3);
    }

    #[test]
    fn test_resolve_explicit_overrides() {
        let edge = ramp(16, 16);
        let params = BilateralGridParams::new()
            .with_edge_min(-2.0)
            .with_edge_max(2.0)
            .with_sigma_spatial(3.0)
            .with_sampling_spatial(1.5)
            .with_sigma_range(0.5)
            .with_sampling_range(0.25);
        let r = params.resolve(&edge).unwrap();
        assert_eq!(r.edge_min, -2.0);
        assert_eq!(r.edge_max, 2.0);
        assert_eq!(r.derived_sigma_spatial(), 2.0);
        assert_eq!(r.derived_sigma_range(), 2.0);
        assert_eq!(r.padding_xy(), 5);
        assert_eq!(r.padding_z(), 5);
    }

    #[test]
    fn test_resolve_rejects_invalid() {
        let edge = ramp(8, 8);
        let bad = [
            BilateralGridParams::new().with_sigma_spatial(0.0),
            BilateralGridParams::new().with_sigma_range(-1.0),
            BilateralGridParams::new().with_sampling_spatial(f32::NAN),
            BilateralGridParams::new().with_edge_min(1.0).with_edge_max(0.5),
        ];
        for params in bad {
            assert!(matches!(
                params.resolve(&edge),
                Err(FilterError::InvalidParameters(_))
            ));
        }
    }

    #[test]
    fn test_constant_edge_with_derived_range_sigma() {
        let data = FPix::new_with_value(8, 8, 0.3).unwrap();
        assert!(matches!(
            bilateral_filter(&data, &BilateralGridParams::new()),
            Err(FilterError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let data = ramp(8, 8);
        let edge = ramp(8, 9);
        let params = BilateralGridParams::new().with_sigma_range(0.1);
        match cross_bilateral_filter(&data, &edge, &params) {
            Err(FilterError::InvalidShape { expected, actual }) => {
                assert_eq!(expected, (8, 8));
                assert_eq!(actual, (8, 9));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_edge_rejected() {
        let data = ramp(8, 8);
        let mut edge = ramp(8, 8);
        edge.set_pixel(3, 3, f32::INFINITY).unwrap();
        let params = BilateralGridParams::new().with_sigma_range(0.1);
        assert!(matches!(
            cross_bilateral_filter(&data, &edge, &params),
            Err(FilterError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_all_nan_data_is_gap() {
        let data = FPix::new_with_value(6, 6, f32::NAN).unwrap();
        let edge = ramp(6, 6);
        let params = BilateralGridParams::new();
        assert!(matches!(
            cross_bilateral_filter(&data, &edge, &params),
            Err(FilterError::InterpolationGap)
        ));
    }

    #[test]
    fn test_nan_data_pixels_are_filled() {
        let mut data = FPix::new_with_value(12, 12, 0.5).unwrap();
        data.set_pixel(4, 4, f32::NAN).unwrap();
        let edge = FPix::new_with_value(12, 12, 0.0).unwrap();
        let params = BilateralGridParams::new()
            .with_edge_min(0.0)
            .with_edge_max(1.0)
            .with_sigma_range(0.1);
        let out = cross_bilateral_filter(&data, &edge, &params).unwrap();
        for &v in out.data() {
            assert!((v - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_identity_with_degenerate_kernel() {
        let data = ramp(9, 7);
        let params = BilateralGridParams::new()
            .with_sigma_spatial(0.4)
            .with_sampling_spatial(1.0)
            .with_sigma_range(0.004)
            .with_sampling_range(0.01);
        let out = bilateral_filter(&data, &params).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_oversized_grid_rejected() {
        // 300x300 pixels at one cell each and about 1000 range cells
        let data = ramp(300, 300);
        let params = BilateralGridParams::new()
            .with_sigma_spatial(0.4)
            .with_sampling_spatial(1.0)
            .with_sigma_range(0.004)
            .with_sampling_range(0.001);
        assert!(matches!(
            bilateral_filter(&data, &params),
            Err(FilterError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_bilateral_exact_constant() {
        let data = FPix::new_with_value(10, 10, 0.8).unwrap();
        let out = bilateral_exact(&data, None, 2.0, 0.1).unwrap();
        for &v in out.data() {
            assert!((v - 0.8).abs() < 1e-6);
        }
        assert!(bilateral_exact(&data, None, 0.0, 0.1).is_err());
        assert!(bilateral_exact(&data, None, 1.0, 0.0).is_err());
    }

    #[test]
    fn test_bilateral_exact_preserves_step() {
        let data = FPix::from_fn(16, 16, |x, _| if x < 8 { 0.0 } else { 1.0 }).unwrap();
        let out = bilateral_exact(&data, None, 2.0, 0.05).unwrap();
        assert!(out.get_pixel(7, 8).unwrap() < 1e-3);
        assert!(out.get_pixel(8, 8).unwrap() > 1.0 - 1e-3);
    }
}
