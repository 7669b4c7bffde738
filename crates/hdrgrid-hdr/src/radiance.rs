//! Radiance map recovery
//!
//! With a known response curve every exposure gives an estimate
//! `g(Z_i) - B_i` of a pixel's log radiance. The estimates are merged with
//! the same weighting function used to solve the curve, so clipped or
//! underexposed observations contribute little.

use crate::gsolve::{LEVELS, ResponseCurve};
use crate::weight::{quantize, weight_table};
use crate::{HdrError, HdrResult};
use hdrgrid_core::{FPix, FPixRgb};

/// Accumulates per-pixel weighted log radiance estimates
struct RadianceMerger {
    weighted_sum: Vec<f64>,
    weight_sum: Vec<f64>,
    plain_sum: Vec<f64>,
    count: usize,
}

impl RadianceMerger {
    fn new(len: usize) -> Self {
        RadianceMerger {
            weighted_sum: vec![0.0; len],
            weight_sum: vec![0.0; len],
            plain_sum: vec![0.0; len],
            count: 0,
        }
    }

    fn add_image(
        &mut self,
        image: &FPix,
        log_exposure: f64,
        g: &[f64],
        w: &[f64; LEVELS],
    ) -> HdrResult<()> {
        for (i, &v) in image.data().iter().enumerate() {
            let z = quantize(v)? as usize;
            let estimate = g[z] - log_exposure;
            self.weighted_sum[i] += w[z] * estimate;
            self.weight_sum[i] += w[z];
            self.plain_sum[i] += estimate;
        }
        self.count += 1;
        Ok(())
    }

    /// Weighted mean where any weight was positive, plain mean elsewhere
    fn finish(self, width: u32, height: u32) -> HdrResult<FPix> {
        let n = self.count as f64;
        let data = self
            .weighted_sum
            .iter()
            .zip(&self.weight_sum)
            .zip(&self.plain_sum)
            .map(|((&ws, &w), &ps)| (if w > 0.0 { ws / w } else { ps / n }) as f32)
            .collect();
        Ok(FPix::from_data(width, height, data)?)
    }
}

/// Merge an exposure stack into a log radiance map
///
/// # Arguments
/// * `images` - Exposures with intensities in [0, 1], all the same size
/// * `log_exposures` - Log exposure time of each image
/// * `g` - Response curve, 256 values
/// * `weight` - Weighting function over intensities
///
/// Pixels whose observations all have zero weight (for example clipped in
/// every exposure) fall back to the unweighted mean of the estimates.
pub fn radiance_map(
    images: &[FPix],
    log_exposures: &[f64],
    g: &[f64],
    weight: impl Fn(u8) -> f64,
) -> HdrResult<FPix> {
    let first = images
        .first()
        .ok_or_else(|| HdrError::InvalidShape("empty exposure stack".to_string()))?;
    if log_exposures.len() != images.len() {
        return Err(HdrError::InvalidShape(format!(
            "{} log exposures for {} images",
            log_exposures.len(),
            images.len()
        )));
    }
    if g.len() != LEVELS {
        return Err(HdrError::InvalidShape(format!(
            "response curve has {} values, expected {}",
            g.len(),
            LEVELS
        )));
    }
    let w = weight_table(weight)?;

    let (width, height) = first.dimensions();
    let mut merger = RadianceMerger::new(first.data().len());
    for (image, &b) in images.iter().zip(log_exposures) {
        first.check_same_size(image)?;
        merger.add_image(image, b, g, &w)?;
    }
    merger.finish(width, height)
}

/// Merge an RGB exposure stack with one response curve per channel
pub fn radiance_map_rgb(
    images: &[FPixRgb],
    log_exposures: &[f64],
    curves: [&ResponseCurve; 3],
    weight: impl Fn(u8) -> f64 + Copy,
) -> HdrResult<FPixRgb> {
    let mut planes = Vec::with_capacity(3);
    for (c, curve) in curves.iter().enumerate() {
        let channel: Vec<FPix> = images
            .iter()
            .map(|img| img.channel(c).cloned())
            .collect::<Result<_, _>>()?;
        planes.push(radiance_map(&channel, log_exposures, &curve.g, weight)?);
    }
    let [r, g, b]: [FPix; 3] = planes
        .try_into()
        .map_err(|_| HdrError::InvalidShape("expected three channels".to_string()))?;
    Ok(FPixRgb::from_planes(r, g, b)?)
}
