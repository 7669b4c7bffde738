//! Rescaling of log radiance maps for display
//!
//! The RGB variants use one range for all three channels so the color
//! balance is kept.

use crate::{HdrError, HdrResult};
use hdrgrid_core::{FPix, FPixRgb};

fn linear_range(range: Option<(f32, f32)>) -> HdrResult<(f32, f32)> {
    match range {
        Some((lo, hi)) if hi > lo => Ok((lo, hi)),
        _ => Err(HdrError::InvalidParameter(
            "rescaling needs at least two distinct finite values".to_string(),
        )),
    }
}

fn rescale_plane(src: &FPix, lo: f32, hi: f32) -> FPix {
    let scale = 1.0 / (hi - lo);
    let mut out = src.clone();
    for v in out.data_mut() {
        let clamped = if *v == f32::INFINITY {
            hi
        } else if *v == f32::NEG_INFINITY {
            lo
        } else {
            *v
        };
        // NaN propagates
        *v = (clamped - lo) * scale;
    }
    out
}

/// Map the finite values of `fpix` linearly onto [0, 1]
///
/// Positive and negative infinity are first replaced by the finite maximum
/// and minimum; NaN stays NaN.
///
/// # Errors
///
/// Returns `HdrError::InvalidParameter` if there are fewer than two
/// distinct finite values.
pub fn rescale_linear(fpix: &FPix) -> HdrResult<FPix> {
    let (lo, hi) = linear_range(fpix.finite_range())?;
    Ok(rescale_plane(fpix, lo, hi))
}

/// [`rescale_linear`] over all three channels jointly
pub fn rescale_linear_rgb(rgb: &FPixRgb) -> HdrResult<FPixRgb> {
    let (lo, hi) = linear_range(rgb.finite_range())?;
    let [r, g, b] = rgb.planes();
    Ok(FPixRgb::from_planes(
        rescale_plane(r, lo, hi),
        rescale_plane(g, lo, hi),
        rescale_plane(b, lo, hi),
    )?)
}

fn shift_plane(src: &FPix, shift: f32) -> FPix {
    let mut out = src.clone();
    out.add_constant(shift);
    out
}

fn nonzero_shift(range: Option<(f32, f32)>, offset: f32) -> HdrResult<f32> {
    if !offset.is_finite() {
        return Err(HdrError::InvalidParameter(format!(
            "offset must be finite, got {}",
            offset
        )));
    }
    let (lo, _) = range.ok_or_else(|| {
        HdrError::InvalidParameter("image has no finite value".to_string())
    })?;
    Ok(offset - lo)
}

/// Shift `fpix` so that its finite minimum becomes `offset`
///
/// Commonly used with a small positive offset (0.1) to make a log
/// radiance map strictly positive.
pub fn rescale_nonzero(fpix: &FPix, offset: f32) -> HdrResult<FPix> {
    let shift = nonzero_shift(fpix.finite_range(), offset)?;
    Ok(shift_plane(fpix, shift))
}

/// [`rescale_nonzero`] over all three channels jointly
pub fn rescale_nonzero_rgb(rgb: &FPixRgb, offset: f32) -> HdrResult<FPixRgb> {
    let shift = nonzero_shift(rgb.finite_range(), offset)?;
    let [r, g, b] = rgb.planes();
    Ok(FPixRgb::from_planes(
        shift_plane(r, shift),
        shift_plane(g, shift),
        shift_plane(b, shift),
    )?)
}
