//! Pixel weighting functions and intensity quantization

use crate::{HdrError, HdrResult};

/// Triangle ("hat") weight, favoring mid-range intensities
///
/// `z` for `z <= 127` and `255 - z` above, so both extremes weigh 0.
#[inline]
pub fn hat_weight(z: u8) -> f64 {
    if z <= 127 {
        z as f64
    } else {
        (255 - z) as f64
    }
}

/// Constant weight of 1
#[inline]
pub fn uniform_weight(_z: u8) -> f64 {
    1.0
}

/// Evaluate `weight` on every intensity, rejecting negative or non-finite
/// values
pub(crate) fn weight_table(weight: impl Fn(u8) -> f64) -> HdrResult<[f64; 256]> {
    let mut table = [0.0; 256];
    for (z, slot) in table.iter_mut().enumerate() {
        let w = weight(z as u8);
        if !(w >= 0.0 && w.is_finite()) {
            return Err(HdrError::InvalidParameter(format!(
                "weight({}) = {} is not a non-negative finite number",
                z, w
            )));
        }
        *slot = w;
    }
    Ok(table)
}

/// Convert a normalized intensity in [0, 1] to an 8-bit level
///
/// Values are rounded and clamped to [0, 255].
pub fn quantize(v: f32) -> HdrResult<u8> {
    if !v.is_finite() {
        return Err(HdrError::InvalidParameter(format!(
            "intensity {} is not finite",
            v
        )));
    }
    Ok((v * 255.0).round().clamp(0.0, 255.0) as u8)
}
