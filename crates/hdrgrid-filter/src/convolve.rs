//! Convolution operations
//!
//! 2D convolution of [`FPix`] images with replicate borders, and 3D
//! convolution of bilateral grids with zero borders.

use crate::grid::Grid3;
use crate::{FilterError, FilterResult, Kernel, Kernel3};
use hdrgrid_core::FPix;

/// Convolve an FPix with a 2D kernel
///
/// Uses replicate (clamp) border handling: samples outside the image are
/// taken from the nearest edge pixel. With `normalize`, the kernel is scaled
/// to unit sum first (skipped when the sum is near zero).
pub fn fpix_convolve(fpix: &FPix, kernel: &Kernel, normalize: bool) -> FilterResult<FPix> {
    let w = fpix.width() as i32;
    let h = fpix.height() as i32;
    let kw = kernel.width() as i32;
    let kh = kernel.height() as i32;
    let cx = kernel.center_x() as i32;
    let cy = kernel.center_y() as i32;

    let ksum = kernel.sum();
    let scale = if normalize && ksum.abs() >= 1e-6 {
        1.0 / ksum
    } else {
        1.0
    };

    let mut fpixd = fpix.create_template();
    let kdata = kernel.data();

    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0f32;
            for ky in 0..kh {
                let sy = (y + ky - cy).clamp(0, h - 1);
                for kx in 0..kw {
                    let sx = (x + kx - cx).clamp(0, w - 1);
                    let val = fpix.get_pixel_unchecked(sx as u32, sy as u32);
                    let kidx = (ky * kw + kx) as usize;
                    sum += val * kdata[kidx] * scale;
                }
            }
            fpixd.set_pixel_unchecked(x as u32, y as u32, sum);
        }
    }

    Ok(fpixd)
}

/// Plain Gaussian blur of an FPix
///
/// The window half-width is `floor(2 * sigma)`, matching the spatial extent
/// of the bilateral filters in this crate.
pub fn gaussian_blur(fpix: &FPix, sigma: f32) -> FilterResult<FPix> {
    if !(sigma > 0.0 && sigma.is_finite()) {
        return Err(FilterError::InvalidParameters(
            "sigma must be positive".to_string(),
        ));
    }
    let halfwidth = (2.0 * sigma) as u32;
    let kernel = Kernel::gaussian(2 * halfwidth + 1, sigma)?;
    fpix_convolve(fpix, &kernel, true)
}

/// Convolve a 3D grid with a 3D kernel, zero outside the grid
///
/// The grid is mostly empty, so the convolution is computed by scattering
/// each nonzero cell through the kernel; contributions that land outside the
/// grid are dropped. The kernel is symmetric, so scattering and gathering
/// give the same result.
pub fn convolve3(grid: &Grid3, kernel: &Kernel3) -> Grid3 {
    if kernel.is_identity() {
        return grid.clone();
    }

    let (nx, ny, nz) = grid.dims();
    let (kw, kh, kd) = kernel.dims();
    let hxy = kernel.half_xy() as isize;
    let hz = kernel.half_z() as isize;
    let mut out = Grid3::zeros_like(grid);

    for y in 0..ny {
        for x in 0..nx {
            for z in 0..nz {
                let v = grid.get(x, y, z);
                if v == 0.0 {
                    continue;
                }
                for ky in 0..kh {
                    let Some(ty) = offset(y, ky as isize - hxy, ny) else {
                        continue;
                    };
                    for kx in 0..kw {
                        let Some(tx) = offset(x, kx as isize - hxy, nx) else {
                            continue;
                        };
                        for kz in 0..kd {
                            let Some(tz) = offset(z, kz as isize - hz, nz) else {
                                continue;
                            };
                            out.add(tx, ty, tz, v * kernel.get(kx, ky, kz));
                        }
                    }
                }
            }
        }
    }

    out
}

#[inline]
fn offset(base: usize, delta: isize, len: usize) -> Option<usize> {
    let t = base as isize + delta;
    (t >= 0 && (t as usize) < len).then_some(t as usize)
}
