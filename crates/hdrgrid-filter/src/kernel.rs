//! Convolution kernels
//!
//! [`Kernel`] is a 2D kernel used by the plain image convolutions;
//! [`Kernel3`] is the unnormalized 3D Gaussian that blurs a bilateral grid.

use crate::{FilterError, FilterResult};

/// A 2D convolution kernel
///
/// Values are stored row-major; the origin is the center cell.
#[derive(Debug, Clone)]
pub struct Kernel {
    /// Width of the kernel
    width: u32,
    /// Height of the kernel
    height: u32,
    /// X coordinate of the center
    cx: u32,
    /// Y coordinate of the center
    cy: u32,
    /// Kernel data (row-major order)
    data: Vec<f32>,
}

impl Kernel {
    /// Create a new zero kernel with the given dimensions.
    pub fn new(width: u32, height: u32) -> FilterResult<Self> {
        if width == 0 || height == 0 {
            return Err(FilterError::InvalidKernel(format!(
                "kernel dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Kernel {
            width,
            height,
            cx: width / 2,
            cy: height / 2,
            data: vec![0.0; (width * height) as usize],
        })
    }

    /// Create a kernel from a slice of values (row-major).
    pub fn from_slice(width: u32, height: u32, data: &[f32]) -> FilterResult<Self> {
        let mut kernel = Self::new(width, height)?;
        if data.len() != kernel.data.len() {
            return Err(FilterError::InvalidKernel(format!(
                "expected {} values, got {}",
                kernel.data.len(),
                data.len()
            )));
        }
        kernel.data.copy_from_slice(data);
        Ok(kernel)
    }

    /// Create a normalized square Gaussian kernel.
    ///
    /// `size` must be odd so the kernel has a center cell.
    pub fn gaussian(size: u32, sigma: f32) -> FilterResult<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(FilterError::InvalidKernel(format!(
                "gaussian size must be odd, got {}",
                size
            )));
        }
        if !(sigma > 0.0) {
            return Err(FilterError::InvalidParameters(
                "sigma must be positive".to_string(),
            ));
        }

        let mut kernel = Self::new(size, size)?;
        let half = (size / 2) as i32;
        let denom = 2.0 * sigma * sigma;
        for ky in 0..size {
            for kx in 0..size {
                let dx = kx as i32 - half;
                let dy = ky as i32 - half;
                let r2 = (dx * dx + dy * dy) as f32;
                kernel.set(kx, ky, (-r2 / denom).exp());
            }
        }
        kernel.normalize();
        Ok(kernel)
    }

    /// Get the kernel width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the kernel height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the center X coordinate.
    #[inline]
    pub fn center_x(&self) -> u32 {
        self.cx
    }

    /// Get the center Y coordinate.
    #[inline]
    pub fn center_y(&self) -> u32 {
        self.cy
    }

    /// Get the kernel data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get a value at (x, y).
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.data[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Set a value at (x, y). Out-of-range coordinates are ignored.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        if x < self.width && y < self.height {
            self.data[(y * self.width + x) as usize] = value;
        }
    }

    /// Normalize the kernel so that values sum to 1.
    ///
    /// A kernel whose sum is near zero is left unchanged.
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum.abs() < 1e-6 {
            return;
        }
        for v in &mut self.data {
            *v /= sum;
        }
    }

    /// Get the sum of all kernel values.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }
}

/// Unnormalized 3D Gaussian over (x, y, range) grid offsets
///
/// The extent along each axis is odd, `2 * half + 1`, with
/// `half = trunc(2 * sigma + 1) / 2` in grid units. Normalization is
/// omitted: the bilateral grid divides blurred data by blurred weights,
/// which cancels any constant factor.
#[derive(Debug, Clone)]
pub struct Kernel3 {
    half_xy: usize,
    half_z: usize,
    /// Values indexed `(ky * side + kx) * depth + kz`
    data: Vec<f64>,
}

impl Kernel3 {
    /// Build the kernel for derived (grid-unit) sigmas
    ///
    /// `exp(-0.5 * ((dx² + dy²) / sigma_xy² + dz² / sigma_z²))`
    pub fn bilateral_gaussian(sigma_xy: f64, sigma_z: f64) -> FilterResult<Self> {
        if !(sigma_xy > 0.0 && sigma_xy.is_finite()) || !(sigma_z > 0.0 && sigma_z.is_finite()) {
            return Err(FilterError::InvalidKernel(format!(
                "derived sigmas must be positive and finite, got ({}, {})",
                sigma_xy, sigma_z
            )));
        }

        let half_xy = Self::half_extent(sigma_xy);
        let half_z = Self::half_extent(sigma_z);
        let side = 2 * half_xy + 1;
        let depth = 2 * half_z + 1;

        let inv_xy = 1.0 / (sigma_xy * sigma_xy);
        let inv_z = 1.0 / (sigma_z * sigma_z);
        let mut data = Vec::with_capacity(side * side * depth);
        for ky in 0..side {
            let dy = ky as f64 - half_xy as f64;
            for kx in 0..side {
                let dx = kx as f64 - half_xy as f64;
                for kz in 0..depth {
                    let dz = kz as f64 - half_z as f64;
                    let r2 = (dx * dx + dy * dy) * inv_xy + dz * dz * inv_z;
                    data.push((-0.5 * r2).exp());
                }
            }
        }

        Ok(Kernel3 {
            half_xy,
            half_z,
            data,
        })
    }

    /// Half extent (in cells) of the kernel along an axis with this sigma
    pub fn half_extent(sigma: f64) -> usize {
        ((2.0 * sigma + 1.0) as usize) / 2
    }

    /// Half extent along the two spatial axes
    #[inline]
    pub fn half_xy(&self) -> usize {
        self.half_xy
    }

    /// Half extent along the range axis
    #[inline]
    pub fn half_z(&self) -> usize {
        self.half_z
    }

    /// Kernel dimensions as (width, height, depth)
    #[inline]
    pub fn dims(&self) -> (usize, usize, usize) {
        let side = 2 * self.half_xy + 1;
        (side, side, 2 * self.half_z + 1)
    }

    /// Value at kernel cell (kx, ky, kz)
    #[inline]
    pub fn get(&self, kx: usize, ky: usize, kz: usize) -> f64 {
        let (side, _, depth) = self.dims();
        self.data[(ky * side + kx) * depth + kz]
    }

    /// True for the 1x1x1 kernel, whose convolution is a copy
    pub fn is_identity(&self) -> bool {
        self.half_xy == 0 && self.half_z == 0
    }

    /// Sum of all kernel values
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }
}
