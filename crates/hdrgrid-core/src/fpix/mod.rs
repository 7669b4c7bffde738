//! FPix - Floating-point image
//!
//! `FPix` is a 2D array of `f32` values. It is the signal type for every
//! filter in the workspace, the edge map of the cross-bilateral filter, and
//! a single channel of [`FPixRgb`].
//!
//! # Examples
//!
//! ```
//! use hdrgrid_core::FPix;
//!
//! // Create a 100x100 floating-point image
//! let mut fpix = FPix::new(100, 100).unwrap();
//!
//! // Set and get pixel values
//! fpix.set_pixel(10, 20, 0.5).unwrap();
//! assert_eq!(fpix.get_pixel(10, 20).unwrap(), 0.5);
//!
//! // Get statistics
//! let (min_val, min_x, min_y) = fpix.min().unwrap();
//! assert_eq!((min_val, min_x, min_y), (0.0, 0, 0));
//! assert_eq!(fpix.max_value(), Some(0.5));
//! ```

mod rgb;

pub use rgb::FPixRgb;

use crate::error::{Error, Result};

/// Maximum pixel count for FPix (2^29)
const MAX_FPIX_PIXELS: u64 = 1 << 29;

/// Floating-point image
///
/// A 2D array of `f32` values. Values are not restricted to any range and
/// may be non-finite; operations that cannot accept NaN or infinity say so.
///
/// # Memory Layout
///
/// Data is stored in row-major order with no padding. The pixel at (x, y)
/// is at index `y * width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct FPix {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Pixel data (row-major, no padding)
    data: Vec<f32>,
}

impl FPix {
    /// Create a new FPix with all pixels set to zero
    ///
    /// # Arguments
    ///
    /// * `width` - Width in pixels (must be > 0)
    /// * `height` - Height in pixels (must be > 0)
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0, or if the
    /// pixel count exceeds 2^29.
    ///
    /// # Examples
    ///
    /// ```
    /// use hdrgrid_core::FPix;
    ///
    /// let fpix = FPix::new(640, 480).unwrap();
    /// assert_eq!(fpix.width(), 640);
    /// assert_eq!(fpix.height(), 480);
    /// ```
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::new_with_value(width, height, 0.0)
    }

    /// Create a new FPix with all pixels set to the specified value
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use hdrgrid_core::FPix;
    ///
    /// let fpix = FPix::new_with_value(100, 100, 0.5).unwrap();
    /// assert_eq!(fpix.get_pixel(50, 50).unwrap(), 0.5);
    /// ```
    pub fn new_with_value(width: u32, height: u32, value: f32) -> Result<Self> {
        check_dimensions(width, height)?;

        let size = (width as usize) * (height as usize);
        Ok(FPix {
            width,
            height,
            data: vec![value; size],
        })
    }

    /// Create a FPix from raw data
    ///
    /// # Arguments
    ///
    /// * `width` - Width in pixels
    /// * `height` - Height in pixels
    /// * `data` - Pixel data in row-major order
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions are invalid or data length doesn't match.
    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        check_dimensions(width, height)?;

        let expected_size = (width as usize) * (height as usize);
        if data.len() != expected_size {
            return Err(Error::InvalidParameter(format!(
                "data length {} doesn't match {}x{} = {}",
                data.len(),
                width,
                height,
                expected_size
            )));
        }

        Ok(FPix {
            width,
            height,
            data,
        })
    }

    /// Create a FPix by evaluating `f(x, y)` at every pixel
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> f32) -> Result<Self> {
        check_dimensions(width, height)?;

        let mut data = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Ok(FPix {
            width,
            height,
            data,
        })
    }

    /// Get the image width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the image dimensions as (width, height)
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get the pixel value at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if coordinates are out of range.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<f32> {
        let idx = self.checked_index(x, y)?;
        Ok(self.data[idx])
    }

    /// Set the pixel value at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if coordinates are out of range.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, value: f32) -> Result<()> {
        let idx = self.checked_index(x, y)?;
        self.data[idx] = value;
        Ok(())
    }

    /// Get the pixel value at (x, y) without bounds checking
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> f32 {
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        self.data[idx]
    }

    /// Set the pixel value at (x, y) without bounds checking
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[inline]
    pub fn set_pixel_unchecked(&mut self, x: u32, y: u32, value: f32) {
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        self.data[idx] = value;
    }

    /// Get raw access to the pixel data
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get mutable access to the pixel data
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Get a row of pixel data
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[f32] {
        let start = (y as usize) * (self.width as usize);
        let end = start + (self.width as usize);
        &self.data[start..end]
    }

    /// Get a mutable row of pixel data
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [f32] {
        let start = (y as usize) * (self.width as usize);
        let end = start + (self.width as usize);
        &mut self.data[start..end]
    }

    /// Set all pixels to the specified value
    pub fn set_all(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Create a template FPix with the same dimensions, zeroed data.
    pub fn create_template(&self) -> FPix {
        FPix {
            width: self.width,
            height: self.height,
            data: vec![0.0; self.data.len()],
        }
    }

    /// Check that two FPix have the same dimensions
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompatibleSizes` if dimensions don't match.
    pub fn check_same_size(&self, other: &FPix) -> Result<()> {
        if self.width != other.width || self.height != other.height {
            return Err(Error::IncompatibleSizes(
                self.width,
                self.height,
                other.width,
                other.height,
            ));
        }
        Ok(())
    }

    /// Check whether every pixel value is finite
    pub fn is_all_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    fn checked_index(&self, x: u32, y: u32) -> Result<usize> {
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: idx,
                len: self.data.len(),
            });
        }
        Ok(idx)
    }

    // ========================================================================
    // Arithmetic Operations
    // ========================================================================

    /// Add two FPix images element-wise
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompatibleSizes` if dimensions don't match.
    pub fn add(&self, other: &FPix) -> Result<FPix> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Multiply two FPix images element-wise
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompatibleSizes` if dimensions don't match.
    pub fn mul(&self, other: &FPix) -> Result<FPix> {
        self.zip_with(other, |a, b| a * b)
    }

    fn zip_with(&self, other: &FPix, op: impl Fn(f32, f32) -> f32) -> Result<FPix> {
        self.check_same_size(other)?;

        let mut result = self.create_template();
        for (d, (&a, &b)) in result
            .data
            .iter_mut()
            .zip(self.data.iter().zip(other.data.iter()))
        {
            *d = op(a, b);
        }
        Ok(result)
    }

    /// Add a constant to all pixels (in-place)
    pub fn add_constant(&mut self, value: f32) {
        for v in &mut self.data {
            *v += value;
        }
    }

    /// Multiply all pixels by a constant (in-place)
    pub fn mul_constant(&mut self, value: f32) {
        for v in &mut self.data {
            *v *= value;
        }
    }

    /// Linear combination: result = a * self + b
    pub fn linear_combination(&self, multiplier: f32, addend: f32) -> FPix {
        let mut result = self.clone();
        for v in &mut result.data {
            *v = multiplier * *v + addend;
        }
        result
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Find the minimum value and its location
    ///
    /// Returns `(min_value, x, y)` where (x, y) is the location of the first
    /// occurrence of the minimum value. NaN pixels are never selected.
    ///
    /// Returns `None` if every pixel is NaN.
    pub fn min(&self) -> Option<(f32, u32, u32)> {
        self.extreme(|v, best| v < best)
    }

    /// Find the minimum value only
    pub fn min_value(&self) -> Option<f32> {
        self.min().map(|(v, _, _)| v)
    }

    /// Find the maximum value, ignoring NaN pixels
    ///
    /// Returns `None` if every pixel is NaN.
    pub fn max_value(&self) -> Option<f32> {
        self.extreme(|v, best| v > best).map(|(v, _, _)| v)
    }

    fn extreme(&self, better: impl Fn(f32, f32) -> bool) -> Option<(f32, u32, u32)> {
        let mut best: Option<(f32, u32, u32)> = None;

        for y in 0..self.height {
            for (x, &val) in self.row(y).iter().enumerate() {
                if val.is_nan() {
                    continue;
                }
                match best {
                    Some((b, _, _)) if !better(val, b) => {}
                    _ => best = Some((val, x as u32, y)),
                }
            }
        }

        best
    }

    /// Minimum and maximum over the finite pixel values only
    ///
    /// Returns `None` if no pixel is finite.
    pub fn finite_range(&self) -> Option<(f32, f32)> {
        finite_range(&self.data)
    }

    /// Calculate the mean (average) of all pixel values
    pub fn mean(&self) -> Option<f32> {
        if self.data.is_empty() {
            return None;
        }

        let sum: f64 = self.data.iter().map(|&v| v as f64).sum();
        Some((sum / self.data.len() as f64) as f32)
    }

    /// Calculate the sum of all pixel values
    pub fn sum(&self) -> f32 {
        self.data.iter().map(|&v| v as f64).sum::<f64>() as f32
    }
}

/// Minimum and maximum of the finite values in a slice
pub(crate) fn finite_range(values: &[f32]) -> Option<(f32, f32)> {
    values
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 || (width as u64) * (height as u64) > MAX_FPIX_PIXELS {
        return Err(Error::InvalidDimension { width, height });
    }
    Ok(())
}

// ============================================================================
// Operator Overloading
// ============================================================================

impl std::ops::Add for &FPix {
    type Output = Result<FPix>;

    fn add(self, rhs: Self) -> Self::Output {
        FPix::add(self, rhs)
    }
}

impl std::ops::Sub for &FPix {
    type Output = Result<FPix>;

    fn sub(self, rhs: Self) -> Self::Output {
        self.zip_with(rhs, |a, b| a - b)
    }
}

// ============================================================================
// Tests
// ============================================================================
