//! Planar three-channel floating-point image
//!
//! `FPixRgb` keeps one [`FPix`] per channel. Decoded color images, the
//! per-pixel reflection vectors of a mirror ball (x, y, z stored in the
//! red, green and blue planes) and equirectangular environment maps all
//! use this layout.

use super::{FPix, finite_range};
use crate::error::{Error, Result};

/// Number of channels in an [`FPixRgb`]
pub const RGB_CHANNELS: usize = 3;

/// Planar RGB floating-point image
#[derive(Debug, Clone, PartialEq)]
pub struct FPixRgb {
    planes: [FPix; RGB_CHANNELS],
}

impl FPixRgb {
    /// Create a new image with all channels set to zero
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let plane = FPix::new(width, height)?;
        Ok(FPixRgb {
            planes: [plane.clone(), plane.clone(), plane],
        })
    }

    /// Assemble an image from three planes of equal size
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompatibleSizes` if the planes differ in size.
    pub fn from_planes(r: FPix, g: FPix, b: FPix) -> Result<Self> {
        r.check_same_size(&g)?;
        r.check_same_size(&b)?;
        Ok(FPixRgb { planes: [r, g, b] })
    }

    /// Width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.planes[0].width()
    }

    /// Height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.planes[0].height()
    }

    /// Dimensions as (width, height)
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.planes[0].dimensions()
    }

    /// Borrow one channel plane
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if `channel >= 3`.
    pub fn channel(&self, channel: usize) -> Result<&FPix> {
        self.planes.get(channel).ok_or(Error::IndexOutOfBounds {
            index: channel,
            len: RGB_CHANNELS,
        })
    }

    /// All three planes in R, G, B order
    #[inline]
    pub fn planes(&self) -> &[FPix; RGB_CHANNELS] {
        &self.planes
    }

    /// Mutable access to all three planes
    #[inline]
    pub fn planes_mut(&mut self) -> &mut [FPix; RGB_CHANNELS] {
        &mut self.planes
    }

    /// Get the (r, g, b) triple at (x, y)
    pub fn get_rgb(&self, x: u32, y: u32) -> Result<[f32; RGB_CHANNELS]> {
        Ok([
            self.planes[0].get_pixel(x, y)?,
            self.planes[1].get_pixel(x, y)?,
            self.planes[2].get_pixel(x, y)?,
        ])
    }

    /// Set the (r, g, b) triple at (x, y)
    pub fn set_rgb(&mut self, x: u32, y: u32, rgb: [f32; RGB_CHANNELS]) -> Result<()> {
        for (plane, value) in self.planes.iter_mut().zip(rgb) {
            plane.set_pixel(x, y, value)?;
        }
        Ok(())
    }

    /// Luminance plane using Rec. 601 weights (0.299, 0.587, 0.114)
    pub fn to_luminance(&self) -> FPix {
        let mut out = self.planes[0].create_template();
        let [r, g, b] = &self.planes;
        for (i, d) in out.data_mut().iter_mut().enumerate() {
            *d = 0.299 * r.data()[i] + 0.587 * g.data()[i] + 0.114 * b.data()[i];
        }
        out
    }

    /// Minimum and maximum over the finite values of all channels
    pub fn finite_range(&self) -> Option<(f32, f32)> {
        self.planes
            .iter()
            .filter_map(|p| finite_range(p.data()))
            .reduce(|(lo1, hi1), (lo2, hi2)| (lo1.min(lo2), hi1.max(hi2)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_from_planes() {
        let r = FPix::new_with_value(4, 3, 1.0).unwrap();
        let g = FPix::new_with_value(4, 3, 2.0).unwrap();
        let b = FPix::new_with_value(4, 3, 3.0).unwrap();
        let rgb = FPixRgb::from_planes(r, g, b).unwrap();

        assert_eq!(rgb.dimensions(), (4, 3));
        assert_eq!(rgb.get_rgb(2, 1).unwrap(), [1.0, 2.0, 3.0]);
        assert!(rgb.channel(3).is_err());
    }

    #[test]
    fn test_rgb_size_mismatch() {
        let r = FPix::new(4, 3).unwrap();
        let g = FPix::new(4, 4).unwrap();
        let b = FPix::new(4, 3).unwrap();
        assert!(FPixRgb::from_planes(r, g, b).is_err());
    }

    #[test]
    fn test_rgb_set_and_luminance() {
        let mut rgb = FPixRgb::new(2, 2).unwrap();
        rgb.set_rgb(1, 1, [1.0, 1.0, 1.0]).unwrap();
        let lum = rgb.to_luminance();
        assert!((lum.get_pixel(1, 1).unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(lum.get_pixel(0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_rgb_finite_range() {
        let mut rgb = FPixRgb::new(2, 1).unwrap();
        rgb.set_rgb(0, 0, [f32::INFINITY, -2.0, 0.5]).unwrap();
        rgb.set_rgb(1, 0, [4.0, f32::NAN, 0.0]).unwrap();
        assert_eq!(rgb.finite_range(), Some((-2.0, 4.0)));
    }
}
