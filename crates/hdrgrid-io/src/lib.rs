//! hdrgrid-io - Image I/O
//!
//! Decodes image files into normalized floating-point RGB ([`FPixRgb`],
//! values in [0, 1]) and encodes floating-point images back to 8-bit files.
//! Channel order is always R, G, B regardless of the codec's native order.
//! The output format is chosen from the file extension.
//!
//! # Example
//!
//! ```ignore
//! use hdrgrid_io::{read_image, write_image};
//!
//! let rgb = read_image("exposure_0.jpg")?;
//! write_image(&rgb, "copy.png")?;
//! ```

mod error;

pub use error::{IoError, IoResult};

use hdrgrid_core::{FPix, FPixRgb};
use image::{GrayImage, RgbImage};
use std::path::Path;

/// Scale factor from 8-bit samples to [0, 1]
const U8_SCALE: f32 = 1.0 / 255.0;

/// Read an image file as normalized RGB
///
/// Any decodable format is accepted; grayscale and palette images are
/// expanded to three channels, alpha is dropped.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<FPixRgb> {
    let path = path.as_ref();
    let decoded = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(io) => IoError::Io(io),
        other => IoError::DecodeError(format!("{}: {}", path.display(), other)),
    })?;
    let rgb = rgb8_to_fpix(&decoded.to_rgb8())?;
    log::debug!(
        "read {}: {}x{}",
        path.display(),
        rgb.width(),
        rgb.height()
    );
    Ok(rgb)
}

/// Decode an in-memory encoded image as normalized RGB
pub fn read_image_mem(bytes: &[u8]) -> IoResult<FPixRgb> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| IoError::DecodeError(e.to_string()))?;
    rgb8_to_fpix(&decoded.to_rgb8())
}

/// Write an RGB image as 8 bits per channel
///
/// Values are clamped to [0, 1]; NaN is written as 0.
pub fn write_image<P: AsRef<Path>>(rgb: &FPixRgb, path: P) -> IoResult<()> {
    let path = path.as_ref();
    let img = fpix_to_rgb8(rgb)?;
    img.save(path)
        .map_err(|e| IoError::EncodeError(format!("{}: {}", path.display(), e)))?;
    log::debug!(
        "wrote {}: {}x{}",
        path.display(),
        rgb.width(),
        rgb.height()
    );
    Ok(())
}

/// Write a single-channel image as 8-bit grayscale
///
/// Values are clamped to [0, 1]; NaN is written as 0.
pub fn write_gray<P: AsRef<Path>>(fpix: &FPix, path: P) -> IoResult<()> {
    let path = path.as_ref();
    let (w, h) = fpix.dimensions();
    let bytes = fpix.data().iter().map(|&v| to_u8(v)).collect();
    let img = GrayImage::from_raw(w, h, bytes)
        .ok_or_else(|| IoError::EncodeError("buffer size mismatch".to_string()))?;
    img.save(path)
        .map_err(|e| IoError::EncodeError(format!("{}: {}", path.display(), e)))?;
    log::debug!("wrote {}: {}x{}", path.display(), w, h);
    Ok(())
}

/// Convert an 8-bit RGB buffer to normalized planar RGB
pub fn rgb8_to_fpix(img: &RgbImage) -> IoResult<FPixRgb> {
    let (w, h) = img.dimensions();
    let mut out = FPixRgb::new(w, h)?;
    let [r, g, b] = out.planes_mut();
    for (i, px) in img.pixels().enumerate() {
        r.data_mut()[i] = px[0] as f32 * U8_SCALE;
        g.data_mut()[i] = px[1] as f32 * U8_SCALE;
        b.data_mut()[i] = px[2] as f32 * U8_SCALE;
    }
    Ok(out)
}

/// Convert normalized planar RGB to an interleaved 8-bit buffer
pub fn fpix_to_rgb8(rgb: &FPixRgb) -> IoResult<RgbImage> {
    let (w, h) = rgb.dimensions();
    let [r, g, b] = rgb.planes();
    let mut bytes = Vec::with_capacity(3 * r.data().len());
    for i in 0..r.data().len() {
        bytes.push(to_u8(r.data()[i]));
        bytes.push(to_u8(g.data()[i]));
        bytes.push(to_u8(b.data()[i]));
    }
    RgbImage::from_raw(w, h, bytes)
        .ok_or_else(|| IoError::EncodeError("buffer size mismatch".to_string()))
}

#[inline]
fn to_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_rgb8_to_fpix_channel_order() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 51]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));

        let rgb = rgb8_to_fpix(&img).unwrap();
        let px = rgb.get_rgb(0, 0).unwrap();
        assert_eq!(px[0], 1.0);
        assert_eq!(px[1], 0.0);
        assert!((px[2] - 0.2).abs() < 1e-6);
        assert_eq!(rgb.get_rgb(1, 0).unwrap(), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_to_u8_clamps() {
        assert_eq!(to_u8(-0.5), 0);
        assert_eq!(to_u8(2.0), 255);
        assert_eq!(to_u8(f32::NAN), 0);
        assert_eq!(to_u8(0.5), 128);
    }

    #[test]
    fn test_fpix_to_rgb8_roundtrip_levels() {
        let mut img = RgbImage::new(3, 2);
        for (i, px) in img.pixels_mut().enumerate() {
            *px = Rgb([i as u8 * 40, 255 - i as u8, 7]);
        }
        let back = fpix_to_rgb8(&rgb8_to_fpix(&img).unwrap()).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn test_read_image_mem_invalid() {
        assert!(matches!(
            read_image_mem(b"not an image"),
            Err(IoError::DecodeError(_))
        ));
    }
}
