//! FPix (floating-point image) regression test
//!
//! Tests FPix and FPixRgb creation, pixel access, arithmetic operations,
//! and statistics.

use hdrgrid_core::{FPix, FPixRgb};
use hdrgrid_test::RegParams;

// ==========================================================================
// Test 1: FPix creation and basic properties
// ==========================================================================

#[test]
fn fpix1_reg_creation() {
    let mut rp = RegParams::new("fpix1_creation");

    let fpix = FPix::new(640, 480).expect("FPix::new failed");
    rp.compare_values(640.0, fpix.width() as f64, 0.0);
    rp.compare_values(480.0, fpix.height() as f64, 0.0);
    rp.check(fpix.data().iter().all(|&v| v == 0.0), "new FPix is zeroed");

    let fpix_v = FPix::new_with_value(100, 100, 42.5).expect("FPix::new_with_value failed");
    rp.check(fpix_v.data().iter().all(|&v| v == 42.5), "initial value");

    let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let fpix_d = FPix::from_data(3, 2, data).expect("FPix::from_data failed");
    rp.compare_values(1.0, fpix_d.get_pixel(0, 0).unwrap() as f64, 0.0);
    rp.compare_values(6.0, fpix_d.get_pixel(2, 1).unwrap() as f64, 0.0);

    rp.check(FPix::new(0, 100).is_err(), "zero width rejected");
    rp.check(FPix::from_data(3, 2, vec![0.0; 5]).is_err(), "short buffer rejected");

    assert!(rp.cleanup(), "fpix1_reg creation tests failed");
}

// ==========================================================================
// Test 2: Pixel access
// ==========================================================================

#[test]
fn fpix1_reg_pixel_access() {
    let mut rp = RegParams::new("fpix1_access");

    let mut fpix = FPix::from_fn(20, 10, |x, y| (x + 100 * y) as f32).unwrap();
    rp.compare_values(305.0, fpix.get_pixel(5, 3).unwrap() as f64, 0.0);
    rp.compare_values(900.0, fpix.row(9)[0] as f64, 0.0);

    fpix.set_pixel(19, 9, -1.5).unwrap();
    rp.compare_values(-1.5, fpix.get_pixel(19, 9).unwrap() as f64, 0.0);
    rp.check(fpix.get_pixel(20, 0).is_err(), "x out of bounds");
    rp.check(fpix.set_pixel(0, 10, 0.0).is_err(), "y out of bounds");

    fpix.row_mut(0).fill(7.0);
    rp.compare_values(7.0, fpix.get_pixel(13, 0).unwrap() as f64, 0.0);

    assert!(rp.cleanup(), "fpix1_reg access tests failed");
}

// ==========================================================================
// Test 3: Arithmetic
// ==========================================================================

#[test]
fn fpix1_reg_arithmetic() {
    let mut rp = RegParams::new("fpix1_arith");

    let a = FPix::new_with_value(8, 8, 3.0).unwrap();
    let b = FPix::new_with_value(8, 8, 1.25).unwrap();

    let sum = a.add(&b).unwrap();
    rp.compare_values(4.25, sum.get_pixel(4, 4).unwrap() as f64, 0.0);
    let diff = (&a - &b).unwrap();
    rp.compare_values(1.75, diff.get_pixel(0, 7).unwrap() as f64, 0.0);
    let prod = a.mul(&b).unwrap();
    rp.compare_values(3.75, prod.get_pixel(7, 0).unwrap() as f64, 0.0);

    let lin = a.linear_combination(2.0, -1.0);
    rp.compare_values(5.0, lin.get_pixel(1, 1).unwrap() as f64, 0.0);

    let c = FPix::new(8, 9).unwrap();
    rp.check(a.add(&c).is_err(), "size mismatch rejected");

    assert!(rp.cleanup(), "fpix1_reg arithmetic tests failed");
}

// ==========================================================================
// Test 4: Statistics with non-finite values
// ==========================================================================

#[test]
fn fpix1_reg_statistics() {
    let mut rp = RegParams::new("fpix1_stats");

    let mut fpix = FPix::from_fn(10, 10, |x, y| (x as f32) - (y as f32)).unwrap();
    rp.compare_values(-9.0, fpix.min_value().unwrap() as f64, 0.0);
    rp.compare_values(9.0, fpix.max_value().unwrap() as f64, 0.0);
    rp.compare_values(0.0, fpix.mean().unwrap() as f64, 1e-6);
    rp.check(fpix.is_all_finite(), "finite image");

    fpix.set_pixel(0, 9, f32::NAN).unwrap();
    fpix.set_pixel(9, 0, f32::INFINITY).unwrap();
    rp.check(!fpix.is_all_finite(), "non-finite detected");
    let (lo, hi) = fpix.finite_range().unwrap();
    rp.compare_values(-8.0, lo as f64, 0.0);
    rp.compare_values(8.0, hi as f64, 0.0);
    rp.compare_values(-8.0, fpix.min().unwrap().0 as f64, 0.0);

    assert!(rp.cleanup(), "fpix1_reg statistics tests failed");
}

// ==========================================================================
// Test 5: Planar RGB
// ==========================================================================

#[test]
fn fpix1_reg_rgb() {
    let mut rp = RegParams::new("fpix1_rgb");

    let mut rgb = FPixRgb::new(6, 4).unwrap();
    rgb.set_rgb(2, 3, [0.1, 0.5, 0.9]).unwrap();
    let px = rgb.get_rgb(2, 3).unwrap();
    rp.compare_values(0.5, px[1] as f64, 0.0);
    rp.check(rgb.channel(3).is_err(), "channel index checked");

    let (lo, hi) = rgb.finite_range().unwrap();
    rp.compare_values(0.0, lo as f64, 0.0);
    rp.compare_values(0.9, hi as f64, 1e-7);

    let luma = rgb.to_luminance();
    let expected = 0.299 * 0.1 + 0.587 * 0.5 + 0.114 * 0.9;
    rp.compare_values(expected, luma.get_pixel(2, 3).unwrap() as f64, 1e-6);

    let r = FPix::new(6, 4).unwrap();
    let g = FPix::new(6, 4).unwrap();
    let b = FPix::new(6, 5).unwrap();
    rp.check(FPixRgb::from_planes(r, g, b).is_err(), "plane sizes checked");

    assert!(rp.cleanup(), "fpix1_reg rgb tests failed");
}
