//! Image I/O regression test
//!
//! Writes synthetic images through the encoder, decodes them again and
//! checks that 8-bit quantization is the only loss.

use hdrgrid_core::{FPix, FPixRgb};
use hdrgrid_io::{IoError, read_image, write_gray, write_image};
use hdrgrid_test::{RegParams, regout_dir, synthetic};

fn out_path(name: &str) -> String {
    let dir = regout_dir();
    std::fs::create_dir_all(&dir).expect("create regout dir");
    format!("{}/{}", dir, name)
}

#[test]
fn ioformats_reg_png_rgb_roundtrip() {
    let mut rp = RegParams::new("ioformats_png_rgb");

    let r = synthetic::ramp_image(32, 8);
    let g = synthetic::step_image(32, 8, 0.25, 0.75);
    let b = FPix::new_with_value(32, 8, 0.5).unwrap();
    let rgb = FPixRgb::from_planes(r, g, b).unwrap();

    let path = out_path("ioformats_rgb.png");
    write_image(&rgb, &path).expect("write png");
    let back = read_image(&path).expect("read png");

    rp.compare_values(32.0, back.width() as f64, 0.0);
    rp.compare_values(8.0, back.height() as f64, 0.0);
    for c in 0..3 {
        rp.compare_fpix(
            rgb.channel(c).unwrap(),
            back.channel(c).unwrap(),
            0.5 / 255.0 + 1e-6,
        );
    }

    assert!(rp.cleanup(), "ioformats png rgb roundtrip failed");
}

#[test]
fn ioformats_reg_gray_expands_to_rgb() {
    let mut rp = RegParams::new("ioformats_gray");

    let gray = synthetic::ramp_image(16, 4);
    let path = out_path("ioformats_gray.png");
    write_gray(&gray, &path).expect("write gray png");
    let back = read_image(&path).expect("read gray png");

    // All three channels carry the gray values
    for c in 0..3 {
        rp.compare_fpix(&gray, back.channel(c).unwrap(), 0.5 / 255.0 + 1e-6);
    }

    assert!(rp.cleanup(), "ioformats gray expansion failed");
}

#[test]
fn ioformats_reg_missing_file() {
    let mut rp = RegParams::new("ioformats_missing");

    let result = read_image(out_path("does_not_exist.png"));
    rp.check(matches!(result, Err(IoError::Io(_))), "missing file maps to Io");

    assert!(rp.cleanup(), "ioformats missing file failed");
}
