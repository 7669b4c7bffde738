//! Equirectangular reprojection regression test
//!
//!   (1) output size and finiteness for a mirror-ball capture
//!   (2) a radiance that depends only on elevation reappears as a
//!       function of the output row
//!   (3) rescaled output spans [0, 1]
//!   (4) a radiance equal to the polar angle is reproduced over the whole
//!       map, at low and high sample densities

use hdrgrid_core::{FPix, FPixRgb};
use hdrgrid_hdr::{
    EQUIRECT_HEIGHT, EQUIRECT_WIDTH, equirectangular, mirror_ball_reflections, reflection_angles,
    rescale_linear_rgb,
};
use hdrgrid_test::RegParams;

#[test]
fn equirect_reg_elevation_gradient() {
    let mut rp = RegParams::new("equirect_gradient");

    let rv = mirror_ball_reflections(512).expect("mirror_ball_reflections");
    let ry = rv.channel(1).expect("y component").clone();
    let hdr = FPixRgb::from_planes(ry.clone(), ry.clone(), ry).unwrap();

    let env = equirectangular(&rv, &hdr).expect("equirectangular");
    rp.compare_values(EQUIRECT_WIDTH as f64, env.width() as f64, 0.0);
    rp.compare_values(EQUIRECT_HEIGHT as f64, env.height() as f64, 0.0);
    rp.check(
        env.planes().iter().all(|p| p.is_all_finite()),
        "every output pixel is defined",
    );

    // theta = pi - acos(ry), so ry = -cos(theta) along each row. Checked on
    // the hemisphere facing the camera, where the ball is densely sampled.
    let step = std::f64::consts::PI / EQUIRECT_HEIGHT as f64;
    let red = env.channel(0).unwrap();
    let mut max_err = 0.0f64;
    for i in 90..=270u32 {
        let expected = -(i as f64 * step).cos();
        for j in 380..=520u32 {
            let v = red.get_pixel(j, i).unwrap() as f64;
            max_err = max_err.max((v - expected).abs());
        }
    }
    eprintln!("  max elevation error on front hemisphere: {:.4}", max_err);
    rp.check(max_err < 0.05, "output follows the elevation gradient");

    let display = rescale_linear_rgb(&env).expect("rescale");
    let (lo, hi) = display.finite_range().unwrap();
    rp.compare_values(0.0, lo as f64, 1e-6);
    rp.compare_values(1.0, hi as f64, 1e-6);
    rp.write_rgb(&display, "equirect").ok();

    assert!(rp.cleanup(), "equirect_gradient regression test failed");
}

#[test]
fn equirect_reg_polar_angle_ramp() {
    let mut rp = RegParams::new("equirect_polar_ramp");

    let step = std::f64::consts::PI / EQUIRECT_HEIGHT as f64;
    for size in [64u32, 256] {
        let rv = mirror_ball_reflections(size).expect("mirror_ball_reflections");
        let theta = FPix::from_fn(size, size, |x, y| {
            let (_, theta) = reflection_angles(rv.get_rgb(x, y).unwrap());
            theta as f32
        })
        .unwrap();
        let hdr = FPixRgb::from_planes(theta.clone(), theta.clone(), theta).unwrap();

        let env = equirectangular(&rv, &hdr).expect("equirectangular");
        let red = env.channel(0).unwrap();
        let mut max_err = 0.0f64;
        for i in 0..EQUIRECT_HEIGHT {
            let expected = i as f64 * step;
            if expected <= 0.3 || expected >= 2.8 {
                continue;
            }
            for j in 0..EQUIRECT_WIDTH {
                let v = red.get_pixel(j, i).unwrap() as f64;
                max_err = max_err.max((v - expected).abs());
            }
        }
        eprintln!("  ball {}: max polar angle error {:.2e}", size, max_err);
        rp.check(max_err < 1e-4, "interior pixels follow the polar angle");
    }

    assert!(rp.cleanup(), "equirect_polar_ramp regression test failed");
}
