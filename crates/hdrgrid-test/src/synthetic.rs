//! Deterministic synthetic fixtures
//!
//! Test images and exposure stacks generated from closed-form models, so
//! regression tests know the exact answer without shipping image files.

use hdrgrid_core::FPix;

/// Simple linear congruential generator for reproducible randomness
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    /// Create a generator from a seed
    pub fn new(seed: u32) -> Self {
        Self {
            state: seed as u64 ^ 0x9e37_79b9_7f4a_7c15,
        }
    }

    fn next(&mut self) -> u64 {
        // LCG parameters from Numerical Recipes
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state
    }

    /// Uniform value in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        (self.next() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform value in [lo, hi)
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Standard normal sample (Box-Muller)
    pub fn next_gaussian(&mut self) -> f64 {
        let u1 = self.next_f64().max(f64::MIN_POSITIVE);
        let u2 = self.next_f64();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }
}

/// Vertical step edge: columns `x < width / 2` hold `low`, the rest `high`
pub fn step_image(width: u32, height: u32, low: f32, high: f32) -> FPix {
    FPix::from_fn(width, height, |x, _| if x < width / 2 { low } else { high })
        .expect("valid step image dimensions")
}

/// Horizontal ramp from 0 at the left column to 1 at the right column
pub fn ramp_image(width: u32, height: u32) -> FPix {
    let denom = (width.max(2) - 1) as f32;
    FPix::from_fn(width, height, |x, _| x as f32 / denom).expect("valid ramp image dimensions")
}

/// Add zero-mean Gaussian noise with standard deviation `stdev`
pub fn add_noise(fpix: &FPix, stdev: f32, seed: u32) -> FPix {
    let mut rng = SimpleRng::new(seed);
    let mut out = fpix.clone();
    for v in out.data_mut() {
        *v += stdev * rng.next_gaussian() as f32;
    }
    out
}

/// Ground-truth log response of a pure gamma camera: `g(z) = gamma * ln(z / 255)`
///
/// Undefined (negative infinity) at `z = 0`.
pub fn gamma_log_response(z: u8, gamma: f64) -> f64 {
    gamma * (z as f64 / 255.0).ln()
}

/// A synthetic multi-exposure capture of a static scene
pub struct ExposureStack {
    /// One image per exposure, values `z / 255` with `z` an integer in [0, 255]
    pub images: Vec<FPix>,
    /// Natural log of each exposure time
    pub log_exposures: Vec<f64>,
    /// Natural log of the scene irradiance per pixel (row-major)
    pub log_irradiance: Vec<f64>,
    /// Camera gamma used to quantize the exposures
    pub gamma: f64,
}

/// Render a scene with log-uniform irradiance through a gamma camera
///
/// Each exposure records `z = round(255 * (E * dt)^(1 / gamma) + n)` clamped
/// to [0, 255], where `n` is Gaussian noise with `noise` standard deviation
/// in intensity levels.
pub fn exposure_stack(
    width: u32,
    height: u32,
    exposure_times: &[f64],
    gamma: f64,
    noise: f64,
    seed: u32,
) -> ExposureStack {
    let mut rng = SimpleRng::new(seed);
    let npix = (width as usize) * (height as usize);
    let log_irradiance: Vec<f64> = (0..npix)
        .map(|_| rng.uniform((1e-3f64).ln(), 0.0))
        .collect();

    let images = exposure_times
        .iter()
        .map(|&dt| {
            let data = log_irradiance
                .iter()
                .map(|&le| {
                    let x = (le.exp() * dt).powf(1.0 / gamma);
                    let z = (255.0 * x + noise * rng.next_gaussian()).round();
                    (z.clamp(0.0, 255.0) / 255.0) as f32
                })
                .collect();
            FPix::from_data(width, height, data).expect("valid exposure dimensions")
        })
        .collect();

    ExposureStack {
        images,
        log_exposures: exposure_times.iter().map(|t| t.ln()).collect(),
        log_irradiance,
        gamma,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_reproducible() {
        let mut a = SimpleRng::new(7);
        let mut b = SimpleRng::new(7);
        for _ in 0..10 {
            let v = a.next_f64();
            assert_eq!(v, b.next_f64());
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_step_image() {
        let step = step_image(8, 2, 0.0, 1.0);
        assert_eq!(step.row(0), &[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_exposure_stack_quantized() {
        let stack = exposure_stack(4, 4, &[0.25, 1.0], 2.2, 0.0, 3);
        assert_eq!(stack.images.len(), 2);
        for img in &stack.images {
            for &v in img.data() {
                let z = v * 255.0;
                assert!((z - z.round()).abs() < 1e-3);
            }
        }
        // Longer exposure is never darker
        for (a, b) in stack.images[0].data().iter().zip(stack.images[1].data()) {
            assert!(b >= a);
        }
    }
}
