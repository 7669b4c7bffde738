//! Equirectangular environment maps from mirror-ball images
//!
//! A photograph of a mirror ball records, at each pixel, the radiance
//! arriving along that pixel's reflection vector. Converting the reflection
//! vectors to spherical angles gives scattered samples of the environment,
//! which are linearly interpolated onto a regular 360 x 720 (theta x phi)
//! grid. The azimuth is periodic, so the map has no seam at phi = 0.

use std::f64::consts::PI;

use crate::{HdrError, HdrResult};
use hdrgrid_core::{FPix, FPixRgb};
use spade::{DelaunayTriangulation, FloatTriangulation, HasPosition, Point2, Triangulation};

/// Output height (theta samples over [0, pi))
pub const EQUIRECT_HEIGHT: u32 = 360;

/// Output width (phi samples over [0, 2 pi))
pub const EQUIRECT_WIDTH: u32 = 720;

/// Angular step of the output grid
const STEP: f64 = PI / EQUIRECT_HEIGHT as f64;

/// Reflection vectors of an orthographically viewed mirror ball
///
/// Returns a `size` x `size` map whose R, G, B planes hold the x, y, z
/// components of `R = V - 2 (V . N) N` with view direction `V = (0, 0, -1)`
/// and `N` the ball normal (x right, y up, z toward the camera). Pixels
/// outside the ball's disc are NaN.
pub fn mirror_ball_reflections(size: u32) -> HdrResult<FPixRgb> {
    let mut out = FPixRgb::new(size, size)?;
    let s = size as f64;
    for y in 0..size {
        for x in 0..size {
            let nx = 2.0 * (x as f64 + 0.5) / s - 1.0;
            let ny = 1.0 - 2.0 * (y as f64 + 0.5) / s;
            let r2 = nx * nx + ny * ny;
            let rv = if r2 > 1.0 {
                [f32::NAN; 3]
            } else {
                let nz = (1.0 - r2).sqrt();
                // V . N = -nz
                let k = 2.0 * nz;
                [(k * nx) as f32, (k * ny) as f32, (-1.0 + k * nz) as f32]
            };
            out.set_rgb(x, y, rv)?;
        }
    }
    Ok(out)
}

/// Spherical angles (phi, theta) of a reflection vector
///
/// `theta = pi - acos(ry)`, `phi = atan2(rz, rx)` shifted by `3 pi / 2`
/// into [0, 2 pi). An undefined azimuth is taken as 0 before the shift.
pub fn reflection_angles(rv: [f32; 3]) -> (f64, f64) {
    let [rx, ry, rz] = rv.map(f64::from);
    let theta = PI - ry.acos();
    let mut phi = rz.atan2(rx);
    if phi.is_nan() {
        phi = 0.0;
    }
    phi = (phi + 1.5 * PI).rem_euclid(2.0 * PI);
    (phi, theta)
}

/// Angles of output pixel (i, j): theta = i * step, and phi runs from pi
/// to 2 pi over the left half, then from 0 to pi
fn output_angles(i: u32, j: u32) -> (f64, f64) {
    let half = EQUIRECT_WIDTH / 2;
    let phi = if j < half {
        PI + j as f64 * STEP
    } else {
        (j - half) as f64 * STEP
    };
    (phi, i as f64 * STEP)
}

/// One scattered sample and the index of the value it carries
#[derive(Debug, Clone, Copy)]
struct Sample {
    position: Point2<f64>,
    index: usize,
}

impl HasPosition for Sample {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// Piecewise-linear interpolation of scattered 2D samples
///
/// Samples are joined into a Delaunay triangulation; a query inside a
/// triangle takes the barycentric blend of its three corners, and a query
/// on a sample returns that sample. Queries outside the convex hull of the
/// samples are undefined.
///
/// With `x_period`, samples within an eighth of a period of either end of
/// `[0, period)` are repeated one period over, so queries near the seam
/// interpolate across it.
pub struct ScatteredInterpolator {
    triangulation: DelaunayTriangulation<Sample>,
}

impl ScatteredInterpolator {
    /// Triangulate `points`; non-finite points are ignored and of several
    /// points at the same position only the first is kept
    pub fn new(points: &[[f64; 2]], x_period: Option<f64>) -> HdrResult<Self> {
        match x_period {
            Some(period) if !(period > 0.0 && period.is_finite()) => {
                return Err(HdrError::InvalidParameter(format!(
                    "period must be positive and finite, got {}",
                    period
                )));
            }
            _ => {}
        }

        let mut samples: Vec<Sample> = Vec::with_capacity(points.len());
        let mut push = |x: f64, y: f64, index: usize| {
            samples.push(Sample {
                position: Point2::new(flush(x), flush(y)),
                index,
            });
        };
        for (index, p) in points.iter().enumerate() {
            let [x, y] = *p;
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            push(x, y, index);
            if let Some(period) = x_period {
                let band = period / 8.0;
                if x < band {
                    push(x + period, y, index);
                } else if x >= period - band {
                    push(x - period, y, index);
                }
            }
        }

        // Stable sort keeps the first of coincident samples
        samples.sort_by(|a, b| {
            a.position
                .x
                .total_cmp(&b.position.x)
                .then(a.position.y.total_cmp(&b.position.y))
        });
        samples.dedup_by(|a, b| a.position == b.position);

        let triangulation = DelaunayTriangulation::bulk_load(samples).map_err(|e| {
            HdrError::NumericalError(format!("cannot triangulate samples: {:?}", e))
        })?;
        Ok(ScatteredInterpolator { triangulation })
    }

    /// Number of distinct samples, repeated seam samples included
    pub fn len(&self) -> usize {
        self.triangulation.num_vertices()
    }

    /// True if no sample is usable
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Samples around `q` with their interpolation weights, summing to 1
    ///
    /// Returns an empty list when `q` is undefined.
    pub fn weights(&self, q: [f64; 2], out: &mut Vec<(usize, f64)>) {
        out.clear();
        if !(q[0].is_finite() && q[1].is_finite()) || self.is_empty() {
            return;
        }
        let mut corners = Vec::with_capacity(3);
        self.triangulation
            .barycentric()
            .get_weights(Point2::new(q[0], q[1]), &mut corners);
        out.extend(
            corners
                .into_iter()
                .map(|(handle, w)| (self.triangulation.vertex(handle).data().index, w)),
        );
    }
}

/// Coordinates too small for the triangulation's exact predicates are zero
fn flush(v: f64) -> f64 {
    if v.abs() < 1e-30 { 0.0 } else { v }
}

/// Interpolate `values` at a query from precomputed weights; NaN values are
/// skipped and the remaining weights renormalized
fn apply_weights(weights: &[(usize, f64)], values: &[f32]) -> f32 {
    let mut sum = 0.0;
    let mut wsum = 0.0;
    for &(idx, w) in weights {
        let v = values[idx];
        if v.is_nan() {
            continue;
        }
        sum += w * v as f64;
        wsum += w;
    }
    if wsum > 0.0 {
        (sum / wsum) as f32
    } else {
        f32::NAN
    }
}

/// Resample a mirror-ball image into a 360 x 720 equirectangular map
///
/// # Arguments
/// * `reflection` - Reflection vector per pixel (x, y, z in the R, G, B planes)
/// * `hdr` - Radiance per pixel, same size as `reflection`
///
/// Output pixels outside the convex hull of the samples are filled with the
/// mean of all interpolated values over the three channels.
///
/// # Errors
///
/// - `HdrError::InvalidShape` if the inputs differ in size
/// - `HdrError::InterpolationGap` if no output pixel could be interpolated
pub fn equirectangular(reflection: &FPixRgb, hdr: &FPixRgb) -> HdrResult<FPixRgb> {
    if reflection.dimensions() != hdr.dimensions() {
        return Err(HdrError::InvalidShape(format!(
            "reflection map is {:?}, image is {:?}",
            reflection.dimensions(),
            hdr.dimensions()
        )));
    }

    let (w, h) = reflection.dimensions();
    let mut points = Vec::with_capacity((w * h) as usize);
    for y in 0..h {
        for x in 0..w {
            let (phi, theta) = reflection_angles(reflection.get_rgb(x, y)?);
            points.push([phi, theta]);
        }
    }
    let interp = ScatteredInterpolator::new(&points, Some(2.0 * PI))?;

    let channels = hdr.planes();
    let mut out = FPixRgb::new(EQUIRECT_WIDTH, EQUIRECT_HEIGHT)?;
    let mut weights = Vec::new();
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for i in 0..EQUIRECT_HEIGHT {
        for j in 0..EQUIRECT_WIDTH {
            let (phi, theta) = output_angles(i, j);
            interp.weights([phi, theta], &mut weights);
            let mut px = [f32::NAN; 3];
            for (c, plane) in channels.iter().enumerate() {
                px[c] = apply_weights(&weights, plane.data());
                if !px[c].is_nan() {
                    sum += px[c] as f64;
                    count += 1;
                }
            }
            out.set_rgb(j, i, px)?;
        }
    }

    if count == 0 {
        return Err(HdrError::InterpolationGap);
    }
    let mean = (sum / count as f64) as f32;
    for plane in out.planes_mut() {
        fill_nan(plane, mean);
    }
    Ok(out)
}

fn fill_nan(plane: &mut FPix, value: f32) {
    for v in plane.data_mut() {
        if v.is_nan() {
            *v = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_ball_center_reflects_back() {
        let rv = mirror_ball_reflections(5).unwrap();
        let center = rv.get_rgb(2, 2).unwrap();
        assert!(center[0].abs() < 1e-6);
        assert!(center[1].abs() < 1e-6);
        assert!((center[2] - 1.0).abs() < 1e-6);
        // Corner lies outside the disc
        assert!(rv.get_rgb(0, 0).unwrap()[0].is_nan());
    }

    #[test]
    fn test_mirror_ball_unit_vectors() {
        let rv = mirror_ball_reflections(16).unwrap();
        for y in 0..16 {
            for x in 0..16 {
                let [a, b, c] = rv.get_rgb(x, y).unwrap();
                if a.is_nan() {
                    continue;
                }
                assert!(((a * a + b * b + c * c) - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_reflection_angles() {
        // Straight up: theta = pi, phi from atan2(0, 0) = 0
        let (phi, theta) = reflection_angles([0.0, 1.0, 0.0]);
        assert!((theta - PI).abs() < 1e-12);
        assert!((phi - 1.5 * PI).abs() < 1e-12);

        // Along +x: theta = pi / 2, phi = 3 pi / 2
        let (phi, theta) = reflection_angles([1.0, 0.0, 0.0]);
        assert!((theta - PI / 2.0).abs() < 1e-12);
        assert!((phi - 1.5 * PI).abs() < 1e-12);

        // Along +z: atan2 = pi / 2, wraps to 0
        let (phi, _) = reflection_angles([0.0, 0.0, 1.0]);
        assert!(phi.abs() < 1e-12 || (phi - 2.0 * PI).abs() < 1e-12);

        let (phi, theta) = reflection_angles([f32::NAN; 3]);
        assert!(theta.is_nan());
        assert!((phi - 1.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_output_angles() {
        assert_eq!(output_angles(0, 0), (PI, 0.0));
        assert_eq!(output_angles(0, 360), (0.0, 0.0));
        let (phi, theta) = output_angles(180, 719);
        assert!((phi - 359.0 * STEP).abs() < 1e-12);
        assert!((theta - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_scattered_linear_interpolation() {
        let points = [[0.0, 0.0], [2.0, 0.0], [0.0, 2.0], [f64::NAN, 0.0], [0.0, 0.0]];
        let interp = ScatteredInterpolator::new(&points, None).unwrap();
        assert_eq!(interp.len(), 3);
        // f(x, y) = x + 2 y at the corners
        let values = [0.0f32, 2.0, 4.0, 100.0, 50.0];

        let mut w = Vec::new();
        interp.weights([2.0, 0.0], &mut w);
        assert_eq!(apply_weights(&w, &values), 2.0);

        interp.weights([0.5, 0.5], &mut w);
        assert!((apply_weights(&w, &values) - 1.5).abs() < 1e-6);
        let total: f64 = w.iter().map(|&(_, wi)| wi).sum();
        assert!((total - 1.0).abs() < 1e-12);

        interp.weights([3.0, 3.0], &mut w);
        assert!(w.is_empty());
        assert!(apply_weights(&w, &values).is_nan());
    }

    #[test]
    fn test_scattered_periodic_seam() {
        // One column of samples on each side of the seam of a period-8 axis
        let points = [[0.5, 0.0], [0.5, 4.0], [7.5, 0.0], [7.5, 4.0]];
        let values = [1.0f32, 1.0, 3.0, 3.0];
        let mut w = Vec::new();

        let plain = ScatteredInterpolator::new(&points, None).unwrap();
        plain.weights([0.0, 2.0], &mut w);
        assert!(w.is_empty());

        let periodic = ScatteredInterpolator::new(&points, Some(8.0)).unwrap();
        assert_eq!(periodic.len(), 8);
        // Halfway between x = -0.5 (value 3) and x = 0.5 (value 1)
        periodic.weights([0.0, 2.0], &mut w);
        assert!((apply_weights(&w, &values) - 2.0).abs() < 1e-6);
        periodic.weights([7.75, 1.0], &mut w);
        assert!((apply_weights(&w, &values) - 2.5).abs() < 1e-6);

        assert!(ScatteredInterpolator::new(&points, Some(0.0)).is_err());
    }

    #[test]
    fn test_equirectangular_constant_radiance() {
        let rv = mirror_ball_reflections(64).unwrap();
        let mut hdr = FPixRgb::new(64, 64).unwrap();
        for (c, plane) in hdr.planes_mut().iter_mut().enumerate() {
            plane.set_all(0.25 * (c + 1) as f32);
        }
        let out = equirectangular(&rv, &hdr).unwrap();
        assert_eq!(out.dimensions(), (EQUIRECT_WIDTH, EQUIRECT_HEIGHT));
        assert!(out.planes().iter().all(|p| p.is_all_finite()));

        // Interpolated pixels reproduce the channel value; the rest carry the
        // joint mean, which lies between the channel values.
        let (lo, hi) = out.finite_range().unwrap();
        assert!(lo >= 0.25 - 1e-6);
        assert!(hi <= 0.75 + 1e-6);
    }

    #[test]
    fn test_equirectangular_errors() {
        let rv = mirror_ball_reflections(8).unwrap();
        let hdr = FPixRgb::new(8, 9).unwrap();
        assert!(matches!(
            equirectangular(&rv, &hdr),
            Err(HdrError::InvalidShape(_))
        ));

        let mut empty = FPixRgb::new(4, 4).unwrap();
        for plane in empty.planes_mut() {
            plane.set_all(f32::NAN);
        }
        let hdr = FPixRgb::new(4, 4).unwrap();
        assert!(matches!(
            equirectangular(&empty, &hdr),
            Err(HdrError::InterpolationGap)
        ));
    }
}
