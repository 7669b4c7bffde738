//! Sparse least squares
//!
//! Solves `min ||A x - b||` for a sparse `A` with `faer`'s matrix-free LSMR
//! (Fong and Saunders, SIAM J. Sci. Comput. 33(5), 2011). LSMR belongs to
//! the LSQR family: it only needs products with `A` and `A^T`, so `A` is
//! never factored, and it stops once the normal-equation residual
//! `||A^T (b - A x)||` falls below the requested relative tolerance.

use crate::sparse::TripletMatrix;
use crate::{HdrError, HdrResult};
use faer::dyn_stack::{MemBuffer, MemStack, StackReq};
use faer::linalg::temp_mat_scratch;
use faer::matrix_free::lsmr::{LsmrParams, lsmr, lsmr_scratch};
use faer::matrix_free::{IdentityPrecond, InitialGuessStatus};
use faer::{Mat, Par};

/// Solver tolerances
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LsmrOptions {
    /// Relative tolerance on the normal-equation residual
    pub tolerance: f64,
    /// Maximum number of iterations; `None` selects `max(20 * ncols, 1000)`
    pub max_iters: Option<usize>,
}

impl Default for LsmrOptions {
    fn default() -> Self {
        LsmrOptions {
            tolerance: 1e-10,
            max_iters: None,
        }
    }
}

impl LsmrOptions {
    /// Set the iteration limit
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = Some(max_iters);
        self
    }

    /// Set the relative tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn iteration_limit(&self, ncols: usize) -> usize {
        self.max_iters.unwrap_or_else(|| (20 * ncols).max(1000))
    }

    fn validate(&self) -> HdrResult<()> {
        if !(self.tolerance > 0.0 && self.tolerance < 1.0) {
            return Err(HdrError::InvalidParameter(format!(
                "tolerance must lie in (0, 1), got {}",
                self.tolerance
            )));
        }
        if self.max_iters == Some(0) {
            return Err(HdrError::InvalidParameter(
                "max_iters must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Solver output
#[derive(Debug, Clone)]
pub struct LsmrSolution {
    /// Solution vector
    pub x: Vec<f64>,
    /// Iterations performed
    pub iterations: usize,
    /// `||b - A x||`
    pub residual_norm: f64,
}

/// Solve `min ||A x - b||` with LSMR, starting from `x = 0`
///
/// # Errors
///
/// - `HdrError::InvalidShape` if `b.len() != a.rows()`
/// - `HdrError::InvalidParameter` for invalid options
/// - `HdrError::SolverDivergence` if the iteration budget runs out before
///   the tolerance is met
pub fn solve_least_squares(
    a: &TripletMatrix,
    b: &[f64],
    options: &LsmrOptions,
) -> HdrResult<LsmrSolution> {
    if b.len() != a.rows() {
        return Err(HdrError::InvalidShape(format!(
            "right-hand side has {} entries, matrix has {} rows",
            b.len(),
            a.rows()
        )));
    }
    options.validate()?;

    let n = a.cols();
    if b.iter().all(|&v| v == 0.0) {
        return Ok(LsmrSolution {
            x: vec![0.0; n],
            iterations: 0,
            residual_norm: 0.0,
        });
    }

    let mat = a.to_faer()?;
    let max_iters = options.iteration_limit(n);
    let rhs = Mat::from_fn(b.len(), 1, |i, _| b[i]);
    let mut out = Mat::<f64>::zeros(n, 1);

    let mut params = LsmrParams::default();
    params.initial_guess = InitialGuessStatus::Zero;
    params.abs_tolerance = 0.0;
    params.rel_tolerance = options.tolerance;
    params.max_iters = max_iters;

    // faer 0.22's `lsmr_scratch` omits the two n x k work matrices (`w`,
    // `wbar`) that `lsmr` allocates, so request them explicitly.
    let mut mem = MemBuffer::new(StackReq::all_of(&[
        lsmr_scratch(IdentityPrecond { dim: n }, mat.as_ref(), 1, Par::Seq),
        temp_mat_scratch::<f64>(n, 1),
        temp_mat_scratch::<f64>(n, 1),
    ]));
    let result = lsmr(
        out.as_mut(),
        IdentityPrecond { dim: n },
        mat.as_ref(),
        rhs.as_ref(),
        params,
        |_| {},
        Par::Seq,
        MemStack::new(&mut mem),
    );

    let x: Vec<f64> = (0..n).map(|i| out[(i, 0)]).collect();
    let residual_norm = a.residual_norm(&x, b);
    match result {
        Ok(info) if info.iter_count < max_iters => Ok(LsmrSolution {
            x,
            iterations: info.iter_count,
            residual_norm,
        }),
        _ => Err(HdrError::SolverDivergence {
            iterations: max_iters,
            residual: residual_norm,
        }),
    }
}
