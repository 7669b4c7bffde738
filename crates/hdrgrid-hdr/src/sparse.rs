//! Sparse matrices
//!
//! Linear systems are assembled as (row, column, value) triplets and
//! compressed once into a `faer` column-major sparse matrix for the solver.

use crate::{HdrError, HdrResult};
use faer::sparse::SparseColMat;

pub use faer::sparse::Triplet;

/// Sparse matrix under construction
#[derive(Debug, Clone)]
pub struct TripletMatrix {
    rows: usize,
    cols: usize,
    triplets: Vec<Triplet<usize, usize, f64>>,
}

impl TripletMatrix {
    /// Create an empty `rows` x `cols` matrix
    pub fn new(rows: usize, cols: usize) -> Self {
        TripletMatrix {
            rows,
            cols,
            triplets: Vec::new(),
        }
    }

    /// Create an empty matrix with room for `capacity` entries
    pub fn with_capacity(rows: usize, cols: usize, capacity: usize) -> Self {
        TripletMatrix {
            rows,
            cols,
            triplets: Vec::with_capacity(capacity),
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Stored entries, duplicates included
    pub fn triplets(&self) -> &[Triplet<usize, usize, f64>] {
        &self.triplets
    }

    /// Add an entry; entries at the same position are summed on compression.
    /// Zero values are not stored.
    pub fn add(&mut self, row: usize, col: usize, val: f64) -> HdrResult<()> {
        if row >= self.rows || col >= self.cols {
            return Err(HdrError::InvalidShape(format!(
                "entry ({}, {}) outside {}x{} matrix",
                row, col, self.rows, self.cols
            )));
        }
        if val != 0.0 {
            self.triplets.push(Triplet::new(row, col, val));
        }
        Ok(())
    }

    /// Compress into a column-major sparse matrix, summing duplicates
    pub fn to_faer(&self) -> HdrResult<SparseColMat<usize, f64>> {
        SparseColMat::try_new_from_triplets(self.rows, self.cols, &self.triplets).map_err(|e| {
            HdrError::InvalidShape(format!(
                "cannot build {}x{} sparse matrix: {:?}",
                self.rows, self.cols, e
            ))
        })
    }

    /// `||b - A x||` over the stored entries
    pub fn residual_norm(&self, x: &[f64], b: &[f64]) -> f64 {
        let mut r = b.to_vec();
        for t in &self.triplets {
            r[t.row] -= t.val * x[t.col];
        }
        r.iter().map(|v| v * v).sum::<f64>().sqrt()
    }
}
