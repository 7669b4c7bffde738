//! Reconstruction from the sparse set of active grid cells
//!
//! After blurring, only cells with nonzero weight hold a meaningful
//! normalized value. Output pixels are read back at their exact grid
//! position by trilinear interpolation restricted to those cells: the
//! corners of the enclosing lattice cube that are inactive are dropped and
//! the remaining trilinear weights renormalized. A query whose eight corners
//! are all inactive takes the value of the nearest active cell.

use std::collections::HashMap;

use crate::grid::GridGeometry;
use crate::{FilterError, FilterResult};
use hdrgrid_core::FPix;

/// One active cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveCell {
    /// Grid coordinate (x, y, z)
    pub coord: [usize; 3],
    /// Normalized (data / weight) value
    pub value: f64,
}

/// Sparse set of active cells with a coordinate index
#[derive(Debug, Clone, Default)]
pub struct ActiveCells {
    cells: Vec<ActiveCell>,
    index: HashMap<[usize; 3], usize>,
}

impl ActiveCells {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell, replacing the value of an existing one
    pub fn insert(&mut self, coord: [usize; 3], value: f64) {
        match self.index.get(&coord) {
            Some(&i) => self.cells[i].value = value,
            None => {
                self.index.insert(coord, self.cells.len());
                self.cells.push(ActiveCell { coord, value });
            }
        }
    }

    /// Number of active cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if no cell is active
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Value of the cell at `coord`, if active
    #[inline]
    pub fn get(&self, coord: [usize; 3]) -> Option<f64> {
        self.index.get(&coord).map(|&i| self.cells[i].value)
    }

    /// Iterate over the active cells in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ActiveCell> {
        self.cells.iter()
    }

    /// Trilinear interpolation over the active corners enclosing `pos`
    ///
    /// Returns `None` when no corner with a nonzero trilinear weight is
    /// active. Negative coordinates have no enclosing cube.
    pub fn interpolate(&self, pos: [f64; 3]) -> Option<f64> {
        if pos.iter().any(|&p| !(p >= 0.0)) {
            return None;
        }

        let base = pos.map(|p| p.floor() as usize);
        let frac = [
            pos[0] - base[0] as f64,
            pos[1] - base[1] as f64,
            pos[2] - base[2] as f64,
        ];

        let mut sum = 0.0;
        let mut weight_sum = 0.0;
        for corner in 0..8usize {
            let mut coord = base;
            let mut w = 1.0;
            for (axis, c) in coord.iter_mut().enumerate() {
                if (corner >> axis) & 1 == 1 {
                    *c += 1;
                    w *= frac[axis];
                } else {
                    w *= 1.0 - frac[axis];
                }
            }
            if w <= 0.0 {
                continue;
            }
            if let Some(v) = self.get(coord) {
                sum += w * v;
                weight_sum += w;
            }
        }

        (weight_sum > 0.0).then(|| sum / weight_sum)
    }

    /// Value of the active cell closest to `pos` (Euclidean, in grid units)
    ///
    /// Ties go to the cell inserted first.
    pub fn nearest(&self, pos: [f64; 3]) -> Option<f64> {
        let mut best: Option<(f64, f64)> = None;
        for cell in &self.cells {
            let d2: f64 = (0..3)
                .map(|i| {
                    let d = cell.coord[i] as f64 - pos[i];
                    d * d
                })
                .sum();
            if best.is_none_or(|(bd, _)| d2 < bd) {
                best = Some((d2, cell.value));
            }
        }
        best.map(|(_, v)| v)
    }
}

/// Read the filtered image back out of the grid
///
/// Each pixel (x, y) is evaluated at the unrounded grid position of
/// (x, y, edge(x, y)).
pub fn reconstruct(
    active: &ActiveCells,
    geometry: &GridGeometry,
    edge: &FPix,
) -> FilterResult<FPix> {
    if active.is_empty() {
        return Err(FilterError::InterpolationGap);
    }

    let mut out = edge.create_template();
    for y in 0..edge.height() {
        for x in 0..edge.width() {
            let pos = geometry.position(x, y, edge.get_pixel_unchecked(x, y));
            let value = match active.interpolate(pos) {
                Some(v) => v,
                None => active.nearest(pos).ok_or(FilterError::InterpolationGap)?,
            };
            out.set_pixel_unchecked(x, y, value as f32);
        }
    }
    Ok(out)
}
