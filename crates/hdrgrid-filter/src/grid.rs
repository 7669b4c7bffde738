//! Bilateral grid
//!
//! A bilateral grid is a coarse 3D histogram over (x, y, edge value). Each
//! input pixel is splatted into the cell nearest its downsampled position;
//! the grid keeps two parallel accumulators, the sum of values (`data`) and
//! the sample count (`weight`).
//!
//! Invariant: a cell whose weight is zero carries no meaningful data and is
//! never divided without the zero guard in [`BilateralGrid::normalize`].

use crate::bilateral::ResolvedParams;
use crate::convolve::convolve3;
use crate::reconstruct::ActiveCells;
use crate::{FilterError, FilterResult, Kernel3};
use hdrgrid_core::FPix;

/// Maximum number of cells in a grid (2^24, 128 MiB of `f64`)
///
/// A filter call holds up to five grids of this size at once: the two
/// accumulators, their blurred copies and the normalized grid.
const MAX_GRID_CELLS: f64 = (1u64 << 24) as f64;

/// Weight substituted for empty cells before dividing; any blurred weight
/// below -1 marks a cell that had none.
const EMPTY_WEIGHT_SENTINEL: f64 = -2.0;

/// Dense 3D array of `f64`
///
/// Dimensions are (nx, ny, nz) = (grid width, grid height, range depth);
/// the range axis is contiguous in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid3 {
    nx: usize,
    ny: usize,
    nz: usize,
    data: Vec<f64>,
}

impl Grid3 {
    /// Create a zeroed grid
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidParameters` for an empty grid or one with
    /// more than 2^24 cells.
    pub fn new(nx: usize, ny: usize, nz: usize) -> FilterResult<Self> {
        let cells = nx as f64 * ny as f64 * nz as f64;
        if cells == 0.0 || cells > MAX_GRID_CELLS {
            return Err(FilterError::InvalidParameters(format!(
                "grid of {}x{}x{} cells is empty or too large",
                nx, ny, nz
            )));
        }
        Ok(Grid3 {
            nx,
            ny,
            nz,
            data: vec![0.0; nx * ny * nz],
        })
    }

    /// A zeroed grid with the dimensions of `other`
    pub fn zeros_like(other: &Grid3) -> Self {
        Grid3 {
            nx: other.nx,
            ny: other.ny,
            nz: other.nz,
            data: vec![0.0; other.data.len()],
        }
    }

    /// Dimensions as (nx, ny, nz)
    #[inline]
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.nx + x) * self.nz + z
    }

    /// Value at (x, y, z)
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> f64 {
        self.data[self.index(x, y, z)]
    }

    /// Add `value` to the cell at (x, y, z)
    #[inline]
    pub fn add(&mut self, x: usize, y: usize, z: usize, value: f64) {
        let idx = self.index(x, y, z);
        self.data[idx] += value;
    }

    /// Raw cell values
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Sum of all cells
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }
}

/// Mapping between image space and grid space
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    /// Image pixels per spatial cell
    pub sampling_spatial: f64,
    /// Edge units per range cell
    pub sampling_range: f64,
    /// Edge value mapped to the first unpadded range cell
    pub edge_min: f64,
    /// Empty cells before the first spatial sample, per side
    pub padding_xy: usize,
    /// Empty cells before the first range sample, per side
    pub padding_z: usize,
    /// Grid width
    pub nx: usize,
    /// Grid height
    pub ny: usize,
    /// Grid depth (range axis)
    pub nz: usize,
}

impl GridGeometry {
    /// Size a grid for a `width` x `height` image
    ///
    /// Each axis holds `floor((n - 1) / sampling) + 1` sampled cells plus
    /// `padding` empty cells on both sides, so the blur kernel never reads
    /// outside the grid around a sample.
    pub fn new(width: u32, height: u32, params: &ResolvedParams) -> FilterResult<Self> {
        let padding_xy = params.padding_xy();
        let padding_z = params.padding_z();
        let ss = params.sampling_spatial;
        let sr = params.sampling_range;
        let edge_delta = params.edge_max - params.edge_min;

        let extent = |span: f64, sampling: f64, padding: usize| -> f64 {
            (span / sampling).floor() + 1.0 + 2.0 * padding as f64
        };
        let nx = extent((width - 1) as f64, ss, padding_xy);
        let ny = extent((height - 1) as f64, ss, padding_xy);
        let nz = extent(edge_delta.max(0.0), sr, padding_z);

        if nx * ny * nz > MAX_GRID_CELLS {
            return Err(FilterError::InvalidParameters(format!(
                "sampling rates ({}, {}) produce a {}x{}x{} grid",
                ss, sr, nx, ny, nz
            )));
        }

        Ok(GridGeometry {
            sampling_spatial: ss,
            sampling_range: sr,
            edge_min: params.edge_min,
            padding_xy,
            padding_z,
            nx: nx as usize,
            ny: ny as usize,
            nz: nz as usize,
        })
    }

    /// Exact (unrounded) grid coordinate of pixel (x, y) with edge value `edge`
    ///
    /// Edge values outside the configured range are clamped into the grid's
    /// range axis.
    #[inline]
    pub fn position(&self, x: u32, y: u32, edge: f32) -> [f64; 3] {
        let gx = x as f64 / self.sampling_spatial + self.padding_xy as f64;
        let gy = y as f64 / self.sampling_spatial + self.padding_xy as f64;
        let gz = (edge as f64 - self.edge_min) / self.sampling_range + self.padding_z as f64;
        [gx, gy, gz.clamp(0.0, (self.nz - 1) as f64)]
    }

    /// Splat cell of pixel (x, y): the position rounded half-to-even
    #[inline]
    pub fn cell(&self, x: u32, y: u32, edge: f32) -> [usize; 3] {
        let [gx, gy, gz] = self.position(x, y, edge);
        [
            gx.round_ties_even() as usize,
            gy.round_ties_even() as usize,
            gz.round_ties_even() as usize,
        ]
    }
}

/// The pair of data / weight accumulators with their geometry
#[derive(Debug, Clone)]
pub struct BilateralGrid {
    geometry: GridGeometry,
    data: Grid3,
    weight: Grid3,
}

impl BilateralGrid {
    /// Splat every finite pixel of `data` into the cell chosen by `edge`
    ///
    /// Pixels whose value is NaN or infinite are skipped: they add neither
    /// data nor weight.
    pub fn splat(data: &FPix, edge: &FPix, geometry: GridGeometry) -> FilterResult<Self> {
        data.check_same_size(edge)?;

        let mut grid_data = Grid3::new(geometry.nx, geometry.ny, geometry.nz)?;
        let mut grid_weight = Grid3::zeros_like(&grid_data);

        for y in 0..data.height() {
            for x in 0..data.width() {
                let value = data.get_pixel_unchecked(x, y);
                if !value.is_finite() {
                    continue;
                }
                let [cx, cy, cz] = geometry.cell(x, y, edge.get_pixel_unchecked(x, y));
                grid_data.add(cx, cy, cz, value as f64);
                grid_weight.add(cx, cy, cz, 1.0);
            }
        }

        Ok(BilateralGrid {
            geometry,
            data: grid_data,
            weight: grid_weight,
        })
    }

    /// Grid geometry
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Accumulated values
    pub fn data(&self) -> &Grid3 {
        &self.data
    }

    /// Accumulated weights
    pub fn weight(&self) -> &Grid3 {
        &self.weight
    }

    /// Total weight in the grid (the number of splatted samples before blurring)
    pub fn total_weight(&self) -> f64 {
        self.weight.sum()
    }

    /// Convolve data and weight independently with `kernel`
    pub fn blur(&self, kernel: &Kernel3) -> BilateralGrid {
        BilateralGrid {
            geometry: self.geometry.clone(),
            data: convolve3(&self.data, kernel),
            weight: convolve3(&self.weight, kernel),
        }
    }

    /// Divide data by weight; cells without weight become 0
    pub fn normalize(&self) -> Grid3 {
        let mut out = Grid3::zeros_like(&self.data);
        for (i, d) in out.data.iter_mut().enumerate() {
            let w = self.weight.data[i];
            let w = if w == 0.0 { EMPTY_WEIGHT_SENTINEL } else { w };
            *d = if w < -1.0 { 0.0 } else { self.data.data[i] / w };
        }
        out
    }

    /// Cells with nonzero weight, paired with their normalized value
    pub fn active_cells(&self) -> ActiveCells {
        let normalized = self.normalize();
        let (nx, ny, nz) = self.weight.dims();
        let mut active = ActiveCells::new();
        for y in 0..ny {
            for x in 0..nx {
                for z in 0..nz {
                    if self.weight.get(x, y, z) > 0.0 {
                        active.insert([x, y, z], normalized.get(x, y, z));
                    }
                }
            }
        }
        active
    }
}
