//! Bilinear interpolation over a rectilinear 2D grid.

use ndarray::Array2;
use thiserror::Error;

use super::misc::clamped_interval;

/// Errors raised when constructing a [`Grid2d`] from tabulated values.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("Grid axes need at least 2 points, got {0} x {1}")]
    InsufficientAxis(usize, usize),

    #[error("Grid {axis} axis must be strictly ascending")]
    UnsortedAxis { axis: &'static str },

    #[error("Grid values have shape {rows} x {cols}, expected {expected_rows} x {expected_cols}")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },
}

/// A smooth function of two variables backed by tabulated values on a
/// rectilinear grid.
///
/// Values are stored row-major as `values[[y_index, x_index]]`. Queries
/// outside the tabulated range clamp to the nearest edge rather than
/// extrapolating; callers that must reject out-of-range input check the
/// axes themselves first.
#[derive(Debug, Clone)]
pub struct Grid2d {
    xs: Vec<f64>,
    ys: Vec<f64>,
    values: Array2<f64>,
}

impl Grid2d {
    /// Build an interpolant from axis samples and a value table.
    ///
    /// # Arguments
    ///
    /// * `xs` - Column axis, strictly ascending
    /// * `ys` - Row axis, strictly ascending
    /// * `values` - Table of shape `(ys.len(), xs.len())`
    pub fn new(xs: Vec<f64>, ys: Vec<f64>, values: Array2<f64>) -> Result<Self, GridError> {
        if xs.len() < 2 || ys.len() < 2 {
            return Err(GridError::InsufficientAxis(xs.len(), ys.len()));
        }
        for (axis, samples) in [("x", &xs), ("y", &ys)] {
            if samples.windows(2).any(|w| w[1] <= w[0]) {
                return Err(GridError::UnsortedAxis { axis });
            }
        }
        let (rows, cols) = values.dim();
        if rows != ys.len() || cols != xs.len() {
            return Err(GridError::ShapeMismatch {
                rows,
                cols,
                expected_rows: ys.len(),
                expected_cols: xs.len(),
            });
        }
        Ok(Self { xs, ys, values })
    }

    /// Evaluate the interpolant at `(x, y)`, clamped to the grid bounds.
    pub fn at(&self, x: f64, y: f64) -> f64 {
        let (ix, tx) = clamped_interval(&self.xs, x);
        let (iy, ty) = clamped_interval(&self.ys, y);

        let v00 = self.values[[iy, ix]];
        let v01 = self.values[[iy, ix + 1]];
        let v10 = self.values[[iy + 1, ix]];
        let v11 = self.values[[iy + 1, ix + 1]];

        let top = v00 * (1.0 - tx) + v01 * tx;
        let bottom = v10 * (1.0 - tx) + v11 * tx;
        top * (1.0 - ty) + bottom * ty
    }

    /// Column axis samples.
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Row axis samples.
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    /// The raw value table, shape `(ys.len(), xs.len())`.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}
