//! Intervening-medium transmission as a function of redshift and
//! rest-frame wavelength.

use std::path::Path;

use thiserror::Error;

use crate::algo::grid::{Grid2d, GridError};
use crate::io::{read_matrix, TableError};

/// Errors raised when building the transmission surface.
#[derive(Debug, Error)]
pub enum TransmissionError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Transmission grid {path} is too small to interpolate")]
    TooSmall { path: String },
}

/// Fraction of source light surviving passage through intervening
/// matter, interpolated over a tabulated (redshift, rest wavelength)
/// grid. Queries outside the table clamp to the nearest tabulated value.
#[derive(Debug, Clone)]
pub struct TransmissionSurface {
    grid: Grid2d,
}

impl TransmissionSurface {
    /// Build the surface from tabulated axes and values.
    ///
    /// # Arguments
    ///
    /// * `redshifts` - Redshift axis, strictly ascending
    /// * `rest_wavelengths` - Rest-frame wavelength axis in Å, strictly ascending
    /// * `values` - Transmission fractions, shape `(wavelengths, redshifts)`
    pub fn new(
        redshifts: Vec<f64>,
        rest_wavelengths: Vec<f64>,
        values: ndarray::Array2<f64>,
    ) -> Result<Self, TransmissionError> {
        Ok(Self {
            grid: Grid2d::new(redshifts, rest_wavelengths, values)?,
        })
    }

    /// Load the tabulated grid: first row carries the redshift axis
    /// (after a corner cell), first column the rest wavelengths.
    pub fn from_path(path: &Path) -> Result<Self, TransmissionError> {
        let raw = read_matrix(path, 0)?;
        let (rows, cols) = raw.dim();
        if rows < 3 || cols < 3 {
            return Err(TransmissionError::TooSmall {
                path: path.display().to_string(),
            });
        }

        let redshifts: Vec<f64> = raw.row(0).iter().skip(1).cloned().collect();
        let rest_wavelengths: Vec<f64> = raw.column(0).iter().skip(1).cloned().collect();
        let values = raw.slice(ndarray::s![1.., 1..]).to_owned();
        Self::new(redshifts, rest_wavelengths, values)
    }

    /// Transmission fraction at `(z, λ_rest)`, clamped to the table.
    pub fn at(&self, redshift: f64, rest_wavelength: f64) -> f64 {
        self.grid.at(redshift, rest_wavelength)
    }
}
