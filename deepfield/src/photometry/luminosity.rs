//! Stellar population luminosity tables.
//!
//! One table per wavelength, each a (log-age × metallicity) grid of
//! luminosity per unit stellar mass. The on-disk format keeps the
//! wavelength in a text header; rows carry log10 age in the first
//! column and the first row carries the metallicity axis.

use std::path::Path;

use ndarray::{Array2, Array3};
use thiserror::Error;

use crate::io::{read_header_line, read_matrix, TableError};

/// Errors raised when assembling the luminosity grid.
#[derive(Debug, Error)]
pub enum LuminosityError {
    #[error("Luminosity grid needs at least 2 wavelength tables, got {0}")]
    InsufficientWavelengths(usize),

    #[error("Duplicate wavelength {0} Å in luminosity tables")]
    DuplicateWavelength(f64),

    #[error("Luminosity table {axis} axis must be strictly ascending")]
    NonMonotonicAxis { axis: &'static str },

    #[error("Luminosity table for {wavelength} Å has shape {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
    ShapeMismatch {
        wavelength: f64,
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    #[error("No luminosity tables found under {0}")]
    NoTables(String),

    #[error("Luminosity table header {0:?} does not carry a wavelength")]
    BadHeader(String),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Source luminosity density per unit stellar mass, tabulated over
/// (wavelength, log age, metallicity).
///
/// The wavelength axis of the source files is irregularly sampled and
/// unordered; construction sorts it (carrying the tables along) so every
/// consumer can rely on ascending wavelengths. Immutable once built.
#[derive(Debug, Clone)]
pub struct LuminosityGrid {
    wavelengths: Vec<f64>,
    log_ages: Vec<f64>,
    metallicities: Vec<f64>,
    /// Indexed `[wavelength, log age, metallicity]`, in solar
    /// luminosities per Hz per solar mass.
    values: Array3<f64>,
}

impl LuminosityGrid {
    /// Assemble a grid from per-wavelength tables.
    ///
    /// # Arguments
    ///
    /// * `tables` - `(wavelength Å, values)` pairs, any order; each table
    ///   has shape `(log_ages.len(), metallicities.len())`
    /// * `log_ages` - log10 age axis in years, strictly ascending
    /// * `metallicities` - metallicity axis in solar units, strictly ascending
    pub fn new(
        mut tables: Vec<(f64, Array2<f64>)>,
        log_ages: Vec<f64>,
        metallicities: Vec<f64>,
    ) -> Result<Self, LuminosityError> {
        if tables.len() < 2 {
            return Err(LuminosityError::InsufficientWavelengths(tables.len()));
        }
        if log_ages.windows(2).any(|w| w[1] <= w[0]) {
            return Err(LuminosityError::NonMonotonicAxis { axis: "log age" });
        }
        if metallicities.windows(2).any(|w| w[1] <= w[0]) {
            return Err(LuminosityError::NonMonotonicAxis {
                axis: "metallicity",
            });
        }

        // Source files come in arbitrary order; sort the wavelength axis
        // and carry the tables along with it.
        tables.sort_by(|a, b| a.0.total_cmp(&b.0));
        if let Some(w) = tables.windows(2).find(|w| w[1].0 <= w[0].0) {
            return Err(LuminosityError::DuplicateWavelength(w[1].0));
        }

        let (n_age, n_met) = (log_ages.len(), metallicities.len());
        let mut values = Array3::zeros((tables.len(), n_age, n_met));
        let mut wavelengths = Vec::with_capacity(tables.len());
        for (i, (wavelength, table)) in tables.into_iter().enumerate() {
            let (rows, cols) = table.dim();
            if rows != n_age || cols != n_met {
                return Err(LuminosityError::ShapeMismatch {
                    wavelength,
                    rows,
                    cols,
                    expected_rows: n_age,
                    expected_cols: n_met,
                });
            }
            values.index_axis_mut(ndarray::Axis(0), i).assign(&table);
            wavelengths.push(wavelength);
        }

        Ok(Self {
            wavelengths,
            log_ages,
            metallicities,
            values,
        })
    }

    /// Load every `muv.bin*` table under a directory.
    ///
    /// Each file: a header line whose third whitespace token is the
    /// wavelength in Å, then a table whose first row (after a corner
    /// cell) is the metallicity axis and whose first column is log10 age.
    pub fn load_dir(dir: &Path) -> Result<Self, LuminosityError> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)
            .map_err(|source| TableError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("muv.bin"))
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(LuminosityError::NoTables(dir.display().to_string()));
        }

        let mut tables = Vec::with_capacity(paths.len());
        let mut axes: Option<(Vec<f64>, Vec<f64>)> = None;
        for path in &paths {
            let header = read_header_line(path)?;
            let wavelength: f64 = header
                .split_whitespace()
                .nth(2)
                .and_then(|tok| tok.parse().ok())
                .ok_or_else(|| LuminosityError::BadHeader(header.clone()))?;

            let raw = read_matrix(path, 1)?;
            let metallicities: Vec<f64> = raw.row(0).iter().skip(1).cloned().collect();
            let log_ages: Vec<f64> = raw.column(0).iter().skip(1).cloned().collect();
            let table = raw.slice(ndarray::s![1.., 1..]).to_owned();

            // Every file shares the same (age, metallicity) axes.
            axes.get_or_insert((log_ages, metallicities));
            tables.push((wavelength, table));
        }

        let (log_ages, metallicities) = axes.expect("at least one table was read");
        Self::new(tables, log_ages, metallicities)
    }

    /// Wavelength axis in angstroms, ascending.
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// log10 age axis in years, ascending.
    pub fn log_ages(&self) -> &[f64] {
        &self.log_ages
    }

    /// Metallicity axis in solar units, ascending.
    pub fn metallicities(&self) -> &[f64] {
        &self.metallicities
    }

    /// Luminosity density at a grid point, indexed
    /// `(wavelength, log age, metallicity)`.
    pub fn value(&self, i_wavelength: usize, i_age: usize, i_metallicity: usize) -> f64 {
        self.values[[i_wavelength, i_age, i_metallicity]]
    }
}
