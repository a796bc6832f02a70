//! Photometric filter response curves.

use std::path::Path;

use crate::algo::misc::clamped_interval;
use crate::io::{read_matrix, TableError};

/// Fraction of the peak response below which a wavelength bin is treated
/// as outside the passband entirely, rather than merely down-weighted.
pub const MIN_RESPONSE_FRACTION: f64 = 5e-4;

/// A filter transmission curve as a function of observed wavelength.
///
/// Response is linearly interpolated inside the tabulated range and
/// identically zero outside it.
#[derive(Debug, Clone)]
pub struct FilterResponse {
    wavelengths: Vec<f64>,
    responses: Vec<f64>,
    peak: f64,
}

/// Errors raised when constructing a filter curve.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("Filter curve needs at least 2 samples, got {0}")]
    InsufficientSamples(usize),

    #[error("Filter curve wavelengths contain duplicates")]
    DuplicateWavelength,

    #[error("Filter curve has no positive response values")]
    NoResponse,

    #[error(transparent)]
    Table(#[from] TableError),
}

impl FilterResponse {
    /// Build a response curve from (wavelength [Å], response) samples.
    /// Samples are sorted by wavelength; duplicates are rejected.
    pub fn new(mut samples: Vec<(f64, f64)>) -> Result<Self, FilterError> {
        if samples.len() < 2 {
            return Err(FilterError::InsufficientSamples(samples.len()));
        }
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        if samples.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(FilterError::DuplicateWavelength);
        }

        let (wavelengths, responses): (Vec<f64>, Vec<f64>) = samples.into_iter().unzip();
        let peak = responses.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if !(peak > 0.0) {
            return Err(FilterError::NoResponse);
        }

        Ok(Self {
            wavelengths,
            responses,
            peak,
        })
    }

    /// Load a two-column (wavelength, response) curve from disk.
    pub fn from_path(path: &Path) -> Result<Self, FilterError> {
        let table = read_matrix(path, 0)?;
        let samples = table
            .rows()
            .into_iter()
            .map(|row| (row[0], row[1]))
            .collect();
        Self::new(samples)
    }

    /// Response at an observed wavelength in angstroms; zero outside the
    /// tabulated range.
    pub fn at(&self, wavelength_angstrom: f64) -> f64 {
        let n = self.wavelengths.len();
        if wavelength_angstrom < self.wavelengths[0] || wavelength_angstrom > self.wavelengths[n - 1]
        {
            return 0.0;
        }
        let (idx, t) = clamped_interval(&self.wavelengths, wavelength_angstrom);
        self.responses[idx] * (1.0 - t) + self.responses[idx + 1] * t
    }

    /// Peak response of the curve.
    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// Indices of the rest-frame wavelength bins whose redshifted
    /// wavelength lands inside the transmissive part of the passband.
    ///
    /// A bin qualifies when the response at `(1 + z) λ` is at least
    /// [`MIN_RESPONSE_FRACTION`] of the peak response. Bins that fail the
    /// cut are excluded entirely.
    pub fn passband_indices(&self, redshift: f64, rest_wavelengths: &[f64]) -> Vec<usize> {
        let floor = MIN_RESPONSE_FRACTION * self.peak;
        rest_wavelengths
            .iter()
            .enumerate()
            .filter(|(_, &lam)| self.at(lam * (1.0 + redshift)) >= floor)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tophat(lo: f64, hi: f64) -> FilterResponse {
        // Steep-edged passband with unit response between lo and hi
        FilterResponse::new(vec![
            (lo - 1.0, 0.0),
            (lo, 1.0),
            (hi, 1.0),
            (hi + 1.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_zero_outside_tabulated_range() {
        let f = tophat(11000.0, 14000.0);
        assert_eq!(f.at(500.0), 0.0);
        assert_eq!(f.at(20000.0), 0.0);
        assert_eq!(f.at(12000.0), 1.0);
    }

    #[test]
    fn test_interpolates_edges() {
        let f = tophat(11000.0, 14000.0);
        assert_relative_eq!(f.at(10999.5), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_sorts_unordered_samples() {
        let f = FilterResponse::new(vec![(3.0, 0.5), (1.0, 0.0), (2.0, 1.0)]).unwrap();
        assert_eq!(f.at(2.0), 1.0);
        assert_eq!(f.peak(), 1.0);
    }

    #[test]
    fn test_passband_indices_redshifted() {
        let f = tophat(11000.0, 14000.0);
        // Rest-frame 1500 Å at z = 7 observes at 12000 Å: inside.
        // Rest-frame 1000 Å observes at 8000 Å: outside.
        let rest = vec![1000.0, 1500.0, 1600.0, 3000.0];
        assert_eq!(f.passband_indices(7.0, &rest), vec![1, 2]);
    }

    #[test]
    fn test_passband_empty_when_band_misses_table() {
        let f = tophat(11000.0, 14000.0);
        let rest = vec![100.0, 200.0];
        assert!(f.passband_indices(0.5, &rest).is_empty());
    }

    #[test]
    fn test_rejects_degenerate_curves() {
        assert!(matches!(
            FilterResponse::new(vec![(1.0, 1.0)]),
            Err(FilterError::InsufficientSamples(1))
        ));
        assert!(matches!(
            FilterResponse::new(vec![(1.0, 1.0), (1.0, 0.5)]),
            Err(FilterError::DuplicateWavelength)
        ));
        assert!(matches!(
            FilterResponse::new(vec![(1.0, 0.0), (2.0, 0.0)]),
            Err(FilterError::NoResponse)
        ));
    }
}
