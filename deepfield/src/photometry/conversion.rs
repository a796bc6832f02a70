//! Per-snapshot band conversion: (metallicity, log age) → flux per unit
//! stellar mass in a photometric band.
//!
//! Built once per snapshot from the luminosity grid, the intervening
//! medium transmission, the filter curve, and the luminosity distance at
//! that redshift. The interpolant must never be reused at a different
//! redshift.

use rayon::prelude::*;
use thiserror::Error;

use crate::algo::grid::{Grid2d, GridError};
use crate::algo::quad::{trapezoid, QuadError};
use crate::cosmology::{self, CosmologyError, CM_PER_MPC};
use crate::hardware::Band;
use crate::photometry::{angstrom_to_hz, FilterResponse, LuminosityGrid, TransmissionSurface, CGS};

/// Errors raised while building a band conversion. Every variant that
/// can surface from a numeric failure carries the offending
/// (redshift, band) pair so batch runs stay diagnosable per snapshot.
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error(
        "Band {band} redshifted to z = {redshift:.4} falls entirely outside \
         the tabulated wavelength coverage"
    )]
    BandOutsideCoverage { band: Band, redshift: f64 },

    #[error("Integration failed for band {band} at z = {redshift:.4}: {source}")]
    Integration {
        band: Band,
        redshift: f64,
        source: QuadError,
    },

    #[error(transparent)]
    Cosmology(#[from] CosmologyError),

    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Mean flux density within a band per unit stellar mass, in nanojanskys
/// per solar mass, as a smooth function of metallicity and log10 age.
#[derive(Debug, Clone)]
pub struct BandConversion {
    band: Band,
    redshift: f64,
    grid: Grid2d,
}

impl BandConversion {
    /// Integrate the population tables through the filter and the
    /// intervening medium for one band at one redshift.
    ///
    /// Restricting to the passband is an index cut, not a weighting: a
    /// wavelength bin whose redshifted response falls below the passband
    /// floor contributes nothing. An empty cut means the band has shifted
    /// off the tabulated coverage, which is a fatal configuration error.
    pub fn build(
        band: Band,
        redshift: f64,
        luminosity: &LuminosityGrid,
        transmission: &TransmissionSurface,
        filter: &FilterResponse,
    ) -> Result<Self, CalibrationError> {
        let indices = filter.passband_indices(redshift, luminosity.wavelengths());
        // The trapezoid rule needs two samples; fewer means the band has
        // effectively no tabulated coverage at this redshift.
        if indices.len() < 2 {
            return Err(CalibrationError::BandOutsideCoverage { band, redshift });
        }

        let wrap_quad = |source: QuadError| CalibrationError::Integration {
            band,
            redshift,
            source,
        };

        // Wavelengths ascend, so frequencies descend; walk the selected
        // indices in reverse to integrate over ascending frequency.
        let rev_indices: Vec<usize> = indices.iter().rev().cloned().collect();
        let wavelengths: Vec<f64> = rev_indices
            .iter()
            .map(|&i| luminosity.wavelengths()[i])
            .collect();
        let frequencies: Vec<f64> = wavelengths.iter().map(|&l| angstrom_to_hz(l)).collect();

        // Filter response per unit frequency at the observed wavelength;
        // its integral normalizes the band to a mean flux density.
        let one_plus_z = 1.0 + redshift;
        let response_per_hz: Vec<f64> = wavelengths
            .iter()
            .zip(&frequencies)
            .map(|(&lam, &nu)| filter.at(lam * one_plus_z) / nu)
            .collect();
        let response_norm = trapezoid(&frequencies, &response_per_hz).map_err(wrap_quad)?;

        let ism: Vec<f64> = wavelengths
            .iter()
            .map(|&lam| transmission.at(redshift, lam))
            .collect();

        let d_l_cm = cosmology::luminosity_distance_mpc(redshift)? * CM_PER_MPC;
        let scale = CGS::NJY_PER_CGS_FLUX * one_plus_z
            / (4.0 * std::f64::consts::PI * d_l_cm * d_l_cm)
            * CGS::SUN_LUMINOSITY
            / response_norm;

        let n_age = luminosity.log_ages().len();
        let n_met = luminosity.metallicities().len();

        // Each (metallicity, age) cell integrates independently.
        let cells: Vec<f64> = (0..n_age * n_met)
            .into_par_iter()
            .map(|cell| {
                let (i_age, i_met) = (cell / n_met, cell % n_met);
                let integrand: Vec<f64> = rev_indices
                    .iter()
                    .enumerate()
                    .map(|(k, &i_lam)| {
                        luminosity.value(i_lam, i_age, i_met) * ism[k] * response_per_hz[k]
                    })
                    .collect();
                trapezoid(&frequencies, &integrand)
                    .map(|v| v * scale)
                    .map_err(wrap_quad)
            })
            .collect::<Result<_, _>>()?;

        let values = ndarray::Array2::from_shape_vec((n_age, n_met), cells)
            .expect("cell count matches grid shape");
        let grid = Grid2d::new(
            luminosity.metallicities().to_vec(),
            luminosity.log_ages().to_vec(),
            values,
        )?;

        Ok(Self {
            band,
            redshift,
            grid,
        })
    }

    /// Flux per unit stellar mass in nJy/M☉ for a population of the
    /// given metallicity (solar units) and log10 age (years). Queries
    /// clamp to the tabulated population grid.
    pub fn flux_per_mass(&self, metallicity: f64, log_age: f64) -> f64 {
        self.grid.at(metallicity, log_age)
    }

    /// The band this interpolant was built for.
    pub fn band(&self) -> Band {
        self.band
    }

    /// The redshift this interpolant was built at.
    pub fn redshift(&self) -> f64 {
        self.redshift
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    /// A small synthetic population: four wavelengths spanning a
    /// redshifted passband, luminosity proportional to metallicity index
    /// plus age index so grid points are distinguishable.
    fn synthetic_inputs() -> (LuminosityGrid, TransmissionSurface, FilterResponse) {
        let log_ages = vec![6.0, 7.0, 8.0];
        let metallicities = vec![0.01, 0.1, 1.0];

        let tables: Vec<(f64, Array2<f64>)> = [1400.0, 1500.0, 1600.0, 1700.0]
            .iter()
            .map(|&lam| {
                let mut t = Array2::zeros((3, 3));
                for j in 0..3 {
                    for i in 0..3 {
                        t[[j, i]] = 1.0 + j as f64 + 2.0 * i as f64 + lam / 10_000.0;
                    }
                }
                (lam, t)
            })
            .collect();
        let grid = LuminosityGrid::new(tables, log_ages, metallicities).unwrap();

        let transmission = TransmissionSurface::new(
            vec![0.0, 12.0],
            vec![1000.0, 3000.0],
            ndarray::array![[0.9, 0.9], [0.9, 0.9]],
        )
        .unwrap();

        // Passband 11000..14000 Å observed; at z = 7.0 rest 1400..1700 Å
        // lands inside it.
        let filter = FilterResponse::new(vec![
            (10999.0, 0.0),
            (11000.0, 1.0),
            (14000.0, 1.0),
            (14001.0, 0.0),
        ])
        .unwrap();

        (grid, transmission, filter)
    }

    #[test]
    fn test_build_succeeds_in_coverage() {
        let (grid, transmission, filter) = synthetic_inputs();
        let conv =
            BandConversion::build(Band::F125W, 7.0, &grid, &transmission, &filter).unwrap();
        assert_eq!(conv.band(), Band::F125W);
        assert!(conv.flux_per_mass(0.1, 7.0) > 0.0);
    }

    #[test]
    fn test_band_outside_coverage_is_fatal() {
        let (grid, transmission, filter) = synthetic_inputs();
        // At z = 0 the rest wavelengths observe at themselves, far below
        // the 11000 Å passband edge.
        let result = BandConversion::build(Band::F160W, 0.0, &grid, &transmission, &filter);
        match result {
            Err(CalibrationError::BandOutsideCoverage { band, redshift }) => {
                assert_eq!(band, Band::F160W);
                assert_eq!(redshift, 0.0);
            }
            other => panic!("expected BandOutsideCoverage, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_grid_point_round_trip() {
        // With a flat spectrum (no age/metallicity structure along the
        // wavelength axis), the normalized band integral reduces to
        // (luminosity × transmission × distance scale); the interpolant
        // evaluated at a grid node must reproduce that closed form.
        let log_ages = vec![6.0, 7.0];
        let metallicities = vec![0.01, 0.1];
        let lum_value = 5.0;
        let tables: Vec<(f64, Array2<f64>)> = [1400.0, 1500.0, 1600.0, 1700.0]
            .iter()
            .map(|&lam| (lam, Array2::from_elem((2, 2), lum_value)))
            .collect();
        let grid = LuminosityGrid::new(tables, log_ages, metallicities).unwrap();

        let trans_value = 0.8;
        let transmission = TransmissionSurface::new(
            vec![0.0, 12.0],
            vec![1000.0, 3000.0],
            Array2::from_elem((2, 2), trans_value),
        )
        .unwrap();
        let filter = FilterResponse::new(vec![
            (10999.0, 0.0),
            (11000.0, 1.0),
            (14000.0, 1.0),
            (14001.0, 0.0),
        ])
        .unwrap();

        let z = 7.0;
        let conv = BandConversion::build(Band::F125W, z, &grid, &transmission, &filter).unwrap();

        let d_l_cm = cosmology::luminosity_distance_mpc(z).unwrap() * CM_PER_MPC;
        let expected = lum_value * trans_value * CGS::NJY_PER_CGS_FLUX * (1.0 + z)
            / (4.0 * std::f64::consts::PI * d_l_cm * d_l_cm)
            * CGS::SUN_LUMINOSITY;

        assert_relative_eq!(conv.flux_per_mass(0.01, 6.0), expected, max_relative = 1e-9);
        assert_relative_eq!(conv.flux_per_mass(0.1, 7.0), expected, max_relative = 1e-9);
    }

    #[test]
    fn test_interpolant_reproduces_tabulated_cells() {
        let (grid, transmission, filter) = synthetic_inputs();
        let conv =
            BandConversion::build(Band::F140W, 7.0, &grid, &transmission, &filter).unwrap();

        // Values at neighboring nodes bracket the midpoint evaluation.
        let lo = conv.flux_per_mass(0.01, 6.0);
        let hi = conv.flux_per_mass(0.01, 7.0);
        let mid = conv.flux_per_mass(0.01, 6.5);
        assert!((lo..=hi).contains(&mid) || (hi..=lo).contains(&mid));
    }
}
