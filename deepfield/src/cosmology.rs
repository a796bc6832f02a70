//! Distances as a function of redshift for a flat ΛCDM cosmology.
//!
//! The comoving distance comes from adaptive quadrature of the inverse
//! expansion rate; angular-diameter and luminosity distances follow from
//! the usual (1+z) factors. All functions are pure and safe to call
//! concurrently.

use thiserror::Error;

use crate::algo::quad::{adaptive_simpson, QuadError};

/// Matter density parameter at z = 0.
pub const OMEGA_M: f64 = 0.2726;

/// Dark energy density parameter.
pub const OMEGA_LAMBDA: f64 = 0.7274;

/// Curvature density parameter.
pub const OMEGA_K: f64 = 0.0;

/// Dimensionless Hubble parameter, H0 = 100 h km/s/Mpc.
pub const HUBBLE_H: f64 = 0.704;

/// Hubble length c/H0 for h = 1, in centimeters.
pub const HUBBLE_LENGTH_CM: f64 = 9.26e27;

/// Centimeters per parsec.
pub const CM_PER_PC: f64 = 3.0857e18;

/// Centimeters per megaparsec.
pub const CM_PER_MPC: f64 = CM_PER_PC * 1e6;

/// Arcseconds per radian.
pub const ARCSEC_PER_RAD: f64 = 206_265.0;

/// Absolute tolerance for the comoving-distance quadrature. The integrand
/// is order unity, so this leaves the result good to far better than any
/// observable quantity derived from it.
const QUAD_TOLERANCE: f64 = 1e-10;

/// Errors that can occur when evaluating cosmological distances.
#[derive(Debug, Error)]
pub enum CosmologyError {
    #[error("Redshift must be finite and non-negative, got {0}")]
    InvalidRedshift(f64),

    #[error("Comoving distance quadrature failed: {0}")]
    Quadrature(#[from] QuadError),
}

/// Inverse of the dimensionless expansion rate, 1/E(x).
fn inverse_expansion_rate(x: f64) -> f64 {
    let one_plus = 1.0 + x;
    1.0 / (OMEGA_M * one_plus.powi(3) + OMEGA_LAMBDA + OMEGA_K * one_plus.powi(2)).sqrt()
}

/// Line-of-sight comoving distance to redshift `z`, in centimeters.
pub fn comoving_distance_cm(z: f64) -> Result<f64, CosmologyError> {
    if !z.is_finite() || z < 0.0 {
        return Err(CosmologyError::InvalidRedshift(z));
    }
    let integral = adaptive_simpson(inverse_expansion_rate, 0.0, z, QUAD_TOLERANCE)?;
    Ok(HUBBLE_LENGTH_CM / HUBBLE_H * integral)
}

/// Angular-diameter distance to redshift `z`, in megaparsecs.
pub fn angular_diameter_distance_mpc(z: f64) -> Result<f64, CosmologyError> {
    Ok(comoving_distance_cm(z)? / (1.0 + z) / CM_PER_MPC)
}

/// Luminosity distance to redshift `z`, in megaparsecs.
pub fn luminosity_distance_mpc(z: f64) -> Result<f64, CosmologyError> {
    let one_plus = 1.0 + z;
    Ok(angular_diameter_distance_mpc(z)? * one_plus * one_plus)
}

/// Angular size in arcseconds of an object of the given physical extent
/// (in kiloparsecs) at redshift `z`.
pub fn angular_size_arcsec(extent_kpc: f64, z: f64) -> Result<f64, CosmologyError> {
    let d_a_pc = angular_diameter_distance_mpc(z)? * 1e6;
    Ok(extent_kpc * 1e3 / d_a_pc * ARCSEC_PER_RAD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_redshift_is_zero_distance() {
        assert_eq!(comoving_distance_cm(0.0).unwrap(), 0.0);
        assert_eq!(angular_diameter_distance_mpc(0.0).unwrap(), 0.0);
        assert_eq!(luminosity_distance_mpc(0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_negative_redshift_rejected() {
        assert!(matches!(
            angular_diameter_distance_mpc(-0.1),
            Err(CosmologyError::InvalidRedshift(_))
        ));
        assert!(matches!(
            luminosity_distance_mpc(f64::NAN),
            Err(CosmologyError::InvalidRedshift(_))
        ));
    }

    #[test]
    fn test_distance_duality() {
        // D_A = D_L / (1+z)^2 must hold identically
        for z in [0.0, 0.5, 1.0, 2.0, 4.0, 7.5, 10.0] {
            let d_a = angular_diameter_distance_mpc(z).unwrap();
            let d_l = luminosity_distance_mpc(z).unwrap();
            let one_plus = 1.0 + z;
            assert_relative_eq!(d_a, d_l / (one_plus * one_plus), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_distances_monotonic_in_z() {
        // No angular-diameter distance turnover below z ~ 1.5 for these
        // parameters, and the luminosity distance always increases.
        let zs: Vec<f64> = (1..=15).map(|i| i as f64 * 0.1).collect();
        let mut prev_da = 0.0;
        let mut prev_dl = 0.0;
        for z in zs {
            let d_a = angular_diameter_distance_mpc(z).unwrap();
            let d_l = luminosity_distance_mpc(z).unwrap();
            assert!(d_a > prev_da, "D_A not increasing at z = {}", z);
            assert!(d_l > prev_dl, "D_L not increasing at z = {}", z);
            prev_da = d_a;
            prev_dl = d_l;
        }
    }

    #[test]
    fn test_comoving_distance_magnitude() {
        // At z = 7 the comoving distance for these parameters is around
        // 9 Gpc; check the order of magnitude rather than a precise value.
        let d_c_mpc = comoving_distance_cm(7.0).unwrap() / CM_PER_MPC;
        assert!(d_c_mpc > 7000.0 && d_c_mpc < 10000.0, "got {}", d_c_mpc);
    }

    #[test]
    fn test_angular_size_shrinks_with_distance() {
        let near = angular_size_arcsec(100.0, 1.0).unwrap();
        let far = angular_size_arcsec(100.0, 1.4).unwrap();
        assert!(far < near);
    }
}
