//! Spectral calibration: from stellar population tables to per-band
//! flux-per-mass interpolants.

pub mod conversion;
pub mod filter;
pub mod luminosity;
pub mod transmission;

pub use conversion::{BandConversion, CalibrationError};
pub use filter::FilterResponse;
pub use luminosity::LuminosityGrid;
pub use transmission::TransmissionSurface;

/// Constants in CGS units
pub struct CGS {}

impl CGS {
    /// Speed of light in vacuum
    /// Units: cm/s
    pub const SPEED_OF_LIGHT: f64 = 2.9927e10;

    /// Solar bolometric luminosity
    /// Units: erg/s
    pub const SUN_LUMINOSITY: f64 = 3.828e33;

    /// Nanojansky per erg s⁻¹ cm⁻² Hz⁻¹
    pub const NJY_PER_CGS_FLUX: f64 = 1e23 * 1e9;

    /// AB magnitude system zero-point offset in magnitudes
    pub const AB_ZERO_POINT: f64 = 48.6;
}

/// Convert a wavelength in angstroms to a frequency in hertz.
pub fn angstrom_to_hz(wavelength_angstrom: f64) -> f64 {
    CGS::SPEED_OF_LIGHT / (wavelength_angstrom * 1e-8)
}
