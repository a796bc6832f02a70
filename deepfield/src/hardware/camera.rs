//! Instrument model: photometric bands, pixel scale, and noise
//! calibration constants.

use std::fmt;

use crate::photometry::CGS;

/// One of the instrument's three photometric bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    F125W,
    F140W,
    F160W,
}

impl Band {
    /// All bands in catalog order.
    pub const ALL: [Band; 3] = [Band::F125W, Band::F140W, Band::F160W];

    /// Index into per-band arrays.
    pub fn index(&self) -> usize {
        match self {
            Band::F125W => 0,
            Band::F140W => 1,
            Band::F160W => 2,
        }
    }

    /// Short label used in catalog file names.
    pub fn label(&self) -> &'static str {
        match self {
            Band::F125W => "125",
            Band::F140W => "140",
            Band::F160W => "160",
        }
    }

    /// Stem of the filter-curve file for this band.
    pub fn filter_stem(&self) -> &'static str {
        match self {
            Band::F125W => "f125w",
            Band::F140W => "f140w",
            Band::F160W => "f160w",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.filter_stem())
    }
}

/// Static description of a survey camera.
///
/// Zero points are AB magnitudes; the raw noise RMS constants fold in
/// the exposure time of the reference survey depth and are hard-coded
/// per instrument, exactly as published.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub name: &'static str,

    /// Native detector sampling in arcseconds per pixel.
    pub pixel_scale_arcsec: f64,

    /// Physical aperture spanned by the PSF kernels, in arcseconds.
    pub psf_aperture_arcsec: f64,

    /// AB zero point per band, indexed by [`Band::index`].
    pub zero_points: [f64; 3],

    /// Raw per-pixel noise RMS per band in instrument flux units,
    /// indexed by [`Band::index`].
    pub noise_rms: [f64; 3],
}

/// The WFC3 IR channel as flown on HST, with noise constants matching
/// the reference survey exposure times.
pub const WFC3_IR: Camera = Camera {
    name: "HST",
    pixel_scale_arcsec: 0.13,
    psf_aperture_arcsec: 3.0,
    zero_points: [26.23, 26.45, 25.94],
    noise_rms: [2.75845e-3, 3.26572605e-3, 2.39519e-3],
};

impl Camera {
    /// Conversion from instrument flux units to nanojanskys for a band,
    /// derived from its AB zero point.
    pub fn flux_scale_njy(&self, band: Band) -> f64 {
        let zp = self.zero_points[band.index()];
        CGS::NJY_PER_CGS_FLUX / 10f64.powf(0.4 * (zp + CGS::AB_ZERO_POINT))
    }

    /// Theoretical per-pixel noise standard deviation for a band in
    /// nanojanskys.
    pub fn noise_sigma_njy(&self, band: Band) -> f64 {
        self.noise_rms[band.index()] * self.flux_scale_njy(band)
    }

    /// Number of detector pixels spanning an angular extent.
    pub fn detector_bins(&self, theta_arcsec: f64) -> usize {
        (theta_arcsec / self.pixel_scale_arcsec) as usize
    }

    /// Number of detector pixels across the PSF aperture.
    pub fn psf_bins(&self) -> usize {
        (self.psf_aperture_arcsec / self.pixel_scale_arcsec) as usize
    }
}
