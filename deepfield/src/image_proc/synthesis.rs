//! Synthesis of per-region mock observations: particle projection,
//! noise injection, PSF convolution, and significance maps.

use ndarray::Array2;

use crate::hardware::{NoiseField, PsfKernel};

use super::convolve2d::{convolve2d, ConvolveMode};
use super::histogram::{histogram2d, rot90};

/// The simulation axis along which a region is collapsed into an image
/// plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionAxis {
    X,
    Y,
    Z,
}

impl ProjectionAxis {
    /// Parse a 0/1/2 axis index.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ProjectionAxis::X),
            1 => Some(ProjectionAxis::Y),
            2 => Some(ProjectionAxis::Z),
            _ => None,
        }
    }

    /// Lowercase axis name, used in output paths.
    pub fn label(&self) -> &'static str {
        match self {
            ProjectionAxis::X => "x",
            ProjectionAxis::Y => "y",
            ProjectionAxis::Z => "z",
        }
    }

    /// The in-plane coordinate pair left after collapsing this axis,
    /// in right-handed order.
    pub fn project<'a>(
        &self,
        x: &'a [f64],
        y: &'a [f64],
        z: &'a [f64],
    ) -> (&'a [f64], &'a [f64]) {
        match self {
            ProjectionAxis::X => (y, z),
            ProjectionAxis::Y => (z, x),
            ProjectionAxis::Z => (x, y),
        }
    }
}

/// The image products of one region in one projection.
#[derive(Debug, Clone)]
pub struct RegionMaps {
    /// Per-band PSF-convolved flux images with noise included, in
    /// nanojanskys, indexed by band.
    pub convolved: Vec<Array2<f64>>,

    /// Per-band significance: the convolved image divided by the
    /// empirical noise standard deviation of that band.
    pub significance: Vec<Array2<f64>>,

    /// Sum of the per-band significance maps; detection runs on this.
    pub combined_significance: Array2<f64>,
}

/// Build the mock observation of one region.
///
/// Per band: the per-particle fluxes are histogrammed onto the detector
/// grid over the region's angular footprint, rotated into image
/// orientation, summed with that band's shared noise realization, and
/// convolved with the band's PSF. Significance maps divide by the
/// band's empirical noise standard deviation.
///
/// # Arguments
/// * `px`, `py` - In-plane particle coordinates (any consistent unit)
/// * `band_fluxes` - Per-band slice of per-particle fluxes in nanojanskys
/// * `half_extent` - Half-width of the square footprint, same unit as
///   the coordinates
/// * `nbins` - Detector pixels per image side
/// * `noise` - Per-band calibrated noise fields
/// * `psfs` - Per-band detector-sampled PSF kernels
pub fn synthesize_region(
    px: &[f64],
    py: &[f64],
    band_fluxes: &[Vec<f64>],
    half_extent: f64,
    nbins: usize,
    noise: &[NoiseField],
    psfs: &[PsfKernel],
) -> RegionMaps {
    let range = (-half_extent, half_extent);

    let mut convolved = Vec::with_capacity(band_fluxes.len());
    let mut significance = Vec::with_capacity(band_fluxes.len());
    let mut combined: Option<Array2<f64>> = None;

    for (band, fluxes) in band_fluxes.iter().enumerate() {
        let binned = histogram2d(px, py, fluxes, range, range, nbins);
        let image = rot90(&binned.view()) + &noise[band].samples;

        let blurred = convolve2d(&image.view(), &psfs[band].pixels().view(), ConvolveMode::Same);
        let sigma_map = &blurred / noise[band].empirical_std;

        combined = Some(match combined {
            Some(sum) => sum + &sigma_map,
            None => sigma_map.clone(),
        });
        convolved.push(blurred);
        significance.push(sigma_map);
    }

    RegionMaps {
        convolved,
        significance,
        combined_significance: combined.unwrap_or_else(|| Array2::zeros((nbins, nbins))),
    }
}
