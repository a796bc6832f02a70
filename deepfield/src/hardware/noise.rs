//! Calibrated instrument noise fields and the stability search.
//!
//! Noise is drawn per band as independent zero-mean Gaussians at the
//! camera's published depth. The stability search regenerates the
//! realization until the noise alone, blurred by the PSF and summed
//! across bands, produces no spurious detections; the accepted
//! realization is then shared by every region of the snapshot so that
//! detection statistics stay comparable across sub-regions.

use log::{debug, warn};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{rng, RngCore, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::detect::SourceDetector;
use crate::image_proc::convolve2d::{convolve2d, ConvolveMode};

use super::{Band, Camera, PsfKernel};

/// Detection threshold (in summed significance) used by the stability
/// search.
pub const STABILITY_THRESHOLD: f64 = 2.3;

/// Minimum connected pixel count for a stability-search detection.
pub const STABILITY_MIN_PIXELS: usize = 3;

/// Retry budget for the stability search.
pub const MAX_STABILITY_ITERATIONS: usize = 1000;

/// One band's noise realization.
#[derive(Debug, Clone)]
pub struct NoiseField {
    /// Raw Gaussian samples on the detector grid, in nanojanskys.
    pub samples: Array2<f64>,

    /// Empirical standard deviation of the raw draw. Normalization uses
    /// this rather than the theoretical sigma to absorb finite-sample
    /// variance.
    pub empirical_std: f64,
}

impl NoiseField {
    /// Draw a fresh `nbins x nbins` realization at the given sigma.
    pub fn generate(sigma: f64, nbins: usize, rng: &mut StdRng) -> Self {
        let dist = Normal::new(0.0, sigma).expect("noise sigma is finite and non-negative");
        let raw: Vec<f64> = (0..nbins * nbins).map(|_| dist.sample(rng)).collect();

        let mean = raw.iter().sum::<f64>() / raw.len() as f64;
        let variance = raw.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / raw.len() as f64;

        Self {
            samples: Array2::from_shape_vec((nbins, nbins), raw)
                .expect("sample count matches grid"),
            empirical_std: variance.sqrt(),
        }
    }
}

/// The per-snapshot noise realization accepted by the stability search,
/// shared read-only across all regions of the snapshot.
#[derive(Debug, Clone)]
pub struct CalibratedNoise {
    /// Per-band fields, indexed by [`Band::index`].
    pub fields: Vec<NoiseField>,

    /// Whether the search found a spurious-detection-free realization
    /// within its budget. When false the last candidate is kept.
    pub converged: bool,

    /// Number of realizations drawn.
    pub iterations: usize,
}

/// PSF-convolved, per-band-normalized significance of the noise alone,
/// summed over bands. This is both the stability-search statistic and
/// the floor of every region's significance map.
pub fn noise_significance(fields: &[NoiseField], psfs: &[PsfKernel]) -> Array2<f64> {
    let mut combined: Option<Array2<f64>> = None;
    for (field, psf) in fields.iter().zip(psfs) {
        let blurred = convolve2d(
            &field.samples.view(),
            &psf.pixels().view(),
            ConvolveMode::Same,
        );
        let normalized = blurred / field.empirical_std;
        combined = Some(match combined {
            Some(sum) => sum + &normalized,
            None => normalized,
        });
    }
    combined.expect("at least one band")
}

/// Search for a noise realization that alone yields zero detections.
///
/// Bounded best-effort calibration: budget exhaustion keeps the last
/// candidate and reports `converged = false` rather than failing, since
/// a noisy realization degrades image quality but not correctness.
/// Deterministic for a fixed `rng_seed`.
pub fn calibrate_noise(
    camera: &Camera,
    nbins: usize,
    psfs: &[PsfKernel],
    detector: &dyn SourceDetector,
    rng_seed: Option<u64>,
) -> CalibratedNoise {
    let rng_seed = rng_seed.unwrap_or(rng().next_u64());
    let mut rng = StdRng::seed_from_u64(rng_seed);

    let sigmas: Vec<f64> = Band::ALL
        .iter()
        .map(|&band| camera.noise_sigma_njy(band))
        .collect();

    let mut fields: Vec<NoiseField> = Vec::new();
    for iteration in 1..=MAX_STABILITY_ITERATIONS {
        fields = sigmas
            .iter()
            .map(|&sigma| NoiseField::generate(sigma, nbins, &mut rng))
            .collect();

        let combined = noise_significance(&fields, psfs);
        let spurious = detector
            .detect(&combined.view(), STABILITY_THRESHOLD, STABILITY_MIN_PIXELS)
            .count;
        debug!(
            "noise stability iteration {}: {} spurious detections at {} bins",
            iteration, spurious, nbins
        );

        if spurious == 0 {
            return CalibratedNoise {
                fields,
                converged: true,
                iterations: iteration,
            };
        }
    }

    warn!(
        "noise stability search exhausted {} iterations at {} bins; \
         keeping last realization",
        MAX_STABILITY_ITERATIONS, nbins
    );
    CalibratedNoise {
        fields,
        converged: false,
        iterations: MAX_STABILITY_ITERATIONS,
    }
}
