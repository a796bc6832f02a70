//! Point-spread-function preparation: rebinning oversampled reference
//! images onto the detector pixel grid.

use ndarray::{Array2, ArrayView2};

use crate::image_proc::histogram::{histogram2d, pixel_centers};

use super::Camera;

/// A PSF image sampled on the detector pixel grid, used directly as a
/// convolution kernel. Derived once per process run; independent of
/// redshift.
#[derive(Debug, Clone)]
pub struct PsfKernel {
    pixels: Array2<f64>,
}

impl PsfKernel {
    /// Rebin an oversampled reference PSF onto the camera's native pixel
    /// scale over its fixed physical aperture.
    ///
    /// Each oversampled sample is treated as a point mass at its pixel
    /// center and accumulated onto the coarser grid by weighted 2D
    /// histogramming, which conserves the total kernel energy.
    pub fn rebin(oversampled: &ArrayView2<f64>, camera: &Camera) -> Self {
        let half = camera.psf_aperture_arcsec / 2.0;
        let (rows, cols) = oversampled.dim();

        let row_centers = pixel_centers(-half, half, rows);
        let col_centers = pixel_centers(-half, half, cols);

        let n = oversampled.len();
        let mut xs = Vec::with_capacity(n);
        let mut ys = Vec::with_capacity(n);
        let mut ws = Vec::with_capacity(n);
        for ((r, c), &w) in oversampled.indexed_iter() {
            xs.push(col_centers[c]);
            ys.push(row_centers[r]);
            ws.push(w);
        }

        let bins = camera.psf_bins();
        let pixels = histogram2d(&xs, &ys, &ws, (-half, half), (-half, half), bins);
        Self { pixels }
    }

    /// Wrap an already detector-sampled kernel. Used by tests that need
    /// exact kernel control.
    pub fn from_pixels(pixels: Array2<f64>) -> Self {
        Self { pixels }
    }

    /// The kernel image.
    pub fn pixels(&self) -> &Array2<f64> {
        &self.pixels
    }

    /// Total kernel energy.
    pub fn energy(&self) -> f64 {
        self.pixels.sum()
    }
}
