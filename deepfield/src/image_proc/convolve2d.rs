//! Direct 2D convolution for image-domain PSF blurring.

use ndarray::{Array2, ArrayView2};

/// How the output extent relates to the input extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvolveMode {
    /// Only compute output where the kernel fully overlaps the image.
    Valid,
    /// Zero-pad so the output matches the input size.
    Same,
}

/// Convolve an image with a kernel.
///
/// Direct (non-FFT) evaluation; the kernels in this pipeline are small
/// relative to the images, so the quadratic cost stays modest. The
/// kernel is flipped along both axes, so this is linear convolution,
/// not cross-correlation.
///
/// # Arguments
/// * `image` - Input image
/// * `kernel` - Convolution kernel
/// * `mode` - Output sizing, see [`ConvolveMode`]
///
/// # Returns
/// The convolved image.
pub fn convolve2d(image: &ArrayView2<f64>, kernel: &ArrayView2<f64>, mode: ConvolveMode) -> Array2<f64> {
    let (img_rows, img_cols) = image.dim();
    let (ker_rows, ker_cols) = kernel.dim();

    let (out_rows, out_cols) = match mode {
        ConvolveMode::Valid => (
            img_rows.saturating_sub(ker_rows) + 1,
            img_cols.saturating_sub(ker_cols) + 1,
        ),
        ConvolveMode::Same => (img_rows, img_cols),
    };
    if out_rows == 0 || out_cols == 0 {
        return Array2::zeros((0, 0));
    }

    let (pad_rows, pad_cols) = match mode {
        ConvolveMode::Valid => (0isize, 0isize),
        ConvolveMode::Same => ((ker_rows / 2) as isize, (ker_cols / 2) as isize),
    };

    let mut output = Array2::zeros((out_rows, out_cols));
    for i in 0..out_rows {
        for j in 0..out_cols {
            let mut sum = 0.0;
            for ki in 0..ker_rows {
                for kj in 0..ker_cols {
                    let row = i as isize + ki as isize - pad_rows;
                    let col = j as isize + kj as isize - pad_cols;
                    if row >= 0 && row < img_rows as isize && col >= 0 && col < img_cols as isize {
                        sum += image[[row as usize, col as usize]]
                            * kernel[[ker_rows - 1 - ki, ker_cols - 1 - kj]];
                    }
                }
            }
            output[[i, j]] = sum;
        }
    }

    output
}
