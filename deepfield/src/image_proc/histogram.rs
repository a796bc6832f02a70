//! Weighted 2D histogramming and grid helpers for particle projection.

use ndarray::{Array2, ArrayView2};

/// Accumulate weighted samples onto a uniform 2D grid.
///
/// The output is indexed `[x_bin, y_bin]`, matching the convention of
/// histogramming the first coordinate along rows. Samples outside the
/// ranges are dropped; samples exactly on the upper edge land in the
/// last bin.
///
/// # Arguments
/// * `xs`, `ys` - Sample coordinates, equal length
/// * `weights` - Per-sample weights, equal length
/// * `x_range`, `y_range` - Grid extents as `(low, high)`
/// * `bins` - Bin count per axis
pub fn histogram2d(
    xs: &[f64],
    ys: &[f64],
    weights: &[f64],
    x_range: (f64, f64),
    y_range: (f64, f64),
    bins: usize,
) -> Array2<f64> {
    debug_assert_eq!(xs.len(), ys.len());
    debug_assert_eq!(xs.len(), weights.len());

    let mut grid = Array2::zeros((bins, bins));
    if bins == 0 {
        return grid;
    }

    let x_width = (x_range.1 - x_range.0) / bins as f64;
    let y_width = (y_range.1 - y_range.0) / bins as f64;

    for ((&x, &y), &w) in xs.iter().zip(ys).zip(weights) {
        let Some(ix) = bin_of(x, x_range, x_width, bins) else {
            continue;
        };
        let Some(iy) = bin_of(y, y_range, y_width, bins) else {
            continue;
        };
        grid[[ix, iy]] += w;
    }

    grid
}

/// Bin index of a value on a uniform axis, or None when out of range.
fn bin_of(value: f64, range: (f64, f64), width: f64, bins: usize) -> Option<usize> {
    if value < range.0 || value > range.1 {
        return None;
    }
    // Upper edge belongs to the last bin.
    Some((((value - range.0) / width) as usize).min(bins - 1))
}

/// Rotate an image a quarter turn counterclockwise.
///
/// Used to align the particle histogram's (x-bin, y-bin) orientation
/// with the row/column orientation of the noise and PSF images.
pub fn rot90(image: &ArrayView2<f64>) -> Array2<f64> {
    let (rows, cols) = image.dim();
    let mut out = Array2::zeros((cols, rows));
    for i in 0..cols {
        for j in 0..rows {
            out[[i, j]] = image[[j, cols - 1 - i]];
        }
    }
    out
}

/// Centers of `n` uniform pixels spanning `[low, high]`.
pub fn pixel_centers(low: f64, high: f64, n: usize) -> Vec<f64> {
    let width = (high - low) / n as f64;
    (0..n).map(|i| low + (i as f64 + 0.5) * width).collect()
}
