//! Shared interval location for the 1D and bilinear interpolants.

/// Locate the interval of a sorted axis bracketing `x`, clamped to the
/// table range. Returns `(index, fraction)` such that the interpolated
/// value is `v[index] * (1 - fraction) + v[index + 1] * fraction`.
///
/// Shared by the filter curve and the bilinear grid interpolant, both
/// of which clamp instead of erroring on out-of-range queries.
pub(crate) fn clamped_interval(xs: &[f64], x: f64) -> (usize, f64) {
    let n = xs.len();
    if x <= xs[0] {
        return (0, 0.0);
    }
    if x >= xs[n - 1] {
        return (n - 2, 1.0);
    }

    let idx = match xs.binary_search_by(|probe| probe.partial_cmp(&x).unwrap()) {
        Ok(exact) => return (exact.min(n - 2), if exact == n - 1 { 1.0 } else { 0.0 }),
        Err(insert) => insert,
    };

    let t = (x - xs[idx - 1]) / (xs[idx] - xs[idx - 1]);
    (idx - 1, t)
}
