//! Numerical integration: adaptive quadrature and sample-based trapezoids.

use thiserror::Error;

/// Errors that can occur during numerical integration.
#[derive(Debug, Error)]
pub enum QuadError {
    #[error("Integration bounds must be finite and ordered, got [{0}, {1}]")]
    InvalidInterval(f64, f64),

    #[error("Integrand evaluated to a non-finite value at x = {0}")]
    NonFiniteEvaluation(f64),

    #[error("Sampled integration needs at least 2 points")]
    InsufficientPoints,

    #[error("Sample abscissae must be strictly ascending")]
    NotAscending,

    #[error("Sample abscissae and ordinates must have the same length")]
    MismatchedLengths,
}

/// Maximum bisection depth for the adaptive scheme. At this depth the
/// local estimate is accepted as-is; the integrands used here are smooth
/// enough that the depth cap is never reached in practice.
const MAX_DEPTH: u32 = 48;

/// Integrate a smooth function over `[a, b]` with adaptive Simpson quadrature.
///
/// Each interval is bisected until the Richardson error estimate of the
/// Simpson rule drops below the (subdivided) tolerance.
///
/// # Arguments
///
/// * `f` - The integrand; must be finite over `[a, b]`
/// * `a`, `b` - Integration bounds, `a <= b`
/// * `tolerance` - Absolute error target for the whole interval
///
/// # Returns
///
/// The integral estimate, or an error for invalid bounds or a non-finite
/// integrand evaluation.
pub fn adaptive_simpson<F>(f: F, a: f64, b: f64, tolerance: f64) -> Result<f64, QuadError>
where
    F: Fn(f64) -> f64,
{
    if !a.is_finite() || !b.is_finite() || a > b {
        return Err(QuadError::InvalidInterval(a, b));
    }
    if a == b {
        return Ok(0.0);
    }

    let eval = |x: f64| -> Result<f64, QuadError> {
        let y = f(x);
        if y.is_finite() {
            Ok(y)
        } else {
            Err(QuadError::NonFiniteEvaluation(x))
        }
    };

    let fa = eval(a)?;
    let fb = eval(b)?;
    let m = 0.5 * (a + b);
    let fm = eval(m)?;
    let whole = simpson(a, b, fa, fm, fb);

    simpson_recurse(&eval, a, b, fa, fm, fb, whole, tolerance, MAX_DEPTH)
}

/// Simpson's rule over `[a, b]` given endpoint and midpoint values.
fn simpson(a: f64, b: f64, fa: f64, fm: f64, fb: f64) -> f64 {
    (b - a) / 6.0 * (fa + 4.0 * fm + fb)
}

#[allow(clippy::too_many_arguments)]
fn simpson_recurse<E>(
    eval: &E,
    a: f64,
    b: f64,
    fa: f64,
    fm: f64,
    fb: f64,
    whole: f64,
    tolerance: f64,
    depth: u32,
) -> Result<f64, QuadError>
where
    E: Fn(f64) -> Result<f64, QuadError>,
{
    let m = 0.5 * (a + b);
    let lm = 0.5 * (a + m);
    let rm = 0.5 * (m + b);

    let flm = eval(lm)?;
    let frm = eval(rm)?;

    let left = simpson(a, m, fa, flm, fm);
    let right = simpson(m, b, fm, frm, fb);
    let delta = left + right - whole;

    // Standard Richardson criterion: the two half-interval estimates agree
    // with the whole-interval estimate to within 15x the requested tolerance.
    if depth == 0 || delta.abs() <= 15.0 * tolerance {
        return Ok(left + right + delta / 15.0);
    }

    let half_tol = tolerance / 2.0;
    let l = simpson_recurse(eval, a, m, fa, flm, fm, left, half_tol, depth - 1)?;
    let r = simpson_recurse(eval, m, b, fm, frm, fb, right, half_tol, depth - 1)?;
    Ok(l + r)
}

/// Trapezoidal integration of tabulated samples over an irregular axis.
///
/// # Arguments
///
/// * `xs` - Sample abscissae, strictly ascending
/// * `ys` - Sample ordinates, same length as `xs`
///
/// # Returns
///
/// The composite trapezoid sum, or an error for malformed input.
pub fn trapezoid(xs: &[f64], ys: &[f64]) -> Result<f64, QuadError> {
    if xs.len() != ys.len() {
        return Err(QuadError::MismatchedLengths);
    }
    if xs.len() < 2 {
        return Err(QuadError::InsufficientPoints);
    }
    for i in 1..xs.len() {
        if xs[i] <= xs[i - 1] {
            return Err(QuadError::NotAscending);
        }
    }

    let mut total = 0.0;
    for i in 0..xs.len() - 1 {
        total += (xs[i + 1] - xs[i]) * 0.5 * (ys[i] + ys[i + 1]);
    }
    Ok(total)
}
