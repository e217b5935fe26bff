//! Knot vector utilities shared by B-spline curves and surfaces.
//!
//! Exchange files carry knots as pairs of lists (distinct values and their
//! multiplicities); evaluation works on the expanded, flat knot vector.

use crate::GeomError;

/// Expand `(multiplicity, value)` pairs into a flat knot vector of length
/// `expected`.
///
/// `[2, 1, 2]` with `[0.0, 0.5, 1.0]` becomes `[0.0, 0.0, 0.5, 1.0, 1.0]`.
/// The multiplicities are summed before anything is allocated.
pub fn expand_knots(
    multiplicities: &[usize],
    values: &[f64],
    expected: usize,
) -> Result<Vec<f64>, GeomError> {
    if multiplicities.len() != values.len() {
        return Err(GeomError::MultiplicityMismatch {
            multiplicities: multiplicities.len(),
            values: values.len(),
        });
    }
    if multiplicities.contains(&0) || values.iter().any(|v| !v.is_finite()) {
        return Err(GeomError::InvalidKnots);
    }
    let actual = multiplicities
        .iter()
        .try_fold(0usize, |sum, &m| sum.checked_add(m))
        .unwrap_or(usize::MAX);
    if actual != expected {
        return Err(GeomError::KnotMismatch { expected, actual });
    }
    Ok(multiplicities
        .iter()
        .zip(values)
        .flat_map(|(&m, &v)| std::iter::repeat(v).take(m))
        .collect())
}

/// Validate a knot vector: finite, non-decreasing, length = `n_points + degree + 1`.
pub fn validate_knots(knots: &[f64], n_points: usize, degree: usize) -> Result<(), GeomError> {
    if degree == 0 {
        return Err(GeomError::InvalidDegree);
    }
    if n_points < degree + 1 {
        return Err(GeomError::TooFewControlPoints {
            degree,
            count: n_points,
        });
    }
    let expected = n_points + degree + 1;
    if knots.len() != expected {
        return Err(GeomError::KnotMismatch {
            expected,
            actual: knots.len(),
        });
    }
    if knots.iter().any(|k| !k.is_finite())
        || knots.windows(2).any(|w| w[1] < w[0])
        || knots[degree] >= knots[n_points]
    {
        return Err(GeomError::InvalidKnots);
    }
    Ok(())
}

/// Find the knot span index for parameter `t`.
///
/// Returns `i` such that `knots[i] <= t < knots[i+1]`, clamped to the valid
/// range `degree..=n`. `n` is the index of the last control point.
pub fn find_span(knots: &[f64], n: usize, degree: usize, t: f64) -> usize {
    if t >= knots[n + 1] {
        return n;
    }
    if t <= knots[degree] {
        return degree;
    }
    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;
    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// Non-zero basis function values `N[span-degree..=span]` at `t` (Cox-de Boor).
pub fn basis_functions(knots: &[f64], span: usize, degree: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            // zero-length interval
            let temp = if denom.abs() < 1e-30 { 0.0 } else { n[r] / denom };
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }

    n
}

/// Check that every weight is strictly positive.
pub(crate) fn validate_weights<'a>(weights: impl IntoIterator<Item = &'a f64>) -> Result<(), GeomError> {
    match weights.into_iter().find(|w| w.is_nan() || **w <= 0.0) {
        Some(&value) => Err(GeomError::InvalidParameter {
            name: "weight",
            value,
        }),
        None => Ok(()),
    }
}
