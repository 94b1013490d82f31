//! Knot vector utilities for B-spline/NURBS evaluation.

use splinekit_core::{Result, SplineError};
use splinekit_math::prelude::*;
use splinekit_math::Real;

/// Find the knot span index for parameter `t` in the knot vector.
///
/// Returns the index `i` such that `knots[i] <= t < knots[i+1]`. Parameters
/// at or beyond the upper bound map to the last non-empty span, parameters at
/// or below the lower bound to the first one.
///
/// # Arguments
/// * `degree` - Degree of the B-spline
/// * `knots` - The knot vector
/// * `n` - Number of control points minus 1
/// * `t` - Parameter value
pub fn find_span<T: Real>(degree: usize, knots: &[T], n: usize, t: T) -> usize {
    if t >= knots[n + 1] {
        let mut span = n;
        while span > degree && knots[span] >= knots[span + 1] {
            span -= 1;
        }
        return span;
    }
    if t <= knots[degree] {
        let mut span = degree;
        while span < n && knots[span] >= knots[span + 1] {
            span += 1;
        }
        return span;
    }

    // Binary search
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

/// Parameter domain `[knots[p], knots[len - p - 1]]`.
///
/// Falls back to zero for bounds the knot vector is too short to provide.
pub fn domain<T: Real>(degree: usize, knots: &[T]) -> (T, T) {
    let lower = knots.get(degree).copied().unwrap_or_else(T::zero);
    let upper = knots
        .len()
        .checked_sub(degree + 1)
        .and_then(|i| knots.get(i))
        .copied()
        .unwrap_or_else(T::zero);
    (lower, upper)
}

/// Number of knots within `eps` of `u`.
pub fn multiplicity<T: Real>(knots: &[T], u: T, eps: T) -> usize {
    knots.iter().filter(|&&k| (k - u).abs() <= eps).count()
}

/// Check that `knots` can carry `count` control points of the given degree.
pub fn validate_knots<T: Real>(degree: usize, knots: &[T], count: usize) -> Result<()> {
    if count == 0 {
        return Err(SplineError::InvalidConfiguration(
            "a B-spline needs at least one control point".into(),
        ));
    }
    if count < degree + 1 {
        return Err(SplineError::InvalidConfiguration(format!(
            "degree {} needs at least {} control points, got {}",
            degree,
            degree + 1,
            count
        )));
    }
    if knots.len() != count + degree + 1 {
        return Err(SplineError::InvalidConfiguration(format!(
            "knot vector length must be n + p + 1, got {} knots for {} control points with degree {}",
            knots.len(),
            count,
            degree
        )));
    }
    if let Some(i) = knots.windows(2).position(|w| !(w[0] <= w[1])) {
        return Err(SplineError::PreconditionViolation(format!(
            "knot vector must be non-decreasing, knot {} is {} but knot {} is {}",
            i,
            knots[i],
            i + 1,
            knots[i + 1]
        )));
    }
    let (lower, upper) = domain(degree, knots);
    if !(lower < upper) {
        return Err(SplineError::PreconditionViolation(format!(
            "empty parameter domain [{}, {}]",
            lower, upper
        )));
    }
    Ok(())
}

/// Degree implied by a knot vector and a control point count.
pub fn derived_degree(knot_count: usize, point_count: usize) -> Result<usize> {
    knot_count
        .checked_sub(point_count + 1)
        .ok_or_else(|| {
            SplineError::InvalidConfiguration(format!(
                "{} knots cannot carry {} control points",
                knot_count, point_count
            ))
        })
}
