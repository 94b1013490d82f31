//! Parameter inversion helpers.

use splinekit_core::{Result, SplineError};
use splinekit_math::prelude::*;
use splinekit_math::{scalar, ControlPoint, Real};

use crate::sampling::parameter_grid;

/// Closest-sample search over `[lower, upper]`.
///
/// Each pass evaluates `samples` evenly spaced parameters, keeps the one
/// closest to `point` and narrows the window to one sample spacing on either
/// side of it, clamped to `[lower, upper]`. The initial pass is followed by
/// `level` refinements, so the work is bounded by `samples * (level + 1)`
/// evaluations. For degenerate curves every sample ties and `lower` wins.
pub fn closest_sample_search<P, F>(
    evaluate: F,
    point: &P,
    lower: P::Scalar,
    upper: P::Scalar,
    samples: usize,
    level: usize,
) -> Result<P::Scalar>
where
    P: ControlPoint,
    F: Fn(P::Scalar) -> Result<P>,
{
    if lower > upper {
        return Err(SplineError::PreconditionViolation(format!(
            "inverse search interval [{}, {}] is reversed",
            lower, upper
        )));
    }
    let samples = samples.max(2);
    let spacing = scalar::<P::Scalar>((samples - 1) as f64);

    let (mut lo, mut hi) = (lower, upper);
    let mut best = lower;
    for _ in 0..=level {
        let step = (hi - lo) / spacing;
        let mut best_distance: Option<P::Scalar> = None;
        for t in parameter_grid(lo, hi, samples) {
            let distance = evaluate(t)?.squared_distance(point);
            if best_distance.map_or(true, |d| distance < d) {
                best = t;
                best_distance = Some(distance);
            }
        }
        lo = (best - step).max(lower);
        hi = (best + step).min(upper);
    }
    Ok(best)
}

/// Ratio in `[0, 1]` of the orthogonal projection of `point` onto segment
/// `a -> b`. A degenerate segment yields zero.
pub(crate) fn segment_parameter<P: ControlPoint>(a: &P, b: &P, point: &P) -> P::Scalar {
    let direction = *b - *a;
    let length2 = direction.squared_norm();
    if length2.is_zero() {
        return P::Scalar::zero();
    }
    let s = (*point - *a).inner_product(&direction) / length2;
    s.max(P::Scalar::zero()).min(P::Scalar::one())
}

/// Map a Cartesian ratio `s` along a rational linear segment back to its
/// parameter: `t = s w0 / (s w0 + (1 - s) w1)`.
pub(crate) fn rational_segment_parameter<T: Real>(s: T, w0: T, w1: T) -> T {
    let numerator = s * w0;
    let denominator = numerator + (T::one() - s) * w1;
    if denominator.is_zero() {
        s
    } else {
        numerator / denominator
    }
}

/// Exact inverse of a degree 0 or degree 1 B-spline, optionally rational.
///
/// Degree 0 returns the start of the span owned by the closest control point.
/// Degree 1 projects onto every traced leg of the control polyline and maps
/// the closest projection linearly into the leg's knot span.
pub(crate) fn piecewise_linear_inverse<P: ControlPoint>(
    degree: usize,
    knots: &[P::Scalar],
    points: &[P],
    weights: Option<&[P::Scalar]>,
    point: &P,
) -> Result<P::Scalar> {
    let mut best: Option<(P::Scalar, P::Scalar)> = None;
    let mut consider = |distance: P::Scalar, t: P::Scalar| {
        if best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, t));
        }
    };

    match degree {
        0 => {
            for (i, p) in points.iter().enumerate() {
                if knots[i + 1] > knots[i] {
                    consider(p.squared_distance(point), knots[i]);
                }
            }
        }
        1 => {
            for i in 0..points.len().saturating_sub(1) {
                let (start, end) = (knots[i + 1], knots[i + 2]);
                if !(end > start) {
                    continue;
                }
                let (a, b) = (&points[i], &points[i + 1]);
                let s = segment_parameter(a, b, point);
                let distance = a.interpolate(b, s).squared_distance(point);
                let local = match weights {
                    Some(w) => rational_segment_parameter(s, w[i], w[i + 1]),
                    None => s,
                };
                consider(distance, start + local * (end - start));
            }
        }
        _ => return Err(unsupported_inverse(degree)),
    }

    best.map(|(_, t)| t).ok_or_else(|| {
        SplineError::PreconditionViolation("curve has no non-empty knot span".into())
    })
}

pub(crate) fn unsupported_inverse(degree: usize) -> SplineError {
    SplineError::UnsupportedOperation(format!(
        "exact inverse evaluation is only available up to degree 1, curve has degree {}",
        degree
    ))
}
