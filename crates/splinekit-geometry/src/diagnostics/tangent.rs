//! Tangent-direction analysis of planar curves.

use splinekit_core::{Result, SplineError, Tolerance};
use splinekit_math::prelude::*;
use splinekit_math::roots::sort_and_merge;
use splinekit_math::{scalar, ControlPoint, Polynomial, Real, RootFinder};

use super::segments::PolynomialSegments;
use super::singularity::vanishing_parameters;
use super::{check_interval, check_planar, merge_distance};

/// All `t` in `[t0, t1]` where the tangent is parallel to `direction` and
/// points the same way.
///
/// A piece whose tangent is parallel to `direction` everywhere has no
/// isolated matches and contributes nothing.
pub fn match_tangent<P, C, F>(
    curve: &C,
    finder: &F,
    direction: [P::Scalar; 2],
    t0: P::Scalar,
    t1: P::Scalar,
) -> Result<Vec<P::Scalar>>
where
    P: ControlPoint,
    C: PolynomialSegments<P> + ?Sized,
    F: RootFinder<P::Scalar> + ?Sized,
{
    check_interval(t0, t1)?;
    check_planar::<P>()?;
    let [dx, dy] = direction;
    let length = (dx * dx + dy * dy).sqrt();
    if length.is_zero() {
        return Err(SplineError::PreconditionViolation(
            "tangent direction must be non-zero".into(),
        ));
    }
    let tolerance = finder.tolerance();
    let relative = scalar::<P::Scalar>(tolerance.parametric);

    let mut result = Vec::new();
    for segment in curve.polynomial_segments()? {
        let Some((s0, s1)) = segment.local_window(t0, t1) else {
            continue;
        };
        let d = segment.tangent_numerators();
        let scale = tangent_scale(&d) * length;
        let cross = &d[0].scaled(dy) - &d[1].scaled(dx);
        if cross.is_negligible(scale, relative) {
            continue;
        }
        let threshold = scale * scalar::<P::Scalar>(tolerance.linear);
        result.extend(
            finder
                .find_roots(&cross, s0, s1)
                .into_iter()
                .filter(|&s| d[0].evaluate(s) * dx + d[1].evaluate(s) * dy > threshold)
                .map(|s| segment.to_global(s)),
        );
    }
    sort_and_merge(&mut result, merge_distance(&tolerance, t0, t1));
    Ok(result)
}

/// Interior parameters of `(t0, t1)` that cut the curve into pieces whose
/// tangent stays within one quadrant: axis-aligned tangents and
/// singularities.
pub fn reduce_turning_angle<P, C, F>(
    curve: &C,
    finder: &F,
    t0: P::Scalar,
    t1: P::Scalar,
) -> Result<Vec<P::Scalar>>
where
    P: ControlPoint,
    C: PolynomialSegments<P> + ?Sized,
    F: RootFinder<P::Scalar> + ?Sized,
{
    check_interval(t0, t1)?;
    check_planar::<P>()?;
    let tolerance = finder.tolerance();
    let merge = merge_distance(&tolerance, t0, t1);

    let mut result = Vec::new();
    for segment in curve.polynomial_segments()? {
        let Some((s0, s1)) = segment.local_window(t0, t1) else {
            continue;
        };
        let d = segment.tangent_numerators();
        result.extend(
            quadrant_breaks(&d, finder, s0, s1, &tolerance)
                .into_iter()
                .map(|s| segment.to_global(s)),
        );
    }
    result.retain(|&t| t - t0 > merge && t1 - t > merge);
    sort_and_merge(&mut result, merge);
    Ok(result)
}

/// Signed total rotation of the tangent over `[t0, t1]`, counter-clockwise
/// positive.
///
/// The curve is cut at the parameters of [`reduce_turning_angle`] and at
/// piece boundaries. Each part turns by at most a quarter turn, so its
/// rotation is the angle between its end tangents. Tangent jumps between
/// parts are added on top; a cusp reverses the tangent and counts as a half
/// turn in the sense of the smooth rotation.
///
/// At a singular parameter the one-sided tangent comes from the first
/// derivative that does not vanish there.
pub fn turning_angle<P, C, F>(
    curve: &C,
    finder: &F,
    t0: P::Scalar,
    t1: P::Scalar,
) -> Result<P::Scalar>
where
    P: ControlPoint,
    C: PolynomialSegments<P> + ?Sized,
    F: RootFinder<P::Scalar> + ?Sized,
{
    check_interval(t0, t1)?;
    check_planar::<P>()?;
    let tolerance = finder.tolerance();
    let zero = P::Scalar::zero();

    // (start, end) tangent of every part, in curve order.
    let mut parts: Vec<([P::Scalar; 2], [P::Scalar; 2])> = Vec::new();
    for segment in curve.polynomial_segments()? {
        let Some((s0, s1)) = segment.local_window(t0, t1) else {
            continue;
        };
        let d = segment.tangent_numerators();
        let scale = tangent_scale(&d);
        if scale.is_zero() {
            continue;
        }
        let threshold = scale * scalar::<P::Scalar>(tolerance.linear);
        let merge = merge_distance(&tolerance, s0, s1);
        let mut breaks = vec![s0];
        breaks.extend(
            quadrant_breaks(&d, finder, s0, s1, &tolerance)
                .into_iter()
                .filter(|&s| s - s0 > merge && s1 - s > merge),
        );
        breaks.push(s1);

        for window in breaks.windows(2) {
            let start = limit_direction(&d, window[0], threshold, false);
            let end = limit_direction(&d, window[1], threshold, true);
            if let (Some(start), Some(end)) = (start, end) {
                parts.push((start, end));
            }
        }
    }

    let smooth = parts
        .iter()
        .fold(zero, |acc, (start, end)| acc + angle_between(start, end));

    let angular = scalar::<P::Scalar>(tolerance.angular);
    let mut jumps = zero;
    for pair in parts.windows(2) {
        let before = pair[0].1;
        let after = pair[1].0;
        let dot = before[0] * after[0] + before[1] * after[1];
        let cross = before[0] * after[1] - before[1] * after[0];
        if dot < zero && cross.abs() <= angular * norm(&before) * norm(&after) {
            jumps += if smooth >= zero {
                P::Scalar::pi()
            } else {
                -P::Scalar::pi()
            };
        } else {
            jumps += cross.atan2(dot);
        }
    }
    log::trace!(
        "turning angle over [{:?}, {:?}]: {} parts, smooth {:?}, jumps {:?}",
        t0,
        t1,
        parts.len(),
        smooth,
        jumps
    );
    Ok(smooth + jumps)
}

/// Local parameters in `[s0, s1]` where a tangent component changes sign or
/// the tangent vanishes.
fn quadrant_breaks<T, F>(
    tangent: &[Polynomial<T>],
    finder: &F,
    s0: T,
    s1: T,
    tolerance: &Tolerance,
) -> Vec<T>
where
    T: Real,
    F: RootFinder<T> + ?Sized,
{
    let scale = tangent_scale(tangent);
    let relative = scalar::<T>(tolerance.parametric);
    let mut breaks = Vec::new();
    for component in tangent {
        if !component.is_negligible(scale, relative) {
            breaks.extend(finder.find_roots(component, s0, s1));
        }
    }
    breaks.extend(vanishing_parameters(tangent, finder, s0, s1, tolerance));
    sort_and_merge(&mut breaks, merge_distance(tolerance, s0, s1));
    breaks
}

fn tangent_scale<T: Real>(tangent: &[Polynomial<T>]) -> T {
    tangent
        .iter()
        .fold(T::zero(), |acc, d| acc.max(d.magnitude()))
}

/// One-sided tangent direction at `s`: the first non-vanishing derivative of
/// the tangent, reversed for odd orders when approached from the left.
fn limit_direction<T: Real>(
    tangent: &[Polynomial<T>],
    s: T,
    threshold: T,
    from_left: bool,
) -> Option<[T; 2]> {
    let mut d = [tangent[0].clone(), tangent[1].clone()];
    let max_order = d.iter().filter_map(Polynomial::degree).max()?;
    for order in 0..=max_order {
        let v = [d[0].evaluate(s), d[1].evaluate(s)];
        if norm(&v) > threshold {
            return Some(if from_left && order % 2 == 1 {
                [-v[0], -v[1]]
            } else {
                v
            });
        }
        d = [d[0].derivative(), d[1].derivative()];
    }
    None
}

fn norm<T: Real>(v: &[T; 2]) -> T {
    (v[0] * v[0] + v[1] * v[1]).sqrt()
}

fn angle_between<T: Real>(a: &[T; 2], b: &[T; 2]) -> T {
    let cross = a[0] * b[1] - a[1] * b[0];
    let dot = a[0] * b[0] + a[1] * b[1];
    cross.atan2(dot)
}
