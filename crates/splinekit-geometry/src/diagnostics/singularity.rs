//! Parameters where the tangent vanishes.

use splinekit_core::{Result, Tolerance};
use splinekit_math::prelude::*;
use splinekit_math::roots::sort_and_merge;
use splinekit_math::{scalar, ControlPoint, Polynomial, Real, RootFinder};

use super::segments::PolynomialSegments;
use super::{check_interval, merge_distance};

/// All `t` in `[t0, t1]` where the curve's derivative vanishes.
///
/// These are the common real roots of the tangent numerators `N' w - N w'`
/// of every polynomial piece. A curve whose tangent vanishes identically has
/// no isolated singularities.
pub fn compute_singularities<P, C, F>(
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
    let tolerance = finder.tolerance();

    let mut result = Vec::new();
    for segment in curve.polynomial_segments()? {
        let Some((s0, s1)) = segment.local_window(t0, t1) else {
            continue;
        };
        let tangent = segment.tangent_numerators();
        result.extend(
            vanishing_parameters(&tangent, finder, s0, s1, &tolerance)
                .into_iter()
                .map(|s| segment.to_global(s)),
        );
    }
    sort_and_merge(&mut result, merge_distance(&tolerance, t0, t1));
    log::trace!("found {} singularities in [{}, {}]", result.len(), t0, t1);
    Ok(result)
}

/// Local parameters in `[s0, s1]` where every component of `tangent` is
/// zero, relative to the largest coefficient.
pub(crate) fn vanishing_parameters<T, F>(
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
    let scale = tangent
        .iter()
        .fold(T::zero(), |acc, d| acc.max(d.magnitude()));
    if scale.is_zero() {
        return Vec::new();
    }
    let relative = scalar::<T>(tolerance.parametric);
    let threshold = scale * scalar::<T>(tolerance.linear);

    let mut candidates = Vec::new();
    for component in tangent {
        if !component.is_negligible(scale, relative) {
            candidates.extend(finder.find_roots(component, s0, s1));
        }
    }
    candidates.retain(|&s| tangent.iter().all(|d| d.evaluate(s).abs() <= threshold));
    sort_and_merge(&mut candidates, merge_distance(tolerance, s0, s1));
    candidates
}
