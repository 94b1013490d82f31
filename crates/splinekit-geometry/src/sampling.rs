//! Sampling utilities for converting curves and patches to discrete points.

use rayon::prelude::*;
use splinekit_core::Result;
use splinekit_math::{scalar, ControlPoint, Real};

use crate::curve::Curve;
use crate::surface::Patch;

/// Maximum recursion depth for adaptive subdivision.
const MAX_DEPTH: u32 = 12;

/// `count` evenly spaced parameters from `lower` to `upper`, both included.
pub fn parameter_grid<T: Real>(lower: T, upper: T, count: usize) -> Vec<T> {
    match count {
        0 => Vec::new(),
        1 => vec![lower],
        _ => {
            let last = count - 1;
            let step = (upper - lower) / scalar::<T>(last as f64);
            (0..count)
                .map(|i| {
                    if i == last {
                        upper
                    } else {
                        lower + step * scalar::<T>(i as f64)
                    }
                })
                .collect()
        }
    }
}

/// Evaluate `count` evenly spaced points over the curve's domain.
pub fn sample_curve<P, C>(curve: &C, count: usize) -> Result<Vec<P>>
where
    P: ControlPoint,
    C: Curve<P> + ?Sized,
{
    let (t_min, t_max) = curve.domain();
    parameter_grid(t_min, t_max, count)
        .into_iter()
        .map(|t| curve.evaluate(t))
        .collect()
}

/// Evaluate a `count_u x count_v` grid over the patch's domain, row-major.
pub fn sample_patch<P, S>(patch: &S, count_u: usize, count_v: usize) -> Result<Vec<P>>
where
    P: ControlPoint,
    S: Patch<P> + ?Sized,
{
    let (u_min, u_max) = patch.domain_u();
    let (v_min, v_max) = patch.domain_v();
    let vs = parameter_grid(v_min, v_max, count_v);

    let mut points = Vec::with_capacity(count_u * count_v);
    for u in parameter_grid(u_min, u_max, count_u) {
        for &v in &vs {
            points.push(patch.evaluate(u, v)?);
        }
    }
    Ok(points)
}

/// Sample a heterogeneous set of curves in parallel.
///
/// Curves share no state, so each one is sampled on its own worker.
pub fn par_sample_curves<P: ControlPoint>(
    curves: &[Box<dyn Curve<P>>],
    count: usize,
) -> Result<Vec<Vec<P>>> {
    curves
        .par_iter()
        .map(|curve| sample_curve(&**curve, count))
        .collect()
}

/// Convert a curve to a polyline using adaptive subdivision.
///
/// The algorithm recursively subdivides segments where the midpoint deviation
/// from the chord exceeds the given `tolerance`.
pub fn curve_to_polyline<P, C>(curve: &C, tolerance: P::Scalar) -> Result<Vec<P>>
where
    P: ControlPoint,
    C: Curve<P> + ?Sized,
{
    let (t_min, t_max) = curve.domain();
    let mut points = vec![curve.evaluate(t_min)?];
    subdivide_curve(curve, t_min, t_max, tolerance, &mut points, 0)?;
    Ok(points)
}

fn subdivide_curve<P, C>(
    curve: &C,
    t0: P::Scalar,
    t1: P::Scalar,
    tolerance: P::Scalar,
    points: &mut Vec<P>,
    depth: u32,
) -> Result<()>
where
    P: ControlPoint,
    C: Curve<P> + ?Sized,
{
    let p1 = curve.evaluate(t1)?;
    if depth >= MAX_DEPTH {
        points.push(p1);
        return Ok(());
    }

    let half = scalar::<P::Scalar>(0.5);
    let t_mid = (t0 + t1) * half;
    let p0 = curve.evaluate(t0)?;
    let p_mid = curve.evaluate(t_mid)?;

    // Chord midpoint
    let chord_mid = p0.interpolate(&p1, half);
    // The first level always splits: an S-shaped curve can pass through its
    // chord midpoint.
    if depth == 0 || p_mid.distance(&chord_mid) > tolerance {
        subdivide_curve(curve, t0, t_mid, tolerance, points, depth + 1)?;
        subdivide_curve(curve, t_mid, t1, tolerance, points, depth + 1)?;
    } else {
        points.push(p1);
    }
    Ok(())
}
