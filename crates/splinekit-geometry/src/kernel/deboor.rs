//! De Boor algorithm for B-spline evaluation, differentiation, knot insertion
//! and Bézier decomposition.

use splinekit_core::Tolerance;
use splinekit_math::prelude::*;
use splinekit_math::{scalar, ControlPoint};

use super::knot::{domain, find_span, multiplicity};

/// Evaluate a B-spline curve point at parameter `t` using the De Boor algorithm.
pub fn evaluate<P: ControlPoint>(
    degree: usize,
    knots: &[P::Scalar],
    control_points: &[P],
    t: P::Scalar,
) -> P {
    let n = control_points.len() - 1;
    let span = find_span(degree, knots, n, t);
    let mut local = control_points[span - degree..=span].to_vec();
    blend(degree, knots, span, &mut local, t)
}

/// Blend the `degree + 1` control points that influence `span`.
///
/// `local[j]` is control point `span - degree + j`. The slice is used as
/// scratch space.
pub fn blend<P: ControlPoint>(
    degree: usize,
    knots: &[P::Scalar],
    span: usize,
    local: &mut [P],
    t: P::Scalar,
) -> P {
    for r in 1..=degree {
        for j in (r..=degree).rev() {
            let left = knots[j + span - degree];
            let right = knots[j + 1 + span - r];
            let alpha = (t - left) / (right - left);
            local[j] = local[j - 1].interpolate(&local[j], alpha);
        }
    }
    local[degree]
}

/// Control points of the derivative curve, which has degree `degree - 1` over
/// `knots[1..len-1]`: `p / (u[i+p+1] - u[i+1]) * (P[i+1] - P[i])`.
///
/// Terms over a vanishing knot interval are zero.
pub fn derivative_points<P: ControlPoint>(
    degree: usize,
    knots: &[P::Scalar],
    control_points: &[P],
) -> Vec<P> {
    let p = scalar::<P::Scalar>(degree as f64);
    control_points
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let delta = knots[i + degree + 1] - knots[i + 1];
            if delta > P::Scalar::zero() {
                (w[1] - w[0]) * (p / delta)
            } else {
                P::origin()
            }
        })
        .collect()
}

/// Evaluate the first derivative at `t`.
pub fn evaluate_derivative<P: ControlPoint>(
    degree: usize,
    knots: &[P::Scalar],
    control_points: &[P],
    t: P::Scalar,
) -> P {
    if degree == 0 {
        return P::origin();
    }
    let derivative = derivative_points(degree, knots, control_points);
    evaluate(degree - 1, &knots[1..knots.len() - 1], &derivative, t)
}

/// Evaluate the second derivative at `t` by differentiating twice.
pub fn evaluate_2nd_derivative<P: ControlPoint>(
    degree: usize,
    knots: &[P::Scalar],
    control_points: &[P],
    t: P::Scalar,
) -> P {
    if degree < 2 {
        return P::origin();
    }
    let derivative = derivative_points(degree, knots, control_points);
    evaluate_derivative(degree - 1, &knots[1..knots.len() - 1], &derivative, t)
}

/// Insert knot `u` once (Boehm's algorithm). The curve is unchanged and gains
/// one control point.
pub fn insert_knot<P: ControlPoint>(
    degree: usize,
    knots: &[P::Scalar],
    control_points: &[P],
    u: P::Scalar,
) -> (Vec<P::Scalar>, Vec<P>) {
    let n = control_points.len() - 1;
    let span = find_span(degree, knots, n, u);

    let mut points = Vec::with_capacity(control_points.len() + 1);
    for i in 0..=n + 1 {
        let q = if i + degree <= span {
            control_points[i]
        } else if i > span {
            control_points[i - 1]
        } else {
            let alpha = (u - knots[i]) / (knots[i + degree] - knots[i]);
            control_points[i - 1].interpolate(&control_points[i], alpha)
        };
        points.push(q);
    }

    let mut new_knots = Vec::with_capacity(knots.len() + 1);
    new_knots.extend_from_slice(&knots[..=span]);
    new_knots.push(u);
    new_knots.extend_from_slice(&knots[span + 1..]);

    log::trace!("inserted knot {} after span {}", u, span);
    (new_knots, points)
}

/// One polynomial piece of a B-spline in Bézier form.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierSegment<P: ControlPoint> {
    pub t_start: P::Scalar,
    pub t_end: P::Scalar,
    pub control_points: Vec<P>,
    /// Index of the first control point in the refined B-spline.
    pub first_index: usize,
    /// Index of the last control point in the refined B-spline.
    pub last_index: usize,
}

/// Split the curve over its domain into Bézier segments.
///
/// Every distinct knot in the domain is raised to multiplicity `degree`; the
/// control points `P[k-p..=k]` of each non-empty span `k` are then the Bézier
/// points of that span.
pub fn decompose<P: ControlPoint>(
    degree: usize,
    knots: &[P::Scalar],
    control_points: &[P],
    tolerance: &Tolerance,
) -> Vec<BezierSegment<P>> {
    let (lower, upper) = domain(degree, knots);
    let eps = scalar::<P::Scalar>(tolerance.knot) * (upper - lower).max(P::Scalar::one());

    let mut distinct: Vec<P::Scalar> = Vec::new();
    for &u in knots {
        if u >= lower - eps && u <= upper + eps && distinct.last().map_or(true, |&l| u - l > eps)
        {
            distinct.push(u);
        }
    }

    let mut knots = knots.to_vec();
    let mut points = control_points.to_vec();
    for &u in &distinct {
        let existing = multiplicity(&knots, u, eps);
        for _ in existing..degree {
            let (k, p) = insert_knot(degree, &knots, &points, u);
            knots = k;
            points = p;
        }
    }

    let n = points.len() - 1;
    let segments: Vec<_> = (degree..=n)
        .filter(|&k| knots[k + 1] - knots[k] > eps)
        .map(|k| BezierSegment {
            t_start: knots[k],
            t_end: knots[k + 1],
            control_points: points[k - degree..=k].to_vec(),
            first_index: k - degree,
            last_index: k,
        })
        .collect();

    log::debug!(
        "decomposed degree-{} B-spline with {} control points into {} Bezier segments",
        degree,
        control_points.len(),
        segments.len()
    );
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::casteljau;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn cubic() -> (Vec<f64>, Vec<Vector3<f64>>) {
        (
            vec![0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0, 3.0],
            vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 2.0, 0.0),
                Vector3::new(2.0, -1.0, 1.0),
                Vector3::new(3.0, 1.0, 0.0),
                Vector3::new(4.0, 0.0, -1.0),
                Vector3::new(5.0, 2.0, 0.0),
            ],
        )
    }

    #[test]
    fn test_curve_point_linear() {
        let degree = 1;
        let knots = vec![0.0, 0.0, 1.0, 2.0, 2.0];
        let cps = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
        ];

        let p = evaluate(degree, &knots, &cps, 0.5);
        assert!((p.x - 0.5).abs() < 1e-10);
        assert!(p.y.abs() < 1e-10);

        let p = evaluate(degree, &knots, &cps, 1.5);
        assert!((p.x - 1.0).abs() < 1e-10);
        assert!((p.y - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_curve_point_quadratic() {
        let degree = 2;
        let knots = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let cps = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.5, 1.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
        ];

        let p = evaluate(degree, &knots, &cps, 0.0);
        assert!((p.x - 0.0).abs() < 1e-10);

        let p = evaluate(degree, &knots, &cps, 1.0);
        assert!((p.x - 1.0).abs() < 1e-10);

        let p = evaluate(degree, &knots, &cps, 0.5);
        assert!((p.x - 0.5).abs() < 1e-10);
        assert!((p.y - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_clamped_single_span_matches_bezier() {
        let knots = vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let (_, cps) = cubic();
        let cps = &cps[..4];
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert_relative_eq!(
                evaluate(3, &knots, cps, t),
                casteljau::evaluate(cps, t),
                epsilon = 1e-12
            );
            assert_relative_eq!(
                evaluate_derivative(3, &knots, cps, t),
                casteljau::evaluate_derivative(cps, t),
                epsilon = 1e-11
            );
            assert_relative_eq!(
                evaluate_2nd_derivative(3, &knots, cps, t),
                casteljau::evaluate_2nd_derivative(cps, t),
                epsilon = 1e-10
            );
        }
    }

    #[test]
    fn test_insert_knot_preserves_curve() {
        let (knots, cps) = cubic();
        let (new_knots, new_cps) = insert_knot(3, &knots, &cps, 1.5);
        assert_eq!(new_knots.len(), knots.len() + 1);
        assert_eq!(new_cps.len(), cps.len() + 1);
        assert_eq!(new_knots[5], 1.5);
        for i in 0..=30 {
            let t = i as f64 / 10.0;
            assert_relative_eq!(
                evaluate(3, &knots, &cps, t),
                evaluate(3, &new_knots, &new_cps, t),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_insert_existing_knot() {
        let (knots, cps) = cubic();
        let (new_knots, new_cps) = insert_knot(3, &knots, &cps, 1.0);
        assert_eq!(multiplicity(&new_knots, 1.0, 1e-12), 2);
        for i in 0..=30 {
            let t = i as f64 / 10.0;
            assert_relative_eq!(
                evaluate(3, &knots, &cps, t),
                evaluate(3, &new_knots, &new_cps, t),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_decompose_reproduces_curve() {
        let (knots, cps) = cubic();
        let segments = decompose(3, &knots, &cps, &Tolerance::default());
        assert_eq!(segments.len(), 3);
        for segment in &segments {
            assert_eq!(segment.control_points.len(), 4);
            let width = segment.t_end - segment.t_start;
            for i in 0..=10 {
                let s = i as f64 / 10.0;
                let t = segment.t_start + s * width;
                assert_relative_eq!(
                    casteljau::evaluate(&segment.control_points, s),
                    evaluate(3, &knots, &cps, t),
                    epsilon = 1e-12
                );
            }
        }
        // Adjacent segments share their junction control point.
        assert_eq!(segments[0].last_index, segments[1].first_index);
        assert_eq!(segments[1].last_index, segments[2].first_index);
    }

    #[test]
    fn test_decompose_unclamped() {
        let knots = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let cps = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(2.0, 0.0, 1.0),
            Vector3::new(3.0, 1.0, 0.0),
        ];
        let segments = decompose(2, &knots, &cps, &Tolerance::default());
        assert_eq!(segments.len(), 2);
        for segment in &segments {
            for i in 0..=4 {
                let s = i as f64 / 4.0;
                let t = segment.t_start + s * (segment.t_end - segment.t_start);
                assert_relative_eq!(
                    casteljau::evaluate(&segment.control_points, s),
                    evaluate(2, &knots, &cps, t),
                    epsilon = 1e-12
                );
            }
        }
    }
}
