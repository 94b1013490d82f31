//! De Casteljau evaluation, differentiation and degree elevation for Bézier
//! control polygons.

use splinekit_math::{scalar, ControlPoint};

/// Evaluate the Bézier curve with the given control points at `t`.
///
/// `points` must not be empty.
pub fn evaluate<P: ControlPoint>(points: &[P], t: P::Scalar) -> P {
    let mut scratch = points.to_vec();
    let n = scratch.len() - 1;
    for level in 1..=n {
        for i in 0..=n - level {
            scratch[i] = scratch[i].interpolate(&scratch[i + 1], t);
        }
    }
    scratch[0]
}

/// Control points of the derivative curve, `n * (P[i+1] - P[i])`.
///
/// Empty for degree 0.
pub fn derivative_points<P: ControlPoint>(points: &[P]) -> Vec<P> {
    let n = scalar::<P::Scalar>(points.len().saturating_sub(1) as f64);
    points.windows(2).map(|w| (w[1] - w[0]) * n).collect()
}

/// Evaluate the first derivative at `t`.
pub fn evaluate_derivative<P: ControlPoint>(points: &[P], t: P::Scalar) -> P {
    let derivative = derivative_points(points);
    if derivative.is_empty() {
        P::origin()
    } else {
        evaluate(&derivative, t)
    }
}

/// Evaluate the second derivative at `t`; the control points are
/// `n (n - 1) (P[i+2] - 2 P[i+1] + P[i])`.
pub fn evaluate_2nd_derivative<P: ControlPoint>(points: &[P], t: P::Scalar) -> P {
    let second = derivative_points(&derivative_points(points));
    if second.is_empty() {
        P::origin()
    } else {
        evaluate(&second, t)
    }
}

/// Exact degree elevation from `n` to `n + 1`:
/// `Q[i] = i / (n + 1) * P[i-1] + (1 - i / (n + 1)) * P[i]`.
pub fn elevate<P: ControlPoint>(points: &[P]) -> Vec<P> {
    let n = points.len() - 1;
    let denom = scalar::<P::Scalar>((n + 1) as f64);
    let mut elevated = Vec::with_capacity(n + 2);
    elevated.push(points[0]);
    for i in 1..=n {
        let alpha = scalar::<P::Scalar>(i as f64) / denom;
        elevated.push(points[i].interpolate(&points[i - 1], alpha));
    }
    elevated.push(points[n]);
    elevated
}

/// Subdivide at `t`, returning the control points of `[0, t]` and `[t, 1]`.
pub fn split<P: ControlPoint>(points: &[P], t: P::Scalar) -> (Vec<P>, Vec<P>) {
    let n = points.len() - 1;
    let mut scratch = points.to_vec();
    let mut left = Vec::with_capacity(n + 1);
    let mut right = Vec::with_capacity(n + 1);
    left.push(scratch[0]);
    right.push(scratch[n]);
    for level in 1..=n {
        for i in 0..=n - level {
            scratch[i] = scratch[i].interpolate(&scratch[i + 1], t);
        }
        left.push(scratch[0]);
        right.push(scratch[n - level]);
    }
    right.reverse();
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector2;

    fn arch() -> Vec<Vector2<f64>> {
        vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(2.0, 1.0),
            Vector2::new(3.0, 0.0),
        ]
    }

    #[test]
    fn test_evaluate_cubic() {
        let pts = arch();
        assert_relative_eq!(evaluate(&pts, 0.0), pts[0]);
        assert_relative_eq!(evaluate(&pts, 1.0), pts[3]);
        // 0.125 P0 + 0.375 P1 + 0.375 P2 + 0.125 P3
        assert_relative_eq!(evaluate(&pts, 0.5), Vector2::new(1.5, 0.75), epsilon = 1e-14);
    }

    #[test]
    fn test_derivative_points() {
        let d = derivative_points(&arch());
        assert_eq!(d.len(), 3);
        assert_relative_eq!(d[0], Vector2::new(3.0, 3.0));
        assert_relative_eq!(d[2], Vector2::new(3.0, -3.0));
        assert!(derivative_points(&[Vector2::new(1.0, 2.0)]).is_empty());
        assert_eq!(
            evaluate_derivative(&[Vector2::new(1.0, 2.0)], 0.3),
            Vector2::zeros()
        );
    }

    #[test]
    fn test_second_derivative_of_quadratic_is_constant() {
        let pts = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(2.0, 0.0),
        ];
        // 2 * 1 * (P2 - 2 P1 + P0)
        for &t in &[0.0, 0.3, 1.0] {
            assert_relative_eq!(
                evaluate_2nd_derivative(&pts, t),
                Vector2::new(0.0, -4.0),
                epsilon = 1e-14
            );
        }
    }

    #[test]
    fn test_elevate_preserves_curve() {
        let pts = arch();
        let elevated = elevate(&pts);
        assert_eq!(elevated.len(), 5);
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert_relative_eq!(evaluate(&pts, t), evaluate(&elevated, t), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_split() {
        let pts = arch();
        let (left, right) = split(&pts, 0.25);
        assert_relative_eq!(left[3], right[0]);
        for i in 0..=10 {
            let s = i as f64 / 10.0;
            assert_relative_eq!(evaluate(&left, s), evaluate(&pts, 0.25 * s), epsilon = 1e-12);
            assert_relative_eq!(
                evaluate(&right, s),
                evaluate(&pts, 0.25 + 0.75 * s),
                epsilon = 1e-12
            );
        }
    }
}
