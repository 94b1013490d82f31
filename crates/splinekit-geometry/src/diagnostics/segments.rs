//! Power-basis pieces of curves, the input to every diagnostic.

use splinekit_core::Result;
use splinekit_math::prelude::*;
use splinekit_math::{ControlPoint, Homogeneous, Polynomial, Real};

use crate::curve::{BSplineCurve, BezierCurve, NurbsCurve, RationalBezierCurve};

/// One polynomial piece of a curve as a homogeneous quotient over a local
/// parameter `s` in `[0, 1]`.
///
/// The piece covers `[t_start, t_end]` of the curve; the point at `s` is
/// `numerators[axis](s) / weight(s)`. Polynomial curves have a unit weight.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialSegment<T: Real> {
    pub t_start: T,
    pub t_end: T,
    pub numerators: Vec<Polynomial<T>>,
    pub weight: Polynomial<T>,
}

impl<T: Real> PolynomialSegment<T> {
    /// Piece of a polynomial curve from its Bézier control points.
    pub fn from_points<P: ControlPoint<Scalar = T>>(t_start: T, t_end: T, points: &[P]) -> Self {
        let numerators = (0..P::DIM)
            .map(|axis| {
                let bernstein: Vec<T> = points.iter().map(|p| p.coordinate(axis)).collect();
                Polynomial::from_bernstein(&bernstein)
            })
            .collect();
        Self {
            t_start,
            t_end,
            numerators,
            weight: Polynomial::constant(T::one()),
        }
    }

    /// Piece of a rational curve from its homogeneous Bézier control points.
    pub fn from_homogeneous<P: ControlPoint<Scalar = T>>(
        t_start: T,
        t_end: T,
        points: &[Homogeneous<P>],
    ) -> Self {
        let weights: Vec<T> = points.iter().map(|h| h.weight).collect();
        let cartesian: Vec<P> = points.iter().map(|h| h.point).collect();
        Self {
            weight: Polynomial::from_bernstein(&weights),
            ..Self::from_points(t_start, t_end, &cartesian)
        }
    }

    pub fn to_local(&self, t: T) -> T {
        (t - self.t_start) / (self.t_end - self.t_start)
    }

    pub fn to_global(&self, s: T) -> T {
        self.t_start + s * (self.t_end - self.t_start)
    }

    /// Local window `[s0, s1]` of the overlap with `[t0, t1]`, if any.
    pub fn local_window(&self, t0: T, t1: T) -> Option<(T, T)> {
        if self.t_end < t0 || self.t_start > t1 || !(self.t_end > self.t_start) {
            return None;
        }
        Some((
            self.to_local(t0.max(self.t_start)),
            self.to_local(t1.min(self.t_end)),
        ))
    }

    /// Numerators of the tangent direction, `N' w - N w'` per axis.
    ///
    /// Same direction as the derivative wherever `w > 0`.
    pub fn tangent_numerators(&self) -> Vec<Polynomial<T>> {
        let dw = self.weight.derivative();
        self.numerators
            .iter()
            .map(|n| &(&n.derivative() * &self.weight) - &(n * &dw))
            .collect()
    }
}

/// Curves that can be split into power-basis pieces.
pub trait PolynomialSegments<P: ControlPoint> {
    fn polynomial_segments(&self) -> Result<Vec<PolynomialSegment<P::Scalar>>>;
}

impl<P: ControlPoint> PolynomialSegments<P> for BezierCurve<P> {
    fn polynomial_segments(&self) -> Result<Vec<PolynomialSegment<P::Scalar>>> {
        Ok(vec![PolynomialSegment::from_points(
            P::Scalar::zero(),
            P::Scalar::one(),
            self.control_points(),
        )])
    }
}

impl<P: ControlPoint> PolynomialSegments<P> for RationalBezierCurve<P> {
    fn polynomial_segments(&self) -> Result<Vec<PolynomialSegment<P::Scalar>>> {
        Ok(vec![PolynomialSegment::from_homogeneous(
            P::Scalar::zero(),
            P::Scalar::one(),
            self.homogeneous()?.control_points(),
        )])
    }
}

impl<P: ControlPoint> PolynomialSegments<P> for BSplineCurve<P> {
    fn polynomial_segments(&self) -> Result<Vec<PolynomialSegment<P::Scalar>>> {
        Ok(self
            .decompose()
            .iter()
            .map(|s| PolynomialSegment::from_points(s.t_start, s.t_end, &s.control_points))
            .collect())
    }
}

impl<P: ControlPoint> PolynomialSegments<P> for NurbsCurve<P> {
    fn polynomial_segments(&self) -> Result<Vec<PolynomialSegment<P::Scalar>>> {
        Ok(self
            .decompose()?
            .iter()
            .map(|s| PolynomialSegment::from_homogeneous(s.t_start, s.t_end, &s.control_points))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Curve;
    use approx::assert_relative_eq;
    use nalgebra::Vector2;

    #[test]
    fn test_bspline_segments_reproduce_curve() {
        let curve = BSplineCurve::new(
            vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(1.0, 2.0),
                Vector2::new(2.0, -1.0),
                Vector2::new(3.0, 0.0),
            ],
            vec![0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0],
        )
        .unwrap();
        let segments = curve.polynomial_segments().unwrap();
        assert_eq!(segments.len(), 2);
        for segment in &segments {
            for i in 0..=4 {
                let t = segment.to_global(i as f64 / 4.0);
                let s = segment.to_local(t);
                let p = curve.evaluate(t).unwrap();
                assert_relative_eq!(segment.numerators[0].evaluate(s), p.x, epsilon = 1e-12);
                assert_relative_eq!(segment.numerators[1].evaluate(s), p.y, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_rational_segment_tangent_direction() {
        let curve = RationalBezierCurve::new(
            vec![
                Vector2::new(1.0, 0.0),
                Vector2::new(1.0, 1.0),
                Vector2::new(0.0, 1.0),
            ],
            vec![1.0, 0.5, 1.0],
        )
        .unwrap();
        let segment = &curve.polynomial_segments().unwrap()[0];
        let tangent = segment.tangent_numerators();
        for i in 0..=4 {
            let t = i as f64 / 4.0;
            let d = curve.evaluate_derivative(t).unwrap();
            let w = segment.weight.evaluate(t);
            // N'w - Nw' = w^2 p'
            assert_relative_eq!(tangent[0].evaluate(t), w * w * d.x, epsilon = 1e-12);
            assert_relative_eq!(tangent[1].evaluate(t), w * w * d.y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_local_window() {
        let segment = PolynomialSegment::from_points(1.0, 3.0, &[Vector2::new(0.0, 0.0)]);
        assert_eq!(segment.local_window(0.0, 2.0), Some((0.0, 0.5)));
        assert_eq!(segment.local_window(3.5, 4.0), None);
    }
}
