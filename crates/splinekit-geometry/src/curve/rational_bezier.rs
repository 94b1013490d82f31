//! Rational Bézier curves evaluated through their homogeneous lift.

use std::io;

use serde::{Deserialize, Serialize};
use splinekit_core::{Result, SplineError, Validate};
use splinekit_math::homogeneous::{lift, unlift};
use splinekit_math::prelude::*;
use splinekit_math::{quotient_derivative, quotient_second_derivative, ControlPoint, Homogeneous};

use super::inverse::{rational_segment_parameter, segment_parameter, unsupported_inverse};
use super::{check_dimension, check_weights, write_points, write_scalars, BezierCurve, Curve, DegreeMode};

/// A rational Bézier curve: control points with one positive weight each.
///
/// The homogeneous curve is cached. Setters rebuild it whenever the point and
/// weight counts agree and drop it otherwise; evaluating without a cache fails
/// with [`SplineError::NotInitialized`]. Deserialized curves start without a
/// cache and need [`RationalBezierCurve::initialize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "P: Serialize, P::Scalar: Serialize",
    deserialize = "P: Deserialize<'de>, P::Scalar: Deserialize<'de>"
))]
pub struct RationalBezierCurve<P: ControlPoint> {
    control_points: Vec<P>,
    weights: Vec<P::Scalar>,
    mode: DegreeMode,
    #[serde(skip)]
    homogeneous: Option<BezierCurve<Homogeneous<P>>>,
}

impl<P: ControlPoint> RationalBezierCurve<P> {
    pub fn new(control_points: Vec<P>, weights: Vec<P::Scalar>) -> Result<Self> {
        Self::with_degree_mode(control_points, weights, DegreeMode::Dynamic)
    }

    pub fn with_degree_mode(
        control_points: Vec<P>,
        weights: Vec<P::Scalar>,
        mode: DegreeMode,
    ) -> Result<Self> {
        let mut curve = Self {
            control_points,
            weights,
            mode,
            homogeneous: None,
        };
        curve.initialize()?;
        Ok(curve)
    }

    /// Build from a homogeneous Bézier curve, recovering points and weights.
    pub fn from_homogeneous(homogeneous: BezierCurve<Homogeneous<P>>) -> Result<Self> {
        let (control_points, weights) = unlift(homogeneous.control_points());
        check_weights(&weights, control_points.len())?;
        let curve = Self {
            control_points,
            weights,
            mode: homogeneous.degree_mode(),
            homogeneous: Some(homogeneous),
        };
        Ok(curve)
    }

    /// Rebuild the homogeneous cache from the current points and weights.
    pub fn initialize(&mut self) -> Result<()> {
        self.homogeneous = None;
        self.validate()?;
        let lifted = lift(&self.control_points, &self.weights);
        self.homogeneous = Some(BezierCurve::with_degree_mode(lifted, self.mode)?);
        log::debug!(
            "built homogeneous cache for rational Bezier curve of degree {}",
            self.degree()
        );
        Ok(())
    }

    pub fn control_points(&self) -> &[P] {
        &self.control_points
    }

    pub fn weights(&self) -> &[P::Scalar] {
        &self.weights
    }

    pub fn degree_mode(&self) -> DegreeMode {
        self.mode
    }

    pub fn is_initialized(&self) -> bool {
        self.homogeneous.is_some()
    }

    /// Replace the control points. The curve is left untouched on error.
    pub fn set_control_points(&mut self, control_points: Vec<P>) -> Result<()> {
        if let Some(degree) = control_points.len().checked_sub(1) {
            self.mode.resolve(degree)?;
        }
        self.adopt(control_points, self.weights.clone())
    }

    /// Replace the weights. The curve is left untouched on error.
    pub fn set_weights(&mut self, weights: Vec<P::Scalar>) -> Result<()> {
        self.adopt(self.control_points.clone(), weights)
    }

    /// The cached homogeneous curve.
    pub fn homogeneous(&self) -> Result<&BezierCurve<Homogeneous<P>>> {
        match &self.homogeneous {
            Some(h) if h.control_points().len() == self.control_points.len() => Ok(h),
            _ => Err(SplineError::NotInitialized(
                "rational Bezier curve has no homogeneous representation".into(),
            )),
        }
    }

    /// Same curve with one more control point.
    pub fn elevate_degree(&self) -> Result<Self> {
        let elevated = self.homogeneous()?.elevate_degree();
        Self::from_homogeneous(elevated)
    }

    /// Subdivide at `t` into the pieces over `[0, t]` and `[t, 1]`.
    pub fn split(&self, t: P::Scalar) -> Result<(Self, Self)> {
        let (left, right) = self.homogeneous()?.split(t);
        Ok((Self::from_homogeneous(left)?, Self::from_homogeneous(right)?))
    }

    /// Swap in new data once it validates; mismatched counts only drop the cache.
    fn adopt(&mut self, control_points: Vec<P>, weights: Vec<P::Scalar>) -> Result<()> {
        let mut candidate = Self {
            control_points,
            weights,
            mode: self.mode,
            homogeneous: None,
        };
        if candidate.control_points.len() == candidate.weights.len() {
            candidate.initialize()?;
        }
        *self = candidate;
        Ok(())
    }
}

impl<P: ControlPoint> Validate for RationalBezierCurve<P> {
    fn validate(&self) -> Result<()> {
        check_dimension::<P>()?;
        if self.control_points.is_empty() {
            return Err(SplineError::InvalidConfiguration(
                "a rational Bezier curve needs at least one control point".into(),
            ));
        }
        check_weights(&self.weights, self.control_points.len())?;
        self.mode.resolve(self.control_points.len() - 1)?;
        Ok(())
    }
}

impl<P: ControlPoint> Curve<P> for RationalBezierCurve<P> {
    fn evaluate(&self, t: P::Scalar) -> Result<P> {
        Ok(self.homogeneous()?.evaluate(t)?.project())
    }

    fn evaluate_derivative(&self, t: P::Scalar) -> Result<P> {
        let h = self.homogeneous()?;
        Ok(quotient_derivative(&h.evaluate(t)?, &h.evaluate_derivative(t)?))
    }

    fn evaluate_2nd_derivative(&self, t: P::Scalar) -> Result<P> {
        let h = self.homogeneous()?;
        Ok(quotient_second_derivative(
            &h.evaluate(t)?,
            &h.evaluate_derivative(t)?,
            &h.evaluate_2nd_derivative(t)?,
        ))
    }

    fn inverse_evaluate(&self, point: &P) -> Result<P::Scalar> {
        self.homogeneous()?;
        match (self.control_points.as_slice(), self.weights.as_slice()) {
            ([_], _) => Ok(P::Scalar::zero()),
            ([a, b], [w0, w1]) => {
                let s = segment_parameter(a, b, point);
                Ok(rational_segment_parameter(s, *w0, *w1))
            }
            _ => Err(unsupported_inverse(self.degree())),
        }
    }

    fn domain(&self) -> (P::Scalar, P::Scalar) {
        (P::Scalar::zero(), P::Scalar::one())
    }

    fn degree(&self) -> usize {
        self.control_points.len().saturating_sub(1)
    }

    fn write(&self, sink: &mut dyn io::Write) -> Result<()> {
        write_points(sink, "c", &self.control_points)?;
        write_scalars(sink, "w", &self.weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector2;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn quarter_circle() -> RationalBezierCurve<Vector2<f64>> {
        RationalBezierCurve::new(
            vec![
                Vector2::new(1.0, 0.0),
                Vector2::new(1.0, 1.0),
                Vector2::new(0.0, 1.0),
            ],
            vec![1.0, FRAC_1_SQRT_2, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_quarter_circle_on_unit_circle() {
        let curve = quarter_circle();
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let p = curve.evaluate(t).unwrap();
            assert_relative_eq!(p.norm(), 1.0, epsilon = 1e-12);
            // Tangent is perpendicular to the radius.
            let d = curve.evaluate_derivative(t).unwrap();
            assert!(p.dot(&d).abs() < 1e-12);
        }
        assert_relative_eq!(curve.evaluate(0.5).unwrap().x, FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_unit_weights_reduce_to_polynomial() {
        let points = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 2.0),
            Vector2::new(3.0, 1.0),
        ];
        let rational = RationalBezierCurve::new(points.clone(), vec![1.0; 3]).unwrap();
        let plain = BezierCurve::new(points).unwrap();
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert_relative_eq!(rational.evaluate(t).unwrap(), plain.evaluate(t).unwrap(), epsilon = 1e-12);
            assert_relative_eq!(
                rational.evaluate_derivative(t).unwrap(),
                plain.evaluate_derivative(t).unwrap(),
                epsilon = 1e-12
            );
            assert_relative_eq!(
                rational.evaluate_2nd_derivative(t).unwrap(),
                plain.evaluate_2nd_derivative(t).unwrap(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_mismatched_setter_invalidates() {
        let mut curve = quarter_circle();
        curve
            .set_control_points(vec![Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)])
            .unwrap();
        assert!(!curve.is_initialized());
        assert!(matches!(curve.evaluate(0.5), Err(SplineError::NotInitialized(_))));

        curve.set_weights(vec![1.0, 3.0]).unwrap();
        assert!(curve.is_initialized());
        // w0 = 1, w1 = 3: p(0.5) = 3 * 0.5 / (0.5 + 1.5)
        assert_relative_eq!(curve.evaluate(0.5).unwrap(), Vector2::new(0.75, 0.0), epsilon = 1e-14);
    }

    #[test]
    fn test_rejected_setters_keep_curve() {
        let circle = quarter_circle();
        let mut curve = RationalBezierCurve::with_degree_mode(
            circle.control_points().to_vec(),
            circle.weights().to_vec(),
            DegreeMode::Fixed(2),
        )
        .unwrap();
        let before = curve.clone();

        let four = vec![Vector2::new(0.0, 0.0); 4];
        assert!(matches!(
            curve.set_control_points(four),
            Err(SplineError::InvalidConfiguration(_))
        ));
        assert_eq!(curve, before);

        assert!(matches!(
            curve.set_weights(vec![1.0, -1.0, 1.0]),
            Err(SplineError::PreconditionViolation(_))
        ));
        assert_eq!(curve, before);
        assert_relative_eq!(curve.evaluate(0.5).unwrap(), circle.evaluate(0.5).unwrap());
    }

    #[test]
    fn test_non_positive_weight() {
        let result = RationalBezierCurve::new(
            vec![Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)],
            vec![1.0, -1.0],
        );
        assert!(matches!(result, Err(SplineError::PreconditionViolation(_))));
    }

    #[test]
    fn test_elevate_degree() {
        let curve = quarter_circle();
        let elevated = curve.elevate_degree().unwrap();
        assert_eq!(elevated.degree(), 3);
        for i in 0..10 {
            let t = i as f64 / 9.0;
            assert_relative_eq!(elevated.evaluate(t).unwrap(), curve.evaluate(t).unwrap(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_inverse_evaluate_linear() {
        let curve = RationalBezierCurve::new(
            vec![Vector2::new(0.0, 0.0), Vector2::new(2.0, 0.0)],
            vec![1.0, 3.0],
        )
        .unwrap();
        for &t in &[0.0, 0.2, 0.5, 0.9, 1.0] {
            let q = curve.evaluate(t).unwrap();
            assert_relative_eq!(curve.inverse_evaluate(&q).unwrap(), t, epsilon = 1e-12);
        }
        assert!(matches!(
            quarter_circle().inverse_evaluate(&Vector2::new(1.0, 0.0)),
            Err(SplineError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_write() {
        let curve = RationalBezierCurve::new(
            vec![Vector2::new(0.0, 0.0), Vector2::new(2.0, 0.0)],
            vec![1.0, 0.5],
        )
        .unwrap();
        let mut out = Vec::new();
        curve.write(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "c:\n0 0\n2 0\nw:\n1 0.5\n");
    }
}
