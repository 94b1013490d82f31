//! Rational Bézier patches.

use std::io;

use serde::{Deserialize, Serialize};
use splinekit_core::{Result, SplineError, Validate};
use splinekit_math::homogeneous::lift;
use splinekit_math::prelude::*;
use splinekit_math::{quotient_derivative, ControlPoint, Homogeneous};

use super::{check_degrees, check_grid, BezierPatch, Patch};
use crate::curve::{check_dimension, check_weights, write_points, write_scalars, RationalBezierCurve};

/// A rational Bézier patch over `[0, 1] x [0, 1]`.
///
/// The homogeneous patch is built by [`RationalBezierPatch::initialize`].
/// Every setter drops it, and evaluation without it fails with
/// [`SplineError::NotInitialized`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "P: Serialize, P::Scalar: Serialize",
    deserialize = "P: Deserialize<'de>, P::Scalar: Deserialize<'de>"
))]
pub struct RationalBezierPatch<P: ControlPoint> {
    degree_u: usize,
    degree_v: usize,
    control_points: Vec<P>,
    weights: Vec<P::Scalar>,
    #[serde(skip)]
    homogeneous: Option<BezierPatch<Homogeneous<P>>>,
}

impl<P: ControlPoint> RationalBezierPatch<P> {
    /// Uninitialized patch; call [`initialize`](Self::initialize) before evaluating.
    pub fn new(
        degree_u: usize,
        degree_v: usize,
        control_points: Vec<P>,
        weights: Vec<P::Scalar>,
    ) -> Result<Self> {
        check_dimension::<P>()?;
        check_degrees(degree_u, degree_v)?;
        Ok(Self {
            degree_u,
            degree_v,
            control_points,
            weights,
            homogeneous: None,
        })
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.homogeneous = None;
        self.validate()?;
        let lifted = lift(&self.control_points, &self.weights);
        self.homogeneous = Some(BezierPatch::new(self.degree_u, self.degree_v, lifted)?);
        log::debug!(
            "built homogeneous cache for rational Bezier patch of degree ({}, {})",
            self.degree_u,
            self.degree_v
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.homogeneous().is_ok()
    }

    pub fn control_points(&self) -> &[P] {
        &self.control_points
    }

    pub fn weights(&self) -> &[P::Scalar] {
        &self.weights
    }

    pub fn set_control_points(&mut self, control_points: Vec<P>) {
        self.control_points = control_points;
        self.homogeneous = None;
    }

    pub fn set_weights(&mut self, weights: Vec<P::Scalar>) {
        self.weights = weights;
        self.homogeneous = None;
    }

    /// The cached homogeneous patch.
    pub fn homogeneous(&self) -> Result<&BezierPatch<Homogeneous<P>>> {
        match &self.homogeneous {
            Some(h)
                if h.control_points().len() == self.control_points.len()
                    && h.control_points().len() == self.weights.len() =>
            {
                Ok(h)
            }
            _ => Err(SplineError::NotInitialized(
                "rational Bezier patch must be initialized before use".into(),
            )),
        }
    }

    /// The rational curve in u obtained by fixing `v`.
    pub fn compute_iso_curve_u(&self, v: P::Scalar) -> Result<RationalBezierCurve<P>> {
        RationalBezierCurve::from_homogeneous(self.homogeneous()?.compute_iso_curve_u(v)?)
    }

    /// The rational curve in v obtained by fixing `u`.
    pub fn compute_iso_curve_v(&self, u: P::Scalar) -> Result<RationalBezierCurve<P>> {
        RationalBezierCurve::from_homogeneous(self.homogeneous()?.compute_iso_curve_v(u)?)
    }
}

impl<P: ControlPoint> Validate for RationalBezierPatch<P> {
    fn validate(&self) -> Result<()> {
        check_dimension::<P>()?;
        check_degrees(self.degree_u, self.degree_v)?;
        check_grid(
            self.control_points.len(),
            self.degree_u + 1,
            self.degree_v + 1,
        )?;
        check_weights(&self.weights, self.control_points.len())
    }
}

impl<P: ControlPoint> Patch<P> for RationalBezierPatch<P> {
    fn evaluate(&self, u: P::Scalar, v: P::Scalar) -> Result<P> {
        Ok(self.homogeneous()?.evaluate(u, v)?.project())
    }

    fn evaluate_derivative_u(&self, u: P::Scalar, v: P::Scalar) -> Result<P> {
        let h = self.homogeneous()?;
        Ok(quotient_derivative(
            &h.evaluate(u, v)?,
            &h.evaluate_derivative_u(u, v)?,
        ))
    }

    fn evaluate_derivative_v(&self, u: P::Scalar, v: P::Scalar) -> Result<P> {
        let h = self.homogeneous()?;
        Ok(quotient_derivative(
            &h.evaluate(u, v)?,
            &h.evaluate_derivative_v(u, v)?,
        ))
    }

    fn domain_u(&self) -> (P::Scalar, P::Scalar) {
        (P::Scalar::zero(), P::Scalar::one())
    }

    fn domain_v(&self) -> (P::Scalar, P::Scalar) {
        (P::Scalar::zero(), P::Scalar::one())
    }

    fn degree_u(&self) -> usize {
        self.degree_u
    }

    fn degree_v(&self) -> usize {
        self.degree_v
    }

    fn write(&self, sink: &mut dyn io::Write) -> Result<()> {
        write_points(sink, "c", &self.control_points)?;
        write_scalars(sink, "w", &self.weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Curve;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use std::f64::consts::FRAC_1_SQRT_2;

    /// Quarter cylinder of radius 1: circular arc in u, straight in v.
    fn quarter_cylinder() -> RationalBezierPatch<Vector3<f64>> {
        let arc = [(1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        let arc_weights = [1.0, FRAC_1_SQRT_2, 1.0];
        let mut points = Vec::new();
        let mut weights = Vec::new();
        for (i, &(x, y)) in arc.iter().enumerate() {
            for z in [0.0, 2.0] {
                points.push(Vector3::new(x, y, z));
                weights.push(arc_weights[i]);
            }
        }
        let mut patch = RationalBezierPatch::new(2, 1, points, weights).unwrap();
        patch.initialize().unwrap();
        patch
    }

    #[test]
    fn test_not_initialized() {
        let patch = RationalBezierPatch::new(1, 1, vec![Vector3::zeros(); 4], vec![1.0; 4]).unwrap();
        assert!(matches!(patch.evaluate(0.5, 0.5), Err(SplineError::NotInitialized(_))));
        assert!(matches!(
            patch.evaluate_derivative_u(0.5, 0.5),
            Err(SplineError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_cylinder_radius() {
        let patch = quarter_cylinder();
        for i in 0..=8 {
            for j in 0..=4 {
                let (u, v) = (i as f64 / 8.0, j as f64 / 4.0);
                let p = patch.evaluate(u, v).unwrap();
                assert_relative_eq!((p.x * p.x + p.y * p.y).sqrt(), 1.0, epsilon = 1e-12);
                assert_relative_eq!(p.z, 2.0 * v, epsilon = 1e-12);
                let dv = patch.evaluate_derivative_v(u, v).unwrap();
                assert_relative_eq!(dv, Vector3::new(0.0, 0.0, 2.0), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_setter_invalidates() {
        let mut patch = quarter_cylinder();
        patch.set_weights(vec![1.0; 6]);
        assert!(!patch.is_initialized());
        assert!(matches!(patch.evaluate(0.5, 0.5), Err(SplineError::NotInitialized(_))));
        patch.initialize().unwrap();
        assert!(patch.evaluate(0.5, 0.5).is_ok());
    }

    #[test]
    fn test_iso_curve_matches_patch() {
        let patch = quarter_cylinder();
        let iso = patch.compute_iso_curve_u(0.25).unwrap();
        for i in 0..=10 {
            let u = i as f64 / 10.0;
            assert_relative_eq!(iso.evaluate(u).unwrap(), patch.evaluate(u, 0.25).unwrap(), epsilon = 1e-12);
            assert_relative_eq!(
                iso.evaluate_derivative(u).unwrap(),
                patch.evaluate_derivative_u(u, 0.25).unwrap(),
                epsilon = 1e-12
            );
        }
    }
}
