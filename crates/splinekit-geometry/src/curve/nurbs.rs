//! NURBS curves evaluated through their homogeneous B-spline.

use std::io;

use serde::{Deserialize, Serialize};
use splinekit_core::{Result, SplineError, Validate};
use splinekit_math::homogeneous::{lift, unlift};
use splinekit_math::{quotient_derivative, quotient_second_derivative, ControlPoint, Homogeneous};

use super::inverse::piecewise_linear_inverse;
use super::{
    check_dimension, check_weights, write_points, write_scalars, BSplineCurve, Curve, DegreeMode,
};
use crate::kernel::knot::{derived_degree, domain, validate_knots};
use crate::kernel::BezierSegment;

/// A NURBS (Non-Uniform Rational B-Spline) curve.
///
/// Extends [`BSplineCurve`] with weights. The homogeneous B-spline is cached
/// and kept in sync by the setters while point and weight counts agree; with
/// mismatched counts the cache is dropped and evaluation fails with
/// [`SplineError::NotInitialized`]. Deserialized curves need
/// [`NurbsCurve::initialize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "P: Serialize, P::Scalar: Serialize",
    deserialize = "P: Deserialize<'de>, P::Scalar: Deserialize<'de>"
))]
pub struct NurbsCurve<P: ControlPoint> {
    control_points: Vec<P>,
    knots: Vec<P::Scalar>,
    weights: Vec<P::Scalar>,
    mode: DegreeMode,
    #[serde(skip)]
    homogeneous: Option<BSplineCurve<Homogeneous<P>>>,
}

impl<P: ControlPoint> NurbsCurve<P> {
    pub fn new(control_points: Vec<P>, knots: Vec<P::Scalar>, weights: Vec<P::Scalar>) -> Result<Self> {
        Self::with_degree_mode(control_points, knots, weights, DegreeMode::Dynamic)
    }

    pub fn with_degree_mode(
        control_points: Vec<P>,
        knots: Vec<P::Scalar>,
        weights: Vec<P::Scalar>,
        mode: DegreeMode,
    ) -> Result<Self> {
        let mut curve = Self {
            control_points,
            knots,
            weights,
            mode,
            homogeneous: None,
        };
        curve.initialize()?;
        Ok(curve)
    }

    /// Build from a homogeneous B-spline, recovering points and weights.
    pub fn from_homogeneous(homogeneous: BSplineCurve<Homogeneous<P>>) -> Result<Self> {
        let (control_points, weights) = unlift(homogeneous.control_points());
        check_weights(&weights, control_points.len())?;
        Ok(Self {
            control_points,
            knots: homogeneous.knots().to_vec(),
            weights,
            mode: homogeneous.degree_mode(),
            homogeneous: Some(homogeneous),
        })
    }

    /// Rebuild the homogeneous cache from the current points, weights and knots.
    pub fn initialize(&mut self) -> Result<()> {
        self.homogeneous = None;
        self.validate()?;
        let lifted = lift(&self.control_points, &self.weights);
        self.homogeneous = Some(BSplineCurve::with_degree_mode(
            lifted,
            self.knots.clone(),
            self.mode,
        )?);
        log::debug!(
            "built homogeneous cache for NURBS curve with {} control points",
            self.control_points.len()
        );
        Ok(())
    }

    pub fn control_points(&self) -> &[P] {
        &self.control_points
    }

    pub fn knots(&self) -> &[P::Scalar] {
        &self.knots
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
        self.adopt(control_points, self.knots.clone(), self.weights.clone())
    }

    /// Replace the weights. The curve is left untouched on error.
    pub fn set_weights(&mut self, weights: Vec<P::Scalar>) -> Result<()> {
        self.adopt(self.control_points.clone(), self.knots.clone(), weights)
    }

    /// Replace the knot vector. The curve is left untouched on error.
    pub fn set_knots(&mut self, knots: Vec<P::Scalar>) -> Result<()> {
        self.adopt(self.control_points.clone(), knots, self.weights.clone())
    }

    /// The cached homogeneous B-spline.
    pub fn homogeneous(&self) -> Result<&BSplineCurve<Homogeneous<P>>> {
        match &self.homogeneous {
            Some(h)
                if h.control_points().len() == self.control_points.len()
                    && h.control_points().len() == self.weights.len() =>
            {
                Ok(h)
            }
            _ => Err(SplineError::NotInitialized(
                "NURBS curve has no homogeneous representation".into(),
            )),
        }
    }

    /// Insert knot `u` once; points and weights are re-derived from the
    /// refined homogeneous curve.
    pub fn insert_knot(&mut self, u: P::Scalar) -> Result<()> {
        let mut refined = self.homogeneous()?.clone();
        refined.insert_knot(u)?;
        *self = Self::from_homogeneous(refined)?;
        Ok(())
    }

    /// Homogeneous Bézier segments over the domain.
    pub fn decompose(&self) -> Result<Vec<BezierSegment<Homogeneous<P>>>> {
        Ok(self.homogeneous()?.decompose())
    }

    /// Same curve on its domain with degree raised by one.
    pub fn elevate_degree(&self) -> Result<Self> {
        Self::from_homogeneous(self.homogeneous()?.elevate_degree()?)
    }

    /// Swap in new data once it validates; mismatched counts only drop the cache.
    fn adopt(
        &mut self,
        control_points: Vec<P>,
        knots: Vec<P::Scalar>,
        weights: Vec<P::Scalar>,
    ) -> Result<()> {
        let mut candidate = Self {
            control_points,
            knots,
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

    fn current_degree(&self) -> Result<usize> {
        derived_degree(self.knots.len(), self.control_points.len())
    }
}

impl<P: ControlPoint> Validate for NurbsCurve<P> {
    fn validate(&self) -> Result<()> {
        check_dimension::<P>()?;
        let degree = self.current_degree()?;
        validate_knots(degree, &self.knots, self.control_points.len())?;
        check_weights(&self.weights, self.control_points.len())?;
        self.mode.resolve(degree)?;
        Ok(())
    }
}

impl<P: ControlPoint> Curve<P> for NurbsCurve<P> {
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
        let degree = self.homogeneous()?.degree();
        piecewise_linear_inverse(
            degree,
            &self.knots,
            &self.control_points,
            Some(&self.weights),
            point,
        )
    }

    fn domain(&self) -> (P::Scalar, P::Scalar) {
        domain(self.degree(), &self.knots)
    }

    fn degree(&self) -> usize {
        self.current_degree().unwrap_or(0)
    }

    fn write(&self, sink: &mut dyn io::Write) -> Result<()> {
        write_points(sink, "c", &self.control_points)?;
        write_scalars(sink, "w", &self.weights)?;
        write_scalars(sink, "k", &self.knots)
    }
}
