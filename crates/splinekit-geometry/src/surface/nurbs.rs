//! NURBS patches.

use std::io;

use serde::{Deserialize, Serialize};
use splinekit_core::{Result, SplineError, Validate};
use splinekit_math::homogeneous::lift;
use splinekit_math::{quotient_derivative, ControlPoint, Homogeneous};

use super::{check_degrees, BSplinePatch, Patch};
use crate::curve::{check_dimension, check_weights, write_points, write_scalars, NurbsCurve};
use crate::kernel::knot::domain;

/// A NURBS patch: a B-spline control grid with one positive weight per point.
///
/// Evaluation goes through a homogeneous [`BSplinePatch`] in one extra
/// dimension, built by [`NurbsPatch::initialize`]. Setters drop it; until the
/// next `initialize` every evaluation fails with [`SplineError::NotInitialized`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "P: Serialize, P::Scalar: Serialize",
    deserialize = "P: Deserialize<'de>, P::Scalar: Deserialize<'de>"
))]
pub struct NurbsPatch<P: ControlPoint> {
    degree_u: usize,
    degree_v: usize,
    knots_u: Vec<P::Scalar>,
    knots_v: Vec<P::Scalar>,
    control_points: Vec<P>,
    weights: Vec<P::Scalar>,
    #[serde(skip)]
    homogeneous: Option<BSplinePatch<Homogeneous<P>>>,
}

impl<P: ControlPoint> NurbsPatch<P> {
    /// Uninitialized patch; call [`initialize`](Self::initialize) before evaluating.
    pub fn new(
        degree_u: usize,
        degree_v: usize,
        knots_u: Vec<P::Scalar>,
        knots_v: Vec<P::Scalar>,
        control_points: Vec<P>,
        weights: Vec<P::Scalar>,
    ) -> Result<Self> {
        check_dimension::<P>()?;
        check_degrees(degree_u, degree_v)?;
        Ok(Self {
            degree_u,
            degree_v,
            knots_u,
            knots_v,
            control_points,
            weights,
            homogeneous: None,
        })
    }

    /// Weight-scale every grid point, append the weights as an extra
    /// coordinate and carry both knot vectors over to the homogeneous patch.
    pub fn initialize(&mut self) -> Result<()> {
        self.homogeneous = None;
        self.validate()?;
        let lifted = lift(&self.control_points, &self.weights);
        self.homogeneous = Some(BSplinePatch::new(
            self.degree_u,
            self.degree_v,
            self.knots_u.clone(),
            self.knots_v.clone(),
            lifted,
        )?);
        log::debug!(
            "built homogeneous cache for NURBS patch with {} control points",
            self.control_points.len()
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

    pub fn knots_u(&self) -> &[P::Scalar] {
        &self.knots_u
    }

    pub fn knots_v(&self) -> &[P::Scalar] {
        &self.knots_v
    }

    pub fn set_control_points(&mut self, control_points: Vec<P>) {
        self.control_points = control_points;
        self.homogeneous = None;
    }

    pub fn set_weights(&mut self, weights: Vec<P::Scalar>) {
        self.weights = weights;
        self.homogeneous = None;
    }

    pub fn set_knots_u(&mut self, knots_u: Vec<P::Scalar>) {
        self.knots_u = knots_u;
        self.homogeneous = None;
    }

    pub fn set_knots_v(&mut self, knots_v: Vec<P::Scalar>) {
        self.knots_v = knots_v;
        self.homogeneous = None;
    }

    /// The cached homogeneous patch, checked against the current grid and weights.
    pub fn homogeneous(&self) -> Result<&BSplinePatch<Homogeneous<P>>> {
        let h = self.homogeneous.as_ref().ok_or_else(|| {
            SplineError::NotInitialized("NURBS patch must be initialized before use".into())
        })?;
        let cached = h.control_points().len();
        if cached != self.control_points.len() || cached != self.weights.len() {
            return Err(SplineError::NotInitialized(format!(
                "homogeneous grid has {} points but the patch has {} control points and {} weights",
                cached,
                self.control_points.len(),
                self.weights.len()
            )));
        }
        Ok(h)
    }

    /// The NURBS curve in u (degree `degree_u`) obtained by fixing `v`.
    pub fn compute_iso_curve_u(&self, v: P::Scalar) -> Result<NurbsCurve<P>> {
        NurbsCurve::from_homogeneous(self.homogeneous()?.compute_iso_curve_u(v)?)
    }

    /// The NURBS curve in v (degree `degree_v`) obtained by fixing `u`.
    pub fn compute_iso_curve_v(&self, u: P::Scalar) -> Result<NurbsCurve<P>> {
        NurbsCurve::from_homogeneous(self.homogeneous()?.compute_iso_curve_v(u)?)
    }
}

impl<P: ControlPoint> Validate for NurbsPatch<P> {
    fn validate(&self) -> Result<()> {
        check_dimension::<P>()?;
        check_degrees(self.degree_u, self.degree_v)?;
        check_weights(&self.weights, self.control_points.len())
    }
}

impl<P: ControlPoint> Patch<P> for NurbsPatch<P> {
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
        domain(self.degree_u, &self.knots_u)
    }

    fn domain_v(&self) -> (P::Scalar, P::Scalar) {
        domain(self.degree_v, &self.knots_v)
    }

    fn degree_u(&self) -> usize {
        self.degree_u
    }

    fn degree_v(&self) -> usize {
        self.degree_v
    }

    fn write(&self, sink: &mut dyn io::Write) -> Result<()> {
        write_points(sink, "c", &self.control_points)?;
        write_scalars(sink, "w", &self.weights)?;
        write_scalars(sink, "ku", &self.knots_u)?;
        write_scalars(sink, "kv", &self.knots_v)
    }
}
