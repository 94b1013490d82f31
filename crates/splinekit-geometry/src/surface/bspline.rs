//! Tensor-product B-spline patches.

use std::io;

use serde::{Deserialize, Serialize};
use splinekit_core::{Result, SplineError, Validate};
use splinekit_math::ControlPoint;

use super::{check_degrees, check_grid, grid_column, Patch};
use crate::curve::{check_dimension, write_points, write_scalars, BSplineCurve, Curve};
use crate::kernel::deboor;
use crate::kernel::knot::{domain, find_span, validate_knots};

/// A B-spline patch defined by degrees, knot vectors, and a row-major control grid.
///
/// The grid has `knots_u.len() - degree_u - 1` rows (u-direction) and
/// `knots_v.len() - degree_v - 1` columns (v-direction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "P: Serialize, P::Scalar: Serialize",
    deserialize = "P: Deserialize<'de>, P::Scalar: Deserialize<'de>"
))]
pub struct BSplinePatch<P: ControlPoint> {
    degree_u: usize,
    degree_v: usize,
    knots_u: Vec<P::Scalar>,
    knots_v: Vec<P::Scalar>,
    control_points: Vec<P>,
}

impl<P: ControlPoint> BSplinePatch<P> {
    pub fn new(
        degree_u: usize,
        degree_v: usize,
        knots_u: Vec<P::Scalar>,
        knots_v: Vec<P::Scalar>,
        control_points: Vec<P>,
    ) -> Result<Self> {
        let patch = Self {
            degree_u,
            degree_v,
            knots_u,
            knots_v,
            control_points,
        };
        patch.validate()?;
        Ok(patch)
    }

    pub fn control_points(&self) -> &[P] {
        &self.control_points
    }

    pub fn knots_u(&self) -> &[P::Scalar] {
        &self.knots_u
    }

    pub fn knots_v(&self) -> &[P::Scalar] {
        &self.knots_v
    }

    /// Number of control point rows.
    pub fn count_u(&self) -> usize {
        self.knots_u.len().saturating_sub(self.degree_u + 1)
    }

    /// Number of control point columns.
    pub fn count_v(&self) -> usize {
        self.knots_v.len().saturating_sub(self.degree_v + 1)
    }

    /// Replace the control grid. The patch is left untouched on error.
    pub fn set_control_points(&mut self, control_points: Vec<P>) -> Result<()> {
        let mut patch = self.clone();
        patch.control_points = control_points;
        patch.validate()?;
        *self = patch;
        Ok(())
    }

    /// Replace the u knot vector. The patch is left untouched on error.
    pub fn set_knots_u(&mut self, knots_u: Vec<P::Scalar>) -> Result<()> {
        let mut patch = self.clone();
        patch.knots_u = knots_u;
        patch.validate()?;
        *self = patch;
        Ok(())
    }

    /// Replace the v knot vector. The patch is left untouched on error.
    pub fn set_knots_v(&mut self, knots_v: Vec<P::Scalar>) -> Result<()> {
        let mut patch = self.clone();
        patch.knots_v = knots_v;
        patch.validate()?;
        *self = patch;
        Ok(())
    }

    /// The curve in u obtained by fixing `v`.
    pub fn compute_iso_curve_u(&self, v: P::Scalar) -> Result<BSplineCurve<P>> {
        let points = self
            .control_points
            .chunks(self.count_v())
            .map(|row| deboor::evaluate(self.degree_v, &self.knots_v, row, v))
            .collect();
        BSplineCurve::new(points, self.knots_u.clone())
    }

    /// The curve in v obtained by fixing `u`.
    pub fn compute_iso_curve_v(&self, u: P::Scalar) -> Result<BSplineCurve<P>> {
        let count_v = self.count_v();
        let points = (0..count_v)
            .map(|j| {
                let column = grid_column(&self.control_points, j, count_v);
                deboor::evaluate(self.degree_u, &self.knots_u, &column, u)
            })
            .collect();
        BSplineCurve::new(points, self.knots_v.clone())
    }
}

impl<P: ControlPoint> Validate for BSplinePatch<P> {
    fn validate(&self) -> Result<()> {
        check_dimension::<P>()?;
        check_degrees(self.degree_u, self.degree_v)?;
        let (count_u, count_v) = (self.count_u(), self.count_v());
        if count_u == 0 || count_v == 0 {
            return Err(SplineError::InvalidConfiguration(format!(
                "knot vectors of length {} and {} leave no control points for degrees ({}, {})",
                self.knots_u.len(),
                self.knots_v.len(),
                self.degree_u,
                self.degree_v
            )));
        }
        validate_knots(self.degree_u, &self.knots_u, count_u)?;
        validate_knots(self.degree_v, &self.knots_v, count_v)?;
        check_grid(self.control_points.len(), count_u, count_v)
    }
}

impl<P: ControlPoint> Patch<P> for BSplinePatch<P> {
    fn evaluate(&self, u: P::Scalar, v: P::Scalar) -> Result<P> {
        let (p, count_v) = (self.degree_u, self.count_v());
        let span = find_span(p, &self.knots_u, self.count_u() - 1, u);
        let mut local: Vec<P> = (span - p..=span)
            .map(|i| {
                let row = &self.control_points[i * count_v..(i + 1) * count_v];
                deboor::evaluate(self.degree_v, &self.knots_v, row, v)
            })
            .collect();
        Ok(deboor::blend(p, &self.knots_u, span, &mut local, u))
    }

    fn evaluate_derivative_u(&self, u: P::Scalar, v: P::Scalar) -> Result<P> {
        self.compute_iso_curve_u(v)?.evaluate_derivative(u)
    }

    fn evaluate_derivative_v(&self, u: P::Scalar, v: P::Scalar) -> Result<P> {
        self.compute_iso_curve_v(u)?.evaluate_derivative(v)
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
        write_scalars(sink, "ku", &self.knots_u)?;
        write_scalars(sink, "kv", &self.knots_v)
    }
}
