//! Tensor-product Bézier patches.

use std::io;

use serde::{Deserialize, Serialize};
use splinekit_core::{Result, Validate};
use splinekit_math::prelude::*;
use splinekit_math::ControlPoint;

use super::{check_degrees, check_grid, grid_column, Patch};
use crate::curve::{write_points, BezierCurve, Curve};
use crate::kernel::casteljau;

/// A Bézier patch over `[0, 1] x [0, 1]` with a
/// `(degree_u + 1) x (degree_v + 1)` control grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BezierPatch<P: ControlPoint> {
    degree_u: usize,
    degree_v: usize,
    control_points: Vec<P>,
}

impl<P: ControlPoint> BezierPatch<P> {
    pub fn new(degree_u: usize, degree_v: usize, control_points: Vec<P>) -> Result<Self> {
        let patch = Self {
            degree_u,
            degree_v,
            control_points,
        };
        patch.validate()?;
        Ok(patch)
    }

    pub fn control_points(&self) -> &[P] {
        &self.control_points
    }

    /// Replace the control grid. The patch is left untouched on error.
    pub fn set_control_points(&mut self, control_points: Vec<P>) -> Result<()> {
        Self::new(self.degree_u, self.degree_v, control_points).map(|patch| *self = patch)
    }

    /// The curve in u obtained by fixing `v`.
    pub fn compute_iso_curve_u(&self, v: P::Scalar) -> Result<BezierCurve<P>> {
        let points = self
            .control_points
            .chunks(self.degree_v + 1)
            .map(|row| casteljau::evaluate(row, v))
            .collect();
        BezierCurve::new(points)
    }

    /// The curve in v obtained by fixing `u`.
    pub fn compute_iso_curve_v(&self, u: P::Scalar) -> Result<BezierCurve<P>> {
        let count_v = self.degree_v + 1;
        let points = (0..count_v)
            .map(|j| casteljau::evaluate(&grid_column(&self.control_points, j, count_v), u))
            .collect();
        BezierCurve::new(points)
    }
}

impl<P: ControlPoint> Validate for BezierPatch<P> {
    fn validate(&self) -> Result<()> {
        crate::curve::check_dimension::<P>()?;
        check_degrees(self.degree_u, self.degree_v)?;
        check_grid(
            self.control_points.len(),
            self.degree_u + 1,
            self.degree_v + 1,
        )
    }
}

impl<P: ControlPoint> Patch<P> for BezierPatch<P> {
    fn evaluate(&self, u: P::Scalar, v: P::Scalar) -> Result<P> {
        let column: Vec<P> = self
            .control_points
            .chunks(self.degree_v + 1)
            .map(|row| casteljau::evaluate(row, v))
            .collect();
        Ok(casteljau::evaluate(&column, u))
    }

    fn evaluate_derivative_u(&self, u: P::Scalar, v: P::Scalar) -> Result<P> {
        self.compute_iso_curve_u(v)?.evaluate_derivative(u)
    }

    fn evaluate_derivative_v(&self, u: P::Scalar, v: P::Scalar) -> Result<P> {
        self.compute_iso_curve_v(u)?.evaluate_derivative(v)
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
        write_points(sink, "c", &self.control_points)
    }
}
