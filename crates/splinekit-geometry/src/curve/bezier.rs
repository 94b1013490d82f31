//! Polynomial Bézier curves.

use std::io;

use serde::{Deserialize, Serialize};
use splinekit_core::{Result, SplineError, Validate};
use splinekit_math::prelude::*;
use splinekit_math::ControlPoint;

use super::inverse::{segment_parameter, unsupported_inverse};
use super::{check_dimension, write_points, Curve, DegreeMode};
use crate::kernel::casteljau;

/// A Bézier curve of degree `n` defined by `n + 1` control points over `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BezierCurve<P: ControlPoint> {
    control_points: Vec<P>,
    mode: DegreeMode,
}

impl<P: ControlPoint> BezierCurve<P> {
    /// Curve whose degree follows the number of control points.
    pub fn new(control_points: Vec<P>) -> Result<Self> {
        Self::with_degree_mode(control_points, DegreeMode::Dynamic)
    }

    pub fn with_degree_mode(control_points: Vec<P>, mode: DegreeMode) -> Result<Self> {
        let curve = Self {
            control_points,
            mode,
        };
        curve.validate()?;
        Ok(curve)
    }

    pub fn control_points(&self) -> &[P] {
        &self.control_points
    }

    pub fn degree_mode(&self) -> DegreeMode {
        self.mode
    }

    /// Replace the control points. The curve is left untouched on error.
    pub fn set_control_points(&mut self, control_points: Vec<P>) -> Result<()> {
        Self::with_degree_mode(control_points, self.mode).map(|curve| *self = curve)
    }

    /// Same curve represented with one more control point.
    pub fn elevate_degree(&self) -> Self {
        log::debug!("elevating Bezier curve from degree {}", self.degree());
        Self {
            control_points: casteljau::elevate(&self.control_points),
            mode: self.mode.elevated(),
        }
    }

    /// Subdivide at `t` into the pieces over `[0, t]` and `[t, 1]`, each
    /// reparameterized to `[0, 1]`.
    pub fn split(&self, t: P::Scalar) -> (Self, Self) {
        let (left, right) = casteljau::split(&self.control_points, t);
        (
            Self {
                control_points: left,
                mode: self.mode,
            },
            Self {
                control_points: right,
                mode: self.mode,
            },
        )
    }
}

impl<P: ControlPoint> Validate for BezierCurve<P> {
    fn validate(&self) -> Result<()> {
        check_dimension::<P>()?;
        if self.control_points.is_empty() {
            return Err(SplineError::InvalidConfiguration(
                "a Bezier curve needs at least one control point".into(),
            ));
        }
        self.mode.resolve(self.control_points.len() - 1)?;
        Ok(())
    }
}

impl<P: ControlPoint> Curve<P> for BezierCurve<P> {
    fn evaluate(&self, t: P::Scalar) -> Result<P> {
        Ok(casteljau::evaluate(&self.control_points, t))
    }

    fn evaluate_derivative(&self, t: P::Scalar) -> Result<P> {
        Ok(casteljau::evaluate_derivative(&self.control_points, t))
    }

    fn evaluate_2nd_derivative(&self, t: P::Scalar) -> Result<P> {
        Ok(casteljau::evaluate_2nd_derivative(&self.control_points, t))
    }

    fn inverse_evaluate(&self, point: &P) -> Result<P::Scalar> {
        match self.control_points.as_slice() {
            [_] => Ok(P::Scalar::zero()),
            [a, b] => Ok(segment_parameter(a, b, point)),
            _ => Err(unsupported_inverse(self.degree())),
        }
    }

    fn domain(&self) -> (P::Scalar, P::Scalar) {
        (P::Scalar::zero(), P::Scalar::one())
    }

    fn degree(&self) -> usize {
        self.control_points.len() - 1
    }

    fn write(&self, sink: &mut dyn io::Write) -> Result<()> {
        write_points(sink, "c", &self.control_points)
    }
}
