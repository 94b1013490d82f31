//! B-spline curves.

use std::io;

use serde::{Deserialize, Serialize};
use splinekit_core::{Result, SplineError, Tolerance, Validate};
use splinekit_math::ControlPoint;

use super::inverse::piecewise_linear_inverse;
use super::{check_dimension, write_points, write_scalars, Curve, DegreeMode};
use crate::kernel::knot::{derived_degree, domain, validate_knots};
use crate::kernel::{casteljau, deboor, BezierSegment};

/// A B-spline curve defined by a knot vector and control points.
///
/// The degree is `knots.len() - control_points.len() - 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "P: Serialize, P::Scalar: Serialize",
    deserialize = "P: Deserialize<'de>, P::Scalar: Deserialize<'de>"
))]
pub struct BSplineCurve<P: ControlPoint> {
    control_points: Vec<P>,
    knots: Vec<P::Scalar>,
    mode: DegreeMode,
    degree: usize,
}

impl<P: ControlPoint> BSplineCurve<P> {
    pub fn new(control_points: Vec<P>, knots: Vec<P::Scalar>) -> Result<Self> {
        Self::with_degree_mode(control_points, knots, DegreeMode::Dynamic)
    }

    pub fn with_degree_mode(
        control_points: Vec<P>,
        knots: Vec<P::Scalar>,
        mode: DegreeMode,
    ) -> Result<Self> {
        let degree = derived_degree(knots.len(), control_points.len())?;
        let curve = Self {
            control_points,
            knots,
            mode,
            degree,
        };
        curve.validate()?;
        Ok(curve)
    }

    pub fn control_points(&self) -> &[P] {
        &self.control_points
    }

    pub fn knots(&self) -> &[P::Scalar] {
        &self.knots
    }

    pub fn degree_mode(&self) -> DegreeMode {
        self.mode
    }

    /// Replace the control points. The curve is left untouched on error.
    pub fn set_control_points(&mut self, control_points: Vec<P>) -> Result<()> {
        let knots = self.knots.clone();
        Self::with_degree_mode(control_points, knots, self.mode).map(|curve| *self = curve)
    }

    /// Replace the knot vector. The curve is left untouched on error.
    pub fn set_knots(&mut self, knots: Vec<P::Scalar>) -> Result<()> {
        let control_points = self.control_points.clone();
        Self::with_degree_mode(control_points, knots, self.mode).map(|curve| *self = curve)
    }

    /// Insert knot `u` once without changing the curve's shape.
    pub fn insert_knot(&mut self, u: P::Scalar) -> Result<()> {
        let (lower, upper) = self.domain();
        if u < lower || u > upper {
            return Err(SplineError::PreconditionViolation(format!(
                "knot {} lies outside the domain [{}, {}]",
                u, lower, upper
            )));
        }
        let (knots, control_points) =
            deboor::insert_knot(self.degree, &self.knots, &self.control_points, u);
        self.knots = knots;
        self.control_points = control_points;
        Ok(())
    }

    /// Split the curve over its domain into Bézier segments.
    pub fn decompose(&self) -> Vec<BezierSegment<P>> {
        deboor::decompose(
            self.degree,
            &self.knots,
            &self.control_points,
            &Tolerance::default(),
        )
    }

    /// Same curve on its domain with degree raised by one.
    ///
    /// The result is clamped to the same domain. Interior knots get
    /// multiplicity `p + 1`, or `p + 2` where the curve is discontinuous.
    pub fn elevate_degree(&self) -> Result<Self> {
        let p = self.degree;
        let segments = self.decompose();
        let (lower, upper) = self.domain();

        let mut knots = vec![lower; p + 2];
        let mut control_points = Vec::with_capacity((p + 1) * segments.len() + 1);
        let mut previous: Option<&BezierSegment<P>> = None;
        for segment in &segments {
            let elevated = casteljau::elevate(&segment.control_points);
            match previous {
                None => control_points.extend_from_slice(&elevated),
                Some(prev) if prev.last_index == segment.first_index => {
                    knots.extend(std::iter::repeat(segment.t_start).take(p + 1));
                    control_points.extend_from_slice(&elevated[1..]);
                }
                Some(_) => {
                    knots.extend(std::iter::repeat(segment.t_start).take(p + 2));
                    control_points.extend_from_slice(&elevated);
                }
            }
            previous = Some(segment);
        }
        knots.extend(std::iter::repeat(upper).take(p + 2));

        log::debug!(
            "elevated B-spline from degree {} with {} control points to {} control points",
            p,
            self.control_points.len(),
            control_points.len()
        );
        Self::with_degree_mode(control_points, knots, self.mode.elevated())
    }
}

impl<P: ControlPoint> Validate for BSplineCurve<P> {
    fn validate(&self) -> Result<()> {
        check_dimension::<P>()?;
        validate_knots(self.degree, &self.knots, self.control_points.len())?;
        self.mode.resolve(self.degree)?;
        Ok(())
    }
}

impl<P: ControlPoint> Curve<P> for BSplineCurve<P> {
    fn evaluate(&self, t: P::Scalar) -> Result<P> {
        Ok(deboor::evaluate(self.degree, &self.knots, &self.control_points, t))
    }

    fn evaluate_derivative(&self, t: P::Scalar) -> Result<P> {
        Ok(deboor::evaluate_derivative(
            self.degree,
            &self.knots,
            &self.control_points,
            t,
        ))
    }

    fn evaluate_2nd_derivative(&self, t: P::Scalar) -> Result<P> {
        Ok(deboor::evaluate_2nd_derivative(
            self.degree,
            &self.knots,
            &self.control_points,
            t,
        ))
    }

    fn inverse_evaluate(&self, point: &P) -> Result<P::Scalar> {
        piecewise_linear_inverse(self.degree, &self.knots, &self.control_points, None, point)
    }

    fn domain(&self) -> (P::Scalar, P::Scalar) {
        domain(self.degree, &self.knots)
    }

    fn degree(&self) -> usize {
        self.degree
    }

    fn write(&self, sink: &mut dyn io::Write) -> Result<()> {
        write_points(sink, "c", &self.control_points)?;
        write_scalars(sink, "k", &self.knots)
    }
}
