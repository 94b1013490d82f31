//! Curve traits and implementations.

mod bezier;
mod bspline;
mod inverse;
mod nurbs;
mod rational_bezier;

use std::io;

use serde::{Deserialize, Serialize};
use splinekit_core::{Result, SplineError};
use splinekit_math::prelude::*;
use splinekit_math::{ControlPoint, Real};

pub use bezier::BezierCurve;
pub use bspline::BSplineCurve;
pub use inverse::closest_sample_search;
pub use nurbs::NurbsCurve;
pub use rational_bezier::RationalBezierCurve;

/// Refinement passes used by callers that have no better choice for
/// [`Curve::approximate_inverse_evaluate`].
pub const DEFAULT_INVERSE_LEVEL: usize = 3;

/// How the degree of a curve or patch is determined.
///
/// Both modes run the same numeric code. `Fixed` only adds a check that the
/// control data matches the expected degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DegreeMode {
    Fixed(usize),
    Dynamic,
}

impl DegreeMode {
    /// Check `derived` (the degree implied by the data) against this mode.
    pub fn resolve(self, derived: usize) -> Result<usize> {
        match self {
            DegreeMode::Fixed(expected) if expected != derived => {
                Err(SplineError::InvalidConfiguration(format!(
                    "fixed degree {} does not match degree {} implied by the control data",
                    expected, derived
                )))
            }
            _ => Ok(derived),
        }
    }

    /// Mode after one degree elevation.
    pub fn elevated(self) -> Self {
        match self {
            DegreeMode::Fixed(n) => DegreeMode::Fixed(n + 1),
            DegreeMode::Dynamic => DegreeMode::Dynamic,
        }
    }
}

impl Default for DegreeMode {
    fn default() -> Self {
        DegreeMode::Dynamic
    }
}

/// Trait for parametric curves over a closed parameter interval.
///
/// Evaluation outside the domain extrapolates the underlying basis.
pub trait Curve<P: ControlPoint>: Send + Sync {
    /// Evaluate the curve at parameter `t`.
    fn evaluate(&self, t: P::Scalar) -> Result<P>;

    /// First derivative with respect to `t`.
    fn evaluate_derivative(&self, t: P::Scalar) -> Result<P>;

    /// Second derivative with respect to `t`.
    fn evaluate_2nd_derivative(&self, t: P::Scalar) -> Result<P>;

    /// Exact parameter of `point`.
    ///
    /// Only curves of degree 0 or 1 have a closed form; everything else
    /// fails with [`SplineError::UnsupportedOperation`].
    fn inverse_evaluate(&self, point: &P) -> Result<P::Scalar>;

    /// Parameter in `[lower, upper]` whose curve point is closest to `point`,
    /// refined `level` times by resampling around the best sample.
    fn approximate_inverse_evaluate(
        &self,
        point: &P,
        lower: P::Scalar,
        upper: P::Scalar,
        level: usize,
    ) -> Result<P::Scalar> {
        let samples = 2 * (self.degree() + 1);
        closest_sample_search(|t| self.evaluate(t), point, lower, upper, samples, level)
    }

    /// Return the parameter domain `(t_min, t_max)`.
    fn domain(&self) -> (P::Scalar, P::Scalar);

    fn domain_lower_bound(&self) -> P::Scalar {
        self.domain().0
    }

    fn domain_upper_bound(&self) -> P::Scalar {
        self.domain().1
    }

    fn degree(&self) -> usize;

    /// Dump the control data as text.
    fn write(&self, sink: &mut dyn io::Write) -> Result<()>;
}

pub(crate) fn check_dimension<P: ControlPoint>() -> Result<()> {
    if P::DIM == 0 {
        return Err(SplineError::InvalidConfiguration(
            "control points must have at least one coordinate".into(),
        ));
    }
    Ok(())
}

pub(crate) fn check_weights<T: Real>(weights: &[T], count: usize) -> Result<()> {
    if weights.len() != count {
        return Err(SplineError::InvalidConfiguration(format!(
            "{} weights for {} control points",
            weights.len(),
            count
        )));
    }
    if let Some(i) = weights.iter().position(|&w| !(w > T::zero())) {
        return Err(SplineError::PreconditionViolation(format!(
            "weight {} is {}, weights must be positive",
            i, weights[i]
        )));
    }
    Ok(())
}

/// Write a labelled block with one control point per line.
pub(crate) fn write_points<P: ControlPoint>(
    sink: &mut dyn io::Write,
    label: &str,
    points: &[P],
) -> Result<()> {
    writeln!(sink, "{}:", label)?;
    for p in points {
        let coords: Vec<String> = (0..P::DIM).map(|axis| p.coordinate(axis).to_string()).collect();
        writeln!(sink, "{}", coords.join(" "))?;
    }
    Ok(())
}

/// Write a labelled block of scalars on a single line.
pub(crate) fn write_scalars<T: Real>(sink: &mut dyn io::Write, label: &str, values: &[T]) -> Result<()> {
    let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    writeln!(sink, "{}:", label)?;
    writeln!(sink, "{}", values.join(" "))?;
    Ok(())
}
