//! Tensor-product patches.
//!
//! Control grids are stored row-major: the point with u-index `i` and
//! v-index `j` lives at `i * count_v + j`.

mod bezier;
mod bspline;
mod nurbs;
mod rational_bezier;

use std::io;

use splinekit_core::{Result, SplineError};
use splinekit_math::ControlPoint;

pub use bezier::BezierPatch;
pub use bspline::BSplinePatch;
pub use nurbs::NurbsPatch;
pub use rational_bezier::RationalBezierPatch;

/// Trait for parametric patches over a rectangular parameter domain.
pub trait Patch<P: ControlPoint>: Send + Sync {
    /// Evaluate the patch at parameters `(u, v)`.
    fn evaluate(&self, u: P::Scalar, v: P::Scalar) -> Result<P>;

    /// Partial derivative along u.
    fn evaluate_derivative_u(&self, u: P::Scalar, v: P::Scalar) -> Result<P>;

    /// Partial derivative along v.
    fn evaluate_derivative_v(&self, u: P::Scalar, v: P::Scalar) -> Result<P>;

    /// Return the u-parameter domain `(u_min, u_max)`.
    fn domain_u(&self) -> (P::Scalar, P::Scalar);

    /// Return the v-parameter domain `(v_min, v_max)`.
    fn domain_v(&self) -> (P::Scalar, P::Scalar);

    fn degree_u(&self) -> usize;

    fn degree_v(&self) -> usize;

    /// Dump the control data as text.
    fn write(&self, sink: &mut dyn io::Write) -> Result<()>;
}

pub(crate) fn check_degrees(degree_u: usize, degree_v: usize) -> Result<()> {
    if degree_u == 0 || degree_v == 0 {
        return Err(SplineError::InvalidConfiguration(format!(
            "patch degrees must be positive, got ({}, {})",
            degree_u, degree_v
        )));
    }
    Ok(())
}

pub(crate) fn check_grid(len: usize, count_u: usize, count_v: usize) -> Result<()> {
    if len != count_u * count_v {
        return Err(SplineError::InvalidConfiguration(format!(
            "{} control points do not form a {} x {} grid",
            len, count_u, count_v
        )));
    }
    Ok(())
}

/// Points with v-index `j`, in u order.
pub(crate) fn grid_column<P: ControlPoint>(points: &[P], j: usize, count_v: usize) -> Vec<P> {
    points.iter().skip(j).step_by(count_v).copied().collect()
}
