//! Curve diagnostics: singularities and tangent rotation.
//!
//! Every diagnostic works on the power-basis pieces of a curve and reduces to
//! finding real roots of tangent polynomials with a [`RootFinder`](splinekit_math::RootFinder).

pub mod segments;
pub mod singularity;
pub mod tangent;

pub use segments::{PolynomialSegment, PolynomialSegments};
pub use singularity::compute_singularities;
pub use tangent::{match_tangent, reduce_turning_angle, turning_angle};

use splinekit_core::{Result, SplineError, Tolerance};
use splinekit_math::prelude::*;
use splinekit_math::{scalar, ControlPoint, IsolatingRootFinder, Real};

pub(crate) fn check_interval<T: Real>(t0: T, t1: T) -> Result<()> {
    if t0 > t1 {
        return Err(SplineError::PreconditionViolation(format!(
            "interval start {} is after its end {}",
            t0, t1
        )));
    }
    Ok(())
}

pub(crate) fn check_planar<P: ControlPoint>() -> Result<()> {
    if P::DIM != 2 {
        return Err(SplineError::UnsupportedOperation(format!(
            "tangent angles need planar curves, got dimension {}",
            P::DIM
        )));
    }
    Ok(())
}

/// Distance below which two parameters of `[t0, t1]` are the same root.
pub(crate) fn merge_distance<T: Real>(tolerance: &Tolerance, t0: T, t1: T) -> T {
    scalar::<T>(tolerance.parametric) * (t1 - t0).max(T::one())
}

/// Diagnostics with the default [`IsolatingRootFinder`].
///
/// Implemented for every curve with [`PolynomialSegments`]. Use the free
/// functions to supply another finder.
pub trait CurveDiagnostics<P: ControlPoint>: PolynomialSegments<P> {
    fn compute_singularities(&self, t0: P::Scalar, t1: P::Scalar) -> Result<Vec<P::Scalar>> {
        compute_singularities::<P, Self, _>(self, &IsolatingRootFinder::new(), t0, t1)
    }

    fn match_tangent(
        &self,
        direction: [P::Scalar; 2],
        t0: P::Scalar,
        t1: P::Scalar,
    ) -> Result<Vec<P::Scalar>> {
        match_tangent::<P, Self, _>(self, &IsolatingRootFinder::new(), direction, t0, t1)
    }

    fn reduce_turning_angle(&self, t0: P::Scalar, t1: P::Scalar) -> Result<Vec<P::Scalar>> {
        reduce_turning_angle::<P, Self, _>(self, &IsolatingRootFinder::new(), t0, t1)
    }

    fn turning_angle(&self, t0: P::Scalar, t1: P::Scalar) -> Result<P::Scalar> {
        turning_angle::<P, Self, _>(self, &IsolatingRootFinder::new(), t0, t1)
    }
}

impl<P: ControlPoint, C: PolynomialSegments<P> + ?Sized> CurveDiagnostics<P> for C {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::BezierCurve;
    use approx::assert_relative_eq;
    use nalgebra::Vector2;
    use splinekit_math::{Polynomial, RootFinder};

    /// Finder that reports no roots at all.
    struct Blind;

    impl RootFinder<f64> for Blind {
        fn find_roots(&self, _: &Polynomial<f64>, _: f64, _: f64) -> Vec<f64> {
            Vec::new()
        }
    }

    fn quadratic() -> BezierCurve<Vector2<f64>> {
        BezierCurve::new(vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(2.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_default_finder() {
        let curve = quadratic();
        let splits = curve.reduce_turning_angle(0.0, 1.0).unwrap();
        assert_eq!(splits.len(), 1);
        assert_relative_eq!(splits[0], 0.5, epsilon = 1e-9);
        assert!(curve.compute_singularities(0.0, 1.0).unwrap().is_empty());
        assert_eq!(curve.match_tangent([1.0, 0.0], 0.0, 1.0).unwrap().len(), 1);
    }

    #[test]
    fn test_custom_finder_is_used() {
        let curve = quadratic();
        assert!(reduce_turning_angle(&curve, &Blind, 0.0, 1.0).unwrap().is_empty());
    }

    #[test]
    fn test_merge_distance_scales_with_width() {
        let tolerance = Tolerance::default();
        assert_relative_eq!(merge_distance(&tolerance, 0.0, 0.5), 1e-9, epsilon = 1e-18);
        assert_relative_eq!(merge_distance(&tolerance, 0.0, 100.0), 1e-7, epsilon = 1e-18);
    }
}
