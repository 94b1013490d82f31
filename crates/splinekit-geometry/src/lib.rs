//! splinekit geometry: Bézier, rational Bézier, B-spline and NURBS curves and
//! patches, with curve diagnostics and sampling.

pub mod curve;
pub mod diagnostics;
pub mod kernel;
pub mod sampling;
pub mod surface;

pub use curve::{
    BSplineCurve, BezierCurve, Curve, DegreeMode, NurbsCurve, RationalBezierCurve,
};
pub use diagnostics::{CurveDiagnostics, PolynomialSegments};
pub use kernel::BezierSegment;
pub use surface::{BSplinePatch, BezierPatch, NurbsPatch, Patch, RationalBezierPatch};
