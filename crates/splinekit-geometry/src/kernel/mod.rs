//! Numeric kernels shared by curves and patches.
//!
//! Everything here is a pure function of control data and a parameter.

pub mod casteljau;
pub mod deboor;
pub mod knot;

pub use deboor::BezierSegment;
