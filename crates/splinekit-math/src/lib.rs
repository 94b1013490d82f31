//! splinekit math primitives: scalars, control points, homogeneous lifts,
//! polynomials and real-root finding.

pub mod homogeneous;
pub mod point;
pub mod poly;
pub mod roots;

/// Scalar traits the kernels call methods from (`sqrt`, `max`, `zero`, ...).
pub mod prelude {
    pub use nalgebra::{ComplexField, RealField};
    pub use num_traits::{One, Zero};
}

pub use glam::{DVec2, DVec3, Vec2, Vec3};
pub use nalgebra::{RealField, SVector, Vector2, Vector3, Vector4};

pub use homogeneous::{quotient_derivative, quotient_second_derivative, Homogeneous};
pub use point::{scalar, ControlPoint, Real};
pub use poly::Polynomial;
pub use roots::{IsolatingRootFinder, RootFinder};
