//! Scalar and control point abstractions shared by every kernel.

use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

use glam::{DVec2, DVec3, Vec2, Vec3};
use nalgebra::{RealField, SVector};

use crate::prelude::*;

/// Floating point precision used by the kernels (`f32` or `f64`).
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}

/// Convert an `f64` constant into the working precision.
#[inline]
pub fn scalar<T: Real>(value: f64) -> T {
    nalgebra::convert(value)
}

/// A point (or vector) in `DIM`-dimensional space that curves and patches can
/// blend linearly.
///
/// Evaluation only ever forms affine combinations, so anything closed under
/// addition, subtraction and scaling can serve as a control point. The
/// homogeneous lift used by the rational kernels is itself a `ControlPoint`
/// of dimension `DIM + 1`.
pub trait ControlPoint: Copy + Debug + PartialEq + Send + Sync + 'static
where
    Self: Add<Self, Output = Self>,
    Self: Sub<Self, Output = Self>,
    Self: Mul<<Self as ControlPoint>::Scalar, Output = Self>,
{
    type Scalar: Real;

    /// Number of coordinates.
    const DIM: usize;

    /// The point with all coordinates zero.
    fn origin() -> Self;

    /// Coordinate along `axis`; `axis` must be below `DIM`.
    fn coordinate(&self, axis: usize) -> Self::Scalar;

    fn inner_product(&self, other: &Self) -> Self::Scalar;

    fn squared_norm(&self) -> Self::Scalar {
        self.inner_product(self)
    }

    fn norm(&self) -> Self::Scalar {
        self.squared_norm().sqrt()
    }

    fn squared_distance(&self, other: &Self) -> Self::Scalar {
        (*self - *other).squared_norm()
    }

    fn distance(&self, other: &Self) -> Self::Scalar {
        self.squared_distance(other).sqrt()
    }

    /// `(1 - t) * self + t * other`
    fn interpolate(&self, other: &Self, t: Self::Scalar) -> Self {
        *self * (nalgebra::one::<Self::Scalar>() - t) + *other * t
    }
}

impl<T: Real, const D: usize> ControlPoint for SVector<T, D> {
    type Scalar = T;
    const DIM: usize = D;

    fn origin() -> Self {
        Self::zeros()
    }

    fn coordinate(&self, axis: usize) -> T {
        self[axis]
    }

    fn inner_product(&self, other: &Self) -> T {
        self.dot(other)
    }
}

macro_rules! impl_glam_control_point {
    ($ty:ty, $scalar:ty, $dim:expr) => {
        impl ControlPoint for $ty {
            type Scalar = $scalar;
            const DIM: usize = $dim;

            fn origin() -> Self {
                <$ty>::ZERO
            }

            fn coordinate(&self, axis: usize) -> $scalar {
                self[axis]
            }

            fn inner_product(&self, other: &Self) -> $scalar {
                self.dot(*other)
            }
        }
    };
}

impl_glam_control_point!(Vec2, f32, 2);
impl_glam_control_point!(Vec3, f32, 3);
impl_glam_control_point!(DVec2, f64, 2);
impl_glam_control_point!(DVec3, f64, 3);
