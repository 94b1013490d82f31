//! Homogeneous (projective) lift of control points.
//!
//! A rational curve with control points `P[i]` and weights `w[i]` is the
//! perspective image of the non-rational curve with control points
//! `(w[i] * P[i], w[i])`. Rational kernels evaluate that lifted curve and
//! divide by the last coordinate.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::point::{ControlPoint, Real};

/// A weighted point `(w * P, w)` in `DIM + 1` dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "P: Serialize, P::Scalar: Serialize",
    deserialize = "P: Deserialize<'de>, P::Scalar: Deserialize<'de>"
))]
pub struct Homogeneous<P: ControlPoint> {
    /// Cartesian coordinates already multiplied by `weight`.
    pub point: P,
    pub weight: P::Scalar,
}

impl<P: ControlPoint> Homogeneous<P> {
    pub fn new(point: P, weight: P::Scalar) -> Self {
        Self { point, weight }
    }

    /// Lift a Cartesian point with its weight.
    pub fn from_weighted(point: P, weight: P::Scalar) -> Self {
        Self {
            point: point * weight,
            weight,
        }
    }

    /// Perspective divide back to Cartesian space.
    ///
    /// A zero weight is a caller precondition and is not guarded.
    pub fn project(&self) -> P {
        self.point * (nalgebra::one::<P::Scalar>() / self.weight)
    }
}

impl<P: ControlPoint> Add for Homogeneous<P> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            point: self.point + rhs.point,
            weight: self.weight + rhs.weight,
        }
    }
}

impl<P: ControlPoint> Sub for Homogeneous<P> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            point: self.point - rhs.point,
            weight: self.weight - rhs.weight,
        }
    }
}

impl<P: ControlPoint> Mul<P::Scalar> for Homogeneous<P> {
    type Output = Self;

    fn mul(self, rhs: P::Scalar) -> Self {
        Self {
            point: self.point * rhs,
            weight: self.weight * rhs,
        }
    }
}

impl<P: ControlPoint> ControlPoint for Homogeneous<P> {
    type Scalar = P::Scalar;
    const DIM: usize = P::DIM + 1;

    fn origin() -> Self {
        Self {
            point: P::origin(),
            weight: nalgebra::zero(),
        }
    }

    fn coordinate(&self, axis: usize) -> P::Scalar {
        if axis < P::DIM {
            self.point.coordinate(axis)
        } else {
            self.weight
        }
    }

    fn inner_product(&self, other: &Self) -> P::Scalar {
        self.point.inner_product(&other.point) + self.weight * other.weight
    }
}

/// Lift parallel slices of points and weights.
pub fn lift<P: ControlPoint>(points: &[P], weights: &[P::Scalar]) -> Vec<Homogeneous<P>> {
    points
        .iter()
        .zip(weights)
        .map(|(&p, &w)| Homogeneous::from_weighted(p, w))
        .collect()
}

/// Split homogeneous points back into Cartesian points and weights.
pub fn unlift<P: ControlPoint>(lifted: &[Homogeneous<P>]) -> (Vec<P>, Vec<P::Scalar>) {
    lifted.iter().map(|h| (h.project(), h.weight)).unzip()
}

/// First derivative of the projected curve by the quotient rule.
///
/// With `H = (N, w)` and `p = N / w`: `p' = (N' - p * w') / w`.
pub fn quotient_derivative<P: ControlPoint>(value: &Homogeneous<P>, first: &Homogeneous<P>) -> P {
    let inv_w = inverse(value.weight);
    let p = value.point * inv_w;
    (first.point - p * first.weight) * inv_w
}

/// Second derivative of the projected curve by the quotient rule.
///
/// `p'' = (N'' - 2 * p' * w' - p * w'') / w`
pub fn quotient_second_derivative<P: ControlPoint>(
    value: &Homogeneous<P>,
    first: &Homogeneous<P>,
    second: &Homogeneous<P>,
) -> P {
    let inv_w = inverse(value.weight);
    let two = nalgebra::one::<P::Scalar>() + nalgebra::one::<P::Scalar>();
    let p = value.point * inv_w;
    let dp = quotient_derivative(value, first);
    (second.point - dp * (two * first.weight) - p * second.weight) * inv_w
}

fn inverse<T: Real>(w: T) -> T {
    nalgebra::one::<T>() / w
}
