//! Real polynomials in power basis.

use std::ops::{Add, Mul, Sub};

use crate::point::{scalar, Real};
use crate::prelude::*;

/// A polynomial `c[0] + c[1] t + ... + c[n] t^n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial<T: Real> {
    coefficients: Vec<T>,
}

impl<T: Real> Polynomial<T> {
    /// Build from ascending power coefficients.
    pub fn new(coefficients: Vec<T>) -> Self {
        Self { coefficients }
    }

    pub fn zero() -> Self {
        Self {
            coefficients: Vec::new(),
        }
    }

    pub fn constant(value: T) -> Self {
        Self {
            coefficients: vec![value],
        }
    }

    /// Convert Bernstein coefficients `b[0..=n]` over `[0, 1]` to power basis:
    /// `c[j] = C(n, j) * sum_{i <= j} (-1)^(j - i) C(j, i) b[i]`.
    pub fn from_bernstein(bernstein: &[T]) -> Self {
        if bernstein.is_empty() {
            return Self::zero();
        }
        let n = bernstein.len() - 1;
        let coefficients = (0..=n)
            .map(|j| {
                let mut sum = T::zero();
                for (i, &b) in bernstein.iter().enumerate().take(j + 1) {
                    let term = b * scalar::<T>(binomial(j, i));
                    if (j - i) % 2 == 0 {
                        sum += term;
                    } else {
                        sum -= term;
                    }
                }
                sum * scalar::<T>(binomial(n, j))
            })
            .collect();
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &[T] {
        &self.coefficients
    }

    /// Degree after dropping exact-zero leading coefficients; `None` for the
    /// zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coefficients.iter().rposition(|c| !c.is_zero())
    }

    /// Largest coefficient magnitude.
    pub fn magnitude(&self) -> T {
        self.coefficients
            .iter()
            .fold(T::zero(), |acc, c| acc.max(c.abs()))
    }

    /// Whether every coefficient is within `relative * reference` of zero.
    pub fn is_negligible(&self, reference: T, relative: T) -> bool {
        self.magnitude() <= reference * relative
    }

    /// Drop leading coefficients that are negligible relative to the largest one.
    pub fn trimmed(&self, relative: T) -> Self {
        let threshold = self.magnitude() * relative;
        let len = self
            .coefficients
            .iter()
            .rposition(|c| c.abs() > threshold)
            .map_or(0, |i| i + 1);
        Self {
            coefficients: self.coefficients[..len].to_vec(),
        }
    }

    /// Horner evaluation.
    pub fn evaluate(&self, t: T) -> T {
        self.coefficients
            .iter()
            .rev()
            .fold(T::zero(), |acc, &c| acc * t + c)
    }

    pub fn derivative(&self) -> Self {
        let coefficients = self
            .coefficients
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, &c)| c * scalar::<T>(i as f64))
            .collect();
        Self { coefficients }
    }

    pub fn scaled(&self, factor: T) -> Self {
        Self {
            coefficients: self.coefficients.iter().map(|&c| c * factor).collect(),
        }
    }
}

impl<T: Real> Add for &Polynomial<T> {
    type Output = Polynomial<T>;

    fn add(self, rhs: Self) -> Polynomial<T> {
        let len = self.coefficients.len().max(rhs.coefficients.len());
        let coefficients = (0..len)
            .map(|i| {
                let a = self.coefficients.get(i).copied().unwrap_or_else(T::zero);
                let b = rhs.coefficients.get(i).copied().unwrap_or_else(T::zero);
                a + b
            })
            .collect();
        Polynomial { coefficients }
    }
}

impl<T: Real> Sub for &Polynomial<T> {
    type Output = Polynomial<T>;

    fn sub(self, rhs: Self) -> Polynomial<T> {
        self + &rhs.scaled(-T::one())
    }
}

impl<T: Real> Mul for &Polynomial<T> {
    type Output = Polynomial<T>;

    fn mul(self, rhs: Self) -> Polynomial<T> {
        if self.coefficients.is_empty() || rhs.coefficients.is_empty() {
            return Polynomial::zero();
        }
        let mut coefficients = vec![T::zero(); self.coefficients.len() + rhs.coefficients.len() - 1];
        for (i, &a) in self.coefficients.iter().enumerate() {
            for (j, &b) in rhs.coefficients.iter().enumerate() {
                coefficients[i + j] += a * b;
            }
        }
        Polynomial { coefficients }
    }
}

/// Binomial coefficient `C(n, k)` as a float.
pub fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}
