//! Real root finding over an interval.
//!
//! Curve diagnostics reduce to locating the real roots of derivative
//! polynomials. The finder is a collaborator: diagnostics accept any
//! [`RootFinder`], and [`IsolatingRootFinder`] is the default.

use splinekit_core::Tolerance;

use crate::point::{scalar, Real};
use crate::poly::Polynomial;
use crate::prelude::*;

/// Maximum bisection steps; enough to exhaust `f64` precision on `[0, 1]`.
const MAX_BISECTIONS: usize = 128;

pub trait RootFinder<T: Real> {
    /// All real roots of `polynomial` in `[t0, t1]`, sorted ascending and
    /// deduplicated. The zero polynomial has no isolated roots.
    fn find_roots(&self, polynomial: &Polynomial<T>, t0: T, t1: T) -> Vec<T>;

    /// Tolerances used for deduplication and zero tests.
    fn tolerance(&self) -> Tolerance {
        Tolerance::default()
    }
}

/// Root isolation by recursion on the derivative.
///
/// The roots of `p'` split `[t0, t1]` into windows where `p` is monotone; each
/// window holds at most one root, found by bisection. Critical points where
/// `|p|` is negligible are reported as even-multiplicity roots.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsolatingRootFinder {
    tolerance: Tolerance,
}

impl IsolatingRootFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    fn isolate<T: Real>(&self, polynomial: &Polynomial<T>, t0: T, t1: T, roots: &mut Vec<T>) {
        let relative = scalar::<T>(self.tolerance.parametric);
        let p = polynomial.trimmed(relative);
        let Some(degree) = p.degree() else {
            return;
        };
        if degree == 0 {
            return;
        }
        if degree == 1 {
            let c = p.coefficients();
            let root = -c[0] / c[1];
            if root >= t0 && root <= t1 {
                roots.push(root);
            }
            return;
        }

        let zero = p.magnitude() * relative;
        let mut breakpoints = vec![t0];
        let mut critical = Vec::new();
        self.isolate(&p.derivative(), t0, t1, &mut critical);
        sort_and_merge(&mut critical, T::zero());
        breakpoints.extend(critical.into_iter().filter(|&c| c > t0 && c < t1));
        breakpoints.push(t1);

        for window in breakpoints.windows(2) {
            let (a, b) = (window[0], window[1]);
            let fa = p.evaluate(a);
            let fb = p.evaluate(b);
            if fa.abs() <= zero {
                roots.push(a);
            } else if fb.abs() > zero && (fa < T::zero()) != (fb < T::zero()) {
                roots.push(bisect(&p, a, b, fa));
            }
        }
        if p.evaluate(t1).abs() <= zero {
            roots.push(t1);
        }
    }
}

impl<T: Real> RootFinder<T> for IsolatingRootFinder {
    fn find_roots(&self, polynomial: &Polynomial<T>, t0: T, t1: T) -> Vec<T> {
        if t1 < t0 {
            return Vec::new();
        }
        let mut roots = Vec::new();
        self.isolate(polynomial, t0, t1, &mut roots);

        let width = (t1 - t0).max(T::one());
        sort_and_merge(&mut roots, width * scalar::<T>(self.tolerance.parametric));
        log::trace!(
            "isolated {} roots of a degree-{:?} polynomial in [{}, {}]",
            roots.len(),
            polynomial.degree(),
            t0,
            t1
        );
        roots
    }

    fn tolerance(&self) -> Tolerance {
        self.tolerance
    }
}

fn bisect<T: Real>(p: &Polynomial<T>, a: T, b: T, fa: T) -> T {
    let half = scalar::<T>(0.5);
    let (mut lo, mut hi) = (a, b);
    let lo_negative = fa < T::zero();
    for _ in 0..MAX_BISECTIONS {
        let mid = (lo + hi) * half;
        if mid <= lo || mid >= hi {
            break;
        }
        let fm = p.evaluate(mid);
        if fm.is_zero() {
            return mid;
        }
        if (fm < T::zero()) == lo_negative {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) * half
}

/// Sort ascending and drop values within `merge` of their predecessor.
pub fn sort_and_merge<T: Real>(values: &mut Vec<T>, merge: T) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    values.dedup_by(|current, kept| *current - *kept <= merge);
}
