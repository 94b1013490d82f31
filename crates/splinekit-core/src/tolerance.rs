/// Tolerances used by evaluation, root isolation and knot bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Linear tolerance for distance comparisons (in model units)
    pub linear: f64,
    /// Angular tolerance (in radians)
    pub angular: f64,
    /// Parametric tolerance, relative to the width of the searched interval.
    /// Roots closer than this are merged and bisection stops at this width.
    pub parametric: f64,
    /// Knot equality tolerance, relative to the length of the domain.
    pub knot: f64,
}

impl Tolerance {
    pub const DEFAULT_LINEAR: f64 = 1e-7;
    pub const DEFAULT_ANGULAR: f64 = 1e-10;
    pub const DEFAULT_PARAMETRIC: f64 = 1e-9;
    pub const DEFAULT_KNOT: f64 = 1e-9;

    pub fn new(linear: f64, angular: f64, parametric: f64, knot: f64) -> Self {
        Self {
            linear,
            angular,
            parametric,
            knot,
        }
    }

    pub fn default_precision() -> Self {
        Self {
            linear: Self::DEFAULT_LINEAR,
            angular: Self::DEFAULT_ANGULAR,
            parametric: Self::DEFAULT_PARAMETRIC,
            knot: Self::DEFAULT_KNOT,
        }
    }

    pub fn loose() -> Self {
        Self {
            linear: 1e-4,
            angular: 1e-6,
            parametric: 1e-6,
            knot: 1e-6,
        }
    }

    pub fn tight() -> Self {
        Self {
            linear: 1e-10,
            angular: 1e-12,
            parametric: 1e-12,
            knot: 1e-12,
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::default_precision()
    }
}
