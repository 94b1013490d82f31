use crate::error::Result;

/// Validate the structural integrity of a curve or patch: knot ordering,
/// knot/control point counts and weight positivity.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}
