use std::error::Error;
use std::fmt;

/// Errors raised while assembling or validating a
/// [`PrimitiveSet`](crate::PrimitiveSet).
#[derive(Clone, Debug, PartialEq)]
pub enum PrimitiveSetError {
    /// A primitive was registered with arity 0.
    ZeroArity(String),
    /// The set has neither variables nor an ephemeral
    /// constant generator, so no tree could terminate.
    EmptyTerminalSet,
    /// The set has no primitives, so no internal node
    /// could ever be placed.
    NoPrimitives,
    /// The ephemeral constant range is empty or non-finite.
    InvalidConstantRange(f64, f64),
}

impl fmt::Display for PrimitiveSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroArity(name) => {
                write!(f, "primitive `{}` registered with arity 0", name)
            }
            Self::EmptyTerminalSet => {
                write!(f, "primitive set has no terminals (no variables or ephemeral constants)")
            }
            Self::NoPrimitives => write!(f, "primitive set has no primitives"),
            Self::InvalidConstantRange(low, high) => {
                write!(f, "invalid ephemeral constant range {}..={}", low, high)
            }
        }
    }
}

impl Error for PrimitiveSetError {}
