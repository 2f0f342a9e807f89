use crate::trees::PrimitiveSetError;

use std::error::Error;
use std::fmt;

/// Errors raised while constructing a
/// [`Population`](crate::Population). All of them are fatal:
/// an invalid configuration is never silently coerced.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A probability field lies outside [0.0, 1.0].
    ProbabilityOutOfRange(&'static str, f64),
    /// A depth range has `min > max`.
    InvalidDepthRange(&'static str, usize, usize),
    /// The primitive set cannot produce trees.
    Primitives(PrimitiveSetError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProbabilityOutOfRange(name, value) => {
                write!(f, "configured {} = {} is not a probability", name, value)
            }
            Self::InvalidDepthRange(name, min, max) => {
                write!(f, "configured {} range {}..={} is inverted", name, min, max)
            }
            Self::Primitives(source) => write!(f, "invalid primitive set: {}", source),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Primitives(source) => Some(source),
            _ => None,
        }
    }
}

impl From<PrimitiveSetError> for ConfigError {
    fn from(source: PrimitiveSetError) -> ConfigError {
        ConfigError::Primitives(source)
    }
}
