//! Error type shared by every part of the estimator.
//!
//! Nothing here is retried: configuration and precondition errors abort the operation that raised
//! them and no partial densities are handed back.

use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// A tolerance or bandwidth outside of its valid range.
    Configuration(String),
    /// An operation called in a state that does not allow it (e.g. evaluating before training).
    Precondition(String),
    /// A kernel bound came back with `min_weight > max_weight`.
    GeometricInconsistency { min_weight: f64, max_weight: f64 },
    DimensionMismatch { expected: usize, found: usize },
    EmptyDataset(String),
    Io(std::io::Error),
    Serialization(String),
}

impl fmt::Display for Error {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "configuration error: {}", msg),
            Error::Precondition(msg) => write!(f, "precondition error: {}", msg),
            Error::GeometricInconsistency { min_weight, max_weight } => write!(
                f,
                "kernel bounds are inconsistent: min weight {} exceeds max weight {}",
                min_weight, max_weight
            ),
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {}, found {}", expected, found)
            }
            Error::EmptyDataset(msg) => write!(f, "empty dataset: {}", msg),
            Error::Io(e) => write!(f, "io error: {}", e),
            Error::Serialization(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {

    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::convert::From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl std::convert::From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Error {
        Error::Serialization(e.to_string())
    }
}

impl std::convert::From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_category() {

        let e = Error::Configuration("relative error must be in [0, 1]".to_string());
        assert!(e.to_string().starts_with("configuration error"));

        let e = Error::GeometricInconsistency { min_weight: 0.5, max_weight: 0.25 };
        assert!(e.to_string().contains("0.5"));

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: Error = io.into();
        assert!(matches!(e, Error::Io(_)));
    }
}
