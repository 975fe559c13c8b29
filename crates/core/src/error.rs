//! Error types for truckpack.

use thiserror::Error;

/// Result type alias for truckpack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can abort a packing request.
///
/// Only malformed input and unknown strategy names abort a request. Hitting a
/// time budget or node cap is reported through [`crate::StopReason`] and
/// cartons that do not fit are reported through the unplaced list.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Malformed carton or truck data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A carton's orientation policy leaves no permitted orientation.
    #[error("Invalid constraint: {0}")]
    InvalidConstraint(String),

    /// Strategy name not present in the registry.
    #[error("Unknown algorithm: '{0}'")]
    UnknownAlgorithm(String),

    /// A strategy produced a result that violates a packing invariant.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true if the error was raised before any strategy executed.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::InvalidConstraint(_) | Self::UnknownAlgorithm(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownAlgorithm("quantum".into());
        assert_eq!(err.to_string(), "Unknown algorithm: 'quantum'");

        let err = Error::InvalidInput("carton 'A' has non-positive length".into());
        assert!(err.to_string().starts_with("Invalid input"));
    }

    #[test]
    fn test_rejection_classification() {
        assert!(Error::InvalidInput(String::new()).is_rejection());
        assert!(Error::InvalidConstraint(String::new()).is_rejection());
        assert!(Error::UnknownAlgorithm(String::new()).is_rejection());
        assert!(!Error::Internal(String::new()).is_rejection());
    }
}
