//! Common error types for Charlie components.

use thiserror::Error;

/// Common errors across Charlie components
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CharlieError {
    /// Missing or mismatched fields, failed bot check, rejected post
    #[error("{0}")]
    Validation(String),

    /// Stored data could not be decoded
    #[error("Stored data is malformed: {0}")]
    PersistenceParse(String),

    /// Local storage read/write failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// A submission is already in flight
    #[error("Busy: {0}")]
    Busy(String),

    /// Operation requires a logged-in session
    #[error("You must be signed in to do that")]
    Unauthenticated,

    /// Store used before its start-up load
    #[error("Not ready: {0}")]
    NotReady(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CharlieError {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns true if the user can simply try again.
    ///
    /// Everything except configuration problems leaves the board in an
    /// interactive, re-submittable state.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}

/// A specialized Result type for Charlie operations.
pub type Result<T> = std::result::Result<T, CharlieError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_shown_verbatim() {
        let err = CharlieError::validation("Passwords do not match");
        assert_eq!(err.to_string(), "Passwords do not match");
    }

    #[test]
    fn test_only_config_errors_are_fatal() {
        assert!(CharlieError::Busy("login".into()).is_recoverable());
        assert!(CharlieError::PersistenceParse("eof".into()).is_recoverable());
        assert!(CharlieError::Unauthenticated.is_recoverable());
        assert!(!CharlieError::Config("bad".into()).is_recoverable());
    }
}
