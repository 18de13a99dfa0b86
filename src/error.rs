//! Error types for passgen.
//!
//! Generation and clipboard delivery fail independently: a `GenerateError`
//! aborts the request, while a `ClipboardError` never invalidates a password
//! that was already produced.

use std::io;

use thiserror::Error;

use crate::generate::{MAX_LENGTH, MIN_LENGTH};

/// Result type alias for generation.
pub type Result<T> = std::result::Result<T, GenerateError>;

/// Errors raised while generating a password.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Requested length is outside the accepted range.
    #[error(
        "invalid password length: must be between {} and {} characters, got {length}",
        MIN_LENGTH,
        MAX_LENGTH
    )]
    InvalidLength { length: usize },

    /// Charset key is not one of the known kinds.
    #[error("invalid charset: {0}")]
    InvalidCharset(String),

    /// The resolved character table has no members.
    #[error("selected charset is empty")]
    EmptyCharset,

    /// The entropy source failed mid-draw.
    #[error("failed to generate password: {0}")]
    GenerationFailure(#[from] rand::Error),
}

/// Failure of a single clipboard mechanism.
///
/// The dispatcher treats every variant the same way (move on to the next
/// mechanism); the variants only exist to label diagnostics.
#[derive(Debug, Error)]
pub enum MechanismError {
    /// Library could not initialise or executable was not found.
    #[error("not available: {reason}")]
    Unavailable { reason: String },

    /// The mechanism ran but did not succeed.
    #[error("failed: {reason}")]
    ExecutionFailure { reason: String },

    /// Anything else that went wrong talking to the mechanism.
    #[error("unexpected error: {0}")]
    Unexpected(#[from] io::Error),
}

impl MechanismError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn execution_failure(reason: impl Into<String>) -> Self {
        Self::ExecutionFailure {
            reason: reason.into(),
        }
    }

    /// Short label used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => "unavailable",
            Self::ExecutionFailure { .. } => "execution-failure",
            Self::Unexpected(_) => "unexpected",
        }
    }
}

/// Errors surfaced by the clipboard dispatcher.
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// Every configured mechanism failed (or none were configured).
    ///
    /// `failures` lists `(mechanism name, cause)` in attempt order.
    #[error("failed to copy to clipboard - no available method worked (tried {})", .failures.len())]
    AllMechanismsFailed {
        failures: Vec<(String, MechanismError)>,
    },

    /// A selector key did not name a known mechanism.
    #[error("unknown clipboard method: {0}")]
    UnknownMechanism(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_length_message_carries_value() {
        let e = GenerateError::InvalidLength { length: 129 };
        let msg = e.to_string();
        assert!(msg.contains("129"));
        assert!(msg.contains("between 8 and 128"));
    }

    #[test]
    fn all_failed_counts_attempts() {
        let e = ClipboardError::AllMechanismsFailed {
            failures: vec![
                ("a".into(), MechanismError::unavailable("missing")),
                ("b".into(), MechanismError::execution_failure("exit 1")),
            ],
        };
        assert!(e.to_string().contains("tried 2"));
    }

    #[test]
    fn mechanism_kinds_are_distinct() {
        let io = io::Error::other("boom");
        assert_eq!(MechanismError::unavailable("x").kind(), "unavailable");
        assert_eq!(
            MechanismError::execution_failure("x").kind(),
            "execution-failure"
        );
        assert_eq!(MechanismError::from(io).kind(), "unexpected");
    }
}
