//! Domain error model.

use thiserror::Error;

/// Result type used by parsing/validation helpers.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Parallax delegates business rules to the backend, so this stays small:
/// malformed identifiers and values rejected before a call is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. an unknown report period).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
