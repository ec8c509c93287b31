use thiserror::Error;

pub type BackendResult<T> = Result<T, BackendError>;

/// Failure talking to the backend.
///
/// The first three variants are the whole taxonomy callers care about:
/// not configured, rejected by the backend, or broken transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// No endpoint/key configured; detected before any network attempt.
    #[error("backend not configured")]
    NotConfigured,

    /// The backend answered with an error (validation, permission, RLS…).
    #[error("{0}")]
    Rejected(String),

    /// The request never produced a backend answer.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with something we could not decode.
    #[error("decode error: {0}")]
    Decode(String),

    /// A read that must produce a row produced none.
    #[error("{0}")]
    NotFound(String),
}

impl BackendError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Transport and decode failures are unexpected; the rest are answers.
    pub fn is_unexpected(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Decode(_))
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}
