//! The one result shape every wrapper returns.

use serde::Serialize;

use parallax_backend::{BackendError, BackendResult};

pub const NOT_CONFIGURED_MESSAGE: &str = "Backend not configured";

/// `data` on success, `error` on failure; never both, never neither.
///
/// Wrappers never propagate a `BackendError`: configuration-absent, rejected,
/// and transport failures all collapse into a human-readable `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceResponse<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ServiceResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
        }
    }

    /// Normalize a backend result, logging the failure under `operation`.
    pub fn from_result(operation: &str, result: BackendResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::err(report(operation, &err)),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<T, String> {
        match (self.data, self.error) {
            (_, Some(err)) => Err(err),
            (Some(data), None) => Ok(data),
            (None, None) => Err("empty response".to_string()),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ServiceResponse<U> {
        ServiceResponse {
            data: self.data.map(f),
            error: self.error,
        }
    }
}

/// User-facing message for a backend failure.
pub fn error_message(err: &BackendError) -> String {
    match err {
        BackendError::NotConfigured => NOT_CONFIGURED_MESSAGE.to_string(),
        BackendError::Rejected(msg) | BackendError::NotFound(msg) => msg.clone(),
        BackendError::Transport(detail) | BackendError::Decode(detail) => {
            format!("Unexpected error communicating with backend: {detail}")
        }
    }
}

/// Log `err` and return its user-facing message.
pub(crate) fn report(operation: &str, err: &BackendError) -> String {
    match err {
        BackendError::NotConfigured => tracing::warn!(operation, "backend not configured"),
        e if e.is_unexpected() => tracing::error!(operation, error = %e, "unexpected backend failure"),
        e => tracing::error!(operation, error = %e, "backend rejected request"),
    }
    error_message(err)
}
