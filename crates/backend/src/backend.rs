//! The seam between Parallax and whatever serves its data.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use parallax_core::UserId;

use crate::{BackendResult, ViewQuery};

/// A user as reported by the backend's auth endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
}

/// Remote data backend: auth endpoint, read-only views, remote procedures.
///
/// Implementations hold whatever session persistence the backend offers; the
/// client keeps no store of its own.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Password sign-in. Establishes the backend session on success.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<AuthUser>;

    /// The user behind the current backend session, if any.
    ///
    /// `Ok(None)` is "not logged in", which is not an error.
    async fn current_user(&self) -> BackendResult<Option<AuthUser>>;

    async fn sign_out(&self) -> BackendResult<()>;

    /// Rows of a view, as JSON objects.
    async fn select(&self, query: &ViewQuery) -> BackendResult<Vec<Value>>;

    /// Exact number of rows matching the query's filters (limit ignored).
    async fn count(&self, query: &ViewQuery) -> BackendResult<u64>;

    /// Invoke a named remote procedure with a JSON object of parameters.
    async fn rpc(&self, procedure: &str, params: Value) -> BackendResult<Value>;
}
