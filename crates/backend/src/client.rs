//! Configured-or-not handle to the backend, with typed helpers.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Backend, BackendConfig, BackendError, BackendResult, HttpBackend, ViewQuery};

/// Cheap-to-clone handle every data wrapper goes through.
///
/// An unconfigured client answers every call with [`BackendError::NotConfigured`]
/// without touching the network.
#[derive(Clone, Default)]
pub struct BackendClient {
    backend: Option<Arc<dyn Backend>>,
}

impl core::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BackendClient")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl BackendClient {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn unconfigured() -> Self {
        Self { backend: None }
    }

    /// Build from the environment: an HTTP backend when configured, else unconfigured.
    pub fn from_env() -> BackendResult<Self> {
        match BackendConfig::from_env() {
            Some(config) => Self::from_config(config),
            None => {
                tracing::warn!("backend URL/key not set; running unconfigured");
                Ok(Self::unconfigured())
            }
        }
    }

    pub fn from_config(config: BackendConfig) -> BackendResult<Self> {
        Ok(Self::new(Arc::new(HttpBackend::new(config)?)))
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// The backend, or `NotConfigured`.
    pub fn backend(&self) -> BackendResult<&dyn Backend> {
        self.backend.as_deref().ok_or(BackendError::NotConfigured)
    }

    /// All rows of a view, decoded.
    pub async fn fetch_rows<T: DeserializeOwned>(&self, query: &ViewQuery) -> BackendResult<Vec<T>> {
        let rows = self.backend()?.select(query).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(BackendError::from))
            .collect()
    }

    /// First row of a view, if any.
    pub async fn fetch_first<T: DeserializeOwned>(&self, query: &ViewQuery) -> BackendResult<Option<T>> {
        let rows = self.backend()?.select(query).await?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    /// Exactly one row; none is `NotFound(missing)`.
    pub async fn fetch_one<T: DeserializeOwned>(
        &self,
        query: &ViewQuery,
        missing: &str,
    ) -> BackendResult<T> {
        self.fetch_first(query)
            .await?
            .ok_or_else(|| BackendError::not_found(missing))
    }

    pub async fn count(&self, query: &ViewQuery) -> BackendResult<u64> {
        self.backend()?.count(query).await
    }

    /// Call a procedure and decode its result.
    pub async fn call<T: DeserializeOwned>(&self, procedure: &str, params: Value) -> BackendResult<T> {
        let value = self.backend()?.rpc(procedure, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Call a procedure whose result is irrelevant.
    pub async fn call_unit(&self, procedure: &str, params: Value) -> BackendResult<()> {
        self.backend()?.rpc(procedure, params).await.map(|_| ())
    }
}
