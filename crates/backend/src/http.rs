//! HTTP backend speaking the hosted REST/auth dialect.
//!
//! - auth: `/auth/v1/token?grant_type=password`, `/auth/v1/user`, `/auth/v1/logout`
//! - views: `GET /rest/v1/{view}?select=…&col=op.value&order=…&limit=…`
//! - counts: `HEAD` on the same URL with `Prefer: count=exact`
//! - procedures: `POST /rest/v1/rpc/{name}`

use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::RwLock;

use parallax_core::UserId;

use crate::{AuthUser, Backend, BackendConfig, BackendError, BackendResult, ViewQuery};

/// Session as the auth endpoint hands it out; persisted to `session_file` if set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredSession {
    access_token: String,
    refresh_token: Option<String>,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: UserId,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<WireUserMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct WireUserMetadata {
    #[serde(default)]
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireTokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    user: Option<WireUser>,
}

impl From<WireUser> for AuthUser {
    fn from(value: WireUser) -> Self {
        AuthUser {
            id: value.id,
            email: value.email.unwrap_or_default(),
            full_name: value.user_metadata.and_then(|m| m.full_name),
        }
    }
}

pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    session_file: Option<PathBuf>,
    session: RwLock<Option<StoredSession>>,
}

impl core::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .field("session_file", &self.session_file)
            .finish()
    }
}

impl HttpBackend {
    /// Build the client and restore a persisted session, if one exists.
    pub fn new(config: BackendConfig) -> BackendResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| BackendError::transport(e.to_string()))?;

        let session = config.session_file.as_ref().and_then(|path| {
            let raw = std::fs::read_to_string(path).ok()?;
            match serde_json::from_str::<StoredSession>(&raw) {
                Ok(s) => Some(s),
                Err(err) => {
                    tracing::warn!("ignoring unreadable session file {}: {err}", path.display());
                    None
                }
            }
        });

        Ok(Self {
            http,
            base_url: config.url,
            api_key: config.api_key,
            session_file: config.session_file,
            session: RwLock::new(session),
        })
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn bearer(&self) -> String {
        match self.session.read().await.as_ref() {
            Some(s) => s.access_token.clone(),
            None => self.api_key.clone(),
        }
    }

    async fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self.bearer().await;
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {bearer}"))
    }

    async fn send(&self, req: RequestBuilder) -> BackendResult<Response> {
        let resp = req
            .send()
            .await
            .map_err(|e| BackendError::transport(e.to_string()))?;
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(BackendError::Rejected(error_message(status, &body)))
    }

    async fn store_session(&self, session: Option<StoredSession>) {
        if let Some(path) = &self.session_file {
            let result = match &session {
                Some(s) => match serde_json::to_vec(s) {
                    Ok(bytes) => tokio::fs::write(path, bytes).await,
                    Err(err) => Err(std::io::Error::other(err)),
                },
                None => match tokio::fs::remove_file(path).await {
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                    other => other,
                },
            };
            if let Err(err) = result {
                tracing::warn!("failed to persist session to {}: {err}", path.display());
            }
        }
        *self.session.write().await = session;
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<AuthUser> {
        let url = self.auth_url("token?grant_type=password");
        let req = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }));
        let resp = self.send(req).await?;
        let token: WireTokenResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::decode(e.to_string()))?;

        let user: AuthUser = token
            .user
            .ok_or_else(|| BackendError::rejected("No user returned"))?
            .into();

        self.store_session(Some(StoredSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            user: user.clone(),
        }))
        .await;

        Ok(user)
    }

    async fn current_user(&self) -> BackendResult<Option<AuthUser>> {
        if self.session.read().await.is_none() {
            return Ok(None);
        }

        let req = self.request(Method::GET, &self.auth_url("user")).await;
        let resp = req
            .send()
            .await
            .map_err(|e| BackendError::transport(e.to_string()))?;

        match resp.status() {
            // Expired or revoked token: the session is gone, which is "not logged in".
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                self.store_session(None).await;
                Ok(None)
            }
            status if status.is_success() => {
                let user: WireUser = resp
                    .json()
                    .await
                    .map_err(|e| BackendError::decode(e.to_string()))?;
                Ok(Some(user.into()))
            }
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(BackendError::Rejected(error_message(status, &body)))
            }
        }
    }

    async fn sign_out(&self) -> BackendResult<()> {
        if self.session.read().await.is_none() {
            return Ok(());
        }
        let req = self.request(Method::POST, &self.auth_url("logout")).await;
        let result = self.send(req).await.map(|_| ());
        // The local session goes regardless of what the server said.
        self.store_session(None).await;
        result
    }

    async fn select(&self, query: &ViewQuery) -> BackendResult<Vec<Value>> {
        let req = self
            .request(Method::GET, &self.rest_url(&query.view))
            .await
            .query(&query.to_query_pairs());
        let resp = self.send(req).await?;
        resp.json::<Vec<Value>>()
            .await
            .map_err(|e| BackendError::decode(e.to_string()))
    }

    async fn count(&self, query: &ViewQuery) -> BackendResult<u64> {
        let req = self
            .request(Method::HEAD, &self.rest_url(&query.view))
            .await
            .header("Prefer", "count=exact")
            .query(&query.to_query_pairs());
        let resp = self.send(req).await?;
        let range = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| BackendError::decode("missing Content-Range header"))?;
        parse_content_range_total(range)
    }

    async fn rpc(&self, procedure: &str, params: Value) -> BackendResult<Value> {
        let req = self
            .request(Method::POST, &self.rest_url(&format!("rpc/{procedure}")))
            .await
            .json(&params);
        let resp = self.send(req).await?;
        let body = resp
            .text()
            .await
            .map_err(|e| BackendError::transport(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`.
fn parse_content_range_total(header: &str) -> BackendResult<u64> {
    let (_, total) = header
        .rsplit_once('/')
        .ok_or_else(|| BackendError::decode(format!("malformed Content-Range: {header}")))?;
    total
        .trim()
        .parse::<u64>()
        .map_err(|_| BackendError::decode(format!("Content-Range has no exact total: {header}")))
}

/// Human-readable message from an error body, falling back to the status line.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(Value::String(msg)) = map.get(key) {
                if !msg.is_empty() {
                    return msg.clone();
                }
            }
        }
    }
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
