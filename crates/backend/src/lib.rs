//! `parallax-backend`: the remote data backend, as seen from the client.
//!
//! The backend exposes three surfaces:
//! - an auth endpoint (password sign-in, current user, sign-out),
//! - read-only **views**, filtered by tenant,
//! - named **remote procedures** for every mutation.
//!
//! The client never writes to storage tables directly. All authorization and
//! business rules live server-side.

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod query;

pub use backend::{AuthUser, Backend};
pub use client::BackendClient;
pub use config::BackendConfig;
pub use error::{BackendError, BackendResult};
pub use http::HttpBackend;
pub use memory::{FailurePoint, InMemoryBackend, ProcedureCall, Views};
pub use query::{Direction, Filter, FilterOp, FilterValue, ViewQuery};
