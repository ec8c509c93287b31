//! `parallax-app`: the stateful layer between the data wrappers and whatever
//! renders them.
//!
//! - [`SessionStore`] owns sign-in, sign-out and the active-company binding.
//! - [`TenantContextStore`] owns the tenant context and company/branch switching.
//! - [`shell`], [`selectors`] and [`pages`] are view-models: they read the
//!   stores through handles and decide what to show.
//!
//! Each store is the single writer of its state. Readers subscribe through a
//! handle and only ever see whole-value replacements.

pub mod navigator;
pub mod pages;
pub mod selectors;
pub mod session;
pub mod shell;
pub mod tenant;

pub use navigator::{Navigator, RecordingNavigator, TracingNavigator};
pub use session::{SessionHandle, SessionState, SessionStore};
pub use tenant::{TenantContext, TenantContextHandle, TenantContextStore};
