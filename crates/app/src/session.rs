//! Session Store: sign-in, sign-out, and the active-company binding.
//!
//! A session is usable only with a binding. Sign-in that authenticates but
//! cannot load a binding is reported as a failure and leaves nothing behind.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use parallax_auth::{
    ActiveCompanyBinding, AuthGate, AuthGateState, GateView, Identity, LOGIN_ROUTE,
    NO_ACTIVE_COMPANY_MESSAGE,
};
use parallax_backend::{AuthUser, BackendClient};
use parallax_services::auth;

use crate::Navigator;

pub const LOGIN_FAILED: &str = "Login failed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub binding: Option<ActiveCompanyBinding>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    /// State at process start, before `load_session` resolves.
    pub fn initial() -> Self {
        Self {
            identity: None,
            binding: None,
            loading: true,
            error: None,
        }
    }

    fn signed_out(error: Option<String>) -> Self {
        Self {
            identity: None,
            binding: None,
            loading: false,
            error,
        }
    }

    pub fn gate_state(&self) -> AuthGateState {
        AuthGate::state(self.loading, self.identity.as_ref(), self.binding.as_ref())
    }

    pub fn gate_view(&self) -> GateView {
        self.gate_state().view()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initial()
    }
}

fn identity(user: AuthUser) -> Identity {
    Identity {
        user_id: user.id,
        email: user.email,
        display_name: user.full_name,
    }
}

/// Read-only view of the session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<SessionState>,
}

impl SessionHandle {
    pub fn snapshot(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    pub fn gate_view(&self) -> GateView {
        self.rx.borrow().gate_view()
    }

    /// Wait for the next replacement. `false` once the store is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Wait until the session is no longer loading.
    pub async fn resolved(&mut self) -> SessionState {
        let waited = self.rx.wait_for(|s| !s.loading).await.map(|s| s.clone()).ok();
        waited.unwrap_or_else(|| self.rx.borrow().clone())
    }
}

pub struct SessionStore {
    client: BackendClient,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<SessionState>,
}

impl core::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(client: BackendClient, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(SessionState::initial());
        Self {
            client,
            navigator,
            state,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            rx: self.state.subscribe(),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    fn publish(&self, next: SessionState) {
        self.state.send_replace(next);
    }

    fn start_loading(&self) {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
    }

    /// Authenticate, then load the binding. Both must succeed.
    pub async fn sign_in(&self, email: &str, password: &str) -> bool {
        self.start_loading();

        let user = match auth::login(&self.client, email, password).await.into_result() {
            Ok(user) => user,
            Err(message) => {
                let message = if message.is_empty() {
                    LOGIN_FAILED.to_string()
                } else {
                    message
                };
                self.publish(SessionState::signed_out(Some(message)));
                return false;
            }
        };

        match auth::load_active_company(&self.client).await.into_result() {
            Ok(binding) => {
                tracing::info!(
                    user_id = %user.id,
                    company_id = %binding.company_id,
                    "signed in"
                );
                self.publish(SessionState {
                    identity: Some(identity(user)),
                    binding: Some(binding),
                    loading: false,
                    error: None,
                });
                true
            }
            Err(message) => {
                tracing::warn!(user_id = %user.id, error = %message, "signed in without an active company");
                // Drop the backend session too, so a restart does not resurrect it.
                if let Some(error) = auth::logout(&self.client).await.error {
                    tracing::warn!(%error, "backend sign-out failed after missing active company");
                }
                self.publish(SessionState::signed_out(Some(message)));
                false
            }
        }
    }

    /// Never fails: backend errors are logged and local state is cleared anyway.
    pub async fn sign_out(&self) {
        if let Some(error) = auth::logout(&self.client).await.error {
            tracing::warn!(%error, "backend sign-out failed; clearing local session");
        }
        self.publish(SessionState::signed_out(None));
        self.navigator.navigate(LOGIN_ROUTE);
    }

    /// Recover an existing session without credentials.
    ///
    /// No session is a normal outcome. A session without a binding is kept so
    /// the gate can show the contact-administrator state.
    pub async fn load_session(&self) {
        self.start_loading();

        let user = match auth::current_user(&self.client).await.into_result() {
            Ok(Some(user)) => user,
            Ok(None) => {
                self.publish(SessionState::signed_out(None));
                return;
            }
            Err(message) => {
                self.publish(SessionState::signed_out(Some(message)));
                return;
            }
        };

        let next = match auth::load_active_company(&self.client).await.into_result() {
            Ok(binding) => SessionState {
                identity: Some(identity(user)),
                binding: Some(binding),
                loading: false,
                error: None,
            },
            Err(message) => {
                tracing::warn!(user_id = %user.id, error = %message, "session has no active company");
                SessionState {
                    identity: Some(identity(user)),
                    binding: None,
                    loading: false,
                    error: Some(NO_ACTIVE_COMPANY_MESSAGE.to_string()),
                }
            }
        };
        self.publish(next);
    }
}
