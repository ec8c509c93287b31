//! Tenant Context Store: the one read model of {user, company, branch, role}.
//!
//! Every load replaces the whole context. A company or branch switch either
//! lands completely (procedure, then a full reload) or leaves the data fields
//! exactly as they were.

use serde::Serialize;
use tokio::sync::watch;

use parallax_auth::{GateView, Role, RoleGate, RoleState};
use parallax_backend::BackendClient;
use parallax_core::{BranchId, CompanyId, UserId};
use parallax_services::{UserContextData, branches, companies, user_context};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantContext {
    pub user_id: Option<UserId>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub company_id: Option<CompanyId>,
    pub company_name: Option<String>,
    /// `None` means "all branches".
    pub branch_id: Option<BranchId>,
    pub role: Option<Role>,
    pub loading: bool,
    pub error: Option<String>,
}

impl TenantContext {
    /// Empty and loading: the state at mount.
    pub fn initial() -> Self {
        Self::from_data(UserContextData::default(), true, None)
    }

    fn from_data(data: UserContextData, loading: bool, error: Option<String>) -> Self {
        Self {
            user_id: data.user_id,
            full_name: data.full_name,
            email: data.email,
            company_id: data.company_id,
            company_name: data.company_name,
            branch_id: data.branch_id,
            role: data.role,
            loading,
            error,
        }
    }

    /// Whether the role is still unknown because the first load has not landed.
    ///
    /// The sidebar keeps the previous role during a switch; page gates fail
    /// open for the whole of any load.
    pub fn role_pending(&self) -> bool {
        self.loading && self.role.is_none()
    }

    pub fn role_state(&self) -> RoleState<'_> {
        if self.role_pending() {
            RoleState::Loading
        } else {
            RoleState::Known(self.role.as_ref())
        }
    }

    pub fn role_gate(&self, allowed: &[Role]) -> GateView {
        RoleGate::new(allowed).evaluate(self.loading, self.role.as_ref())
    }

    pub fn has_role(&self, allowed: &[Role]) -> bool {
        self.role.as_ref().is_some_and(|r| r.is_in(allowed))
    }

    /// Data fields only; `loading` and `error` are ignored.
    pub fn same_data(&self, other: &TenantContext) -> bool {
        self.user_id == other.user_id
            && self.full_name == other.full_name
            && self.email == other.email
            && self.company_id == other.company_id
            && self.company_name == other.company_name
            && self.branch_id == other.branch_id
            && self.role == other.role
    }
}

impl Default for TenantContext {
    fn default() -> Self {
        Self::initial()
    }
}

/// Read-only view of the tenant context.
#[derive(Debug, Clone)]
pub struct TenantContextHandle {
    rx: watch::Receiver<TenantContext>,
}

impl TenantContextHandle {
    pub fn snapshot(&self) -> TenantContext {
        self.rx.borrow().clone()
    }

    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Wait until no load or switch is in flight.
    pub async fn settled(&mut self) -> TenantContext {
        let waited = self.rx.wait_for(|c| !c.loading).await.map(|c| c.clone()).ok();
        waited.unwrap_or_else(|| self.rx.borrow().clone())
    }
}

/// Single writer of the tenant context.
///
/// Switches are not queued: callers disable their controls while `loading`
/// is set so that two reloads never race.
pub struct TenantContextStore {
    client: BackendClient,
    state: watch::Sender<TenantContext>,
}

impl core::fmt::Debug for TenantContextStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TenantContextStore")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl TenantContextStore {
    pub fn new(client: BackendClient) -> Self {
        let (state, _) = watch::channel(TenantContext::initial());
        Self { client, state }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    pub fn handle(&self) -> TenantContextHandle {
        TenantContextHandle {
            rx: self.state.subscribe(),
        }
    }

    pub fn snapshot(&self) -> TenantContext {
        self.state.borrow().clone()
    }

    /// Replace the context with a fresh read. On failure every data field is cleared.
    pub async fn load_user_context(&self) {
        let next = match user_context::fetch_user_context(&self.client).await.into_result() {
            Ok(data) => {
                tracing::debug!(company_id = ?data.company_id, role = ?data.role, "tenant context loaded");
                TenantContext::from_data(data, false, None)
            }
            Err(message) => TenantContext::from_data(UserContextData::default(), false, Some(message)),
        };
        self.state.send_replace(next);
    }

    pub async fn switch_company(&self, company: CompanyId) -> bool {
        self.begin_switch();
        let response = companies::set_active_company(&self.client, company).await;
        self.finish_switch(response.error).await
    }

    /// `None` selects "all branches".
    pub async fn switch_branch(&self, branch: Option<BranchId>) -> bool {
        self.begin_switch();
        let response = branches::set_active_branch(&self.client, branch).await;
        self.finish_switch(response.error).await
    }

    fn begin_switch(&self) {
        self.state.send_modify(|c| {
            c.loading = true;
            c.error = None;
        });
    }

    async fn finish_switch(&self, error: Option<String>) -> bool {
        match error {
            None => {
                self.load_user_context().await;
                self.state.borrow().error.is_none()
            }
            Some(message) => {
                tracing::warn!(error = %message, "switch rejected; keeping the current tenant");
                self.state.send_modify(|c| {
                    c.loading = false;
                    c.error = Some(message);
                });
                false
            }
        }
    }
}
