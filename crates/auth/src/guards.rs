//! Route guards modelled as plain state machines.
//!
//! - [`AuthGate`] blocks rendering until identity and tenant binding are resolved.
//! - [`RoleGate`] renders a fallback when the resolved role is not allowed.
//!
//! Both are front-end conveniences. The backend must enforce the same policy on
//! its own; never treat a passing gate as authorization.

use crate::{ActiveCompanyBinding, Identity, Role};

/// Client-side route for the login entry point.
pub const LOGIN_ROUTE: &str = "/login";

pub const NO_ACTIVE_COMPANY_MESSAGE: &str =
    "No active company found. Contact your administrator.";

pub const ACCESS_RESTRICTED_MESSAGE: &str = "You do not have permission to access this area.";

/// What a guarded route should put on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateView {
    /// Neutral placeholder; nothing conclusive yet.
    Loading,
    /// Navigate (client-side) to the given route and render nothing else.
    Redirect(&'static str),
    /// Signed in, but no tenant binding. Dead end: bindings are provisioned
    /// out-of-band, so there is no self-service recovery.
    ContactAdministrator,
    /// Generic "access restricted" fallback from a role gate.
    AccessRestricted,
    /// Render the guarded content.
    Children,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AuthGateState {
    Checking,
    Unauthenticated,
    AuthenticatedNoTenant,
    Ready,
}

/// Inputs that move the authentication gate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AuthGateEvent {
    /// Session loading started (app mount or sign-in attempt).
    LoadStarted,
    /// Session loading finished.
    Resolved { authenticated: bool, has_binding: bool },
    /// The user signed out.
    SignedOut,
}

impl AuthGateState {
    /// Pure transition function.
    pub fn next(self, event: AuthGateEvent) -> Self {
        match event {
            AuthGateEvent::LoadStarted => AuthGateState::Checking,
            AuthGateEvent::Resolved {
                authenticated: false,
                ..
            } => AuthGateState::Unauthenticated,
            AuthGateEvent::Resolved {
                authenticated: true,
                has_binding: false,
            } => AuthGateState::AuthenticatedNoTenant,
            AuthGateEvent::Resolved {
                authenticated: true,
                has_binding: true,
            } => AuthGateState::Ready,
            AuthGateEvent::SignedOut => AuthGateState::Unauthenticated,
        }
    }

    pub fn view(self) -> GateView {
        match self {
            // Never redirect while checking: the session may still resolve.
            AuthGateState::Checking => GateView::Loading,
            AuthGateState::Unauthenticated => GateView::Redirect(LOGIN_ROUTE),
            AuthGateState::AuthenticatedNoTenant => GateView::ContactAdministrator,
            AuthGateState::Ready => GateView::Children,
        }
    }
}

/// Authentication gate: derives its state from a session snapshot.
#[derive(Debug, Copy, Clone, Default)]
pub struct AuthGate;

impl AuthGate {
    pub fn state(
        loading: bool,
        identity: Option<&Identity>,
        binding: Option<&ActiveCompanyBinding>,
    ) -> AuthGateState {
        if loading {
            return AuthGateState::Checking;
        }
        AuthGateState::Checking.next(AuthGateEvent::Resolved {
            authenticated: identity.is_some(),
            has_binding: binding.is_some(),
        })
    }

    pub fn evaluate(
        loading: bool,
        identity: Option<&Identity>,
        binding: Option<&ActiveCompanyBinding>,
    ) -> GateView {
        Self::state(loading, identity, binding).view()
    }
}

/// Role gate for a page: an allow-list of roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGate {
    allowed: Vec<Role>,
}

impl RoleGate {
    pub fn new(allowed: &[Role]) -> Self {
        Self {
            allowed: allowed.to_vec(),
        }
    }

    pub fn allowed(&self) -> &[Role] {
        &self.allowed
    }

    pub fn evaluate(&self, loading: bool, role: Option<&Role>) -> GateView {
        // Fail open while the tenant context loads so pages don't flash
        // "access restricted". Intentional; the backend still filters the data.
        if loading {
            return GateView::Children;
        }
        match role {
            Some(r) if r.is_in(&self.allowed) => GateView::Children,
            _ => GateView::AccessRestricted,
        }
    }
}
