//! `parallax-auth`: identity, roles, and role-gated navigation.
//!
//! Everything here is pure: no IO, no async, no rendering. The stores in
//! `parallax-app` feed these types and render whatever they decide.
//!
//! Nothing in this crate is a security boundary. The backend enforces the same
//! policies through row-level security; these checks only shape the UI.

pub mod guards;
pub mod identity;
pub mod navigation;
pub mod roles;

pub use guards::{
    ACCESS_RESTRICTED_MESSAGE, AuthGate, AuthGateEvent, AuthGateState, GateView, LOGIN_ROUTE,
    NO_ACTIVE_COMPANY_MESSAGE, RoleGate,
};
pub use identity::{ActiveCompanyBinding, Identity};
pub use navigation::{NavGroup, NavItem, NavigationTaxonomy, RoleState, VisibleGroup};
pub use roles::Role;
