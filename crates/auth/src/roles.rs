use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role tag attached to a user's company membership.
///
/// Roles are opaque strings at this layer: what a role authorizes is decided
/// server-side. The client only compares roles for equality against allow-lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    pub const PROFESSIONAL: Role = Role(Cow::Borrowed("professional"));
    pub const CLIENT: Role = Role(Cow::Borrowed("client"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when this role appears in `allowed`.
    pub fn is_in(&self, allowed: &[Role]) -> bool {
        allowed.iter().any(|r| r == self)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self(Cow::Owned(value.to_string()))
    }
}
