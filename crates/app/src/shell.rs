//! Navigation shell: the sidebar and header around every authenticated page.

use serde::Serialize;

use parallax_auth::{NavigationTaxonomy, VisibleGroup};

use crate::TenantContext;

pub const DEFAULT_EXPANDED_GROUP: &str = "Overview";

/// Sidebar state. At most one group is expanded at a time.
#[derive(Debug, Clone)]
pub struct Sidebar {
    taxonomy: &'static NavigationTaxonomy,
    expanded: Option<String>,
}

impl Default for Sidebar {
    fn default() -> Self {
        Self::new(NavigationTaxonomy::standard())
    }
}

impl Sidebar {
    pub fn new(taxonomy: &'static NavigationTaxonomy) -> Self {
        Self {
            taxonomy,
            expanded: Some(DEFAULT_EXPANDED_GROUP.to_string()),
        }
    }

    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    /// Expand `title`, collapsing whatever was open; toggling the open group closes it.
    pub fn toggle(&mut self, title: &str) {
        if self.expanded.as_deref() == Some(title) {
            self.expanded = None;
        } else {
            self.expanded = Some(title.to_string());
        }
    }

    pub fn groups<'a>(&'a self, ctx: &'a TenantContext) -> Vec<VisibleGroup<'a>> {
        self.taxonomy.visible(ctx.role_state())
    }

    /// Whether `route` is reachable from the sidebar for this context.
    pub fn can_reach(&self, ctx: &TenantContext, route: &str) -> bool {
        self.groups(ctx)
            .iter()
            .flat_map(|g| g.items.iter())
            .any(|i| i.path == route)
    }
}

/// Header line: who is signed in, for which company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub user_name: String,
    pub company_name: Option<String>,
    pub role: Option<String>,
}

impl Header {
    pub fn from_context(ctx: &TenantContext) -> Self {
        let user_name = ctx
            .full_name
            .clone()
            .or_else(|| ctx.email.clone())
            .unwrap_or_default();
        Self {
            user_name,
            company_name: ctx.company_name.clone(),
            role: ctx.role.as_ref().map(|r| r.as_str().to_string()),
        }
    }
}
