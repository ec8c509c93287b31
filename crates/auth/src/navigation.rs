//! Navigation taxonomy and the role visibility resolver.
//!
//! The taxonomy is static configuration: an ordered list of groups, each with an
//! ordered list of items. Groups and items may carry an allow-list of roles;
//! `None` means "visible to every role".

use std::sync::LazyLock;

use serde::Serialize;

use crate::Role;

/// One navigable entry in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: String,
    pub icon: String,
    pub path: String,
    pub roles: Option<Vec<Role>>,
}

/// A titled, expandable section of the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavGroup {
    pub title: String,
    pub icon: String,
    pub items: Vec<NavItem>,
    pub roles: Option<Vec<Role>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationTaxonomy {
    pub groups: Vec<NavGroup>,
}

/// What the resolver knows about the current user's role.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RoleState<'a> {
    /// Tenant context is still loading.
    Loading,
    /// Context resolved; the user may still have no role.
    Known(Option<&'a Role>),
}

/// A group that survived filtering, with only its visible items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleGroup<'a> {
    pub title: &'a str,
    pub icon: &'a str,
    pub items: Vec<&'a NavItem>,
}

impl NavItem {
    pub fn new(label: &str, icon: &str, path: &str) -> Self {
        Self {
            label: label.to_string(),
            icon: icon.to_string(),
            path: path.to_string(),
            roles: None,
        }
    }

    pub fn restricted_to(mut self, roles: &[Role]) -> Self {
        self.roles = Some(roles.to_vec());
        self
    }

    pub fn is_visible(&self, role: RoleState<'_>) -> bool {
        allows(self.roles.as_deref(), role)
    }
}

impl NavGroup {
    pub fn new(title: &str, icon: &str, items: Vec<NavItem>) -> Self {
        Self {
            title: title.to_string(),
            icon: icon.to_string(),
            items,
            roles: None,
        }
    }

    pub fn restricted_to(mut self, roles: &[Role]) -> Self {
        self.roles = Some(roles.to_vec());
        self
    }

    /// A group renders only if its own restriction passes *and* at least one
    /// child item is visible; empty expandable sections never render.
    pub fn is_visible(&self, role: RoleState<'_>) -> bool {
        allows(self.roles.as_deref(), role) && self.items.iter().any(|i| i.is_visible(role))
    }
}

impl NavigationTaxonomy {
    pub fn new(groups: Vec<NavGroup>) -> Self {
        Self { groups }
    }

    /// The Parallax sidebar.
    pub fn standard() -> &'static NavigationTaxonomy {
        &STANDARD
    }

    /// Filter the taxonomy down to what `role` may see, preserving order.
    pub fn visible(&self, role: RoleState<'_>) -> Vec<VisibleGroup<'_>> {
        self.groups
            .iter()
            .filter(|g| g.is_visible(role))
            .map(|g| VisibleGroup {
                title: &g.title,
                icon: &g.icon,
                items: g.items.iter().filter(|i| i.is_visible(role)).collect(),
            })
            .collect()
    }

    /// Find the item for a route path, if the taxonomy has one.
    pub fn find_item(&self, path: &str) -> Option<&NavItem> {
        self.groups
            .iter()
            .flat_map(|g| g.items.iter())
            .find(|i| i.path == path)
    }
}

fn allows(restriction: Option<&[Role]>, role: RoleState<'_>) -> bool {
    match (restriction, role) {
        (None, _) => true,
        // Fail open while loading: layout only, no data is fetched before the
        // role is known and page-level role gates do the real gating. Do not
        // turn this into a deny.
        (Some(_), RoleState::Loading) => true,
        (Some(allowed), RoleState::Known(Some(r))) => r.is_in(allowed),
        (Some(_), RoleState::Known(None)) => false,
    }
}

static STANDARD: LazyLock<NavigationTaxonomy> = LazyLock::new(|| {
    let admin = [Role::ADMIN];
    let staff = [Role::ADMIN, Role::PROFESSIONAL];

    NavigationTaxonomy::new(vec![
        NavGroup::new("Overview", "📊", vec![NavItem::new("Overview", "📊", "/")]),
        NavGroup::new(
            "Operations",
            "📅",
            vec![
                NavItem::new("Schedule", "📅", "/agenda"),
                NavItem::new("Appointments", "✅", "/operacao/atendimentos").restricted_to(&staff),
                NavItem::new("Services", "💼", "/servicos"),
            ],
        ),
        NavGroup::new(
            "People",
            "👥",
            vec![
                NavItem::new("Clients", "👤", "/pessoas/clientes").restricted_to(&staff),
                NavItem::new("Professionals", "🧑", "/pessoas/profissionais").restricted_to(&admin),
            ],
        ),
        NavGroup::new(
            "Finance",
            "💰",
            vec![
                NavItem::new("Cash register", "💵", "/financeiro"),
                NavItem::new("Reports", "📈", "/sistema/relatorios"),
            ],
        )
        .restricted_to(&admin),
        NavGroup::new(
            "System",
            "⚙️",
            vec![
                NavItem::new("Settings", "⚙️", "/sistema"),
                NavItem::new("Users", "👥", "/sistema/usuarios"),
                NavItem::new("Audit", "🔒", "/sistema/auditoria"),
            ],
        )
        .restricted_to(&admin),
    ])
});
