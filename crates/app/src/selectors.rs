//! Company and branch pickers in the header.

use serde::Serialize;

use parallax_auth::Role;
use parallax_backend::BackendClient;
use parallax_core::{BranchId, CompanyId};
use parallax_services::branches::{self, Branch};
use parallax_services::companies::{self, Company};

use crate::{TenantContext, TenantContextStore};

pub const ALL_BRANCHES_LABEL: &str = "All branches";
pub const UNKNOWN_BRANCH_LABEL: &str = "Branch";

/// Result of picking an entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Already active, or not selectable; nothing was sent.
    Unchanged,
    Switched,
    /// The store carries the error.
    Failed,
}

impl SwitchOutcome {
    fn from_switch(ok: bool) -> Self {
        if ok { Self::Switched } else { Self::Failed }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchOption {
    pub id: Option<BranchId>,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct BranchSelector {
    branches: Vec<Branch>,
    loading: bool,
}

impl BranchSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Only staff with a company scope pick branches.
    pub fn is_visible(ctx: &TenantContext) -> bool {
        ctx.company_id.is_some() && ctx.has_role(&[Role::ADMIN, Role::PROFESSIONAL])
    }

    /// Refresh the list for the context's company. A failed read leaves an empty list.
    pub async fn load(&mut self, client: &BackendClient, ctx: &TenantContext) {
        let company = match ctx.company_id {
            Some(company) if Self::is_visible(ctx) => company,
            _ => {
                self.branches.clear();
                return;
            }
        };
        self.loading = true;
        self.branches = branches::fetch_my_branches(client, company)
            .await
            .data
            .unwrap_or_default();
        self.loading = false;
    }

    pub fn label(&self, ctx: &TenantContext) -> String {
        match ctx.branch_id {
            None => ALL_BRANCHES_LABEL.to_string(),
            Some(id) => self
                .branches
                .iter()
                .find(|b| b.id == id)
                .map(|b| b.name.clone())
                .unwrap_or_else(|| UNKNOWN_BRANCH_LABEL.to_string()),
        }
    }

    /// "All branches" first, admins only; then every branch.
    pub fn options(&self, ctx: &TenantContext) -> Vec<BranchOption> {
        let mut options = Vec::with_capacity(self.branches.len() + 1);
        if ctx.has_role(&[Role::ADMIN]) {
            options.push(BranchOption {
                id: None,
                label: ALL_BRANCHES_LABEL.to_string(),
                active: ctx.branch_id.is_none(),
            });
        }
        options.extend(self.branches.iter().map(|b| BranchOption {
            id: Some(b.id),
            label: b.name.clone(),
            active: ctx.branch_id == Some(b.id),
        }));
        options
    }

    pub fn is_disabled(&self, ctx: &TenantContext) -> bool {
        ctx.loading || self.loading || self.branches.is_empty()
    }

    pub async fn select(
        &self,
        store: &TenantContextStore,
        ctx: &TenantContext,
        branch: Option<BranchId>,
    ) -> SwitchOutcome {
        if branch == ctx.branch_id || self.is_disabled(ctx) {
            return SwitchOutcome::Unchanged;
        }
        if branch.is_none() && !ctx.has_role(&[Role::ADMIN]) {
            return SwitchOutcome::Unchanged;
        }
        SwitchOutcome::from_switch(store.switch_branch(branch).await)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyOption {
    pub id: CompanyId,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CompanySelector {
    companies: Vec<Company>,
    loading: bool,
    error: Option<String>,
}

impl CompanySelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn load(&mut self, client: &BackendClient) {
        self.loading = true;
        let response = companies::get_my_companies(client).await;
        self.companies = response.data.unwrap_or_default();
        self.error = response.error;
        self.loading = false;
    }

    pub fn options(&self, ctx: &TenantContext) -> Vec<CompanyOption> {
        self.companies
            .iter()
            .map(|c| CompanyOption {
                id: c.id,
                name: c.name.clone(),
                active: ctx.company_id == Some(c.id),
            })
            .collect()
    }

    pub fn is_disabled(&self, ctx: &TenantContext) -> bool {
        ctx.loading || self.loading
    }

    pub async fn select(
        &self,
        store: &TenantContextStore,
        ctx: &TenantContext,
        company: CompanyId,
    ) -> SwitchOutcome {
        if ctx.company_id == Some(company) || self.is_disabled(ctx) {
            return SwitchOutcome::Unchanged;
        }
        SwitchOutcome::from_switch(store.switch_company(company).await)
    }
}
