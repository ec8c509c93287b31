//! System settings: company details, members, roles, plan and invites.

use serde::Serialize;

use parallax_backend::BackendClient;
use parallax_services::settings::{self, CompanyDetails, CompanyPlan, CompanyUser, Permission, RoleDefinition};
use parallax_services::users::{self, PendingInvite};

use super::{Page, PageView, Section, admit};
use crate::{TenantContext, TenantContextHandle};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPage {
    pub company: CompanyDetails,
    pub users: Section<Vec<CompanyUser>>,
    pub roles: Section<Vec<RoleDefinition>>,
    pub permissions: Section<Vec<Permission>>,
    pub plan: Section<Option<CompanyPlan>>,
    pub invites: Section<Vec<PendingInvite>>,
}

pub async fn open(client: &BackendClient, handle: &mut TenantContextHandle) -> PageView<SettingsPage> {
    let ctx = handle.settled().await;
    load(client, &ctx).await
}

pub async fn load(client: &BackendClient, ctx: &TenantContext) -> PageView<SettingsPage> {
    let company = match admit(Page::Settings, ctx) {
        Ok(company) => company,
        Err(view) => return view,
    };

    let (details, members, roles, permissions, plan, invites) = tokio::join!(
        settings::fetch_company_details(client, company),
        settings::fetch_company_users(client, company),
        settings::fetch_roles(client),
        settings::fetch_permissions(client),
        settings::fetch_company_plan(client, company),
        users::fetch_pending_invites(client, company),
    );

    match details.into_result() {
        Ok(company) => PageView::Ready(SettingsPage {
            company,
            users: Section::from_response(members),
            roles: Section::from_response(roles),
            permissions: Section::from_response(permissions),
            plan: Section::from_response(plan.map(Some)),
            invites: Section::from_response(invites),
        }),
        Err(message) => PageView::Failed(message),
    }
}
