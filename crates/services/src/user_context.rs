//! The tenant-context read.

use serde::{Deserialize, Serialize};

use parallax_auth::Role;
use parallax_backend::{BackendClient, BackendError, BackendResult, ViewQuery};
use parallax_core::{BranchId, CompanyId, UserId};

use crate::ServiceResponse;
use crate::normalize::present;

pub const NO_USER_CONTEXT: &str = "No user context found";
pub const NO_COMPANY_SCOPE: &str = "Tenant context has no confirmed company scope";

/// One row of `view_user_context`, with empty strings folded to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContextData {
    pub user_id: Option<UserId>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub company_id: Option<CompanyId>,
    pub company_name: Option<String>,
    pub branch_id: Option<BranchId>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
struct UserContextRow {
    #[serde(default)]
    user_id: Option<UserId>,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    company_id: Option<CompanyId>,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    branch_id: Option<BranchId>,
    #[serde(default)]
    role: Option<String>,
}

impl From<UserContextRow> for UserContextData {
    fn from(row: UserContextRow) -> Self {
        Self {
            user_id: row.user_id,
            full_name: present(row.full_name),
            email: present(row.email),
            company_id: row.company_id,
            company_name: present(row.company_name),
            branch_id: row.branch_id,
            role: present(row.role).map(|r| Role::from(r.as_str())),
        }
    }
}

/// The active tenant context: the first row of `view_user_context`.
///
/// The view should yield one row per user. A second row is logged and ignored.
/// A row with a role but no company (or the reverse) is rejected.
pub async fn fetch_user_context(client: &BackendClient) -> ServiceResponse<UserContextData> {
    ServiceResponse::from_result("fetch_user_context", load(client).await)
}

async fn load(client: &BackendClient) -> BackendResult<UserContextData> {
    let query = ViewQuery::new("view_user_context").limit(2);
    let rows: Vec<UserContextRow> = client.fetch_rows(&query).await?;
    if rows.len() > 1 {
        tracing::warn!("view_user_context returned more than one row; using the first");
    }
    let data: UserContextData = rows
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::not_found(NO_USER_CONTEXT))?
        .into();

    if data.role.is_some() != data.company_id.is_some() {
        return Err(BackendError::rejected(NO_COMPANY_SCOPE));
    }
    Ok(data)
}
