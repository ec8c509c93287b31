use serde::{Deserialize, Serialize};
use serde_json::json;

use parallax_backend::{BackendClient, Direction, ViewQuery};
use parallax_core::{BranchId, CompanyId};

use crate::ServiceResponse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Branch {
    pub id: BranchId,
    pub company_id: CompanyId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub client_count: Option<u64>,
    #[serde(default)]
    pub professional_count: Option<u64>,
}

/// Branches of `company` visible to the user, by name.
pub async fn fetch_my_branches(client: &BackendClient, company: CompanyId) -> ServiceResponse<Vec<Branch>> {
    let query = ViewQuery::new("view_my_branches")
        .eq("company_id", company)
        .order_by("name", Direction::Ascending);
    ServiceResponse::from_result("fetch_my_branches", client.fetch_rows(&query).await)
}

/// `None` selects "all branches".
pub async fn set_active_branch(client: &BackendClient, branch: Option<BranchId>) -> ServiceResponse<()> {
    ServiceResponse::from_result(
        "set_active_branch",
        client
            .call_unit("set_active_branch", json!({ "branch_id": branch }))
            .await,
    )
}
