use serde::{Deserialize, Serialize};
use serde_json::json;

use parallax_backend::{BackendClient, Direction, ViewQuery};
use parallax_core::CompanyId;

use crate::ServiceResponse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    #[serde(default)]
    pub name: String,
}

/// Companies the current user belongs to, by name.
pub async fn get_my_companies(client: &BackendClient) -> ServiceResponse<Vec<Company>> {
    let query = ViewQuery::new("view_my_companies")
        .select(&["id", "name"])
        .order_by("name", Direction::Ascending);
    ServiceResponse::from_result("get_my_companies", client.fetch_rows(&query).await)
}

pub async fn set_active_company(client: &BackendClient, company: CompanyId) -> ServiceResponse<()> {
    ServiceResponse::from_result(
        "set_active_company",
        client
            .call_unit("set_active_company", json!({ "company_id": company }))
            .await,
    )
}
