//! Auth endpoint and the active-company binding.

use parallax_auth::ActiveCompanyBinding;
use parallax_backend::{AuthUser, BackendClient, ViewQuery};

use crate::ServiceResponse;

pub const NO_ACTIVE_COMPANY: &str = "No active company found for user";

pub async fn login(client: &BackendClient, email: &str, password: &str) -> ServiceResponse<AuthUser> {
    let result = match client.backend() {
        Ok(backend) => backend.sign_in_with_password(email, password).await,
        Err(e) => Err(e),
    };
    ServiceResponse::from_result("login", result)
}

pub async fn logout(client: &BackendClient) -> ServiceResponse<()> {
    let result = match client.backend() {
        Ok(backend) => backend.sign_out().await,
        Err(e) => Err(e),
    };
    ServiceResponse::from_result("logout", result)
}

/// `Ok(None)` (no session) is a normal answer, not an error.
pub async fn current_user(client: &BackendClient) -> ServiceResponse<Option<AuthUser>> {
    let result = match client.backend() {
        Ok(backend) => backend.current_user().await,
        Err(e) => Err(e),
    };
    ServiceResponse::from_result("current_user", result)
}

/// The signed-in user's authoritative (user, company, branch) row.
pub async fn load_active_company(client: &BackendClient) -> ServiceResponse<ActiveCompanyBinding> {
    let query = ViewQuery::new("user_active_company")
        .select(&["user_id", "company_id", "branch_id"])
        .limit(1);
    ServiceResponse::from_result(
        "load_active_company",
        client.fetch_one(&query, NO_ACTIVE_COMPANY).await,
    )
}
