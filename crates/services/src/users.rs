//! Company membership and invites. Every mutation is a remote procedure; the
//! backend validates the email, role and company scope.

use serde::{Deserialize, Serialize};
use serde_json::json;

use parallax_backend::{BackendClient, Direction, ViewQuery};
use parallax_core::{CompanyId, InviteId, UserId};

use crate::ServiceResponse;
use crate::normalize::or_empty;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingInvite {
    pub id: InviteId,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
struct InviteRow {
    id: InviteId,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

pub async fn add_company_user(client: &BackendClient, user_email: &str, role_key: &str) -> ServiceResponse<()> {
    let params = json!({ "user_email": user_email, "role_key": role_key });
    ServiceResponse::from_result(
        "add_company_user",
        client.call_unit("add_company_user", params).await,
    )
}

pub async fn update_user_role(client: &BackendClient, user: UserId, role_key: &str) -> ServiceResponse<()> {
    let params = json!({ "user_id": user, "role_key": role_key });
    ServiceResponse::from_result(
        "update_company_user_role",
        client.call_unit("update_company_user_role", params).await,
    )
}

pub async fn remove_user(client: &BackendClient, user: UserId) -> ServiceResponse<()> {
    ServiceResponse::from_result(
        "remove_company_user",
        client
            .call_unit("remove_company_user", json!({ "user_id": user }))
            .await,
    )
}

pub async fn invite_company_user(client: &BackendClient, email: &str, role_key: &str) -> ServiceResponse<()> {
    let params = json!({ "email": email, "role_key": role_key });
    ServiceResponse::from_result(
        "invite_company_user",
        client.call_unit("invite_company_user", params).await,
    )
}

pub async fn cancel_invite(client: &BackendClient, invite: InviteId) -> ServiceResponse<()> {
    ServiceResponse::from_result(
        "cancel_invite",
        client
            .call_unit("cancel_invite", json!({ "invite_id": invite }))
            .await,
    )
}

pub async fn accept_invite(client: &BackendClient, token: &str) -> ServiceResponse<()> {
    ServiceResponse::from_result(
        "accept_invite",
        client.call_unit("accept_invite", json!({ "token": token })).await,
    )
}

/// Invites not yet accepted or cancelled, newest first.
pub async fn fetch_pending_invites(
    client: &BackendClient,
    company: CompanyId,
) -> ServiceResponse<Vec<PendingInvite>> {
    let query = ViewQuery::new("view_pending_invites")
        .eq("company_id", company)
        .order_by("created_at", Direction::Descending);
    let result = client.fetch_rows::<InviteRow>(&query).await.map(|rows| {
        rows.into_iter()
            .map(|r| PendingInvite {
                id: r.id,
                email: or_empty(r.email),
                role: or_empty(r.role),
                created_at: r.created_at.unwrap_or_default(),
            })
            .collect()
    });
    ServiceResponse::from_result("fetch_pending_invites", result)
}
