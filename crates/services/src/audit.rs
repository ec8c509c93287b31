use serde::{Deserialize, Serialize};
use serde_json::Value;

use parallax_backend::{BackendClient, Direction, ViewQuery};
use parallax_core::{CompanyId, UserId};

use crate::ServiceResponse;
use crate::normalize::{or_empty, present};

const AUDIT_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: String,
    pub action_type: String,
    pub actor_user_id: Option<UserId>,
    pub actor_email: String,
    pub actor_name: String,
    pub target_user_id: Option<UserId>,
    pub target_email: Option<String>,
    pub target_name: Option<String>,
    pub company_id: CompanyId,
    pub metadata: Option<Value>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
struct AuditRow {
    id: String,
    #[serde(default)]
    action_type: Option<String>,
    #[serde(default)]
    actor_user_id: Option<UserId>,
    #[serde(default)]
    actor_email: Option<String>,
    #[serde(default)]
    actor_name: Option<String>,
    #[serde(default)]
    target_user_id: Option<UserId>,
    #[serde(default)]
    target_email: Option<String>,
    #[serde(default)]
    target_name: Option<String>,
    company_id: CompanyId,
    #[serde(default)]
    metadata: Option<Value>,
    #[serde(default)]
    created_at: Option<String>,
}

/// Most recent audit entries for a company, newest first.
pub async fn fetch_audit_logs(client: &BackendClient, company: CompanyId) -> ServiceResponse<Vec<AuditLog>> {
    let query = ViewQuery::new("view_audit_logs")
        .eq("company_id", company)
        .order_by("created_at", Direction::Descending)
        .limit(AUDIT_LIMIT);
    let result = client.fetch_rows::<AuditRow>(&query).await.map(|rows| {
        rows.into_iter()
            .map(|r| AuditLog {
                id: r.id,
                action_type: or_empty(r.action_type),
                actor_user_id: r.actor_user_id,
                actor_email: or_empty(r.actor_email),
                actor_name: or_empty(r.actor_name),
                target_user_id: r.target_user_id,
                target_email: present(r.target_email),
                target_name: present(r.target_name),
                company_id: r.company_id,
                metadata: r.metadata.filter(|m| !m.is_null()),
                created_at: r.created_at.unwrap_or_default(),
            })
            .collect()
    });
    ServiceResponse::from_result("fetch_audit_logs", result)
}
