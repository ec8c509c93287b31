//! Company settings: details, members, roles, permissions, plan.

use serde::{Deserialize, Serialize};

use parallax_backend::{BackendClient, Direction, ViewQuery};
use parallax_core::{CompanyId, UserId};

use crate::ServiceResponse;
use crate::normalize::{or_default, or_empty, present};

pub const COMPANY_NOT_FOUND: &str = "Company details not found";
pub const PLAN_NOT_FOUND: &str = "Company plan not found";
const DEFAULT_PLAN: &str = "Free";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetails {
    pub name: String,
    pub trade_name: String,
    pub document: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyUser {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub role: String,
}

/// A role as the settings page lists it (not to be confused with the tag on a membership).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: String,
    pub name: String,
    pub description: String,
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPlan {
    pub plan_name: String,
    pub max_users: u32,
    pub max_branches: u32,
    pub expires_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsRow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    trade_name: Option<String>,
    #[serde(default)]
    document: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserRow {
    user_id: UserId,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RoleRow {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PermissionRow {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    resource: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlanRow {
    #[serde(default)]
    plan_name: Option<String>,
    #[serde(default)]
    max_users: Option<u32>,
    #[serde(default)]
    max_branches: Option<u32>,
    #[serde(default)]
    expires_at: Option<String>,
}

pub async fn fetch_company_details(
    client: &BackendClient,
    company: CompanyId,
) -> ServiceResponse<CompanyDetails> {
    let query = ViewQuery::new("view_company_details").eq("id", company).limit(1);
    let result = client
        .fetch_one::<DetailsRow>(&query, COMPANY_NOT_FOUND)
        .await
        .map(|r| CompanyDetails {
            name: or_empty(r.name),
            trade_name: or_empty(r.trade_name),
            document: or_empty(r.document),
            email: or_empty(r.email),
            phone: or_empty(r.phone),
        });
    ServiceResponse::from_result("fetch_company_details", result)
}

pub async fn fetch_company_users(
    client: &BackendClient,
    company: CompanyId,
) -> ServiceResponse<Vec<CompanyUser>> {
    let query = ViewQuery::new("view_company_users").eq("company_id", company);
    let result = client.fetch_rows::<UserRow>(&query).await.map(|rows| {
        rows.into_iter()
            .map(|r| CompanyUser {
                id: r.user_id,
                full_name: or_empty(r.full_name),
                email: or_empty(r.email),
                role: or_empty(r.role),
            })
            .collect()
    });
    ServiceResponse::from_result("fetch_company_users", result)
}

pub async fn fetch_roles(client: &BackendClient) -> ServiceResponse<Vec<RoleDefinition>> {
    let query = ViewQuery::new("view_roles").order_by("name", Direction::Ascending);
    let result = client.fetch_rows::<RoleRow>(&query).await.map(|rows| {
        rows.into_iter()
            .map(|r| RoleDefinition {
                id: r.id,
                name: or_empty(r.name),
                description: or_empty(r.description),
            })
            .collect()
    });
    ServiceResponse::from_result("fetch_roles", result)
}

pub async fn fetch_permissions(client: &BackendClient) -> ServiceResponse<Vec<Permission>> {
    let query = ViewQuery::new("view_permissions").order_by("resource", Direction::Ascending);
    let result = client.fetch_rows::<PermissionRow>(&query).await.map(|rows| {
        rows.into_iter()
            .map(|r| Permission {
                id: r.id,
                name: or_empty(r.name),
                description: or_empty(r.description),
                resource: or_empty(r.resource),
            })
            .collect()
    });
    ServiceResponse::from_result("fetch_permissions", result)
}

pub async fn fetch_company_plan(client: &BackendClient, company: CompanyId) -> ServiceResponse<CompanyPlan> {
    let query = ViewQuery::new("view_company_plan")
        .eq("company_id", company)
        .limit(1);
    let result = client
        .fetch_one::<PlanRow>(&query, PLAN_NOT_FOUND)
        .await
        .map(|r| CompanyPlan {
            plan_name: or_default(r.plan_name, DEFAULT_PLAN),
            max_users: r.max_users.unwrap_or(0),
            max_branches: r.max_branches.unwrap_or(0),
            expires_at: present(r.expires_at),
        });
    ServiceResponse::from_result("fetch_company_plan", result)
}
