//! Period reports and the detail rows behind their CSV exports.
//!
//! Dates in `view_financial_daily_summary` are plain `YYYY-MM-DD` and filtered
//! inclusively. Timestamps (`start_time`, `created_at`) use the half-open window
//! from [`ReportPeriod::timestamp_range`], so the whole last day is included.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use parallax_backend::{BackendClient, BackendResult, Direction, ViewQuery};
use parallax_core::{ClientId, CompanyId, ProfessionalId};

use crate::normalize::{amount, or_default, or_empty, or_na};
use crate::{ReportPeriod, ServiceResponse};

const ADMIN_ACTIVITY_LIMIT: usize = 50;
const RECENT_ACTIONS: usize = 10;
const UNKNOWN_ACTOR: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_result: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentsOverview {
    pub total_appointments: u64,
    pub completed_appointments: u64,
    pub cancelled_appointments: u64,
    pub upcoming_appointments: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientsGrowth {
    pub total_clients: u64,
    pub new_clients: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalsActivity {
    pub total_professionals: u64,
    pub active_professionals: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAction {
    pub id: String,
    pub action_type: String,
    pub actor_name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdministrativeActivity {
    pub action_counts: BTreeMap<String, u64>,
    pub recent_actions: Vec<AdminAction>,
}

// Detail rows serialize with the CSV column names.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialDetailRow {
    pub date: String,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_result: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentDetailRow {
    pub appointment_id: String,
    pub date: String,
    pub status: String,
    pub client_name: String,
    pub professional_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientDetailRow {
    pub client_id: ClientId,
    pub full_name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfessionalDetailRow {
    pub professional_id: ProfessionalId,
    pub full_name: String,
    pub total_appointments_in_period: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditDetailRow {
    pub action_type: String,
    pub actor_email: String,
    pub target_email: String,
    pub created_at: String,
    pub metadata: Value,
}

#[derive(Debug, Deserialize)]
struct DailyRow {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    total_income: Option<f64>,
    #[serde(default)]
    total_expenses: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AppointmentRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    client_name: Option<String>,
    #[serde(default)]
    professional_name: Option<String>,
    #[serde(default)]
    professional_id: Option<ProfessionalId>,
}

#[derive(Debug, Deserialize)]
struct PersonRow {
    id: String,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuditRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    action_type: Option<String>,
    #[serde(default)]
    actor_name: Option<String>,
    #[serde(default)]
    actor_email: Option<String>,
    #[serde(default)]
    target_email: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    metadata: Option<Value>,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn daily_query(company: CompanyId, period: ReportPeriod, today: NaiveDate) -> ViewQuery {
    let (start, end) = period.range(today);
    ViewQuery::new("view_financial_daily_summary")
        .eq("company_id", company)
        .gte("date", start)
        .lte("date", end)
}

fn appointments_query(company: CompanyId, period: ReportPeriod, today: NaiveDate) -> ViewQuery {
    let (start, end) = period.timestamp_range(today);
    ViewQuery::new("view_appointments")
        .eq("company_id", company)
        .gte("start_time", start)
        .lt("start_time", end)
}

fn new_clients_query(company: CompanyId, period: ReportPeriod, today: NaiveDate) -> ViewQuery {
    let (start, end) = period.timestamp_range(today);
    ViewQuery::new("view_clients")
        .eq("company_id", company)
        .gte("created_at", start)
        .lt("created_at", end)
}

pub async fn fetch_financial_summary(
    client: &BackendClient,
    company: CompanyId,
    period: ReportPeriod,
) -> ServiceResponse<FinancialSummary> {
    fetch_financial_summary_on(client, company, period, today()).await
}

/// Sum of the daily totals in the period.
pub async fn fetch_financial_summary_on(
    client: &BackendClient,
    company: CompanyId,
    period: ReportPeriod,
    today: NaiveDate,
) -> ServiceResponse<FinancialSummary> {
    let query = daily_query(company, period, today).select(&["total_income", "total_expenses"]);
    let result = client.fetch_rows::<DailyRow>(&query).await.map(|rows| {
        let total_income: f64 = rows.iter().map(|r| amount(r.total_income)).sum();
        let total_expenses: f64 = rows.iter().map(|r| amount(r.total_expenses)).sum();
        FinancialSummary {
            total_income,
            total_expenses,
            net_result: total_income - total_expenses,
        }
    });
    ServiceResponse::from_result("fetch_financial_summary", result)
}

pub async fn fetch_appointments_overview(
    client: &BackendClient,
    company: CompanyId,
    period: ReportPeriod,
) -> ServiceResponse<AppointmentsOverview> {
    fetch_appointments_overview_at(client, company, period, Utc::now()).await
}

pub async fn fetch_appointments_overview_at(
    client: &BackendClient,
    company: CompanyId,
    period: ReportPeriod,
    now: DateTime<Utc>,
) -> ServiceResponse<AppointmentsOverview> {
    let query = appointments_query(company, period, now.date_naive()).select(&["start_time", "status"]);
    let result = client.fetch_rows::<AppointmentRow>(&query).await.map(|rows| {
        let with_status = |s: &str| rows.iter().filter(|r| r.status.as_deref() == Some(s)).count() as u64;
        let upcoming = rows
            .iter()
            .filter_map(|r| r.start_time.as_deref())
            .filter_map(|t| DateTime::parse_from_rfc3339(t).ok())
            .filter(|t| t.with_timezone(&Utc) > now)
            .count() as u64;
        AppointmentsOverview {
            total_appointments: rows.len() as u64,
            completed_appointments: with_status("completed"),
            cancelled_appointments: with_status("cancelled"),
            upcoming_appointments: upcoming,
        }
    });
    ServiceResponse::from_result("fetch_appointments_overview", result)
}

pub async fn fetch_clients_growth(
    client: &BackendClient,
    company: CompanyId,
    period: ReportPeriod,
) -> ServiceResponse<ClientsGrowth> {
    fetch_clients_growth_on(client, company, period, today()).await
}

pub async fn fetch_clients_growth_on(
    client: &BackendClient,
    company: CompanyId,
    period: ReportPeriod,
    today: NaiveDate,
) -> ServiceResponse<ClientsGrowth> {
    let result: BackendResult<ClientsGrowth> = async {
        let total_clients = client
            .count(&ViewQuery::new("view_clients").eq("company_id", company))
            .await?;
        let new_clients = client.count(&new_clients_query(company, period, today)).await?;
        Ok(ClientsGrowth {
            total_clients,
            new_clients,
        })
    }
    .await;
    ServiceResponse::from_result("fetch_clients_growth", result)
}

pub async fn fetch_professionals_activity(
    client: &BackendClient,
    company: CompanyId,
    period: ReportPeriod,
) -> ServiceResponse<ProfessionalsActivity> {
    fetch_professionals_activity_on(client, company, period, today()).await
}

/// Active = has at least one appointment in the period.
pub async fn fetch_professionals_activity_on(
    client: &BackendClient,
    company: CompanyId,
    period: ReportPeriod,
    today: NaiveDate,
) -> ServiceResponse<ProfessionalsActivity> {
    let result: BackendResult<ProfessionalsActivity> = async {
        let total_professionals = client
            .count(&ViewQuery::new("view_professionals").eq("company_id", company))
            .await?;
        let query = appointments_query(company, period, today).select(&["professional_id"]);
        let rows: Vec<AppointmentRow> = client.fetch_rows(&query).await?;
        let active: HashSet<ProfessionalId> = rows.into_iter().filter_map(|r| r.professional_id).collect();
        Ok(ProfessionalsActivity {
            total_professionals,
            active_professionals: active.len() as u64,
        })
    }
    .await;
    ServiceResponse::from_result("fetch_professionals_activity", result)
}

/// Counts per action type over the last 50 entries, plus the 10 newest.
pub async fn fetch_administrative_activity(
    client: &BackendClient,
    company: CompanyId,
) -> ServiceResponse<AdministrativeActivity> {
    let query = ViewQuery::new("view_audit_logs")
        .select(&["id", "action_type", "actor_name", "created_at"])
        .eq("company_id", company)
        .order_by("created_at", Direction::Descending)
        .limit(ADMIN_ACTIVITY_LIMIT);
    let result = client.fetch_rows::<AuditRow>(&query).await.map(|rows| {
        let mut action_counts = BTreeMap::new();
        for r in &rows {
            *action_counts
                .entry(r.action_type.clone().unwrap_or_default())
                .or_insert(0) += 1;
        }
        let recent_actions = rows
            .into_iter()
            .take(RECENT_ACTIONS)
            .map(|r| AdminAction {
                id: r.id.unwrap_or_default(),
                action_type: or_empty(r.action_type),
                actor_name: or_default(r.actor_name, UNKNOWN_ACTOR),
                created_at: r.created_at.unwrap_or_default(),
            })
            .collect();
        AdministrativeActivity {
            action_counts,
            recent_actions,
        }
    });
    ServiceResponse::from_result("fetch_administrative_activity", result)
}

pub async fn fetch_financial_detail(
    client: &BackendClient,
    company: CompanyId,
    period: ReportPeriod,
    today: NaiveDate,
) -> ServiceResponse<Vec<FinancialDetailRow>> {
    let query = daily_query(company, period, today)
        .select(&["date", "total_income", "total_expenses"])
        .order_by("date", Direction::Ascending);
    let result = client.fetch_rows::<DailyRow>(&query).await.map(|rows| {
        rows.into_iter()
            .map(|r| {
                let total_income = amount(r.total_income);
                let total_expenses = amount(r.total_expenses);
                FinancialDetailRow {
                    date: r.date.unwrap_or_default(),
                    total_income,
                    total_expenses,
                    net_result: total_income - total_expenses,
                }
            })
            .collect()
    });
    ServiceResponse::from_result("fetch_financial_detail", result)
}

pub async fn fetch_appointments_detail(
    client: &BackendClient,
    company: CompanyId,
    period: ReportPeriod,
    today: NaiveDate,
) -> ServiceResponse<Vec<AppointmentDetailRow>> {
    let query = appointments_query(company, period, today)
        .select(&["id", "start_time", "status", "client_name", "professional_name"])
        .order_by("start_time", Direction::Ascending);
    let result = client.fetch_rows::<AppointmentRow>(&query).await.map(|rows| {
        rows.into_iter()
            .map(|r| AppointmentDetailRow {
                appointment_id: r.id.unwrap_or_default(),
                date: r.start_time.unwrap_or_default(),
                status: or_empty(r.status),
                client_name: or_na(r.client_name),
                professional_name: or_na(r.professional_name),
            })
            .collect()
    });
    ServiceResponse::from_result("fetch_appointments_detail", result)
}

/// Clients created in the period.
pub async fn fetch_clients_detail(
    client: &BackendClient,
    company: CompanyId,
    period: ReportPeriod,
    today: NaiveDate,
) -> ServiceResponse<Vec<ClientDetailRow>> {
    let query = new_clients_query(company, period, today)
        .select(&["id", "full_name", "created_at"])
        .order_by("created_at", Direction::Ascending);
    let result: BackendResult<Vec<ClientDetailRow>> = async {
        let rows: Vec<PersonRow> = client.fetch_rows(&query).await?;
        rows.into_iter()
            .map(|r| {
                Ok(ClientDetailRow {
                    client_id: parse_id(&r.id)?,
                    full_name: or_empty(r.full_name),
                    created_at: r.created_at.unwrap_or_default(),
                })
            })
            .collect()
    }
    .await;
    ServiceResponse::from_result("fetch_clients_detail", result)
}

/// Every professional with their appointment count in the period.
pub async fn fetch_professionals_detail(
    client: &BackendClient,
    company: CompanyId,
    period: ReportPeriod,
    today: NaiveDate,
) -> ServiceResponse<Vec<ProfessionalDetailRow>> {
    let result: BackendResult<Vec<ProfessionalDetailRow>> = async {
        let professionals: Vec<PersonRow> = client
            .fetch_rows(
                &ViewQuery::new("view_professionals")
                    .select(&["id", "full_name"])
                    .eq("company_id", company)
                    .order_by("full_name", Direction::Ascending),
            )
            .await?;
        let appointments: Vec<AppointmentRow> = client
            .fetch_rows(&appointments_query(company, period, today).select(&["professional_id"]))
            .await?;

        let mut per_professional: HashMap<ProfessionalId, u64> = HashMap::new();
        for id in appointments.into_iter().filter_map(|a| a.professional_id) {
            *per_professional.entry(id).or_insert(0) += 1;
        }

        professionals
            .into_iter()
            .map(|p| {
                let professional_id: ProfessionalId = parse_id(&p.id)?;
                Ok(ProfessionalDetailRow {
                    professional_id,
                    full_name: or_empty(p.full_name),
                    total_appointments_in_period: per_professional
                        .get(&professional_id)
                        .copied()
                        .unwrap_or(0),
                })
            })
            .collect()
    }
    .await;
    ServiceResponse::from_result("fetch_professionals_detail", result)
}

pub async fn fetch_audit_detail(
    client: &BackendClient,
    company: CompanyId,
) -> ServiceResponse<Vec<AuditDetailRow>> {
    let query = ViewQuery::new("view_audit_logs")
        .select(&["action_type", "actor_email", "target_email", "created_at", "metadata"])
        .eq("company_id", company)
        .order_by("created_at", Direction::Descending);
    let result = client.fetch_rows::<AuditRow>(&query).await.map(|rows| {
        rows.into_iter()
            .map(|r| AuditDetailRow {
                action_type: or_empty(r.action_type),
                actor_email: or_empty(r.actor_email),
                target_email: or_empty(r.target_email),
                created_at: r.created_at.unwrap_or_default(),
                metadata: r.metadata.unwrap_or(Value::Null),
            })
            .collect()
    });
    ServiceResponse::from_result("fetch_audit_detail", result)
}

fn parse_id<T>(raw: &str) -> BackendResult<T>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| parallax_backend::BackendError::decode(e.to_string()))
}
