//! Dashboard KPIs and the upcoming-appointments strip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parallax_backend::{BackendClient, Direction, ViewQuery};
use parallax_core::CompanyId;

use crate::normalize::or_na;
use crate::response::report;
use crate::{ServiceResponse, day_bounds};

pub const CLIENTS_FAILED: &str = "Failed to fetch clients data";
pub const PROFESSIONALS_FAILED: &str = "Failed to fetch professionals data";
pub const APPOINTMENTS_FAILED: &str = "Failed to fetch appointments data";
pub const UPCOMING_FAILED: &str = "Failed to fetch upcoming appointments";

const UPCOMING_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardKpis {
    pub total_clients: u64,
    pub active_professionals: u64,
    pub appointments_today: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingAppointment {
    pub id: String,
    pub client_name: String,
    pub professional_name: String,
    pub service_name: String,
    pub start_time: String,
}

#[derive(Debug, Deserialize)]
struct AppointmentRow {
    id: String,
    #[serde(default)]
    client_name: Option<String>,
    #[serde(default)]
    professional_name: Option<String>,
    #[serde(default)]
    service_name: Option<String>,
    #[serde(default)]
    start_time: Option<String>,
}

pub async fn fetch_dashboard_kpis(client: &BackendClient, company: CompanyId) -> ServiceResponse<DashboardKpis> {
    fetch_dashboard_kpis_at(client, company, Utc::now()).await
}

/// Three exact counts; the first failing one decides the message.
pub async fn fetch_dashboard_kpis_at(
    client: &BackendClient,
    company: CompanyId,
    now: DateTime<Utc>,
) -> ServiceResponse<DashboardKpis> {
    if let Err(e) = client.backend() {
        return ServiceResponse::err(report("fetch_dashboard_kpis", &e));
    }

    let clients = ViewQuery::new("view_clients").eq("company_id", company);
    let total_clients = match client.count(&clients).await {
        Ok(n) => n,
        Err(e) => {
            report("count clients", &e);
            return ServiceResponse::err(CLIENTS_FAILED);
        }
    };

    let professionals = ViewQuery::new("view_professionals").eq("company_id", company);
    let active_professionals = match client.count(&professionals).await {
        Ok(n) => n,
        Err(e) => {
            report("count professionals", &e);
            return ServiceResponse::err(PROFESSIONALS_FAILED);
        }
    };

    let (start, end) = day_bounds(now.date_naive());
    let today = ViewQuery::new("view_appointments")
        .eq("company_id", company)
        .gte("start_time", start)
        .lt("start_time", end);
    let appointments_today = match client.count(&today).await {
        Ok(n) => n,
        Err(e) => {
            report("count today's appointments", &e);
            return ServiceResponse::err(APPOINTMENTS_FAILED);
        }
    };

    ServiceResponse::ok(DashboardKpis {
        total_clients,
        active_professionals,
        appointments_today,
    })
}

pub async fn fetch_upcoming_appointments(
    client: &BackendClient,
    company: CompanyId,
) -> ServiceResponse<Vec<UpcomingAppointment>> {
    fetch_upcoming_appointments_at(client, company, Utc::now()).await
}

/// Next appointments starting at or after `now`, soonest first.
pub async fn fetch_upcoming_appointments_at(
    client: &BackendClient,
    company: CompanyId,
    now: DateTime<Utc>,
) -> ServiceResponse<Vec<UpcomingAppointment>> {
    let query = ViewQuery::new("view_appointments")
        .select(&["id", "client_name", "professional_name", "service_name", "start_time"])
        .eq("company_id", company)
        .gte("start_time", now)
        .order_by("start_time", Direction::Ascending)
        .limit(UPCOMING_LIMIT);

    match client.fetch_rows::<AppointmentRow>(&query).await {
        Ok(rows) => ServiceResponse::ok(
            rows.into_iter()
                .map(|r| UpcomingAppointment {
                    id: r.id,
                    client_name: or_na(r.client_name),
                    professional_name: or_na(r.professional_name),
                    service_name: or_na(r.service_name),
                    start_time: r.start_time.unwrap_or_default(),
                })
                .collect(),
        ),
        Err(e) => {
            let message = report("fetch_upcoming_appointments", &e);
            if client.is_configured() {
                ServiceResponse::err(UPCOMING_FAILED)
            } else {
                ServiceResponse::err(message)
            }
        }
    }
}
