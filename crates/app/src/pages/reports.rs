//! Reports: period aggregates on screen, detail rows as CSV files.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use parallax_auth::ACCESS_RESTRICTED_MESSAGE;
use parallax_backend::BackendClient;
use parallax_core::CompanyId;
use parallax_services::reports::{
    self, AdministrativeActivity, AppointmentsOverview, ClientsGrowth, FinancialSummary, ProfessionalsActivity,
};
use parallax_services::{ReportKind, ReportPeriod, ServiceResponse, export_filename, save_csv, to_csv};

use super::{NO_COMPANY_MESSAGE, Page, PageView, Section, admit};
use crate::{TenantContext, TenantContextHandle};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportsPage {
    pub period: ReportPeriod,
    pub financial: FinancialSummary,
    pub appointments: Section<AppointmentsOverview>,
    pub clients: Section<ClientsGrowth>,
    pub professionals: Section<ProfessionalsActivity>,
    pub administrative: Section<AdministrativeActivity>,
}

pub async fn open(
    client: &BackendClient,
    handle: &mut TenantContextHandle,
    period: ReportPeriod,
) -> PageView<ReportsPage> {
    let ctx = handle.settled().await;
    load_at(client, &ctx, period, Utc::now()).await
}

pub async fn load_at(
    client: &BackendClient,
    ctx: &TenantContext,
    period: ReportPeriod,
    now: DateTime<Utc>,
) -> PageView<ReportsPage> {
    let company = match admit(Page::Reports, ctx) {
        Ok(company) => company,
        Err(view) => return view,
    };
    let today = now.date_naive();

    let (financial, appointments, clients, professionals, administrative) = tokio::join!(
        reports::fetch_financial_summary_on(client, company, period, today),
        reports::fetch_appointments_overview_at(client, company, period, now),
        reports::fetch_clients_growth_on(client, company, period, today),
        reports::fetch_professionals_activity_on(client, company, period, today),
        reports::fetch_administrative_activity(client, company),
    );

    match financial.into_result() {
        Ok(financial) => PageView::Ready(ReportsPage {
            period,
            financial,
            appointments: Section::from_response(appointments),
            clients: Section::from_response(clients),
            professionals: Section::from_response(professionals),
            administrative: Section::from_response(administrative),
        }),
        Err(message) => PageView::Failed(message),
    }
}

/// Fetch the detail rows for `report`, serialize them and write the file into `dir`.
pub async fn export(
    client: &BackendClient,
    ctx: &TenantContext,
    report: ReportKind,
    period: ReportPeriod,
    today: NaiveDate,
    dir: &Path,
) -> ServiceResponse<PathBuf> {
    let company = match admit::<()>(Page::Reports, ctx) {
        Ok(company) => company,
        Err(PageView::NoCompany) => return ServiceResponse::err(NO_COMPANY_MESSAGE),
        Err(_) => return ServiceResponse::err(ACCESS_RESTRICTED_MESSAGE),
    };

    let csv = match detail_csv(client, company, report, period, today).await {
        Ok(csv) => csv,
        Err(message) => return ServiceResponse::err(message),
    };
    let filename = export_filename(report, period, today);
    match save_csv(dir, &filename, &csv) {
        Ok(path) => ServiceResponse::ok(path),
        Err(e) => {
            tracing::error!(error = %e, report = report.as_str(), "export failed");
            ServiceResponse::err(e.to_string())
        }
    }
}

async fn detail_csv(
    client: &BackendClient,
    company: CompanyId,
    report: ReportKind,
    period: ReportPeriod,
    today: NaiveDate,
) -> Result<String, String> {
    let headers = report.headers();
    let csv = match report {
        ReportKind::Financial => {
            let rows = reports::fetch_financial_detail(client, company, period, today).await.into_result()?;
            to_csv(&rows, headers)
        }
        ReportKind::Appointments => {
            let rows = reports::fetch_appointments_detail(client, company, period, today)
                .await
                .into_result()?;
            to_csv(&rows, headers)
        }
        ReportKind::Clients => {
            let rows = reports::fetch_clients_detail(client, company, period, today).await.into_result()?;
            to_csv(&rows, headers)
        }
        ReportKind::Professionals => {
            let rows = reports::fetch_professionals_detail(client, company, period, today)
                .await
                .into_result()?;
            to_csv(&rows, headers)
        }
        ReportKind::Audit => {
            let rows = reports::fetch_audit_detail(client, company).await.into_result()?;
            to_csv(&rows, headers)
        }
    };
    csv.map_err(|e| e.to_string())
}
