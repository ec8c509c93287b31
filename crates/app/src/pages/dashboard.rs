use chrono::{DateTime, Utc};
use serde::Serialize;

use parallax_backend::BackendClient;
use parallax_services::dashboard::{self, DashboardKpis, UpcomingAppointment};

use super::{Page, PageView, Section, admit};
use crate::{TenantContext, TenantContextHandle};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPage {
    pub kpis: DashboardKpis,
    pub upcoming: Section<Vec<UpcomingAppointment>>,
}

pub async fn open(client: &BackendClient, handle: &mut TenantContextHandle) -> PageView<DashboardPage> {
    let ctx = handle.settled().await;
    load_at(client, &ctx, Utc::now()).await
}

pub async fn load_at(client: &BackendClient, ctx: &TenantContext, now: DateTime<Utc>) -> PageView<DashboardPage> {
    let company = match admit(Page::Dashboard, ctx) {
        Ok(company) => company,
        Err(view) => return view,
    };

    let (kpis, upcoming) = tokio::join!(
        dashboard::fetch_dashboard_kpis_at(client, company, now),
        dashboard::fetch_upcoming_appointments_at(client, company, now),
    );

    match kpis.into_result() {
        Ok(kpis) => PageView::Ready(DashboardPage {
            kpis,
            upcoming: Section::from_response(upcoming),
        }),
        Err(message) => PageView::Failed(message),
    }
}
