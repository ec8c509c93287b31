use chrono::{NaiveDate, Utc};
use serde::Serialize;

use parallax_backend::BackendClient;
use parallax_services::ServiceResponse;
use parallax_services::finance::{self, CashMovement, CashRegister, CashRegisterStatus, FinancialDailySummary};

use super::{Page, PageView, Section, admit};
use crate::{TenantContext, TenantContextHandle};

pub const BRANCH_REQUIRED: &str = "Select a branch to operate the cash register";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancePage {
    pub status: CashRegisterStatus,
    pub today: Section<FinancialDailySummary>,
    pub movements: Section<Vec<CashMovement>>,
}

pub async fn open(client: &BackendClient, handle: &mut TenantContextHandle) -> PageView<FinancePage> {
    let ctx = handle.settled().await;
    load_on(client, &ctx, Utc::now().date_naive()).await
}

pub async fn load_on(client: &BackendClient, ctx: &TenantContext, today: NaiveDate) -> PageView<FinancePage> {
    let company = match admit(Page::Finance, ctx) {
        Ok(company) => company,
        Err(view) => return view,
    };

    let (status, summary, movements) = tokio::join!(
        finance::fetch_cash_register_status(client, company),
        finance::fetch_financial_daily_summary_on(client, company, today),
        finance::fetch_recent_cash_movements(client, company),
    );

    match status.into_result() {
        Ok(status) => PageView::Ready(FinancePage {
            status,
            today: Section::from_response(summary),
            movements: Section::from_response(movements),
        }),
        Err(message) => PageView::Failed(message),
    }
}

/// Open the register of the active branch. Callers reload the page afterwards.
pub async fn open_register(
    client: &BackendClient,
    ctx: &TenantContext,
    opening_balance: f64,
) -> ServiceResponse<CashRegister> {
    match ctx.branch_id {
        Some(branch) => finance::open_cash_register(client, branch, opening_balance).await,
        None => ServiceResponse::err(BRANCH_REQUIRED),
    }
}
