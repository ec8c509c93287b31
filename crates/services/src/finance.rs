//! Cash register, daily totals and cash movements.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use parallax_backend::{BackendClient, Direction, ViewQuery};
use parallax_core::{BranchId, CompanyId, OrderId};

use crate::ServiceResponse;
use crate::normalize::{amount, or_na, present};

const MOVEMENTS_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashRegisterStatus {
    pub is_open: bool,
    pub current_balance: f64,
    pub opened_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialDailySummary {
    pub total_income: f64,
    pub total_expenses: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashMovement {
    pub id: String,
    pub date: String,
    pub kind: MovementKind,
    pub amount: f64,
    pub origin: String,
}

/// Register state as returned by the cash register procedures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashRegister {
    pub id: String,
    pub branch_id: BranchId,
    pub status: RegisterState,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub opening_balance: f64,
    #[serde(default)]
    pub opened_at: Option<String>,
    #[serde(default)]
    pub closed_at: Option<String>,
    #[serde(default)]
    pub opened_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterState {
    Open,
    Closed,
}

#[derive(Debug, Deserialize)]
struct StatusRow {
    #[serde(default)]
    is_open: Option<bool>,
    #[serde(default)]
    current_balance: Option<f64>,
    #[serde(default)]
    opened_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryRow {
    #[serde(default)]
    total_income: Option<f64>,
    #[serde(default)]
    total_expenses: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MovementRow {
    id: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    origin: Option<String>,
}

/// No row means the register has never been opened: closed, zero balance.
pub async fn fetch_cash_register_status(
    client: &BackendClient,
    company: CompanyId,
) -> ServiceResponse<CashRegisterStatus> {
    let query = ViewQuery::new("view_cash_register_status")
        .eq("company_id", company)
        .limit(1);
    let result = client.fetch_first::<StatusRow>(&query).await.map(|row| match row {
        Some(r) => CashRegisterStatus {
            is_open: r.is_open.unwrap_or(false),
            current_balance: amount(r.current_balance),
            opened_at: present(r.opened_at),
        },
        None => CashRegisterStatus::default(),
    });
    ServiceResponse::from_result("fetch_cash_register_status", result)
}

pub async fn fetch_financial_daily_summary(
    client: &BackendClient,
    company: CompanyId,
) -> ServiceResponse<FinancialDailySummary> {
    fetch_financial_daily_summary_on(client, company, Utc::now().date_naive()).await
}

/// Totals for `date`; no row means nothing happened that day.
pub async fn fetch_financial_daily_summary_on(
    client: &BackendClient,
    company: CompanyId,
    date: NaiveDate,
) -> ServiceResponse<FinancialDailySummary> {
    let query = ViewQuery::new("view_financial_daily_summary")
        .eq("company_id", company)
        .eq("date", date)
        .limit(1);
    let result = client.fetch_first::<SummaryRow>(&query).await.map(|row| match row {
        Some(r) => FinancialDailySummary {
            total_income: amount(r.total_income),
            total_expenses: amount(r.total_expenses),
        },
        None => FinancialDailySummary::default(),
    });
    ServiceResponse::from_result("fetch_financial_daily_summary", result)
}

pub async fn fetch_recent_cash_movements(
    client: &BackendClient,
    company: CompanyId,
) -> ServiceResponse<Vec<CashMovement>> {
    let query = ViewQuery::new("view_cash_movements")
        .eq("company_id", company)
        .order_by("date", Direction::Descending)
        .limit(MOVEMENTS_LIMIT);
    let result = client.fetch_rows::<MovementRow>(&query).await.map(|rows| {
        rows.into_iter()
            .map(|r| CashMovement {
                id: r.id,
                date: r.date.unwrap_or_default(),
                kind: match r.kind.as_deref() {
                    Some("income") => MovementKind::Income,
                    _ => MovementKind::Expense,
                },
                amount: amount(r.amount),
                origin: or_na(r.origin),
            })
            .collect()
    });
    ServiceResponse::from_result("fetch_recent_cash_movements", result)
}

/// Open the register for a branch; user and company come from the session.
pub async fn open_cash_register(
    client: &BackendClient,
    branch: BranchId,
    opening_balance: f64,
) -> ServiceResponse<CashRegister> {
    let params = json!({ "p_branch_id": branch, "p_opening_balance": opening_balance });
    ServiceResponse::from_result(
        "open_cash_register",
        client.call("open_cash_register", params).await,
    )
}

pub async fn get_cash_register(client: &BackendClient, branch: BranchId) -> ServiceResponse<CashRegister> {
    let params = json!({ "p_branch_id": branch });
    ServiceResponse::from_result(
        "get_cash_register_status",
        client.call("get_cash_register_status", params).await,
    )
}

/// Close an order (comanda). The procedure's result is passed through untouched.
pub async fn close_order(
    client: &BackendClient,
    order: OrderId,
    payment_method: &str,
) -> ServiceResponse<Value> {
    let params = json!({ "p_order_id": order, "p_payment_method": payment_method });
    ServiceResponse::from_result("close_order", client.call("close_order", params).await)
}
