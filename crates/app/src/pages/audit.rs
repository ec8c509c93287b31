use serde::Serialize;

use parallax_backend::BackendClient;
use parallax_services::audit::{self, AuditLog};

use super::{Page, PageView, admit};
use crate::{TenantContext, TenantContextHandle};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditPage {
    pub logs: Vec<AuditLog>,
}

pub async fn open(client: &BackendClient, handle: &mut TenantContextHandle) -> PageView<AuditPage> {
    let ctx = handle.settled().await;
    load(client, &ctx).await
}

pub async fn load(client: &BackendClient, ctx: &TenantContext) -> PageView<AuditPage> {
    let company = match admit(Page::Audit, ctx) {
        Ok(company) => company,
        Err(view) => return view,
    };
    match audit::fetch_audit_logs(client, company).await.into_result() {
        Ok(logs) => PageView::Ready(AuditPage { logs }),
        Err(message) => PageView::Failed(message),
    }
}
