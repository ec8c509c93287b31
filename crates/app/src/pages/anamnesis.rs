//! A client's anamnesis history, with the newest record opened.

use serde::Serialize;

use parallax_backend::BackendClient;
use parallax_core::{ClientId, RecordId};
use parallax_services::anamnesis::{self, AnamnesisAnswer, AnamnesisRecord};

use super::{Page, PageView, Section, admit};
use crate::{TenantContext, TenantContextHandle};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnamnesisPage {
    pub records: Vec<AnamnesisRecord>,
    pub selected: Option<RecordId>,
    pub answers: Section<Vec<AnamnesisAnswer>>,
}

pub async fn open(
    client: &BackendClient,
    handle: &mut TenantContextHandle,
    client_id: ClientId,
) -> PageView<AnamnesisPage> {
    let ctx = handle.settled().await;
    load(client, &ctx, client_id).await
}

pub async fn load(client: &BackendClient, ctx: &TenantContext, client_id: ClientId) -> PageView<AnamnesisPage> {
    let company = match admit(Page::Anamnesis, ctx) {
        Ok(company) => company,
        Err(view) => return view,
    };

    let records = match anamnesis::fetch_client_anamnesis_records(client, company, client_id)
        .await
        .into_result()
    {
        Ok(records) => records,
        Err(message) => return PageView::Failed(message),
    };

    let selected = records.first().map(|r| r.id);
    let answers = match selected {
        Some(record) => Section::from_response(anamnesis::fetch_anamnesis_answers(client, company, record).await),
        None => Section {
            data: Vec::new(),
            error: None,
        },
    };

    PageView::Ready(AnamnesisPage {
        records,
        selected,
        answers,
    })
}

/// Switch the opened record.
pub async fn select(client: &BackendClient, ctx: &TenantContext, page: &mut AnamnesisPage, record: RecordId) {
    let Some(company) = ctx.company_id else {
        return;
    };
    if page.selected == Some(record) || !page.records.iter().any(|r| r.id == record) {
        return;
    }
    page.selected = Some(record);
    page.answers = Section::from_response(anamnesis::fetch_anamnesis_answers(client, company, record).await);
}
