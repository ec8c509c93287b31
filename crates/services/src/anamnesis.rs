//! Client anamnesis records and their answers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use parallax_backend::{BackendClient, Direction, ViewQuery};
use parallax_core::{ClientId, CompanyId, RecordId};

use crate::ServiceResponse;
use crate::normalize::{or_default, or_empty, or_na, present};

const DEFAULT_FIELD_TYPE: &str = "text";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnamnesisRecord {
    pub id: RecordId,
    pub template_name: String,
    pub created_at: String,
    pub professional_name: String,
    pub appointment_id: Option<String>,
}

/// One answered question; `answer` keeps whatever JSON type the field produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnamnesisAnswer {
    pub question_id: String,
    pub question_text: String,
    pub field_type: String,
    pub answer: Value,
}

#[derive(Debug, Deserialize)]
struct RecordRow {
    id: RecordId,
    #[serde(default)]
    template_name: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    professional_name: Option<String>,
    #[serde(default)]
    appointment_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnswerRow {
    question_id: String,
    #[serde(default)]
    question_text: Option<String>,
    #[serde(default)]
    field_type: Option<String>,
    #[serde(default)]
    answer: Value,
}

pub async fn fetch_client_anamnesis_records(
    client: &BackendClient,
    company: CompanyId,
    client_id: ClientId,
) -> ServiceResponse<Vec<AnamnesisRecord>> {
    let query = ViewQuery::new("view_anamnesis_records")
        .eq("company_id", company)
        .eq("client_id", client_id)
        .order_by("created_at", Direction::Descending);
    let result = client.fetch_rows::<RecordRow>(&query).await.map(|rows| {
        rows.into_iter()
            .map(|r| AnamnesisRecord {
                id: r.id,
                template_name: or_na(r.template_name),
                created_at: r.created_at.unwrap_or_default(),
                professional_name: or_na(r.professional_name),
                appointment_id: present(r.appointment_id),
            })
            .collect()
    });
    ServiceResponse::from_result("fetch_client_anamnesis_records", result)
}

pub async fn fetch_anamnesis_answers(
    client: &BackendClient,
    company: CompanyId,
    record: RecordId,
) -> ServiceResponse<Vec<AnamnesisAnswer>> {
    let query = ViewQuery::new("view_anamnesis_answers")
        .eq("company_id", company)
        .eq("record_id", record)
        .order_by("question_order", Direction::Ascending);
    let result = client.fetch_rows::<AnswerRow>(&query).await.map(|rows| {
        rows.into_iter()
            .map(|r| AnamnesisAnswer {
                question_id: r.question_id,
                question_text: or_empty(r.question_text),
                field_type: or_default(r.field_type, DEFAULT_FIELD_TYPE),
                answer: r.answer,
            })
            .collect()
    });
    ServiceResponse::from_result("fetch_anamnesis_answers", result)
}
