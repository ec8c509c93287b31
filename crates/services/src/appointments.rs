use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use parallax_backend::{BackendClient, BackendError, BackendResult};
use parallax_core::{BranchId, ClientId, CompanyId, ProfessionalId};

use crate::ServiceResponse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAppointment {
    pub company_id: CompanyId,
    pub branch_id: BranchId,
    pub professional_id: ProfessionalId,
    pub client_id: ClientId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Schedule an appointment; returns the new appointment id.
///
/// Conflicts and working hours are checked by the procedure, not here.
pub async fn create_appointment(client: &BackendClient, request: &NewAppointment) -> ServiceResponse<String> {
    let params = json!({
        "company_id": request.company_id,
        "branch_id": request.branch_id,
        "professional_id": request.professional_id,
        "client_id": request.client_id,
        "start_time": request.start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        "end_time": request.end_time.to_rfc3339_opts(SecondsFormat::Secs, true),
    });
    let result = async {
        let value: Value = client.call("create_appointment", params).await?;
        appointment_id(value)
    }
    .await;
    ServiceResponse::from_result("create_appointment", result)
}

/// The procedure answers with a bare id or an object carrying `id`.
fn appointment_id(value: Value) -> BackendResult<String> {
    match value {
        Value::String(id) => Ok(id),
        Value::Object(mut map) => match map.remove("id") {
            Some(Value::String(id)) => Ok(id),
            _ => Err(BackendError::decode("create_appointment returned no id")),
        },
        other => Err(BackendError::decode(format!(
            "create_appointment returned unexpected value: {other}"
        ))),
    }
}
