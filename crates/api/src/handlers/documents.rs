//! Confirmation page shown once the requested documents were sent.

use admission_core::error::CoreError;
use admission_core::types::AdmissionId;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use super::parse_context;
use crate::error::AppResult;
use crate::middleware::auth::Candidate;
use crate::response::DataResponse;
use crate::session::ADMISSION_CONFIRM_DOCUMENTS;
use crate::state::AppState;

/// GET /{context}/{uuid}/update/confirm-documents
///
/// Reachable once, right after a successful documents submission for the
/// same admission.
pub async fn confirm_documents(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid)): Path<(String, AdmissionId)>,
) -> AppResult<Json<DataResponse<Value>>> {
    let context = parse_context(&context)?;
    let flag = state
        .sessions
        .pop(&candidate.identity.global_id, ADMISSION_CONFIRM_DOCUMENTS)
        .await;
    if flag.as_ref().and_then(Value::as_str) != Some(uuid.to_string().as_str()) {
        return Err(CoreError::Forbidden("No documents were just submitted for this admission".into()).into());
    }
    let admission = state
        .service
        .get_proposition(&candidate.identity, context, uuid)
        .await?;
    Ok(Json(DataResponse {
        data: json!({
            "admission": admission,
            "home_url": context.home_url(uuid),
        }),
    }))
}
