//! Pages reached without signing in: an external member of a doctorate
//! supervision approves or rejects the admission from their invitation.

use admission_client::ServiceError;
use admission_core::context::AdmissionContext;
use admission_core::forms::approval::{ApprovalForm, SAVED_MESSAGE};
use admission_core::forms::{bind_form_with, CleanForm};
use admission_core::tabs::TAB_SUPERVISION;
use admission_core::types::AdmissionId;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde_json::{json, Value};

use super::run_action;
use crate::error::AppResult;
use crate::middleware::auth::Anonymous;
use crate::response::{DataResponse, FormPage};
use crate::state::AppState;
use crate::wizard::{Submission, SubmissionQuery};

pub fn confirm_url(uuid: AdmissionId) -> String {
    format!("/public/{}/{uuid}/external-confirm", AdmissionContext::Doctorate)
}

/// GET /public/doctorate/{uuid}/external-approval/{token}
pub async fn approval(
    State(state): State<AppState>,
    _: Anonymous,
    Path((uuid, token)): Path<(AdmissionId, String)>,
) -> AppResult<FormPage> {
    let supervision = state.service.external_supervision(uuid, &token).await?;
    Ok(FormPage::new(
        TAB_SUPERVISION,
        json!({}),
        json!({ "supervision": supervision }),
    ))
}

/// POST /public/doctorate/{uuid}/external-approval/{token}
pub async fn decide(
    State(state): State<AppState>,
    _: Anonymous,
    Path((uuid, token)): Path<(AdmissionId, String)>,
    Query(query): Query<SubmissionQuery>,
    Json(submitted): Json<Value>,
) -> AppResult<Response> {
    // The invitation must still be valid before anything is sent.
    state.service.external_supervision(uuid, &token).await?;

    let form = bind_form_with::<ApprovalForm>(&submitted, |form| form.member = token.clone());
    let approved = form.as_ref().is_ok_and(ApprovalForm::is_approved);
    let payload = form.map(CleanForm::into_payload);
    let submission = Submission::from_request(&query, &submitted);
    let service = &state.service;
    let token = token.as_str();
    Ok(run_action(
        TAB_SUPERVISION,
        &[],
        &submitted,
        payload,
        |payload| async move {
            let result = service.external_decision(uuid, token, approved, &payload).await?;
            tracing::info!(%uuid, approved, "External member decision saved");
            Ok::<_, ServiceError>(result)
        },
        &submission,
        confirm_url(uuid),
    )
    .await)
}

/// GET /public/doctorate/{uuid}/external-confirm
pub async fn confirm(
    _: Anonymous,
    Path(uuid): Path<AdmissionId>,
) -> Json<DataResponse<Value>> {
    Json(DataResponse {
        data: json!({ "uuid": uuid, "message": SAVED_MESSAGE }),
    })
}
