//! Supervision group actions besides adding a member.

use admission_client::Resource;
use admission_core::forms::supervision::{self, RemoveMemberForm};
use admission_core::forms::{bind_form, CleanForm};
use admission_core::tabs::TAB_SUPERVISION;
use admission_core::types::AdmissionId;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde_json::{json, Value};

use super::{parse_context, run_action};
use crate::error::AppResult;
use crate::middleware::auth::Candidate;
use crate::state::AppState;
use crate::tabs::Wizard;
use crate::wizard::contract::open_for_update;
use crate::wizard::{Submission, SubmissionQuery};

/// POST /{context}/{uuid}/update/supervision/request-signatures
pub async fn request_signatures(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid)): Path<(String, AdmissionId)>,
    Query(query): Query<SubmissionQuery>,
) -> AppResult<Response> {
    let context = parse_context(&context)?;
    let (admission, _) = open_for_update(&state, &candidate.identity, context, uuid, TAB_SUPERVISION).await?;
    let wizard = Wizard {
        state: &state,
        identity: &candidate.identity,
        context,
        admission: Some(&admission),
    };
    let submitted = json!({});
    let submission = Submission::from_request(&query, &submitted);
    Ok(run_action(
        TAB_SUPERVISION,
        supervision::BUSINESS_ERRORS,
        &submitted,
        Ok(json!({})),
        |payload| async move { wizard.post(Resource::Signatures, &payload).await },
        &submission,
        context.tab_url(uuid, TAB_SUPERVISION),
    )
    .await)
}

/// POST /{context}/{uuid}/update/supervision/remove-member
pub async fn remove_member(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid)): Path<(String, AdmissionId)>,
    Query(query): Query<SubmissionQuery>,
    Json(submitted): Json<Value>,
) -> AppResult<Response> {
    let context = parse_context(&context)?;
    let (admission, _) = open_for_update(&state, &candidate.identity, context, uuid, TAB_SUPERVISION).await?;
    let wizard = Wizard {
        state: &state,
        identity: &candidate.identity,
        context,
        admission: Some(&admission),
    };
    let payload = bind_form::<RemoveMemberForm>(&submitted).map(CleanForm::into_payload);
    let submission = Submission::from_request(&query, &submitted);
    Ok(run_action(
        TAB_SUPERVISION,
        supervision::BUSINESS_ERRORS,
        &submitted,
        payload,
        |payload| async move { wizard.post(Resource::SupervisionMember, &payload).await },
        &submission,
        context.tab_url(uuid, TAB_SUPERVISION),
    )
    .await)
}
