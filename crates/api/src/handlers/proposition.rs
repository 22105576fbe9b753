//! Handlers for the candidate's admissions as a whole.

use admission_core::admission::Admission;
use admission_core::context::AdmissionContext;
use admission_core::types::AdmissionId;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use super::parse_context;
use crate::error::AppResult;
use crate::middleware::auth::Candidate;
use crate::response::DataResponse;
use crate::session::{PAYMENT_COMPLETED, PROPOSITION_JUST_SUBMITTED};
use crate::state::AppState;
use crate::wizard::{Submission, SubmissionQuery};

/// A wizard tab with what the candidate may do on it.
#[derive(Debug, Serialize)]
pub struct TabAccess {
    pub name: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub can_read: bool,
    pub can_update: bool,
}

#[derive(Debug, Serialize)]
pub struct TabGroupAccess {
    pub name: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub children: Vec<TabAccess>,
}

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub admission: Admission,
    pub tabs: Vec<TabGroupAccess>,
    /// Context of an application submitted on the previous request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub just_submitted: Option<Value>,
    /// Kind of fees paid on the previous request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_completed: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub late_notice: Option<String>,
}

fn tab_access(state: &AppState, admission: &Admission, context: AdmissionContext) -> Vec<TabGroupAccess> {
    context
        .tab_tree()
        .groups()
        .iter()
        .map(|group| TabGroupAccess {
            name: group.parent.name,
            label: group.parent.label,
            icon: group.parent.icon,
            children: group
                .children
                .iter()
                .map(|tab| TabAccess {
                    name: tab.name,
                    label: tab.label,
                    icon: tab.icon,
                    can_read: state.permissions.can_read_tab(admission, tab.name),
                    can_update: state.permissions.can_update_tab(admission, tab.name),
                })
                .collect(),
        })
        .collect()
}

/// GET /propositions
pub async fn list(
    State(state): State<AppState>,
    candidate: Candidate,
) -> AppResult<Json<DataResponse<Value>>> {
    let propositions = state.service.list_propositions(&candidate.identity).await?;
    Ok(Json(DataResponse { data: propositions }))
}

/// GET /{context}/{uuid}
pub async fn home(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid)): Path<(String, AdmissionId)>,
) -> AppResult<Json<DataResponse<HomePage>>> {
    let context = parse_context(&context)?;
    let admission = state
        .service
        .get_proposition(&candidate.identity, context, uuid)
        .await?;

    let candidate_id = &candidate.identity.global_id;
    let just_submitted = state.sessions.pop(candidate_id, PROPOSITION_JUST_SUBMITTED).await;
    let payment_completed = state.sessions.pop(candidate_id, PAYMENT_COMPLETED).await;

    let page = HomePage {
        tabs: tab_access(&state, &admission, context),
        late_notice: admission.late_enrollment_notice(chrono::Utc::now().date_naive()),
        just_submitted,
        payment_completed,
        admission,
    };
    Ok(Json(DataResponse { data: page }))
}

/// GET /{context}/{uuid}/tabs
pub async fn tabs(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid)): Path<(String, AdmissionId)>,
) -> AppResult<Json<DataResponse<Vec<TabGroupAccess>>>> {
    let context = parse_context(&context)?;
    let admission = state
        .service
        .get_proposition(&candidate.identity, context, uuid)
        .await?;
    Ok(Json(DataResponse {
        data: tab_access(&state, &admission, context),
    }))
}

/// POST /{context}/{uuid}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid)): Path<(String, AdmissionId)>,
    Query(query): Query<SubmissionQuery>,
) -> AppResult<Response> {
    let context = parse_context(&context)?;
    state
        .service
        .cancel_proposition(&candidate.identity, context, uuid)
        .await?;
    tracing::info!(%context, admission = %uuid, "Admission cancelled");
    let submission = Submission::from_request(&query, &Value::Null);
    Ok(Redirect::to(&submission.destination_or("/propositions".into())).into_response())
}
