//! Handlers for the wizard tabs: read views, edit forms and submissions.

use std::sync::Arc;

use admission_core::context::AdmissionContext;
use admission_core::error::CoreError;
use admission_core::forms::training_choice::context_for_training_type;
use admission_core::tabs::TAB_TRAINING_CHOICE;
use admission_core::types::AdmissionId;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde_json::Value;

use super::parse_context;
use crate::error::AppResult;
use crate::middleware::auth::Candidate;
use crate::response::FormPage;
use crate::state::AppState;
use crate::tabs::{TabForm, Wizard};
use crate::wizard::contract::{open_for_update, render, render_edit, submit as submit_form, tab_form};
use crate::wizard::{Submission, SubmissionQuery};

/// GET /{context}/{uuid}/{tab}
pub async fn detail(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, tab)): Path<(String, AdmissionId, String)>,
) -> AppResult<FormPage> {
    let context = parse_context(&context)?;
    let form = tab_form(&state, context, &tab)?;
    let admission = state
        .service
        .get_proposition(&candidate.identity, context, uuid)
        .await?;
    if !state.permissions.can_read_tab(&admission, &tab) {
        return Err(CoreError::Forbidden(format!("You are not allowed to view the '{tab}' step")).into());
    }
    let wizard = Wizard {
        state: &state,
        identity: &candidate.identity,
        context,
        admission: Some(&admission),
    };
    render(&wizard, form.as_ref()).await
}

/// GET /{context}/{uuid}/update/{tab}
pub async fn edit(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, tab)): Path<(String, AdmissionId, String)>,
) -> AppResult<Response> {
    let context = parse_context(&context)?;
    let (admission, form) = open_for_update(&state, &candidate.identity, context, uuid, &tab).await?;
    let wizard = Wizard {
        state: &state,
        identity: &candidate.identity,
        context,
        admission: Some(&admission),
    };
    render_edit(&wizard, form.as_ref()).await
}

/// POST /{context}/{uuid}/update/{tab}
pub async fn submit(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, tab)): Path<(String, AdmissionId, String)>,
    Query(query): Query<SubmissionQuery>,
    Json(submitted): Json<Value>,
) -> AppResult<Response> {
    let context = parse_context(&context)?;
    let (admission, form) = open_for_update(&state, &candidate.identity, context, uuid, &tab).await?;
    let wizard = Wizard {
        state: &state,
        identity: &candidate.identity,
        context,
        admission: Some(&admission),
    };
    let submission = Submission::from_request(&query, &submitted);
    submit_form(&wizard, form.as_ref(), &submitted, &submission).await
}

/// The training choice also creates doctorate admissions, whose tree has
/// no such step.
fn training_choice_form(state: &AppState, context: AdmissionContext) -> AppResult<Arc<dyn TabForm>> {
    state.tabs.get(TAB_TRAINING_CHOICE).ok_or_else(|| {
        CoreError::UnknownTab {
            context: context.slug(),
            tab: TAB_TRAINING_CHOICE.to_string(),
        }
        .into()
    })
}

/// GET /{context}/create/training-choice
pub async fn create_form(
    State(state): State<AppState>,
    candidate: Candidate,
    Path(context): Path<String>,
) -> AppResult<FormPage> {
    let context = parse_context(&context)?;
    let form = training_choice_form(&state, context)?;
    let wizard = Wizard {
        state: &state,
        identity: &candidate.identity,
        context,
        admission: None,
    };
    render(&wizard, form.as_ref()).await
}

/// POST /{context}/create/training-choice
///
/// The admission is created in the context of the chosen training, which
/// may differ from the one of the page.
pub async fn create(
    State(state): State<AppState>,
    candidate: Candidate,
    Path(context): Path<String>,
    Query(query): Query<SubmissionQuery>,
    Json(submitted): Json<Value>,
) -> AppResult<Response> {
    let page_context = parse_context(&context)?;
    let context = submitted
        .get("training_type")
        .and_then(Value::as_str)
        .and_then(context_for_training_type)
        .unwrap_or(page_context);
    let form = training_choice_form(&state, context)?;
    let wizard = Wizard {
        state: &state,
        identity: &candidate.identity,
        context,
        admission: None,
    };
    let submission = Submission::from_request(&query, &submitted);
    submit_form(&wizard, form.as_ref(), &submitted, &submission).await
}
