//! Jury member edition, removal and role changes (doctorate only).

use admission_client::{Identity, Resource, ServiceError};
use admission_core::admission::Admission;
use admission_core::context::AdmissionContext;
use admission_core::error::CoreError;
use admission_core::forms::jury::{self, JuryMemberForm, JuryMemberRoleForm};
use admission_core::forms::{bind_form, CleanForm};
use admission_core::tabs::TAB_JURY;
use admission_core::types::AdmissionId;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde_json::{json, Value};

use super::{parse_context, run_action};
use crate::error::AppResult;
use crate::middleware::auth::Candidate;
use crate::response::FormPage;
use crate::state::AppState;
use crate::tabs::Wizard;
use crate::wizard::contract::open_for_update;
use crate::wizard::{Submission, SubmissionQuery};

/// Only doctorate admissions have a jury.
async fn open_jury(
    state: &AppState,
    identity: &Identity,
    context: &str,
    uuid: AdmissionId,
) -> AppResult<(AdmissionContext, Admission)> {
    let context = parse_context(context)?;
    if context != AdmissionContext::Doctorate {
        return Err(CoreError::UnknownTab {
            context: context.slug(),
            tab: TAB_JURY.to_string(),
        }
        .into());
    }
    let (admission, _) = open_for_update(state, identity, context, uuid, TAB_JURY).await?;
    Ok((context, admission))
}

/// GET /{context}/{uuid}/update/jury/members/{member}
pub async fn member(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, member)): Path<(String, AdmissionId, String)>,
) -> AppResult<FormPage> {
    let (context, admission) = open_jury(&state, &candidate.identity, &context, uuid).await?;
    let wizard = Wizard {
        state: &state,
        identity: &candidate.identity,
        context,
        admission: Some(&admission),
    };
    let remote = wizard.retrieve(Resource::JuryMember(member)).await?;
    Ok(FormPage::new(
        TAB_JURY,
        jury::member_initial(&remote),
        json!({ "member": remote }),
    ))
}

/// POST /{context}/{uuid}/update/jury/members/{member}
pub async fn update_member(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, member)): Path<(String, AdmissionId, String)>,
    Query(query): Query<SubmissionQuery>,
    Json(submitted): Json<Value>,
) -> AppResult<Response> {
    let (context, admission) = open_jury(&state, &candidate.identity, &context, uuid).await?;
    let wizard = Wizard {
        state: &state,
        identity: &candidate.identity,
        context,
        admission: Some(&admission),
    };
    let payload = bind_form::<JuryMemberForm>(&submitted).map(CleanForm::into_payload);
    let submission = Submission::from_request(&query, &submitted);
    Ok(run_action(
        TAB_JURY,
        jury::MEMBER_BUSINESS_ERRORS,
        &submitted,
        payload,
        |payload| async move { wizard.update(Resource::JuryMember(member), &payload).await },
        &submission,
        context.tab_url(uuid, TAB_JURY),
    )
    .await)
}

/// POST /{context}/{uuid}/update/jury/members/{member}/remove
pub async fn remove_member(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, member)): Path<(String, AdmissionId, String)>,
    Query(query): Query<SubmissionQuery>,
) -> AppResult<Response> {
    let (context, admission) = open_jury(&state, &candidate.identity, &context, uuid).await?;
    let wizard = Wizard {
        state: &state,
        identity: &candidate.identity,
        context,
        admission: Some(&admission),
    };
    let submitted = json!({});
    let submission = Submission::from_request(&query, &submitted);
    Ok(run_action(
        TAB_JURY,
        jury::MEMBER_BUSINESS_ERRORS,
        &submitted,
        Ok(Value::Null),
        |_| async move {
            wizard.delete(Resource::JuryMember(member)).await?;
            Ok::<_, ServiceError>(Value::Null)
        },
        &submission,
        context.tab_url(uuid, TAB_JURY),
    )
    .await)
}

/// POST /{context}/{uuid}/update/jury/members/{member}/change-role
pub async fn change_role(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, member)): Path<(String, AdmissionId, String)>,
    Query(query): Query<SubmissionQuery>,
    Json(submitted): Json<Value>,
) -> AppResult<Response> {
    let (context, admission) = open_jury(&state, &candidate.identity, &context, uuid).await?;
    let wizard = Wizard {
        state: &state,
        identity: &candidate.identity,
        context,
        admission: Some(&admission),
    };
    let payload = bind_form::<JuryMemberRoleForm>(&submitted).map(CleanForm::into_payload);
    let submission = Submission::from_request(&query, &submitted);
    Ok(run_action(
        TAB_JURY,
        jury::MEMBER_BUSINESS_ERRORS,
        &submitted,
        payload,
        |payload| async move {
            wizard
                .update(Resource::JuryMemberRole(member), &payload)
                .await
        },
        &submission,
        context.tab_url(uuid, TAB_JURY),
    )
    .await)
}
