//! Doctoral training activities (doctorate only): the activity lists,
//! their creation, edition and removal, their batch submission and the
//! reference promoter's assent.

use std::future::Future;

use admission_client::{Identity, Resource, ServiceError};
use admission_core::admission::Admission;
use admission_core::context::AdmissionContext;
use admission_core::error::CoreError;
use admission_core::forms::training::{
    activity_kind, activity_payload, activity_uuids, assent_initial, batch_errors,
    ActivityCategory, ActivityForm, ActivityKind, AssentForm, BatchActivityForm,
    TrainingNamespace,
};
use admission_core::forms::{bind_form, bind_form_with, CleanForm, FormErrors};
use admission_core::types::AdmissionId;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{parse_context, run_action};
use crate::error::AppResult;
use crate::middleware::auth::Candidate;
use crate::response::FormPage;
use crate::state::AppState;
use crate::tabs::Wizard;
use crate::wizard::contract::form_errors_from_service;
use crate::wizard::{Submission, SubmissionQuery};

pub const ADD_ACTION: &str = "add_training";
pub const UPDATE_ACTION: &str = "update_training";
pub const SUBMIT_ACTION: &str = "submit_training";
pub const ASSENT_ACTION: &str = "assent_training";

#[derive(Debug, Default, Deserialize)]
pub struct ParentQuery {
    /// Activity the new one is given under.
    pub parent: Option<String>,
}

/// An open activity list of a doctorate admission.
struct Training {
    admission: Admission,
    namespace: TrainingNamespace,
}

impl Training {
    fn wizard<'a>(&'a self, state: &'a AppState, identity: &'a Identity) -> Wizard<'a> {
        Wizard {
            state,
            identity,
            context: AdmissionContext::Doctorate,
            admission: Some(&self.admission),
        }
    }

    fn list_url(&self) -> String {
        format!(
            "/{}/{}/training/{}",
            AdmissionContext::Doctorate,
            self.admission.uuid,
            self.namespace.slug()
        )
    }
}

fn not_found(message: String) -> CoreError {
    CoreError::NotFound(message)
}

/// Load the admission behind a list and check the candidate may run
/// `action` on it.
async fn open_training(
    state: &AppState,
    identity: &Identity,
    context: &str,
    uuid: AdmissionId,
    namespace: &str,
    action: impl FnOnce(TrainingNamespace) -> &'static str,
) -> AppResult<Training> {
    let context = parse_context(context)?;
    if context != AdmissionContext::Doctorate {
        return Err(not_found(format!("No doctoral training for context {context}")).into());
    }
    let namespace = TrainingNamespace::from_slug(namespace)
        .ok_or_else(|| not_found(format!("Unknown training '{namespace}'")))?;
    let admission = state.service.get_proposition(identity, context, uuid).await?;
    let action = action(namespace);
    if !state.permissions.can_make_action(&admission, action) {
        let reason = admission
            .links
            .refusal(action)
            .unwrap_or("You are not allowed to do this");
        return Err(CoreError::Forbidden(reason.to_string()).into());
    }
    Ok(Training {
        admission,
        namespace,
    })
}

/// Category and kind of an activity, given under `parent` when set.
async fn resolve_kind(
    wizard: &Wizard<'_>,
    namespace: TrainingNamespace,
    category: &str,
    parent: Option<&str>,
) -> AppResult<(ActivityCategory, &'static ActivityKind)> {
    let category = ActivityCategory::from_name(category)
        .ok_or_else(|| not_found(format!("Unknown activity category '{category}'")))?;
    let parent_category = match parent {
        Some(parent) => {
            let remote = wizard
                .retrieve(Resource::TrainingActivity(parent.to_string()))
                .await?;
            let name = remote.get("category").and_then(Value::as_str).unwrap_or_default();
            Some(
                ActivityCategory::from_name(name)
                    .ok_or_else(|| not_found(format!("Unknown activity category '{name}'")))?,
            )
        }
        None => None,
    };
    let kind = activity_kind(namespace, parent_category, category).ok_or_else(|| {
        not_found(format!(
            "No {} activity in {}",
            category.name(),
            namespace.slug()
        ))
    })?;
    Ok((category, kind))
}

/// Stored values of the fields `kind` edits.
fn activity_initial(activity: &Value, kind: &ActivityKind) -> Value {
    let values: Map<String, Value> = kind
        .fields
        .iter()
        .map(|field| {
            let value = activity.get(*field).cloned().unwrap_or(Value::Null);
            (field.to_string(), value)
        })
        .collect();
    Value::Object(values)
}

/// Save an activity and send the candidate back to it on its list.
async fn save_activity<F, Fut>(
    namespace: TrainingNamespace,
    submitted: &Value,
    payload: Result<Value, FormErrors>,
    invoke: F,
    submission: &Submission,
    list_url: String,
    activity: Option<String>,
) -> Response
where
    F: FnOnce(Value) -> Fut,
    Fut: Future<Output = Result<Value, ServiceError>>,
{
    let rejected = |errors: FormErrors| {
        FormPage::new(namespace.slug(), submitted.clone(), Value::Null)
            .with_errors(errors)
            .into_response()
    };
    let payload = match payload {
        Ok(payload) => payload,
        Err(errors) => return rejected(errors),
    };
    match invoke(payload).await {
        Ok(result) => {
            let anchor = activity
                .or_else(|| result.get("uuid").and_then(Value::as_str).map(str::to_string));
            let fallback = match anchor {
                Some(anchor) => format!("{list_url}#{anchor}"),
                None => list_url,
            };
            Redirect::to(&submission.destination_or(fallback)).into_response()
        }
        Err(error) => rejected(form_errors_from_service(&[], &error)),
    }
}

// ---- lists ----

/// GET /{context}/{uuid}/training/{namespace}
pub async fn list(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, namespace)): Path<(String, AdmissionId, String)>,
) -> AppResult<FormPage> {
    let training = open_training(
        &state,
        &candidate.identity,
        &context,
        uuid,
        &namespace,
        TrainingNamespace::read_action,
    )
    .await?;
    let wizard = training.wizard(&state, &candidate.identity);
    let config = wizard.retrieve(Resource::TrainingConfig).await?;
    let activities = wizard
        .retrieve(Resource::TrainingList(training.namespace))
        .await?;
    Ok(FormPage::new(
        training.namespace.slug(),
        json!({}),
        json!({ "config": config, "activities": activities }),
    ))
}

/// POST /{context}/{uuid}/training/{namespace}
///
/// Submit a batch of activities. A rejection lists the activities in
/// error next to the messages.
pub async fn submit(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, namespace)): Path<(String, AdmissionId, String)>,
    Query(query): Query<SubmissionQuery>,
    Json(submitted): Json<Value>,
) -> AppResult<Response> {
    let training = open_training(&state, &candidate.identity, &context, uuid, &namespace, |_| SUBMIT_ACTION)
        .await?;
    let wizard = training.wizard(&state, &candidate.identity);
    let activities = wizard
        .retrieve(Resource::TrainingList(training.namespace))
        .await?;
    let page = |errors: FormErrors, in_error: Vec<String>| {
        FormPage::new(
            training.namespace.slug(),
            submitted.clone(),
            json!({ "activities": activities, "activities_in_error": in_error }),
        )
        .with_errors(errors)
        .into_response()
    };

    let form = match bind_form_with::<BatchActivityForm>(&submitted, |form| {
        form.choices = activity_uuids(&activities)
    }) {
        Ok(form) => form,
        Err(errors) => return Ok(page(errors, Vec::new())),
    };
    match wizard
        .post(Resource::TrainingSubmission, &form.into_payload())
        .await
    {
        Ok(_) => {
            tracing::info!(%uuid, training = training.namespace.slug(), "Activities submitted");
            let submission = Submission::from_request(&query, &submitted);
            Ok(Redirect::to(&submission.destination_or(training.list_url())).into_response())
        }
        Err(ServiceError::Business(errors)) => {
            let (errors, in_error) = batch_errors(&errors);
            Ok(page(errors, in_error))
        }
        Err(error) => Ok(page(form_errors_from_service(&[], &error), Vec::new())),
    }
}

// ---- activities ----

/// GET /{context}/{uuid}/training/{namespace}/add/{category}
pub async fn new_activity(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, namespace, category)): Path<(String, AdmissionId, String, String)>,
    Query(parent): Query<ParentQuery>,
) -> AppResult<FormPage> {
    let training = open_training(&state, &candidate.identity, &context, uuid, &namespace, |_| ADD_ACTION)
        .await?;
    let wizard = training.wizard(&state, &candidate.identity);
    let (category, kind) =
        resolve_kind(&wizard, training.namespace, &category, parent.parent.as_deref()).await?;
    Ok(FormPage::new(
        training.namespace.slug(),
        activity_initial(&Value::Null, kind),
        json!({ "category": category.name(), "parent": parent.parent }),
    ))
}

/// POST /{context}/{uuid}/training/{namespace}/add/{category}
pub async fn create_activity(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, namespace, category)): Path<(String, AdmissionId, String, String)>,
    Query(parent): Query<ParentQuery>,
    Query(query): Query<SubmissionQuery>,
    Json(submitted): Json<Value>,
) -> AppResult<Response> {
    let training = open_training(&state, &candidate.identity, &context, uuid, &namespace, |_| ADD_ACTION)
        .await?;
    let wizard = training.wizard(&state, &candidate.identity);
    let parent = parent.parent;
    let (category, kind) =
        resolve_kind(&wizard, training.namespace, &category, parent.as_deref()).await?;
    let namespace = training.namespace;
    let payload = ActivityForm::bind(&submitted, kind)
        .map(|form| activity_payload(form, namespace, category, parent.as_deref()));
    let submission = Submission::from_request(&query, &submitted);
    Ok(save_activity(
        namespace,
        &submitted,
        payload,
        |payload| async move { wizard.post(Resource::TrainingActivities, &payload).await },
        &submission,
        training.list_url(),
        None,
    )
    .await)
}

/// The stored activity and what it is: its category, its kind and the
/// activity it is given under.
async fn stored_activity(
    wizard: &Wizard<'_>,
    namespace: TrainingNamespace,
    activity: &str,
) -> AppResult<(Value, ActivityCategory, &'static ActivityKind, Option<String>)> {
    let remote = wizard
        .retrieve(Resource::TrainingActivity(activity.to_string()))
        .await?;
    let category = remote.get("category").and_then(Value::as_str).unwrap_or_default();
    let parent = remote.get("parent").and_then(Value::as_str).map(str::to_string);
    let (category, kind) = resolve_kind(wizard, namespace, category, parent.as_deref()).await?;
    Ok((remote, category, kind, parent))
}

/// GET /{context}/{uuid}/training/{namespace}/{activity}/edit
pub async fn activity(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, namespace, activity)): Path<(String, AdmissionId, String, String)>,
) -> AppResult<FormPage> {
    let training = open_training(&state, &candidate.identity, &context, uuid, &namespace, |_| UPDATE_ACTION)
        .await?;
    let wizard = training.wizard(&state, &candidate.identity);
    let (remote, category, kind, parent) =
        stored_activity(&wizard, training.namespace, &activity).await?;
    Ok(FormPage::new(
        training.namespace.slug(),
        activity_initial(&remote, kind),
        json!({ "category": category.name(), "parent": parent, "activity": remote }),
    ))
}

/// POST /{context}/{uuid}/training/{namespace}/{activity}/edit
pub async fn update_activity(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, namespace, activity)): Path<(String, AdmissionId, String, String)>,
    Query(query): Query<SubmissionQuery>,
    Json(submitted): Json<Value>,
) -> AppResult<Response> {
    let training = open_training(&state, &candidate.identity, &context, uuid, &namespace, |_| UPDATE_ACTION)
        .await?;
    let wizard = training.wizard(&state, &candidate.identity);
    let namespace = training.namespace;
    let (_, category, kind, parent) = stored_activity(&wizard, namespace, &activity).await?;
    let payload = ActivityForm::bind(&submitted, kind)
        .map(|form| activity_payload(form, namespace, category, parent.as_deref()));
    let submission = Submission::from_request(&query, &submitted);
    let resource = Resource::TrainingActivity(activity.clone());
    Ok(save_activity(
        namespace,
        &submitted,
        payload,
        |payload| async move { wizard.update(resource, &payload).await },
        &submission,
        training.list_url(),
        Some(activity),
    )
    .await)
}

/// POST /{context}/{uuid}/training/{namespace}/{activity}/delete
pub async fn delete_activity(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, namespace, activity)): Path<(String, AdmissionId, String, String)>,
    Query(query): Query<SubmissionQuery>,
) -> AppResult<Response> {
    let training = open_training(&state, &candidate.identity, &context, uuid, &namespace, |_| UPDATE_ACTION)
        .await?;
    let wizard = training.wizard(&state, &candidate.identity);
    let submitted = json!({});
    let submission = Submission::from_request(&query, &submitted);
    Ok(run_action(
        training.namespace.slug(),
        &[],
        &submitted,
        Ok(Value::Null),
        |_| async move {
            wizard.delete(Resource::TrainingActivity(activity)).await?;
            Ok::<_, ServiceError>(Value::Null)
        },
        &submission,
        training.list_url(),
    )
    .await)
}

/// GET /{context}/{uuid}/training/{namespace}/{activity}/assent
pub async fn assent(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, namespace, activity)): Path<(String, AdmissionId, String, String)>,
) -> AppResult<FormPage> {
    let training = open_training(&state, &candidate.identity, &context, uuid, &namespace, |_| ASSENT_ACTION)
        .await?;
    let wizard = training.wizard(&state, &candidate.identity);
    let remote = wizard.retrieve(Resource::TrainingActivity(activity)).await?;
    Ok(FormPage::new(
        training.namespace.slug(),
        assent_initial(&remote),
        json!({ "activity": remote }),
    ))
}

/// POST /{context}/{uuid}/training/{namespace}/{activity}/assent
pub async fn give_assent(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, namespace, activity)): Path<(String, AdmissionId, String, String)>,
    Query(query): Query<SubmissionQuery>,
    Json(submitted): Json<Value>,
) -> AppResult<Response> {
    let training = open_training(&state, &candidate.identity, &context, uuid, &namespace, |_| ASSENT_ACTION)
        .await?;
    let wizard = training.wizard(&state, &candidate.identity);
    let payload = bind_form::<AssentForm>(&submitted).map(CleanForm::into_payload);
    let submission = Submission::from_request(&query, &submitted);
    Ok(run_action(
        training.namespace.slug(),
        &[],
        &submitted,
        payload,
        |payload| async move {
            wizard
                .update(Resource::TrainingAssent(activity), &payload)
                .await
        },
        &submission,
        training.list_url(),
    )
    .await)
}
