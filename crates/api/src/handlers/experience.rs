//! Professional and educational experiences listed on the curriculum tab.
//!
//! Each experience is created, edited and removed on its own page; the
//! curriculum tab itself only lists them. Every route needs the right to
//! update the curriculum.

use admission_client::{Identity, Resource, ServiceError};
use admission_core::admission::Admission;
use admission_core::context::AdmissionContext;
use admission_core::forms::experience::{
    educational_initial, professional_initial, EducationalExperienceForms,
    ProfessionalExperienceForm,
};
use admission_core::forms::{bind_form, CleanForm};
use admission_core::tabs::TAB_CURRICULUM;
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

const PROFESSIONAL_ANCHOR: &str = "non-academic-activities";
const EDUCATIONAL_ANCHOR: &str = "academic-activities";

async fn open_curriculum(
    state: &AppState,
    identity: &Identity,
    context: &str,
    uuid: AdmissionId,
) -> AppResult<(AdmissionContext, Admission)> {
    let context = parse_context(context)?;
    let (admission, _) = open_for_update(state, identity, context, uuid, TAB_CURRICULUM).await?;
    Ok((context, admission))
}

/// Section of the curriculum edit page listing the experience.
fn curriculum_url(context: AdmissionContext, uuid: AdmissionId, anchor: &str) -> String {
    format!("{}#{anchor}", context.tab_update_url(uuid, TAB_CURRICULUM))
}

fn empty_page(kind: &str) -> FormPage {
    FormPage::new(TAB_CURRICULUM, json!({}), json!({ "experience_type": kind }))
}

// ---- professional ----

/// GET /{context}/{uuid}/update/curriculum/professional/create
pub async fn new_professional(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid)): Path<(String, AdmissionId)>,
) -> AppResult<FormPage> {
    open_curriculum(&state, &candidate.identity, &context, uuid).await?;
    Ok(empty_page("professional"))
}

/// POST /{context}/{uuid}/update/curriculum/professional/create
pub async fn create_professional(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid)): Path<(String, AdmissionId)>,
    Query(query): Query<SubmissionQuery>,
    Json(submitted): Json<Value>,
) -> AppResult<Response> {
    let (context, admission) = open_curriculum(&state, &candidate.identity, &context, uuid).await?;
    let wizard = Wizard {
        state: &state,
        identity: &candidate.identity,
        context,
        admission: Some(&admission),
    };
    let payload = bind_form::<ProfessionalExperienceForm>(&submitted).map(CleanForm::into_payload);
    let submission = Submission::from_request(&query, &submitted);
    Ok(run_action(
        TAB_CURRICULUM,
        &[],
        &submitted,
        payload,
        |payload| async move { wizard.post(Resource::ProfessionalExperiences, &payload).await },
        &submission,
        curriculum_url(context, uuid, PROFESSIONAL_ANCHOR),
    )
    .await)
}

/// GET /{context}/{uuid}/update/curriculum/professional/{experience}/update
pub async fn professional(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, experience)): Path<(String, AdmissionId, String)>,
) -> AppResult<FormPage> {
    let (context, admission) = open_curriculum(&state, &candidate.identity, &context, uuid).await?;
    let wizard = Wizard {
        state: &state,
        identity: &candidate.identity,
        context,
        admission: Some(&admission),
    };
    let remote = wizard
        .retrieve(Resource::ProfessionalExperience(experience))
        .await?;
    Ok(FormPage::new(
        TAB_CURRICULUM,
        professional_initial(&remote),
        json!({ "experience_type": "professional", "experience": remote }),
    ))
}

/// POST /{context}/{uuid}/update/curriculum/professional/{experience}/update
pub async fn update_professional(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, experience)): Path<(String, AdmissionId, String)>,
    Query(query): Query<SubmissionQuery>,
    Json(submitted): Json<Value>,
) -> AppResult<Response> {
    let (context, admission) = open_curriculum(&state, &candidate.identity, &context, uuid).await?;
    let wizard = Wizard {
        state: &state,
        identity: &candidate.identity,
        context,
        admission: Some(&admission),
    };
    let payload = bind_form::<ProfessionalExperienceForm>(&submitted).map(CleanForm::into_payload);
    let submission = Submission::from_request(&query, &submitted);
    Ok(run_action(
        TAB_CURRICULUM,
        &[],
        &submitted,
        payload,
        |payload| async move {
            wizard
                .update(Resource::ProfessionalExperience(experience), &payload)
                .await
        },
        &submission,
        curriculum_url(context, uuid, PROFESSIONAL_ANCHOR),
    )
    .await)
}

/// POST /{context}/{uuid}/update/curriculum/professional/{experience}/delete
pub async fn delete_professional(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, experience)): Path<(String, AdmissionId, String)>,
    Query(query): Query<SubmissionQuery>,
) -> AppResult<Response> {
    let resource = Resource::ProfessionalExperience(experience);
    delete_experience(state, candidate, context, uuid, query, resource, PROFESSIONAL_ANCHOR).await
}

// ---- educational ----

/// GET /{context}/{uuid}/update/curriculum/educational/create
pub async fn new_educational(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid)): Path<(String, AdmissionId)>,
) -> AppResult<FormPage> {
    open_curriculum(&state, &candidate.identity, &context, uuid).await?;
    Ok(empty_page("educational"))
}

/// POST /{context}/{uuid}/update/curriculum/educational/create
pub async fn create_educational(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid)): Path<(String, AdmissionId)>,
    Query(query): Query<SubmissionQuery>,
    Json(submitted): Json<Value>,
) -> AppResult<Response> {
    let (context, admission) = open_curriculum(&state, &candidate.identity, &context, uuid).await?;
    let wizard = Wizard {
        state: &state,
        identity: &candidate.identity,
        context,
        admission: Some(&admission),
    };
    let payload = EducationalExperienceForms::bind(&submitted, context)
        .map(|forms| forms.into_payload(context, &Value::Null));
    let submission = Submission::from_request(&query, &submitted);
    Ok(run_action(
        TAB_CURRICULUM,
        &[],
        &submitted,
        payload,
        |payload| async move { wizard.post(Resource::EducationalExperiences, &payload).await },
        &submission,
        curriculum_url(context, uuid, EDUCATIONAL_ANCHOR),
    )
    .await)
}

/// GET /{context}/{uuid}/update/curriculum/educational/{experience}/update
pub async fn educational(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, experience)): Path<(String, AdmissionId, String)>,
) -> AppResult<FormPage> {
    let (context, admission) = open_curriculum(&state, &candidate.identity, &context, uuid).await?;
    let wizard = Wizard {
        state: &state,
        identity: &candidate.identity,
        context,
        admission: Some(&admission),
    };
    let remote = wizard
        .retrieve(Resource::EducationalExperience(experience))
        .await?;
    Ok(FormPage::new(
        TAB_CURRICULUM,
        educational_initial(&remote),
        json!({ "experience_type": "educational", "experience": remote }),
    ))
}

/// POST /{context}/{uuid}/update/curriculum/educational/{experience}/update
///
/// Fields the context may not edit keep their stored value.
pub async fn update_educational(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, experience)): Path<(String, AdmissionId, String)>,
    Query(query): Query<SubmissionQuery>,
    Json(submitted): Json<Value>,
) -> AppResult<Response> {
    let (context, admission) = open_curriculum(&state, &candidate.identity, &context, uuid).await?;
    let wizard = Wizard {
        state: &state,
        identity: &candidate.identity,
        context,
        admission: Some(&admission),
    };
    let resource = Resource::EducationalExperience(experience);
    let stored = wizard.retrieve(resource.clone()).await?;
    let payload = EducationalExperienceForms::bind(&submitted, context)
        .map(|forms| forms.into_payload(context, &stored));
    let submission = Submission::from_request(&query, &submitted);
    Ok(run_action(
        TAB_CURRICULUM,
        &[],
        &submitted,
        payload,
        |payload| async move { wizard.update(resource, &payload).await },
        &submission,
        curriculum_url(context, uuid, EDUCATIONAL_ANCHOR),
    )
    .await)
}

/// POST /{context}/{uuid}/update/curriculum/educational/{experience}/delete
pub async fn delete_educational(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid, experience)): Path<(String, AdmissionId, String)>,
    Query(query): Query<SubmissionQuery>,
) -> AppResult<Response> {
    let resource = Resource::EducationalExperience(experience);
    delete_experience(state, candidate, context, uuid, query, resource, EDUCATIONAL_ANCHOR).await
}

async fn delete_experience(
    state: AppState,
    candidate: Candidate,
    context: String,
    uuid: AdmissionId,
    query: SubmissionQuery,
    resource: Resource,
    anchor: &str,
) -> AppResult<Response> {
    let (context, admission) = open_curriculum(&state, &candidate.identity, &context, uuid).await?;
    let wizard = Wizard {
        state: &state,
        identity: &candidate.identity,
        context,
        admission: Some(&admission),
    };
    let submitted = json!({});
    let submission = Submission::from_request(&query, &submitted);
    Ok(run_action(
        TAB_CURRICULUM,
        &[],
        &submitted,
        Ok(Value::Null),
        |_| async move {
            wizard.delete(resource).await?;
            Ok::<_, ServiceError>(Value::Null)
        },
        &submission,
        curriculum_url(context, uuid, anchor),
    )
    .await)
}
