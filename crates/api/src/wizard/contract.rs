//! Lifecycle of a tab submission: load, bind, transform, invoke, redirect.
//!
//! Local validation failures and remote rejections both re-render the form
//! with a 422 and nothing is retried: the candidate resubmits explicitly.
//! Only failures outside the form (unknown tab, tab not writable, the
//! admission itself unreachable) surface as [`AppError`]s.

use std::sync::Arc;

use admission_client::{Identity, ServiceError};
use admission_core::admission::Admission;
use admission_core::business::{field_for, max_length_message, parse_max_length_error, ErrorKind};
use admission_core::context::AdmissionContext;
use admission_core::error::CoreError;
use admission_core::forms::FormErrors;
use admission_core::types::AdmissionId;
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::Value;

use super::redirect::success_url;
use super::Submission;
use crate::error::AppResult;
use crate::response::FormPage;
use crate::state::AppState;
use crate::tabs::{TabData, TabForm, Wizard};

/// The form of `tab`, provided the tab belongs to `context`.
pub fn tab_form(state: &AppState, context: AdmissionContext, tab: &str) -> AppResult<Arc<dyn TabForm>> {
    if !context.tab_tree().contains(tab) {
        return Err(unknown_tab(context, tab).into());
    }
    state
        .tabs
        .get(tab)
        .ok_or_else(|| unknown_tab(context, tab).into())
}

fn unknown_tab(context: AdmissionContext, tab: &str) -> CoreError {
    CoreError::UnknownTab {
        context: context.slug(),
        tab: tab.to_string(),
    }
}

/// Load the admission and check the candidate may update `tab`.
pub async fn open_for_update(
    state: &AppState,
    identity: &Identity,
    context: AdmissionContext,
    uuid: AdmissionId,
    tab: &str,
) -> AppResult<(Admission, Arc<dyn TabForm>)> {
    let form = tab_form(state, context, tab)?;
    let admission = state.service.get_proposition(identity, context, uuid).await?;
    ensure_can_update(state, &admission, tab)?;
    Ok((admission, form))
}

pub fn ensure_can_update(state: &AppState, admission: &Admission, tab: &str) -> AppResult<()> {
    if state.permissions.can_update_tab(admission, tab) {
        return Ok(());
    }
    let read = state.permissions.read_requirement(tab);
    let update = state.permissions.update_requirement(tab);
    let reason = read
        .actions()
        .iter()
        .chain(update.actions())
        .find_map(|action| admission.links.refusal(action))
        .unwrap_or("You are not allowed to update this step");
    Err(CoreError::Forbidden(reason.to_string()).into())
}

/// Initial rendering of the form.
pub async fn render(wizard: &Wizard<'_>, form: &dyn TabForm) -> AppResult<FormPage> {
    let data = form.load(wizard).await?;
    Ok(FormPage::new(form.tab(), data.initial, data.context))
}

/// Edit page of the form, or a redirect to the read view when nothing is
/// left to edit.
pub async fn render_edit(wizard: &Wizard<'_>, form: &dyn TabForm) -> AppResult<Response> {
    let data = form.load(wizard).await?;
    if let Some(url) = read_only_redirect(wizard, form, &data) {
        return Ok(Redirect::to(&url).into_response());
    }
    Ok(FormPage::new(form.tab(), data.initial, data.context).into_response())
}

fn read_only_redirect(wizard: &Wizard<'_>, form: &dyn TabForm, data: &TabData) -> Option<String> {
    let uuid = wizard.uuid().filter(|_| form.is_read_only(data))?;
    tracing::debug!(tab = form.tab(), %uuid, "Read-only tab, sending to its read view");
    Some(wizard.context.tab_url(uuid, form.tab()))
}

/// Run the whole contract for one submission.
pub async fn submit(
    wizard: &Wizard<'_>,
    form: &dyn TabForm,
    submitted: &Value,
    submission: &Submission,
) -> AppResult<Response> {
    let data = form.load(wizard).await?;
    if let Some(url) = read_only_redirect(wizard, form, &data) {
        return Ok(Redirect::to(&url).into_response());
    }

    let payload = match form.bind(wizard, &data, submitted) {
        Ok(payload) => payload,
        Err(errors) => {
            tracing::debug!(tab = form.tab(), errors = ?errors, "Submission rejected locally");
            return Ok(rejected(form, submitted, data.context, errors));
        }
    };

    let result = match form.invoke(wizard, &payload).await {
        Ok(result) => result,
        Err(error) => {
            let errors = form_errors_from_service(form.business_errors(), &error);
            return Ok(rejected(form, submitted, data.context, errors));
        }
    };

    tracing::info!(
        context = %wizard.context,
        admission = ?wizard.uuid(),
        tab = form.tab(),
        "Tab saved"
    );

    let destination = form.after_success(wizard, &result).await;
    let url = match (&submission.redirect_to, destination) {
        (Some(target), _) => target.clone(),
        (None, Some(destination)) => destination,
        (None, None) => default_destination(wizard, form.tab(), &result, submission).await,
    };
    Ok(Redirect::to(&url).into_response())
}

fn rejected(form: &dyn TabForm, submitted: &Value, context: Value, errors: FormErrors) -> Response {
    FormPage::new(form.tab(), submitted.clone(), context)
        .with_errors(errors)
        .into_response()
}

/// Redirect policy applied to the saved admission, or to the one just
/// created.
async fn default_destination(
    wizard: &Wizard<'_>,
    tab: &str,
    result: &Value,
    submission: &Submission,
) -> String {
    let created;
    let admission = match wizard.admission {
        Some(admission) => admission,
        None => {
            let Some(uuid) = result
                .get("uuid")
                .and_then(Value::as_str)
                .and_then(|uuid| uuid.parse().ok())
            else {
                return "/propositions".to_string();
            };
            match wizard
                .state
                .service
                .get_proposition(wizard.identity, wizard.context, uuid)
                .await
            {
                Ok(admission) => {
                    created = admission;
                    &created
                }
                Err(e) => {
                    tracing::warn!(error = %e, %uuid, "Created admission could not be loaded");
                    return wizard.context.tab_url(uuid, tab);
                }
            }
        }
    };
    success_url(
        &wizard.state.permissions,
        wizard.context.tab_tree(),
        wizard.context,
        admission,
        tab,
        submission,
    )
}

/// Convert a failed remote call into errors of the submitted form.
///
/// Business errors go to the field `mapping` names for their kind, then to
/// the field the service attached them to, and to the whole form
/// otherwise. A transport message about a value too long for a field is
/// attached to that field.
pub fn form_errors_from_service(mapping: &[(ErrorKind, &'static str)], error: &ServiceError) -> FormErrors {
    let mut errors = FormErrors::new();
    match error {
        ServiceError::Business(business) => {
            for e in business {
                tracing::warn!(status_code = %e.status_code, detail = %e.detail, "Business error");
                let field = e
                    .kind()
                    .and_then(|kind| field_for(mapping, kind))
                    .map(str::to_string)
                    .or_else(|| e.field.clone());
                match field {
                    Some(field) => errors.add(field, e.detail.clone()),
                    None => errors.add_non_field(e.detail.clone()),
                }
            }
        }
        ServiceError::PermissionDenied(message) => {
            tracing::warn!(error = %message, "Submission refused");
            errors.add_non_field(message.clone());
        }
        ServiceError::Api { status, body } => {
            tracing::error!(status, body = %body, "Admission service error");
            match parse_max_length_error(body) {
                Some((field, max)) => errors.add(field, max_length_message(max)),
                None => errors.add_non_field(body.clone()),
            }
        }
        ServiceError::NotFound(_) | ServiceError::Request(_) | ServiceError::Decode(_) => {
            tracing::error!(error = %error, "Admission service failure");
            errors.add_non_field(error.to_string());
        }
    }
    errors
}
