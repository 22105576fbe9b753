pub mod documents;
pub mod experience;
pub mod jury;
pub mod payment;
pub mod proposition;
pub mod public;
pub mod supervision;
pub mod training;
pub mod wizard;

use std::future::Future;

use admission_client::ServiceError;
use admission_core::business::ErrorKind;
use admission_core::context::AdmissionContext;
use admission_core::forms::FormErrors;
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::Value;

use crate::error::AppResult;
use crate::response::FormPage;
use crate::wizard::contract::form_errors_from_service;
use crate::wizard::Submission;

/// Context of the `{context}` path segment.
pub(crate) fn parse_context(slug: &str) -> AppResult<AdmissionContext> {
    Ok(AdmissionContext::from_slug(slug)?)
}

/// Run a single remote action bound from `submitted`, outside the tab
/// forms. On success the candidate is sent to the requested `redirect_to`,
/// or to `destination` without one. Failures re-render `tab` with its
/// errors.
pub(crate) async fn run_action<F, Fut>(
    tab: &'static str,
    mapping: &[(ErrorKind, &'static str)],
    submitted: &Value,
    payload: Result<Value, FormErrors>,
    invoke: F,
    submission: &Submission,
    destination: String,
) -> Response
where
    F: FnOnce(Value) -> Fut,
    Fut: Future<Output = Result<Value, ServiceError>>,
{
    let rejected = |errors| {
        FormPage::new(tab, submitted.clone(), Value::Null)
            .with_errors(errors)
            .into_response()
    };
    let payload = match payload {
        Ok(payload) => payload,
        Err(errors) => return rejected(errors),
    };
    match invoke(payload).await {
        Ok(_) => Redirect::to(&submission.destination_or(destination)).into_response(),
        Err(error) => rejected(form_errors_from_service(mapping, &error)),
    }
}
