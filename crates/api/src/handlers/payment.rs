//! Application fees, paid after submission or at the faculty's request.

use admission_client::Resource;
use admission_core::admission::Admission;
use admission_core::error::CoreError;
use admission_core::forms::FormErrors;
use admission_core::types::AdmissionId;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::parse_context;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::Candidate;
use crate::response::{DataResponse, FormPage};
use crate::session::{PAYMENT_AFTER_REQUEST, PAYMENT_AFTER_SUBMISSION, PAYMENT_COMPLETED};
use crate::state::AppState;
use crate::tabs::Wizard;
use crate::wizard::contract::form_errors_from_service;
use crate::wizard::{Submission, SubmissionQuery};

pub const PAYMENT_PAGE: &str = "payment";
pub const PAYMENT_FAILED_MESSAGE: &str = "An error occurred during your payment.";

const ACTION_AFTER_SUBMISSION: &str = "pay_after_submission";
const ACTION_AFTER_REQUEST: &str = "pay_after_request";

/// Which fees the candidate may pay now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaymentKind {
    AfterSubmission,
    AfterRequest,
}

impl PaymentKind {
    /// Exactly one kind must be open.
    fn of(state: &AppState, admission: &Admission) -> AppResult<Self> {
        let after_submission = state.permissions.can_make_action(admission, ACTION_AFTER_SUBMISSION);
        let after_request = state.permissions.can_make_action(admission, ACTION_AFTER_REQUEST);
        match (after_submission, after_request) {
            (true, false) => Ok(Self::AfterSubmission),
            (false, true) => Ok(Self::AfterRequest),
            (false, false) => Err(CoreError::Forbidden("No payment is expected for this admission".into()).into()),
            (true, true) => Err(AppError::InternalError(
                "Both payment kinds are open for the same admission".into(),
            )),
        }
    }

    fn resource(self) -> Resource {
        match self {
            Self::AfterSubmission => Resource::PaymentAfterSubmission,
            Self::AfterRequest => Resource::PaymentAfterRequest,
        }
    }

    fn session_value(self) -> &'static str {
        match self {
            Self::AfterSubmission => PAYMENT_AFTER_SUBMISSION,
            Self::AfterRequest => PAYMENT_AFTER_REQUEST,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentAction {
    pub action: String,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

/// GET /{context}/{uuid}/payment
pub async fn page(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid)): Path<(String, AdmissionId)>,
) -> AppResult<Json<DataResponse<Value>>> {
    let context = parse_context(&context)?;
    let admission = state
        .service
        .get_proposition(&candidate.identity, context, uuid)
        .await?;
    let kind = PaymentKind::of(&state, &admission)?;
    Ok(Json(DataResponse {
        data: json!({
            "admission": admission,
            "payment": kind.session_value(),
        }),
    }))
}

/// POST /{context}/{uuid}/payment
///
/// `valid-payment` records the payment, `invalid-payment` reports a failed
/// one.
pub async fn submit(
    State(state): State<AppState>,
    candidate: Candidate,
    Path((context, uuid)): Path<(String, AdmissionId)>,
    Query(query): Query<SubmissionQuery>,
    Json(input): Json<PaymentAction>,
) -> AppResult<Response> {
    let context = parse_context(&context)?;
    let admission = state
        .service
        .get_proposition(&candidate.identity, context, uuid)
        .await?;
    let submitted = json!({ "action": input.action });
    let submission = Submission::from_request(&query, &json!({ "redirect_to": input.redirect_to }));

    match input.action.as_str() {
        "valid-payment" => {
            let kind = PaymentKind::of(&state, &admission)?;
            let wizard = Wizard {
                state: &state,
                identity: &candidate.identity,
                context,
                admission: Some(&admission),
            };
            if let Err(error) = wizard.post(kind.resource(), &json!({})).await {
                let errors = form_errors_from_service(&[], &error);
                return Ok(FormPage::new(PAYMENT_PAGE, submitted, Value::Null)
                    .with_errors(errors)
                    .into_response());
            }
            state
                .sessions
                .put(
                    &candidate.identity.global_id,
                    PAYMENT_COMPLETED,
                    json!(kind.session_value()),
                )
                .await;
            tracing::info!(%context, admission = %uuid, payment = kind.session_value(), "Payment recorded");
            Ok(Redirect::to(&submission.destination_or(context.home_url(uuid))).into_response())
        }
        "invalid-payment" => {
            tracing::warn!(%context, admission = %uuid, "Payment failed");
            let mut errors = FormErrors::new();
            errors.add_non_field(PAYMENT_FAILED_MESSAGE);
            Ok(FormPage::new(PAYMENT_PAGE, submitted, Value::Null)
                .with_errors(errors)
                .into_response())
        }
        other => Err(AppError::BadRequest(format!("Unknown payment action '{other}'"))),
    }
}
