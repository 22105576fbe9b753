//! Final steps: confirmation of the application and completion of the
//! documents requested after submission.

use admission_client::{Resource, ServiceError};
use admission_core::admission::STATUS_PENDING_FEES;
use admission_core::business::BusinessError;
use admission_core::forms::confirm::{ensure_submittable, ConfirmForm, VERIFICATION_UNREADABLE_MESSAGE};
use admission_core::forms::documents::{DocumentsForm, RequestedDocuments};
use admission_core::forms::FormErrors;
use admission_core::questions::{descriptors_from_value, missing_required};
use admission_core::tabs::{TAB_CONFIRM, TAB_DOCUMENTS};
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{TabData, TabForm, Wizard};
use crate::session::{ADMISSION_CONFIRM_DOCUMENTS, PROPOSITION_JUST_SUBMITTED};

/// Payment page of an admission.
pub fn payment_url(wizard: &Wizard<'_>) -> Option<String> {
    wizard
        .uuid()
        .map(|uuid| format!("{}/payment", wizard.context.home_url(uuid)))
}

/// Verification errors and confirmation elements, whichever shape the
/// service answers with. Errors that cannot be decoded are reported as
/// such and never read as an empty list.
fn split_verification(verification: Value) -> (Result<Vec<BusinessError>, String>, Value) {
    let (errors, elements) = match verification {
        Value::Array(_) => (verification, Value::Null),
        Value::Object(mut object) => (
            object.remove("errors").unwrap_or(Value::Null),
            object.remove("elements_confirmation").unwrap_or(Value::Null),
        ),
        _ => (Value::Null, Value::Null),
    };
    let errors = match errors {
        Value::Null => Ok(Vec::new()),
        errors => serde_json::from_value(errors).map_err(|e| e.to_string()),
    };
    (errors, elements)
}

/// Refuse submission unless the verification was read and passed.
fn ensure_verified(context: &Value) -> Result<(), FormErrors> {
    let unreadable = || {
        let mut errors = FormErrors::new();
        errors.add_non_field(VERIFICATION_UNREADABLE_MESSAGE);
        errors
    };
    if context.get("verification_failure").is_some_and(|failure| !failure.is_null()) {
        return Err(unreadable());
    }
    let errors: Vec<BusinessError> =
        serde_json::from_value(context["verification_errors"].clone()).map_err(|_| unreadable())?;
    let missing = descriptors_from_value(&context["missing_questions"]);
    let missing: Vec<_> = missing.iter().collect();
    ensure_submittable(&errors, &missing)
}

pub struct ConfirmTab;

#[async_trait]
impl TabForm for ConfirmTab {
    fn tab(&self) -> &'static str {
        TAB_CONFIRM
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError> {
        let Some(admission) = wizard.admission else {
            return Ok(TabData::new(json!({})));
        };
        let (errors, elements) = split_verification(wizard.retrieve(Resource::Verification).await?);
        let (errors, failure) = match errors {
            Ok(errors) => (errors, None),
            Err(message) => {
                tracing::error!(error = %message, "Unreadable verification errors");
                (Vec::new(), Some(message))
            }
        };
        let grouped = wizard.state.permissions.group_errors_by_tab(
            wizard.context.tab_tree(),
            admission,
            &errors,
        );
        let questions = wizard.all_questions().await?;
        let missing: Vec<_> = missing_required(&questions, &wizard.stored_answers());

        Ok(TabData {
            initial: ConfirmForm::initial(admission),
            context: json!({
                "errors_by_tab": grouped,
                "verification_errors": errors,
                "verification_failure": failure,
                "missing_questions": missing,
                "elements": elements,
                "late_notice": admission.late_enrollment_notice(chrono::Utc::now().date_naive()),
            }),
        })
    }

    fn bind(&self, _: &Wizard<'_>, data: &TabData, submitted: &Value) -> Result<Value, FormErrors> {
        ensure_verified(&data.context)?;
        ConfirmForm::from_value(&data.context["elements"]).bind(submitted)
    }

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError> {
        wizard.post(Resource::Submission, payload).await
    }

    async fn after_success(&self, wizard: &Wizard<'_>, result: &Value) -> Option<String> {
        let status = result
            .get("status")
            .or_else(|| result.get("statut"))
            .and_then(Value::as_str);
        if status == Some(STATUS_PENDING_FEES) {
            return payment_url(wizard);
        }
        wizard
            .state
            .sessions
            .put(
                &wizard.identity.global_id,
                PROPOSITION_JUST_SUBMITTED,
                json!(wizard.context.slug()),
            )
            .await;
        wizard.uuid().map(|uuid| wizard.context.home_url(uuid))
    }
}

/// Documents requested by the faculty once the application is submitted.
pub struct DocumentsTab;

#[async_trait]
impl TabForm for DocumentsTab {
    fn tab(&self) -> &'static str {
        TAB_DOCUMENTS
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError> {
        let requested = wizard.retrieve(Resource::Documents).await?;
        let form = DocumentsForm::new(&RequestedDocuments::from_value(&requested));
        Ok(TabData {
            initial: form.initial(&requested["answers"]),
            context: requested,
        })
    }

    fn bind(&self, _: &Wizard<'_>, data: &TabData, submitted: &Value) -> Result<Value, FormErrors> {
        let form = DocumentsForm::new(&RequestedDocuments::from_value(&data.context));
        form.bind(submitted).map(DocumentsForm::into_payload)
    }

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError> {
        wizard.update(Resource::Documents, payload).await
    }

    async fn after_success(&self, wizard: &Wizard<'_>, _: &Value) -> Option<String> {
        let uuid = wizard.uuid()?;
        wizard
            .state
            .sessions
            .put(
                &wizard.identity.global_id,
                ADMISSION_CONFIRM_DOCUMENTS,
                json!(uuid.to_string()),
            )
            .await;
        Some(wizard.context.tab_update_url(uuid, "confirm-documents"))
    }
}
