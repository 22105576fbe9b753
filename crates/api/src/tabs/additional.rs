//! Accounting, training choice and the additional questions.

use admission_client::{Resource, ServiceError};
use admission_core::business::ErrorKind;
use admission_core::context::AdmissionContext;
use admission_core::forms::accounting::{self, AccountingForm};
use admission_core::forms::training_choice::{self, TrainingChoiceForm};
use admission_core::forms::{bind_form_with, CleanForm, FormErrors};
use admission_core::tabs::{TAB_ACCOUNTING, TAB_SPECIFIC_QUESTIONS, TAB_TRAINING_CHOICE};
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{join, TabData, TabForm, Wizard, REMOTE_ANSWERS_FIELD};

pub struct AccountingTab;

/// Which optional parts of the accounting form apply to this candidate.
fn accounting_flags(context: AdmissionContext, accounting: &Value) -> Value {
    json!({
        "is_general_admission": context == AdmissionContext::GeneralEducation,
        "with_assimilation": accounting["a_nationalite_ue"] == Value::Bool(false),
        "needs_debt_certificates": !accounting["derniers_etablissements_superieurs_communaute_fr_frequentes"].is_null(),
    })
}

#[async_trait]
impl TabForm for AccountingTab {
    fn tab(&self) -> &'static str {
        TAB_ACCOUNTING
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError> {
        let accounting = wizard.retrieve(Resource::Accounting).await?;
        Ok(TabData {
            initial: accounting::initial(&accounting),
            context: accounting_flags(wizard.context, &accounting),
        })
    }

    fn bind(&self, _: &Wizard<'_>, data: &TabData, submitted: &Value) -> Result<Value, FormErrors> {
        let flag = |name: &str| data.context[name].as_bool().unwrap_or(false);
        bind_form_with(submitted, |form: &mut AccountingForm| {
            form.is_general_admission = flag("is_general_admission");
            form.with_assimilation = flag("with_assimilation");
            form.needs_debt_certificates = flag("needs_debt_certificates");
        })
        .map(CleanForm::into_payload)
    }

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError> {
        wizard.update(Resource::Accounting, payload).await
    }
}

/// Creates the admission when none exists yet, otherwise changes its
/// training.
pub struct TrainingChoiceTab;

#[async_trait]
impl TabForm for TrainingChoiceTab {
    fn tab(&self) -> &'static str {
        TAB_TRAINING_CHOICE
    }

    fn business_errors(&self) -> &'static [(ErrorKind, &'static str)] {
        training_choice::BUSINESS_ERRORS
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError> {
        let Some(admission) = wizard.admission else {
            return Ok(TabData::new(json!({})));
        };
        let admission = serde_json::to_value(admission)
            .map_err(|e| ServiceError::Decode(e.to_string()))?;
        let questions = wizard.questions(TAB_TRAINING_CHOICE).await?;
        Ok(TabData::new(training_choice::initial(wizard.context, &admission))
            .with_questions(wizard, questions))
    }

    fn bind(&self, wizard: &Wizard<'_>, data: &TabData, submitted: &Value) -> Result<Value, FormErrors> {
        let current_context = wizard.admission.map(|_| wizard.context);
        let (form, answers) = join(
            bind_form_with(submitted, |form: &mut TrainingChoiceForm| {
                form.current_context = current_context;
            }),
            data.bind_questions(wizard, submitted),
        )?;
        let mut payload = form.into_payload();
        if wizard.admission.is_some() {
            payload[REMOTE_ANSWERS_FIELD] = answers;
        }
        Ok(payload)
    }

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError> {
        if wizard.admission.is_some() {
            return wizard.update(Resource::TrainingChoice, payload).await;
        }
        wizard
            .state
            .service
            .create_proposition(wizard.identity, wizard.context, payload)
            .await
    }
}

pub struct SpecificQuestionsTab;

#[async_trait]
impl TabForm for SpecificQuestionsTab {
    fn tab(&self) -> &'static str {
        TAB_SPECIFIC_QUESTIONS
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError> {
        let questions = wizard.questions(TAB_SPECIFIC_QUESTIONS).await?;
        Ok(TabData::new(json!({})).with_questions(wizard, questions))
    }

    fn bind(&self, wizard: &Wizard<'_>, data: &TabData, submitted: &Value) -> Result<Value, FormErrors> {
        let answers = data.bind_questions(wizard, submitted)?;
        Ok(json!({ REMOTE_ANSWERS_FIELD: answers }))
    }

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError> {
        wizard.update(Resource::SpecificQuestions, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accounting_flags_follow_the_loaded_data() {
        let flags = accounting_flags(
            AdmissionContext::GeneralEducation,
            &json!({
                "a_nationalite_ue": false,
                "derniers_etablissements_superieurs_communaute_fr_frequentes": { "names": ["UCL"] },
            }),
        );
        assert_eq!(
            flags,
            json!({ "is_general_admission": true, "with_assimilation": true, "needs_debt_certificates": true })
        );
    }

    #[test]
    fn unknown_nationality_does_not_offer_assimilation() {
        let flags = accounting_flags(AdmissionContext::Doctorate, &json!({}));
        assert_eq!(flags["with_assimilation"], json!(false));
        assert_eq!(flags["is_general_admission"], json!(false));
        assert_eq!(flags["needs_debt_certificates"], json!(false));
    }
}
