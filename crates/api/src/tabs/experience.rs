//! Previous experience: secondary studies, curriculum, exam and languages.

use admission_client::{Resource, ServiceError};
use admission_core::business::ErrorKind;
use admission_core::forms::curriculum::{self, CurriculumForm};
use admission_core::forms::education::EducationForms;
use admission_core::forms::exam::{self, ExamForm, ExamStatus};
use admission_core::forms::languages::{self, LanguagesForm};
use admission_core::forms::{bind_form, CleanForm, FormErrors};
use admission_core::tabs::{TAB_CURRICULUM, TAB_EDUCATION, TAB_EXAM, TAB_LANGUAGES};
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{join, TabData, TabForm, Wizard, REMOTE_ANSWERS_FIELD};

/// Attach the dynamic question answers to a payload once the admission
/// exists.
fn with_answers(wizard: &Wizard<'_>, mut payload: Value, answers: Value) -> Value {
    if wizard.admission.is_some() {
        payload[REMOTE_ANSWERS_FIELD] = answers;
    }
    payload
}

pub struct EducationTab;

#[async_trait]
impl TabForm for EducationTab {
    fn tab(&self) -> &'static str {
        TAB_EDUCATION
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError> {
        let studies = wizard.retrieve(Resource::SecondaryStudies).await?;
        let questions = wizard.questions(TAB_EDUCATION).await?;
        Ok(TabData::new(EducationForms::initial(&studies)).with_questions(wizard, questions))
    }

    fn bind(&self, wizard: &Wizard<'_>, data: &TabData, submitted: &Value) -> Result<Value, FormErrors> {
        let (forms, answers) = join(
            EducationForms::bind(submitted),
            data.bind_questions(wizard, submitted),
        )?;
        Ok(with_answers(wizard, forms.into_payload(), answers))
    }

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError> {
        wizard.update(Resource::SecondaryStudies, payload).await
    }
}

pub struct CurriculumTab;

#[async_trait]
impl TabForm for CurriculumTab {
    fn tab(&self) -> &'static str {
        TAB_CURRICULUM
    }

    fn business_errors(&self) -> &'static [(ErrorKind, &'static str)] {
        curriculum::BUSINESS_ERRORS
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError> {
        let curriculum = wizard.retrieve(Resource::Curriculum).await?;
        let initial = json!({
            "curriculum": curriculum.get("curriculum").cloned().unwrap_or_else(|| json!([])),
        });
        let questions = wizard.questions(TAB_CURRICULUM).await?;
        let mut data = TabData::new(initial).with_questions(wizard, questions);
        // Experiences are listed on the page, edited elsewhere.
        data.context["experiences"] = curriculum
            .get("experiences")
            .cloned()
            .unwrap_or_else(|| json!([]));
        Ok(data)
    }

    fn bind(&self, wizard: &Wizard<'_>, data: &TabData, submitted: &Value) -> Result<Value, FormErrors> {
        let (form, answers) = join(
            bind_form::<CurriculumForm>(submitted),
            data.bind_questions(wizard, submitted),
        )?;
        Ok(with_answers(wizard, form.into_payload(), answers))
    }

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError> {
        wizard.update(Resource::Curriculum, payload).await
    }
}

pub struct ExamTab;

#[async_trait]
impl TabForm for ExamTab {
    fn tab(&self) -> &'static str {
        TAB_EXAM
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError> {
        let remote = wizard.retrieve(Resource::Exam).await?;
        let status = ExamStatus::from_remote(&remote);
        let mut data = TabData::new(exam::initial(&remote));
        data.context = json!({
            "required": status.required,
            "is_valuated": status.is_valuated,
            "title": exam::certificate_title(&remote, &wizard.identity.language),
        });
        Ok(data)
    }

    fn bind(&self, _: &Wizard<'_>, _: &TabData, submitted: &Value) -> Result<Value, FormErrors> {
        bind_form::<ExamForm>(submitted).map(ExamForm::into_payload)
    }

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError> {
        wizard.update(Resource::Exam, payload).await
    }

    fn is_read_only(&self, data: &TabData) -> bool {
        ExamStatus {
            required: data.context["required"].as_bool().unwrap_or(false),
            is_valuated: data.context["is_valuated"].as_bool().unwrap_or(false),
        }
        .is_read_only()
    }
}

pub struct LanguagesTab;

#[async_trait]
impl TabForm for LanguagesTab {
    fn tab(&self) -> &'static str {
        TAB_LANGUAGES
    }

    fn business_errors(&self) -> &'static [(ErrorKind, &'static str)] {
        languages::BUSINESS_ERRORS
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError> {
        let knowledge = wizard.retrieve(Resource::Languages).await?;
        Ok(TabData::new(LanguagesForm::initial(&knowledge)))
    }

    fn bind(&self, _: &Wizard<'_>, _: &TabData, submitted: &Value) -> Result<Value, FormErrors> {
        LanguagesForm::bind(submitted).map(LanguagesForm::into_payload)
    }

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError> {
        wizard.update(Resource::Languages, payload).await
    }
}
