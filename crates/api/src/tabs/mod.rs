//! Form handlers of the writable wizard tabs.
//!
//! Each tab supplies the collaborators of the submission contract
//! ([`crate::wizard::contract`]): how to load its initial values, how to
//! bind and transform a submission, and which remote operation to call.

mod additional;
mod doctorate;
mod experience;
mod personal;
mod submission;

use std::collections::HashMap;
use std::sync::Arc;

use admission_client::{Identity, Resource, ServiceError};
use admission_core::admission::Admission;
use admission_core::business::ErrorKind;
use admission_core::context::AdmissionContext;
use admission_core::forms::FormErrors;
use admission_core::questions::{
    answers_from_value, descriptors_from_value, merge_initial, Answers, FieldSet,
    QuestionDescriptor, RenderOptions,
};
use admission_core::types::AdmissionId;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::state::AppState;

pub use additional::{AccountingTab, SpecificQuestionsTab, TrainingChoiceTab};
pub use doctorate::{
    ConfirmationPaperTab, CotutelleTab, ExtensionRequestTab, JuryPreparationTab, JuryTab,
    ProjectTab, SupervisionTab,
};
pub use experience::{CurriculumTab, EducationTab, ExamTab, LanguagesTab};
pub use personal::{CoordinatesTab, PersonTab};
pub use submission::{ConfirmTab, DocumentsTab};

/// Submitted key holding the answers to dynamic questions.
pub const ANSWERS_FIELD: &str = "specific_question_answers";
/// Remote key of the same answers.
pub const REMOTE_ANSWERS_FIELD: &str = "reponses_questions_specifiques";

/// Everything a request needs to talk to the admission service on behalf
/// of the candidate.
pub struct Wizard<'a> {
    pub state: &'a AppState,
    pub identity: &'a Identity,
    pub context: AdmissionContext,
    /// `None` in create mode.
    pub admission: Option<&'a Admission>,
}

impl Wizard<'_> {
    pub fn uuid(&self) -> Option<AdmissionId> {
        self.admission.map(|admission| admission.uuid)
    }

    fn require_uuid(&self) -> Result<AdmissionId, ServiceError> {
        self.uuid()
            .ok_or_else(|| ServiceError::NotFound("This step requires an existing admission".into()))
    }

    pub async fn retrieve(&self, resource: Resource) -> Result<Value, ServiceError> {
        self.state
            .service
            .retrieve(self.identity, self.context, self.uuid(), &resource)
            .await
    }

    pub async fn update(&self, resource: Resource, payload: &Value) -> Result<Value, ServiceError> {
        self.state
            .service
            .update(self.identity, self.context, self.uuid(), &resource, payload)
            .await
    }

    pub async fn post(&self, resource: Resource, payload: &Value) -> Result<Value, ServiceError> {
        let uuid = self.require_uuid()?;
        self.state
            .service
            .post(self.identity, self.context, uuid, &resource, payload)
            .await
    }

    pub async fn delete(&self, resource: Resource) -> Result<(), ServiceError> {
        let uuid = self.require_uuid()?;
        self.state
            .service
            .delete(self.identity, self.context, uuid, &resource)
            .await
    }

    /// Dynamic questions configured for `tab`; none before the admission
    /// exists.
    pub async fn questions(&self, tab: &str) -> Result<Vec<QuestionDescriptor>, ServiceError> {
        Ok(self
            .all_questions()
            .await?
            .into_iter()
            .filter(|descriptor| descriptor.tab == tab)
            .collect())
    }

    /// Dynamic questions of every tab.
    pub async fn all_questions(&self) -> Result<Vec<QuestionDescriptor>, ServiceError> {
        if self.admission.is_none() {
            return Ok(Vec::new());
        }
        let configurations = self.retrieve(Resource::SpecificQuestions).await?;
        Ok(descriptors_from_value(&configurations))
    }

    /// Answers already stored on the admission, all tabs together.
    pub fn stored_answers(&self) -> Answers {
        self.admission
            .map(|admission| answers_from_value(&Value::Object(admission.specific_question_answers.clone())))
            .unwrap_or_default()
    }
}

/// Initial values and page context of a tab.
#[derive(Debug, Clone, Default)]
pub struct TabData {
    pub initial: Value,
    /// Extra data shown by the page and needed to bind it.
    pub context: Value,
}

impl TabData {
    pub fn new(initial: Value) -> Self {
        Self {
            initial,
            context: Value::Null,
        }
    }

    /// Attach dynamic questions: their descriptors go to the context and
    /// their stored answers to the initial values.
    pub fn with_questions(mut self, wizard: &Wizard<'_>, questions: Vec<QuestionDescriptor>) -> Self {
        let fields = FieldSet::build(&questions, RenderOptions::default());
        let answers = fields.initial_values(&wizard.stored_answers());
        if let Value::Object(initial) = &mut self.initial {
            initial.insert(ANSWERS_FIELD.into(), answers);
        }
        if !self.context.is_object() {
            self.context = json!({});
        }
        self.context["questions"] = json!(questions);
        self
    }

    fn questions(&self) -> Vec<QuestionDescriptor> {
        descriptors_from_value(&self.context["questions"])
    }

    /// Bind the dynamic questions of this page, merged with the stored
    /// answers of the other tabs.
    pub fn bind_questions(&self, wizard: &Wizard<'_>, submitted: &Value) -> Result<Value, FormErrors> {
        let fields = FieldSet::build(&self.questions(), RenderOptions::default());
        let answers = fields
            .bind(&submitted[ANSWERS_FIELD])
            .map_err(|errors| {
                let mut prefixed = FormErrors::new();
                prefixed.extend_prefixed(ANSWERS_FIELD, errors);
                prefixed
            })?;
        Ok(json!(merge_initial(answers, &wizard.stored_answers())))
    }
}

/// Combine two independent bindings, reporting the errors of both.
pub(crate) fn join<A, B>(
    first: Result<A, FormErrors>,
    second: Result<B, FormErrors>,
) -> Result<(A, B), FormErrors> {
    match (first, second) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(errors), Ok(_)) | (Ok(_), Err(errors)) => Err(errors),
        (Err(mut errors), Err(other)) => {
            errors.extend(other);
            Err(errors)
        }
    }
}

/// Collaborators of the submission contract for one tab.
#[async_trait]
pub trait TabForm: Send + Sync {
    fn tab(&self) -> &'static str;

    /// Business error kinds shown next to a field of this form.
    fn business_errors(&self) -> &'static [(ErrorKind, &'static str)] {
        &[]
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError>;

    /// Validate locally and transform into the remote payload.
    fn bind(&self, wizard: &Wizard<'_>, data: &TabData, submitted: &Value) -> Result<Value, FormErrors>;

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError>;

    /// Nothing left to edit: the edit page sends to the read view.
    fn is_read_only(&self, _data: &TabData) -> bool {
        false
    }

    /// Destination overriding the default redirect policy.
    async fn after_success(&self, _wizard: &Wizard<'_>, _result: &Value) -> Option<String> {
        None
    }
}

/// Tab name to form handler.
pub struct TabRegistry {
    forms: HashMap<&'static str, Arc<dyn TabForm>>,
}

impl Default for TabRegistry {
    fn default() -> Self {
        let forms: Vec<Arc<dyn TabForm>> = vec![
            Arc::new(PersonTab),
            Arc::new(CoordinatesTab),
            Arc::new(EducationTab),
            Arc::new(CurriculumTab),
            Arc::new(ExamTab),
            Arc::new(LanguagesTab),
            Arc::new(ProjectTab),
            Arc::new(CotutelleTab),
            Arc::new(SupervisionTab),
            Arc::new(AccountingTab),
            Arc::new(TrainingChoiceTab),
            Arc::new(SpecificQuestionsTab),
            Arc::new(ConfirmTab),
            Arc::new(ConfirmationPaperTab),
            Arc::new(ExtensionRequestTab),
            Arc::new(JuryPreparationTab),
            Arc::new(JuryTab),
            Arc::new(DocumentsTab),
        ];
        Self::new(forms)
    }
}

impl TabRegistry {
    pub fn new(forms: Vec<Arc<dyn TabForm>>) -> Self {
        Self {
            forms: forms.into_iter().map(|form| (form.tab(), form)).collect(),
        }
    }

    pub fn get(&self, tab: &str) -> Option<Arc<dyn TabForm>> {
        self.forms.get(tab).cloned()
    }

    pub fn contains(&self, tab: &str) -> bool {
        self.forms.contains_key(tab)
    }
}
