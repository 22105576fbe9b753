//! Completion of the documents requested by the faculty after submission.

use serde_json::{json, Value};

use super::FormErrors;
use crate::questions::{
    answers_from_value, descriptors_from_value, Answers, FieldSet, QuestionDescriptor, RenderOptions,
};

const OPTIONS: RenderOptions = RenderOptions {
    group_fields_by_tab: true,
    required_documents_on_form_submit: true,
};

/// Requested documents as returned by the remote service.
#[derive(Debug, Clone, Default)]
pub struct RequestedDocuments {
    pub immediate: Vec<QuestionDescriptor>,
    pub later: Vec<QuestionDescriptor>,
    pub deadline: Option<String>,
}

impl RequestedDocuments {
    pub fn from_value(value: &Value) -> Self {
        Self {
            immediate: descriptors_from_value(&value["immediate_requested_documents"]),
            later: descriptors_from_value(&value["later_requested_documents"]),
            deadline: value["deadline"].as_str().map(str::to_string),
        }
    }

    fn descriptors(&self) -> Vec<QuestionDescriptor> {
        self.immediate.iter().chain(&self.later).cloned().collect()
    }

    pub fn field_set(&self) -> FieldSet {
        FieldSet::build(&self.descriptors(), OPTIONS)
    }
}

pub struct DocumentsForm {
    fields: FieldSet,
}

impl DocumentsForm {
    pub fn new(requested: &RequestedDocuments) -> Self {
        Self { fields: requested.field_set() }
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn initial(&self, answers: &Value) -> Value {
        self.fields.initial_values(&answers_from_value(answers))
    }

    pub fn bind(&self, submitted: &Value) -> Result<Answers, FormErrors> {
        self.fields.bind(submitted)
    }

    pub fn into_payload(answers: Answers) -> Value {
        json!({ "reponses_documents_a_completer": answers })
    }
}
