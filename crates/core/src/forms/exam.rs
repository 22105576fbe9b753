//! Exam tab: the admission exam certificate some general education
//! trainings require.

use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::{CleanForm, FormErrors};

pub const ONE_FILE_MESSAGE: &str = "Ensure this field has no more than 1 files.";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExamForm {
    #[serde(default)]
    pub certificate: Vec<String>,
    pub year: Option<i32>,
}

impl CleanForm for ExamForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        if self.certificate.len() > 1 {
            errors.add("certificate", ONE_FILE_MESSAGE);
        }
    }

    fn into_payload(self) -> Value {
        json!({ "certificate": self.certificate, "year": self.year })
    }
}

/// What the remote service says about the exam of an admission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExamStatus {
    /// The training asks for an exam.
    pub required: bool,
    /// Already checked by the faculty, hence frozen.
    pub is_valuated: bool,
}

impl ExamStatus {
    pub fn from_remote(exam: &Value) -> Self {
        let flag = |field: &str| exam.get(field).and_then(Value::as_bool).unwrap_or(false);
        Self {
            required: flag("required"),
            is_valuated: flag("is_valuated"),
        }
    }

    /// Nothing can be edited on the exam page.
    pub fn is_read_only(&self) -> bool {
        self.is_valuated || !self.required
    }
}

pub fn initial(exam: &Value) -> Value {
    json!({
        "certificate": exam.get("certificate").cloned().unwrap_or_else(|| json!([])),
        "year": exam.get("year").cloned().unwrap_or(Value::Null),
    })
}

/// Title of the certificate in the candidate's language, French being the
/// institution's own.
pub fn certificate_title<'a>(exam: &'a Value, language: &str) -> Option<&'a str> {
    let field = if language.starts_with("fr") { "title_fr" } else { "title_en" };
    exam.get(field).and_then(Value::as_str)
}
