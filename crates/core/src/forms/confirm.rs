//! Final confirmation before the application is submitted.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{normalize, FormErrors, INVALID_CHOICE_MESSAGE, REQUIRED_MESSAGE};
use crate::admission::Admission;
use crate::business::BusinessError;
use crate::questions::QuestionDescriptor;

pub const INCOMPLETE_MESSAGE: &str =
    "Your application cannot be submitted yet: some information is missing.";

/// A statement the candidate must accept, as sent by the remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationElement {
    #[serde(alias = "nom")]
    pub name: String,
    /// `checkbox` or `radio`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, alias = "titre")]
    pub title: String,
    #[serde(default, alias = "texte")]
    pub text: String,
    #[serde(default, alias = "reponses")]
    pub answers: Vec<String>,
}

impl ConfirmationElement {
    fn is_checkbox(&self) -> bool {
        self.kind == "checkbox"
    }

    /// Values accepted for this element.
    pub fn choices(&self) -> Vec<String> {
        if self.is_checkbox() {
            vec![self.text.clone()]
        } else {
            self.answers
                .iter()
                .map(|answer| format!("{answer} {}", self.text))
                .collect()
        }
    }
}

pub struct ConfirmForm {
    elements: Vec<ConfirmationElement>,
}

impl ConfirmForm {
    pub fn new(elements: Vec<ConfirmationElement>) -> Self {
        Self { elements }
    }

    pub fn from_value(elements: &Value) -> Self {
        let elements = elements
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|element| serde_json::from_value(element.clone()).ok())
            .collect();
        Self::new(elements)
    }

    pub fn elements(&self) -> &[ConfirmationElement] {
        &self.elements
    }

    /// Hidden pool and year computed by the remote service.
    pub fn initial(admission: &Admission) -> Value {
        json!({ "pool": admission.pool, "annee": admission.year })
    }

    /// Every element must be accepted; the hidden values must be present.
    pub fn bind(&self, submitted: &Value) -> Result<Value, FormErrors> {
        let data = normalize(submitted);
        let mut errors = FormErrors::new();

        let pool = data.get("pool").and_then(Value::as_str);
        if pool.is_none() {
            errors.required("pool");
        }
        let year = data.get("annee").and_then(|year| {
            year.as_i64()
                .or_else(|| year.as_str().and_then(|year| year.parse().ok()))
        });
        if year.is_none() {
            errors.required("annee");
        }

        let mut accepted = Map::new();
        for element in &self.elements {
            // Checkboxes post a one-item list.
            let value = match data.get(&element.name) {
                Some(Value::Array(items)) => items.first().cloned(),
                Some(Value::Null) | None => None,
                Some(value) => Some(value.clone()),
            };
            match value.as_ref().and_then(Value::as_str) {
                None => errors.add(element.name.clone(), REQUIRED_MESSAGE),
                Some(choice) if !element.choices().iter().any(|c| c == choice) => {
                    errors.add(element.name.clone(), INVALID_CHOICE_MESSAGE)
                }
                Some(choice) => {
                    accepted.insert(element.name.clone(), Value::String(choice.to_string()));
                }
            }
        }

        errors.into_result()?;
        Ok(json!({
            "pool": pool,
            "annee": year,
            "elements_confirmation": accepted,
        }))
    }
}

/// Shown when the verification answer of the service cannot be read.
pub const VERIFICATION_UNREADABLE_MESSAGE: &str =
    "The completeness of your application could not be checked. Please try again later.";

/// Refuse submission while verification reports errors or a required
/// question is unanswered.
pub fn ensure_submittable(
    verification_errors: &[BusinessError],
    missing_questions: &[&QuestionDescriptor],
) -> Result<(), FormErrors> {
    let mut errors = FormErrors::new();
    if !verification_errors.is_empty() || !missing_questions.is_empty() {
        errors.add_non_field(INCOMPLETE_MESSAGE);
    }
    for question in missing_questions {
        errors.add_non_field(format!("Please answer the question \"{}\".", question.label));
    }
    errors.into_result()
}
