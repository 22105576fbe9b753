//! Form binding and local validation.
//!
//! Every writable wizard tab is backed by one or more typed forms. Binding
//! a form normalizes the submitted JSON (blank strings become null),
//! deserializes it, runs the declarative `validator` rules and then the
//! form's own cross-field checks. Nothing in here talks to the remote
//! service: a form that binds cleanly is transformed into the wire payload
//! with [`CleanForm::into_payload`].

pub mod accounting;
pub mod address;
pub mod approval;
pub mod confirm;
pub mod confirmation_paper;
pub mod coordinates;
pub mod cotutelle;
pub mod curriculum;
pub mod documents;
pub mod education;
pub mod exam;
pub mod experience;
pub mod jury;
pub mod languages;
pub mod person;
pub mod project;
pub mod supervision;
pub mod training;
pub mod training_choice;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_CHOICE_MESSAGE: &str = "Select a valid choice.";

/// Field-level and whole-form errors, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    fields: IndexMap<String, Vec<String>>,
    non_field: Vec<String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let messages = self.fields.entry(field.into()).or_default();
        let message = message.into();
        if !messages.contains(&message) {
            messages.push(message);
        }
    }

    pub fn required(&mut self, field: &str) {
        self.add(field, REQUIRED_MESSAGE);
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.non_field.contains(&message) {
            self.non_field.push(message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fields(&self) -> &IndexMap<String, Vec<String>> {
        &self.fields
    }

    pub fn non_field(&self) -> &[String] {
        &self.non_field
    }

    /// Merge errors of a sub-form bound under `prefix`.
    pub fn extend_prefixed(&mut self, prefix: &str, other: FormErrors) {
        for (field, messages) in other.fields {
            for message in messages {
                self.add(prefixed(prefix, &field), message);
            }
        }
        for message in other.non_field {
            self.add_non_field(message);
        }
    }

    pub fn extend(&mut self, other: FormErrors) {
        for (field, messages) in other.fields {
            for message in messages {
                self.add(field.clone(), message);
            }
        }
        for message in other.non_field {
            self.add_non_field(message);
        }
    }

    /// `Ok(())` when no error was recorded.
    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::new();
        // Stable output regardless of the validator's map ordering.
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        for (field, field_errors) in fields {
            for error in field_errors {
                let message = validation_message(error);
                if field == "__all__" {
                    form_errors.add_non_field(message);
                } else {
                    form_errors.add(field.to_string(), message);
                }
            }
        }
        form_errors
    }
}

fn validation_message(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "required" => REQUIRED_MESSAGE.to_string(),
        "email" => "Enter a valid email address.".to_string(),
        "length" => match (error.params.get("max"), error.params.get("min")) {
            (Some(max), _) => format!("Ensure this value has at most {max} characters."),
            (None, Some(min)) => format!("Ensure this value has at least {min} characters."),
            (None, None) => "Invalid length.".to_string(),
        },
        "range" => match (error.params.get("min"), error.params.get("max")) {
            (Some(min), Some(max)) => format!("Ensure this value is between {min} and {max}."),
            _ => "Value out of range.".to_string(),
        },
        code => format!("Invalid value ({code})."),
    }
}

/// A form with cross-field rules and a wire representation.
pub trait CleanForm: DeserializeOwned + Validate {
    /// Cross-field validation, run after the declarative rules.
    fn clean(&mut self, _errors: &mut FormErrors) {}

    /// Wire payload of a validated form.
    fn into_payload(self) -> Value;
}

/// Bind `data` to `F` and run every local check.
pub fn bind_form<F: CleanForm>(data: &Value) -> Result<F, FormErrors> {
    bind_form_with(data, |_: &mut F| {})
}

/// Like [`bind_form`], with server-side context set on the form before
/// its checks run.
pub fn bind_form_with<F: CleanForm>(
    data: &Value,
    configure: impl FnOnce(&mut F),
) -> Result<F, FormErrors> {
    let normalized = normalize(data);
    let mut form: F = serde_json::from_value(normalized).map_err(|e| {
        let mut errors = FormErrors::new();
        errors.add_non_field(format!("Invalid submitted data: {e}"));
        errors
    })?;
    configure(&mut form);

    let mut errors = match form.validate() {
        Ok(()) => FormErrors::new(),
        Err(validation) => validation.into(),
    };
    form.clean(&mut errors);
    errors.into_result().map(|()| form)
}

/// Bind the `prefix-*` keys of `data` to `F`, the way sub-forms share one
/// submission. Errors come back with prefixed field names.
pub fn bind_prefixed<F: CleanForm>(data: &Value, prefix: &str) -> Result<F, FormErrors> {
    bind_form(&extract_prefixed(data, prefix)).map_err(|errors| {
        let mut prefixed_errors = FormErrors::new();
        prefixed_errors.extend_prefixed(prefix, errors);
        prefixed_errors
    })
}

pub fn prefixed(prefix: &str, field: &str) -> String {
    format!("{prefix}-{field}")
}

/// Keys of `data` starting with `prefix-`, with the prefix removed.
pub fn extract_prefixed(data: &Value, prefix: &str) -> Value {
    let start = format!("{prefix}-");
    let extracted: Map<String, Value> = data
        .as_object()
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| {
            key.strip_prefix(&start)
                .map(|field| (field.to_string(), value.clone()))
        })
        .collect();
    Value::Object(extracted)
}

/// Trim strings and turn blank ones into null, recursively.
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Null
            } else {
                Value::String(trimmed.to_string())
            }
        }
        // Blank list entries are dropped rather than nulled.
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(normalize)
                .filter(|item| !item.is_null())
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), normalize(value)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Value of an optional field, or a required-field error.
pub fn require<'a, T>(errors: &mut FormErrors, field: &str, value: &'a Option<T>) -> Option<&'a T> {
    if value.is_none() {
        errors.required(field);
    }
    value.as_ref()
}

pub fn require_tokens(errors: &mut FormErrors, field: &str, tokens: &[String]) {
    if tokens.is_empty() {
        errors.required(field);
    }
}
