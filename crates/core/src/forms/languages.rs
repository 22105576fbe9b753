//! Language knowledge tab: one row per language.

use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::{bind_form, CleanForm, FormErrors};
use crate::business::ErrorKind;

/// Languages every candidate has to rate.
pub const MANDATORY_LANGUAGES: &[&str] = &["EN", "FR"];

pub const GRADES: &[&str] = &["A1", "A2", "B1", "B2", "C1", "C2"];

pub const ROWS_FIELD: &str = "languages";

pub const DUPLICATE_LANGUAGE_MESSAGE: &str = "This language is already listed.";
pub const INVALID_GRADE_MESSAGE: &str = "Select a grade between A1 and C2.";

pub const BUSINESS_ERRORS: &[(ErrorKind, &str)] =
    &[(ErrorKind::MandatoryLanguagesMissing, ROWS_FIELD)];

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LanguageRowForm {
    #[validate(required)]
    pub language: Option<String>,
    #[validate(required)]
    pub listening_comprehension: Option<String>,
    #[validate(required)]
    pub speaking_ability: Option<String>,
    #[validate(required)]
    pub writing_ability: Option<String>,
    #[serde(default)]
    pub certificate: Vec<String>,
}

impl CleanForm for LanguageRowForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        for (field, grade) in [
            ("listening_comprehension", &self.listening_comprehension),
            ("speaking_ability", &self.speaking_ability),
            ("writing_ability", &self.writing_ability),
        ] {
            if grade.as_deref().is_some_and(|grade| !GRADES.contains(&grade)) {
                errors.add(field, INVALID_GRADE_MESSAGE);
            }
        }
    }

    fn into_payload(self) -> Value {
        json!({
            "language": self.language,
            "listening_comprehension": self.listening_comprehension,
            "speaking_ability": self.speaking_ability,
            "writing_ability": self.writing_ability,
            "certificate": self.certificate,
        })
    }
}

#[derive(Debug, Clone)]
pub struct LanguagesForm {
    pub rows: Vec<LanguageRowForm>,
}

fn row_prefix(index: usize) -> String {
    format!("{ROWS_FIELD}-{index}")
}

impl LanguagesForm {
    pub fn bind(data: &Value) -> Result<Self, FormErrors> {
        let empty = Vec::new();
        let submitted = data
            .get(ROWS_FIELD)
            .and_then(Value::as_array)
            .unwrap_or(&empty);

        let mut errors = FormErrors::new();
        let mut rows = Vec::with_capacity(submitted.len());
        for (index, row) in submitted.iter().enumerate() {
            match bind_form::<LanguageRowForm>(row) {
                Ok(row) => rows.push(row),
                Err(row_errors) => errors.extend_prefixed(&row_prefix(index), row_errors),
            }
        }

        let mut seen: Vec<&str> = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            if let Some(language) = row.language.as_deref() {
                if seen.contains(&language) {
                    errors.add(format!("{}-language", row_prefix(index)), DUPLICATE_LANGUAGE_MESSAGE);
                }
                seen.push(language);
            }
        }

        let languages: Vec<&str> = submitted
            .iter()
            .filter_map(|row| row.get("language").and_then(Value::as_str))
            .collect();
        let missing: Vec<&str> = MANDATORY_LANGUAGES
            .iter()
            .copied()
            .filter(|mandatory| !languages.contains(mandatory))
            .collect();
        if !missing.is_empty() {
            errors.add(
                ROWS_FIELD,
                format!("The following languages are mandatory: {}.", missing.join(", ")),
            );
        }

        errors.into_result().map(|()| Self { rows })
    }

    /// Initial rows, mandatory languages first when not yet rated.
    pub fn initial(knowledge: &Value) -> Value {
        let mut rows: Vec<Value> = knowledge.as_array().cloned().unwrap_or_default();
        for mandatory in MANDATORY_LANGUAGES.iter().rev() {
            let present = rows
                .iter()
                .any(|row| row.get("language").and_then(Value::as_str) == Some(*mandatory));
            if !present {
                rows.insert(0, json!({ "language": mandatory }));
            }
        }
        json!({ ROWS_FIELD: rows })
    }

    pub fn into_payload(self) -> Value {
        Value::Array(self.rows.into_iter().map(CleanForm::into_payload).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(language: &str) -> Value {
        json!({
            "language": language,
            "listening_comprehension": "B2",
            "speaking_ability": "B1",
            "writing_ability": "C1",
        })
    }

    #[test]
    fn mandatory_languages_are_required() {
        let errors = LanguagesForm::bind(&json!({ "languages": [row("FR"), row("DE")] })).unwrap_err();
        assert_eq!(
            errors.field(ROWS_FIELD),
            ["The following languages are mandatory: EN.".to_string()]
        );
    }

    #[test]
    fn duplicates_are_rejected_on_the_repeated_row() {
        let data = json!({ "languages": [row("FR"), row("EN"), row("FR")] });
        let errors = LanguagesForm::bind(&data).unwrap_err();
        assert_eq!(errors.field("languages-2-language"), [DUPLICATE_LANGUAGE_MESSAGE.to_string()]);
        assert!(!errors.has("languages-0-language"));
    }

    #[test]
    fn grades_are_checked_per_row() {
        let mut bad = row("EN");
        bad["speaking_ability"] = json!("D1");
        let errors = LanguagesForm::bind(&json!({ "languages": [row("FR"), bad] })).unwrap_err();
        assert_eq!(errors.field("languages-1-speaking_ability"), [INVALID_GRADE_MESSAGE.to_string()]);
    }

    #[test]
    fn valid_rows_become_a_list() {
        let form = LanguagesForm::bind(&json!({ "languages": [row("EN"), row("FR")] })).unwrap();
        let payload = form.into_payload();
        assert_eq!(payload.as_array().map(Vec::len), Some(2));
        assert_eq!(payload[0]["language"], "EN");
    }

    #[test]
    fn initial_prepends_missing_mandatory_languages() {
        let initial = LanguagesForm::initial(&json!([row("DE"), row("FR")]));
        let languages: Vec<_> = initial[ROWS_FIELD]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["language"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(languages, ["EN", "DE", "FR"]);
    }
}
