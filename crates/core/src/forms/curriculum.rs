//! Curriculum tab: the curriculum vitae upload.
//!
//! Dynamic questions of the tab are bound separately and merged into the
//! payload by the caller.

use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::{CleanForm, FormErrors};
use crate::business::ErrorKind;

pub const BUSINESS_ERRORS: &[(ErrorKind, &str)] = &[(ErrorKind::CurriculumFileMissing, "curriculum")];

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CurriculumForm {
    #[serde(default)]
    pub curriculum: Vec<String>,
}

impl CleanForm for CurriculumForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        super::require_tokens(errors, "curriculum", &self.curriculum);
    }

    fn into_payload(self) -> Value {
        json!({ "curriculum": self.curriculum })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::bind_form;

    #[test]
    fn curriculum_file_is_required() {
        let errors = bind_form::<CurriculumForm>(&json!({ "curriculum": ["", " "] })).unwrap_err();
        assert!(errors.has("curriculum"));
    }

    #[test]
    fn tokens_keep_their_order() {
        let form = bind_form::<CurriculumForm>(&json!({ "curriculum": ["b", "a"] })).unwrap();
        assert_eq!(form.into_payload(), json!({ "curriculum": ["b", "a"] }));
    }
}
