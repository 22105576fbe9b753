//! Cotutelle tab: joint supervision with a partner institution.

use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::{CleanForm, FormErrors, INVALID_CHOICE_MESSAGE};
use crate::business::ErrorKind;

pub const BUSINESS_ERRORS: &[(ErrorKind, &str)] = &[(ErrorKind::CotutelleIncomplete, "cotutelle")];

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CotutelleForm {
    /// `YES` or `NO`.
    #[validate(required)]
    pub cotutelle: Option<String>,
    pub motivation: Option<String>,
    pub institution: Option<String>,
    #[serde(default)]
    pub opening_request: Vec<String>,
    #[serde(default)]
    pub convention: Vec<String>,
    #[serde(default)]
    pub other_documents: Vec<String>,
}

impl CotutelleForm {
    fn is_cotutelle(&self) -> bool {
        self.cotutelle.as_deref() == Some("YES")
    }
}

impl CleanForm for CotutelleForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        match self.cotutelle.as_deref() {
            Some("YES") => {
                if self.motivation.is_none() {
                    errors.required("motivation");
                }
                if self.institution.is_none() {
                    errors.required("institution");
                }
                super::require_tokens(errors, "opening_request", &self.opening_request);
            }
            Some("NO") | None => {}
            Some(_) => errors.add("cotutelle", INVALID_CHOICE_MESSAGE),
        }
        if self.opening_request.len() > 1 {
            errors.add("opening_request", "Only one file is allowed.");
        }
        if self.convention.len() > 1 {
            errors.add("convention", "Only one file is allowed.");
        }
    }

    fn into_payload(self) -> Value {
        if !self.is_cotutelle() {
            return json!({
                "motivation": "",
                "institution": "",
                "demande_ouverture": [],
                "convention": [],
                "autres_documents": [],
            });
        }
        json!({
            "motivation": self.motivation,
            "institution": self.institution,
            "demande_ouverture": self.opening_request,
            "convention": self.convention,
            "autres_documents": self.other_documents,
        })
    }
}

/// Initial values from the remote cotutelle resource.
pub fn initial(cotutelle: &Value) -> Value {
    let field = |key: &str| cotutelle.get(key).cloned().unwrap_or(Value::Null);
    let has_cotutelle = cotutelle
        .get("cotutelle")
        .and_then(Value::as_bool)
        .unwrap_or_else(|| field("institution").as_str().is_some_and(|i| !i.is_empty()));
    json!({
        "cotutelle": if has_cotutelle { "YES" } else { "NO" },
        "motivation": field("motivation"),
        "institution": field("institution"),
        "opening_request": field("demande_ouverture"),
        "convention": field("convention"),
        "other_documents": field("autres_documents"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::bind_form;

    #[test]
    fn yes_requires_motivation_institution_and_request() {
        let errors = bind_form::<CotutelleForm>(&json!({ "cotutelle": "YES" })).unwrap_err();
        assert!(errors.has("motivation"));
        assert!(errors.has("institution"));
        assert!(errors.has("opening_request"));
    }

    #[test]
    fn no_blanks_everything() {
        let form = bind_form::<CotutelleForm>(&json!({
            "cotutelle": "NO",
            "motivation": "Left over",
            "convention": ["token"],
        }))
        .unwrap();
        let payload = form.into_payload();
        assert_eq!(payload["motivation"], "");
        assert_eq!(payload["convention"], json!([]));
    }

    #[test]
    fn cotutelle_choice_is_required() {
        let errors = bind_form::<CotutelleForm>(&json!({})).unwrap_err();
        assert!(errors.has("cotutelle"));
    }
}
