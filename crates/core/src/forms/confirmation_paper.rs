//! Doctorate confirmation paper and its deadline extension request.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::{CleanForm, FormErrors};
use crate::business::ErrorKind;

const SINGLE_FILE_MESSAGE: &str = "Only one file is allowed.";

pub const BUSINESS_ERRORS: &[(ErrorKind, &str)] = &[
    (ErrorKind::ConfirmationDateIncorrect, "date"),
    (ErrorKind::ConfirmationPaperIncomplete, "research_report"),
];

pub const EXTENSION_BUSINESS_ERRORS: &[(ErrorKind, &str)] = &[
    (ErrorKind::ExtensionRequestIncomplete, "short_justification"),
];

fn at_most_one(errors: &mut FormErrors, field: &str, tokens: &[String]) {
    if tokens.len() > 1 {
        errors.add(field, SINGLE_FILE_MESSAGE);
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConfirmationPaperForm {
    #[validate(required)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub research_report: Vec<String>,
    #[serde(default)]
    pub supervisory_panel_report: Vec<String>,
    /// Only relevant for FNRS, FRIA and FRESH grant holders.
    #[serde(default)]
    pub research_mandate_renewal_opinion: Vec<String>,
}

impl CleanForm for ConfirmationPaperForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        at_most_one(errors, "research_report", &self.research_report);
        at_most_one(errors, "supervisory_panel_report", &self.supervisory_panel_report);
        at_most_one(
            errors,
            "research_mandate_renewal_opinion",
            &self.research_mandate_renewal_opinion,
        );
    }

    fn into_payload(self) -> Value {
        json!({
            "date": self.date,
            "rapport_recherche": self.research_report,
            "proces_verbal_ca": self.supervisory_panel_report,
            "avis_renouvellement_mandat_recherche": self.research_mandate_renewal_opinion,
        })
    }
}

/// Initial values from the last confirmation paper, if any.
pub fn initial(paper: Option<&Value>) -> Value {
    let Some(paper) = paper.filter(|paper| !paper.is_null()) else {
        return json!({});
    };
    let field = |key: &str| paper.get(key).cloned().unwrap_or(Value::Null);
    json!({
        "date": field("date"),
        "research_report": field("rapport_recherche"),
        "supervisory_panel_report": field("proces_verbal_ca"),
        "research_mandate_renewal_opinion": field("avis_renouvellement_mandat_recherche"),
    })
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExtensionRequestForm {
    #[validate(required)]
    pub new_deadline: Option<NaiveDate>,
    #[validate(required)]
    pub short_justification: Option<String>,
    #[serde(default)]
    pub justification_letter: Vec<String>,
}

impl CleanForm for ExtensionRequestForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        at_most_one(errors, "justification_letter", &self.justification_letter);
    }

    fn into_payload(self) -> Value {
        json!({
            "nouvelle_echeance": self.new_deadline,
            "justification_succincte": self.short_justification,
            "lettre_justification": self.justification_letter,
        })
    }
}

/// Initial values from the pending extension request of the last paper.
pub fn extension_initial(paper: Option<&Value>) -> Value {
    let Some(request) = paper
        .and_then(|paper| paper.get("demande_prolongation"))
        .filter(|request| !request.is_null())
    else {
        return json!({});
    };
    let field = |key: &str| request.get(key).cloned().unwrap_or(Value::Null);
    json!({
        "new_deadline": field("nouvelle_echeance"),
        "short_justification": field("justification_succincte"),
        "justification_letter": field("lettre_justification"),
    })
}
