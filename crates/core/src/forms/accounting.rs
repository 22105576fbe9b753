//! Accounting tab: fee reductions, assimilation and the refund bank
//! account.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::{CleanForm, FormErrors, INVALID_CHOICE_MESSAGE};

pub const ACCOUNT_IBAN: &str = "IBAN";
pub const ACCOUNT_OTHER_FORMAT: &str = "AUTRE_FORMAT";
pub const ACCOUNT_NONE: &str = "NON";

pub const INVALID_IBAN_MESSAGE: &str = "This IBAN is not valid.";
pub const INVALID_BIC_MESSAGE: &str = "This BIC/SWIFT code is not valid.";

static BIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{6}[A-Z0-9]{2}([A-Z0-9]{3})?$").expect("BIC pattern is valid")
});

/// ISO 13616 check: country code, check digits and a mod-97 remainder of 1.
pub fn is_valid_iban(iban: &str) -> bool {
    let compact: String = iban
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if !(15..=34).contains(&compact.len()) || !compact.is_ascii() {
        return false;
    }
    let (head, tail) = compact.split_at(4);
    if !head[..2].chars().all(|c| c.is_ascii_uppercase())
        || !head[2..].chars().all(|c| c.is_ascii_digit())
    {
        return false;
    }

    let mut remainder: u32 = 0;
    for c in tail.chars().chain(head.chars()) {
        let value = match c.to_digit(36) {
            Some(value) => value,
            None => return false,
        };
        remainder = if value < 10 {
            (remainder * 10 + value) % 97
        } else {
            (remainder * 100 + value) % 97
        };
    }
    remainder == 1
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AccountingForm {
    #[serde(default)]
    pub debt_certificates: Vec<String>,
    pub student_grant_request: Option<bool>,
    pub staff_child: Option<bool>,
    #[serde(default)]
    pub staff_child_certificate: Vec<String>,
    pub assimilation_situation: Option<String>,
    #[serde(default)]
    pub assimilation_documents: Vec<String>,
    pub sport_affiliation: Option<String>,
    #[validate(required)]
    pub bank_account_type: Option<String>,
    pub iban: Option<String>,
    #[serde(skip)]
    pub iban_valid: Option<bool>,
    #[validate(length(max = 255))]
    pub other_format_number: Option<String>,
    pub bic_swift: Option<String>,
    #[validate(length(max = 128))]
    pub holder_first_name: Option<String>,
    #[validate(length(max = 128))]
    pub holder_last_name: Option<String>,

    /// General education admissions ask about grants and staff children.
    #[serde(skip)]
    pub is_general_admission: bool,
    /// Candidates outside the EU may claim an assimilation situation.
    #[serde(skip)]
    pub with_assimilation: bool,
    /// The candidate attended a French Community institution recently.
    #[serde(skip)]
    pub needs_debt_certificates: bool,
}

impl AccountingForm {
    fn clean_bank_fields(&mut self, errors: &mut FormErrors) {
        let account_type = self.bank_account_type.clone();
        match account_type.as_deref() {
            Some(ACCOUNT_IBAN) => match &self.iban {
                None => errors.required("iban"),
                Some(iban) => {
                    let valid = is_valid_iban(iban);
                    self.iban_valid = Some(valid);
                    if !valid {
                        errors.add("iban", INVALID_IBAN_MESSAGE);
                    }
                }
            },
            _ => self.iban = None,
        }

        if account_type.as_deref() == Some(ACCOUNT_OTHER_FORMAT) {
            if self.other_format_number.is_none() {
                errors.required("other_format_number");
            }
            match self.bic_swift.as_deref() {
                None => errors.required("bic_swift"),
                Some(bic) if !BIC_RE.is_match(&bic.to_ascii_uppercase()) => {
                    errors.add("bic_swift", INVALID_BIC_MESSAGE)
                }
                Some(_) => {}
            }
        } else {
            self.other_format_number = None;
            self.bic_swift = None;
        }

        match account_type.as_deref() {
            None | Some(ACCOUNT_NONE) => {
                self.holder_first_name = None;
                self.holder_last_name = None;
            }
            Some(ACCOUNT_IBAN | ACCOUNT_OTHER_FORMAT) => {
                if self.holder_first_name.is_none() {
                    errors.required("holder_first_name");
                }
                if self.holder_last_name.is_none() {
                    errors.required("holder_last_name");
                }
            }
            Some(_) => errors.add("bank_account_type", INVALID_CHOICE_MESSAGE),
        }
    }
}

impl CleanForm for AccountingForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        if !self.needs_debt_certificates {
            self.debt_certificates.clear();
        }

        if self.is_general_admission {
            if self.student_grant_request.is_none() {
                errors.required("student_grant_request");
            }
            if self.staff_child.is_none() {
                errors.required("staff_child");
            }
            if self.sport_affiliation.is_none() {
                errors.required("sport_affiliation");
            }
        }
        if self.staff_child != Some(true) {
            self.staff_child_certificate.clear();
        }

        if self.with_assimilation {
            if self.assimilation_situation.is_none() {
                errors.required("assimilation_situation");
            }
        } else {
            self.assimilation_situation = None;
            self.assimilation_documents.clear();
        }

        self.clean_bank_fields(errors);
    }

    fn into_payload(self) -> Value {
        json!({
            "attestation_absence_dette_etablissement": self.debt_certificates,
            "demande_allocation_d_etudes_communaute_francaise_belgique": self.student_grant_request,
            "enfant_personnel": self.staff_child,
            "attestation_enfant_personnel": self.staff_child_certificate,
            "type_situation_assimilation": self.assimilation_situation,
            "documents_assimilation": self.assimilation_documents,
            "affiliation_sport": self.sport_affiliation,
            "type_numero_compte": self.bank_account_type,
            "numero_compte_iban": self.iban,
            "iban_valide": self.iban_valid,
            "numero_compte_autre_format": self.other_format_number,
            "code_bic_swift_banque": self.bic_swift,
            "prenom_titulaire_compte": self.holder_first_name,
            "nom_titulaire_compte": self.holder_last_name,
        })
    }
}

/// Initial values from the remote accounting resource.
pub fn initial(accounting: &Value) -> Value {
    let field = |key: &str| accounting.get(key).cloned().unwrap_or(Value::Null);
    json!({
        "debt_certificates": field("attestation_absence_dette_etablissement"),
        "student_grant_request": field("demande_allocation_d_etudes_communaute_francaise_belgique"),
        "staff_child": field("enfant_personnel"),
        "staff_child_certificate": field("attestation_enfant_personnel"),
        "assimilation_situation": field("type_situation_assimilation"),
        "assimilation_documents": field("documents_assimilation"),
        "sport_affiliation": field("affiliation_sport"),
        "bank_account_type": field("type_numero_compte"),
        "iban": field("numero_compte_iban"),
        "other_format_number": field("numero_compte_autre_format"),
        "bic_swift": field("code_bic_swift_banque"),
        "holder_first_name": field("prenom_titulaire_compte"),
        "holder_last_name": field("nom_titulaire_compte"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{bind_form, bind_form_with};

    #[test]
    fn iban_checksum() {
        assert!(is_valid_iban("BE71 0961 2345 6769"));
        assert!(is_valid_iban("fr7630006000011234567890189"));
        assert!(!is_valid_iban("BE71 0961 2345 6768"));
        assert!(!is_valid_iban("BE71"));
        assert!(!is_valid_iban("1271 0961 2345 6769"));
    }

    #[test]
    fn iban_account_needs_valid_iban_and_holder() {
        let errors = bind_form::<AccountingForm>(&json!({
            "bank_account_type": "IBAN",
            "iban": "BE71 0961 2345 6768",
        }))
        .unwrap_err();
        assert_eq!(errors.field("iban"), [INVALID_IBAN_MESSAGE.to_string()]);
        assert!(errors.has("holder_first_name"));
        assert!(errors.has("holder_last_name"));
    }

    #[test]
    fn other_format_needs_number_and_bic() {
        let errors = bind_form::<AccountingForm>(&json!({
            "bank_account_type": "AUTRE_FORMAT",
            "holder_first_name": "A",
            "holder_last_name": "B",
            "bic_swift": "nope",
        }))
        .unwrap_err();
        assert!(errors.has("other_format_number"));
        assert_eq!(errors.field("bic_swift"), [INVALID_BIC_MESSAGE.to_string()]);
    }

    #[test]
    fn no_account_blanks_bank_fields() {
        let form = bind_form::<AccountingForm>(&json!({
            "bank_account_type": "NON",
            "iban": "garbage",
            "holder_first_name": "A",
            "bic_swift": "GEBABEBB",
        }))
        .unwrap();
        let payload = form.into_payload();
        assert_eq!(payload["numero_compte_iban"], Value::Null);
        assert_eq!(payload["prenom_titulaire_compte"], Value::Null);
        assert_eq!(payload["code_bic_swift_banque"], Value::Null);
    }

    #[test]
    fn general_admission_questions_and_staff_certificate() {
        let errors = bind_form_with::<AccountingForm>(&json!({ "bank_account_type": "NON" }), |form| {
            form.is_general_admission = true;
        })
        .unwrap_err();
        assert!(errors.has("student_grant_request"));
        assert!(errors.has("staff_child"));

        let form = bind_form_with::<AccountingForm>(
            &json!({
                "bank_account_type": "NON",
                "student_grant_request": false,
                "staff_child": false,
                "staff_child_certificate": ["token"],
                "sport_affiliation": "NON",
                "debt_certificates": ["token"],
            }),
            |form| form.is_general_admission = true,
        )
        .unwrap();
        let payload = form.into_payload();
        assert_eq!(payload["attestation_enfant_personnel"], json!([]));
        assert_eq!(payload["attestation_absence_dette_etablissement"], json!([]));
    }

    #[test]
    fn valid_iban_is_flagged() {
        let form = bind_form::<AccountingForm>(&json!({
            "bank_account_type": "IBAN",
            "iban": "BE71096123456769",
            "holder_first_name": "A",
            "holder_last_name": "B",
        }))
        .unwrap();
        assert_eq!(form.into_payload()["iban_valide"], true);
    }
}
