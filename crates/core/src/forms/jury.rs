//! Doctorate defense: jury preparation and jury members.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::{CleanForm, FormErrors, INVALID_CHOICE_MESSAGE};
use crate::business::ErrorKind;

pub const INSTITUTION_UCL: &str = "UCL";
pub const INSTITUTION_OTHER: &str = "OTHER";

pub const TITLE_DOCTOR: &str = "DOCTEUR";
pub const TITLE_PROFESSOR: &str = "PROFESSEUR";
pub const TITLE_NON_DOCTOR: &str = "NON_DOCTEUR";

pub const ROLES: &[&str] = &["PRESIDENT", "SECRETAIRE", "MEMBRE"];

pub const PREPARATION_BUSINESS_ERRORS: &[(ErrorKind, &str)] = &[];

pub const MEMBER_BUSINESS_ERRORS: &[(ErrorKind, &str)] = &[
    (ErrorKind::NonDoctorWithoutJustification, "non_doctor_justification"),
    (ErrorKind::ExternalMemberWithoutInstitution, "institution"),
    (ErrorKind::ExternalMemberWithoutCountry, "country"),
    (ErrorKind::ExternalMemberWithoutLastName, "last_name"),
    (ErrorKind::ExternalMemberWithoutFirstName, "first_name"),
    (ErrorKind::ExternalMemberWithoutTitle, "title"),
    (ErrorKind::ExternalMemberWithoutGender, "gender"),
    (ErrorKind::ExternalMemberWithoutEmail, "email"),
    (ErrorKind::MemberAlreadyInJury, "matricule"),
];

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JuryPreparationForm {
    #[validate(required, length(max = 255))]
    pub proposed_title: Option<String>,
    #[serde(default)]
    pub cotutelle: bool,
    pub cotutelle_institution: Option<String>,
    #[serde(default)]
    pub additional_training: bool,
    pub thesis_language: Option<String>,
    #[validate(required)]
    pub defense_method: Option<String>,
    pub defense_indicative_date: Option<NaiveDate>,
    #[validate(required)]
    pub defense_language: Option<String>,
    pub comment: Option<String>,
}

impl CleanForm for JuryPreparationForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        if self.cotutelle {
            if self.cotutelle_institution.is_none() {
                errors.required("cotutelle_institution");
            }
        } else {
            self.cotutelle_institution = None;
        }
    }

    fn into_payload(self) -> Value {
        json!({
            "titre_propose": self.proposed_title,
            "cotutelle": self.cotutelle,
            "institution_cotutelle": self.cotutelle_institution,
            "formation_complementaire": self.additional_training,
            "langue_redaction": self.thesis_language,
            "modalite": self.defense_method,
            "date_indicative": self.defense_indicative_date,
            "langue_soutenance": self.defense_language,
            "commentaire": self.comment,
        })
    }
}

/// Initial values of the preparation form from the remote jury.
pub fn preparation_initial(jury: &Value) -> Value {
    let field = |key: &str| jury.get(key).cloned().unwrap_or(Value::Null);
    json!({
        "proposed_title": field("titre_propose"),
        "cotutelle": jury.get("cotutelle").and_then(Value::as_bool).unwrap_or(false),
        "cotutelle_institution": field("institution_cotutelle"),
        "additional_training": jury.get("formation_complementaire").and_then(Value::as_bool).unwrap_or(false),
        "thesis_language": field("langue_redaction"),
        "defense_method": field("modalite"),
        "defense_indicative_date": field("date_indicative"),
        "defense_language": field("langue_soutenance"),
        "comment": field("commentaire"),
    })
}

/// Add or edit a jury member.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JuryMemberForm {
    #[validate(required)]
    pub main_institution: Option<String>,
    pub matricule: Option<String>,
    pub institution: Option<String>,
    pub other_institution: Option<String>,
    pub country: Option<String>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub title: Option<String>,
    pub non_doctor_justification: Option<String>,
    pub gender: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

impl JuryMemberForm {
    fn is_internal(&self) -> bool {
        self.main_institution.as_deref() == Some(INSTITUTION_UCL)
    }
}

impl CleanForm for JuryMemberForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        match self.main_institution.as_deref() {
            Some(INSTITUTION_UCL) => {
                if self.matricule.is_none() {
                    errors.required("matricule");
                }
                return;
            }
            Some(INSTITUTION_OTHER) => {}
            None => return,
            Some(_) => {
                errors.add("main_institution", INVALID_CHOICE_MESSAGE);
                return;
            }
        }

        if self.institution.is_none() && self.other_institution.is_none() {
            errors.required("institution");
        }
        for (field, value) in [
            ("country", &self.country),
            ("last_name", &self.last_name),
            ("first_name", &self.first_name),
            ("title", &self.title),
            ("gender", &self.gender),
            ("email", &self.email),
        ] {
            if value.is_none() {
                errors.required(field);
            }
        }
        match self.title.as_deref() {
            Some(TITLE_NON_DOCTOR) if self.non_doctor_justification.is_none() => {
                errors.required("non_doctor_justification")
            }
            Some(TITLE_DOCTOR | TITLE_PROFESSOR | TITLE_NON_DOCTOR) | None => {}
            Some(_) => errors.add("title", INVALID_CHOICE_MESSAGE),
        }
    }

    fn into_payload(self) -> Value {
        if self.is_internal() {
            return json!({
                "matricule": self.matricule,
                "institution": "",
                "autre_institution": "",
                "pays": "",
                "nom": "",
                "prenom": "",
                "titre": "",
                "justification_non_docteur": "",
                "genre": "",
                "email": "",
            });
        }
        let justification = if self.title.as_deref() == Some(TITLE_NON_DOCTOR) {
            self.non_doctor_justification
        } else {
            None
        };
        json!({
            "matricule": "",
            "institution": self.institution,
            "autre_institution": self.other_institution,
            "pays": self.country,
            "nom": self.last_name,
            "prenom": self.first_name,
            "titre": self.title,
            "justification_non_docteur": justification,
            "genre": self.gender,
            "email": self.email,
        })
    }
}

/// Initial values of the member form from the remote member.
pub fn member_initial(member: &Value) -> Value {
    let field = |key: &str| member.get(key).cloned().unwrap_or(Value::Null);
    let internal = member
        .get("matricule")
        .and_then(Value::as_str)
        .is_some_and(|matricule| !matricule.is_empty());
    json!({
        "main_institution": if internal { INSTITUTION_UCL } else { INSTITUTION_OTHER },
        "matricule": field("matricule"),
        "institution": field("institution"),
        "other_institution": field("autre_institution"),
        "country": field("pays"),
        "last_name": field("nom"),
        "first_name": field("prenom"),
        "title": field("titre"),
        "non_doctor_justification": field("justification_non_docteur"),
        "gender": field("genre"),
        "email": field("email"),
    })
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JuryMemberRoleForm {
    #[validate(required)]
    pub role: Option<String>,
}

impl CleanForm for JuryMemberRoleForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        if let Some(role) = self.role.as_deref() {
            if !ROLES.contains(&role) {
                errors.add("role", INVALID_CHOICE_MESSAGE);
            }
        }
    }

    fn into_payload(self) -> Value {
        json!({ "role": self.role })
    }
}
