//! Training choice tab, also used to create an admission.
//!
//! The training type decides the admission context: creating an admission
//! for a doctorate lands in the doctorate wizard, a bachelor in the general
//! education one, and so on.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use validator::Validate;

use super::{CleanForm, FormErrors, INVALID_CHOICE_MESSAGE};
use crate::business::ErrorKind;
use crate::context::AdmissionContext;

pub const TRAINING_BACHELOR: &str = "BACHELIER";
pub const TRAINING_MASTER: &str = "MASTER";
pub const TRAINING_DOCTORATE: &str = "DOCTORAT";
pub const TRAINING_AGGREGATION: &str = "AGREGATION_CAPES";
pub const TRAINING_CONTINUING: &str = "FORMATION_CONTINUE";
pub const TRAINING_CERTIFICATE: &str = "CERTIFICAT";

pub const GENERAL_TRAINING_TYPES: &[&str] = &[
    TRAINING_BACHELOR,
    TRAINING_MASTER,
    TRAINING_AGGREGATION,
    TRAINING_CERTIFICATE,
];

pub const INVALID_TRAINING_MESSAGE: &str = "Select a valid training.";
pub const CONTEXT_CHANGE_MESSAGE: &str =
    "The training type cannot be changed to another kind of admission.";

pub const BUSINESS_ERRORS: &[(ErrorKind, &str)] = &[
    (ErrorKind::MaximumPropositionsReached, "training_type"),
    (ErrorKind::TrainingNotFound, "training"),
    (ErrorKind::DoctorateNotFound, "doctorate_training"),
    (ErrorKind::ScholarshipNotFound, "erasmus_mundus_scholarship"),
    (ErrorKind::JustificationRequired, "justification"),
];

static TRAINING_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)-(\d{4})$").expect("training id pattern is valid"));

/// Split an `ACRONYM-YYYY` training id.
pub fn split_training_id(training_id: &str) -> Option<(String, i32)> {
    let captures = TRAINING_ID_RE.captures(training_id)?;
    let year = captures[2].parse().ok()?;
    Some((captures[1].to_string(), year))
}

pub fn training_id(acronym: &str, year: i32) -> String {
    format!("{acronym}-{year}")
}

/// Admission context in which a training type is handled.
pub fn context_for_training_type(training_type: &str) -> Option<AdmissionContext> {
    match training_type {
        TRAINING_DOCTORATE => Some(AdmissionContext::Doctorate),
        TRAINING_CONTINUING => Some(AdmissionContext::ContinuingEducation),
        t if GENERAL_TRAINING_TYPES.contains(&t) => Some(AdmissionContext::GeneralEducation),
        _ => None,
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TrainingChoiceForm {
    #[validate(required)]
    pub training_type: Option<String>,
    pub general_education_training: Option<String>,
    pub continuing_education_training: Option<String>,
    pub doctorate_training: Option<String>,
    pub sector: Option<String>,
    pub admission_type: Option<String>,
    pub justification: Option<String>,
    pub proximity_commission_cde: Option<String>,
    pub proximity_commission_cdss: Option<String>,
    pub science_sub_domain: Option<String>,
    pub campus: Option<String>,
    pub has_erasmus_mundus_scholarship: Option<bool>,
    pub erasmus_mundus_scholarship: Option<String>,
    pub has_double_degree_scholarship: Option<bool>,
    pub double_degree_scholarship: Option<String>,
    pub has_international_scholarship: Option<bool>,
    pub international_scholarship: Option<String>,

    /// Context of the admission being edited; `None` when creating.
    #[serde(skip)]
    pub current_context: Option<AdmissionContext>,
    #[serde(skip)]
    training: Option<(String, i32)>,
}

/// `has_*` flag with its dependent scholarship.
fn clean_scholarship(
    errors: &mut FormErrors,
    flag_field: &str,
    flag: Option<bool>,
    field: &str,
    value: &mut Option<String>,
) {
    match flag {
        Some(true) => {
            if value.is_none() {
                errors.required(field);
            }
        }
        Some(false) => *value = None,
        None => {
            errors.required(flag_field);
            *value = None;
        }
    }
}

impl TrainingChoiceForm {
    pub fn context(&self) -> Option<AdmissionContext> {
        self.training_type.as_deref().and_then(context_for_training_type)
    }

    pub fn is_creation(&self) -> bool {
        self.current_context.is_none()
    }

    fn training_field(&self) -> Option<&'static str> {
        match self.context()? {
            AdmissionContext::Doctorate => Some("doctorate_training"),
            AdmissionContext::GeneralEducation => Some("general_education_training"),
            AdmissionContext::ContinuingEducation => Some("continuing_education_training"),
        }
    }

    fn training_value(&self, field: &str) -> Option<&str> {
        match field {
            "doctorate_training" => self.doctorate_training.as_deref(),
            "general_education_training" => self.general_education_training.as_deref(),
            _ => self.continuing_education_training.as_deref(),
        }
    }

    fn clean_doctorate(&mut self, errors: &mut FormErrors) {
        match self.admission_type.as_deref() {
            None => errors.required("admission_type"),
            Some(super::project::ADMISSION_TYPE_PRE_ADMISSION) => {
                if self.justification.is_none() {
                    errors.required("justification");
                }
            }
            Some(_) => self.justification = None,
        }
        if self.is_creation() && self.sector.is_none() {
            errors.required("sector");
        }
    }
}

impl CleanForm for TrainingChoiceForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        let Some(context) = self.context() else {
            if self.training_type.is_some() {
                errors.add("training_type", INVALID_CHOICE_MESSAGE);
            }
            return;
        };
        if self.current_context.is_some_and(|current| current != context) {
            errors.add("training_type", CONTEXT_CHANGE_MESSAGE);
        }

        // The doctorate itself is fixed once the admission exists.
        let needs_training = !(context == AdmissionContext::Doctorate && !self.is_creation());
        if let Some(field) = self.training_field().filter(|_| needs_training) {
            match self.training_value(field).map(split_training_id) {
                None => errors.required(field),
                Some(None) => errors.add(field, INVALID_TRAINING_MESSAGE),
                Some(Some(training)) => self.training = Some(training),
            }
        }

        match context {
            AdmissionContext::Doctorate => self.clean_doctorate(errors),
            AdmissionContext::GeneralEducation | AdmissionContext::ContinuingEducation => {
                self.admission_type = None;
                self.justification = None;
            }
        }

        if context == AdmissionContext::ContinuingEducation {
            self.has_erasmus_mundus_scholarship = Some(false);
        }
        clean_scholarship(
            errors,
            "has_erasmus_mundus_scholarship",
            self.has_erasmus_mundus_scholarship,
            "erasmus_mundus_scholarship",
            &mut self.erasmus_mundus_scholarship,
        );

        if self.training_type.as_deref() == Some(TRAINING_MASTER) {
            clean_scholarship(
                errors,
                "has_double_degree_scholarship",
                self.has_double_degree_scholarship,
                "double_degree_scholarship",
                &mut self.double_degree_scholarship,
            );
            clean_scholarship(
                errors,
                "has_international_scholarship",
                self.has_international_scholarship,
                "international_scholarship",
                &mut self.international_scholarship,
            );
        } else {
            self.double_degree_scholarship = None;
            self.international_scholarship = None;
        }
    }

    fn into_payload(self) -> Value {
        let mut payload = Map::new();
        if let Some((acronym, year)) = &self.training {
            payload.insert("sigle_formation".into(), json!(acronym));
            payload.insert("annee_formation".into(), json!(year));
        }
        match self.context() {
            Some(AdmissionContext::Doctorate) => {
                payload.insert("type_admission".into(), json!(self.admission_type));
                payload.insert("justification".into(), json!(self.justification));
                payload.insert(
                    "bourse_erasmus_mundus".into(),
                    json!(self.erasmus_mundus_scholarship),
                );
                if self.is_creation() {
                    let commission = self
                        .proximity_commission_cde
                        .or(self.proximity_commission_cdss)
                        .or(self.science_sub_domain)
                        .unwrap_or_default();
                    payload.insert("commission_proximite".into(), json!(commission));
                }
            }
            Some(AdmissionContext::GeneralEducation) => {
                payload.insert(
                    "bourse_erasmus_mundus".into(),
                    json!(self.erasmus_mundus_scholarship),
                );
                payload.insert(
                    "bourse_double_diplome".into(),
                    json!(self.double_degree_scholarship),
                );
                payload.insert(
                    "bourse_internationale".into(),
                    json!(self.international_scholarship),
                );
            }
            Some(AdmissionContext::ContinuingEducation) | None => {}
        }
        Value::Object(payload)
    }
}

/// Initial values from an existing admission.
pub fn initial(context: AdmissionContext, admission: &Value) -> Value {
    let field = |key: &str| admission.get(key).cloned().unwrap_or(Value::Null);
    let training = admission
        .get("formation")
        .or_else(|| admission.get("doctorat"))
        .and_then(|training| {
            let acronym = training.get("sigle")?.as_str()?;
            let year = training.get("annee")?.as_i64()?;
            Some(training_id(acronym, i32::try_from(year).ok()?))
        });
    let uuid_of = |key: &str| admission.get(key).and_then(|s| s.get("uuid")).cloned().unwrap_or(Value::Null);
    let flag = |key: &str| Value::Bool(admission.get(key).is_some_and(|s| !s.is_null()));

    let mut values = json!({
        "training_type": field("type_formation"),
        "campus": field("campus"),
        "erasmus_mundus_scholarship": uuid_of("bourse_erasmus_mundus"),
        "has_erasmus_mundus_scholarship": flag("bourse_erasmus_mundus"),
        "double_degree_scholarship": uuid_of("bourse_double_diplome"),
        "has_double_degree_scholarship": flag("bourse_double_diplome"),
        "international_scholarship": uuid_of("bourse_internationale"),
        "has_international_scholarship": flag("bourse_internationale"),
    });
    match context {
        AdmissionContext::Doctorate => {
            values["training_type"] = json!(TRAINING_DOCTORATE);
            values["doctorate_training"] = json!(training);
            values["admission_type"] = field("type_admission");
            values["justification"] = field("justification");
            values["sector"] = field("code_secteur_formation");
        }
        AdmissionContext::GeneralEducation => {
            values["general_education_training"] = json!(training);
        }
        AdmissionContext::ContinuingEducation => {
            values["training_type"] = json!(TRAINING_CONTINUING);
            values["continuing_education_training"] = json!(training);
        }
    }
    values
}
