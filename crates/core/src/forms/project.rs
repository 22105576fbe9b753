//! Doctoral project tab.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::{CleanForm, FormErrors};
use crate::business::ErrorKind;

pub const ADMISSION_TYPE_ADMISSION: &str = "ADMISSION";
pub const ADMISSION_TYPE_PRE_ADMISSION: &str = "PRE_ADMISSION";

pub const FINANCING_WORK_CONTRACT: &str = "WORK_CONTRACT";
pub const FINANCING_SEARCH_SCHOLARSHIP: &str = "SEARCH_SCHOLARSHIP";
pub const FINANCING_SELF_FUNDING: &str = "SELF_FUNDING";

/// Choice value standing for a free-text answer.
pub const OTHER: &str = "OTHER";

pub const PHD_ALREADY_DONE_YES: &str = "YES";
pub const PHD_ALREADY_DONE_PARTIAL: &str = "PARTIAL";
pub const PHD_ALREADY_DONE_NO: &str = "NO";

pub const BUSINESS_ERRORS: &[(ErrorKind, &str)] = &[
    (ErrorKind::JustificationRequired, "justification"),
    (ErrorKind::WorkContractInconsistent, "work_contract_type"),
    (ErrorKind::DoctorateNotFound, "doctorate"),
    (ErrorKind::InstitutionInconsistent, "institution"),
];

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProjectForm {
    #[validate(required)]
    pub admission_type: Option<String>,
    pub justification: Option<String>,
    pub proximity_commission_cde: Option<String>,
    pub proximity_commission_cdss: Option<String>,
    pub financing_type: Option<String>,
    pub work_contract_type: Option<String>,
    #[validate(length(max = 255))]
    pub work_contract_type_other: Option<String>,
    #[validate(range(min = 0, max = 100))]
    pub eft: Option<u32>,
    pub scholarship: Option<String>,
    #[validate(length(max = 255))]
    pub scholarship_other: Option<String>,
    #[validate(range(min = 0, max = 100))]
    pub planned_duration: Option<u32>,
    #[validate(range(min = 0, max = 1000))]
    pub dedicated_time: Option<u32>,
    #[validate(length(max = 1023))]
    pub project_title: Option<String>,
    pub thesis_institute: Option<String>,
    pub thesis_location: Option<String>,
    pub other_thesis_location: Option<String>,
    pub project_resume: Option<String>,
    #[serde(default)]
    pub project_documents: Vec<String>,
    #[serde(default)]
    pub gantt_graph: Vec<String>,
    #[serde(default)]
    pub program_proposition: Vec<String>,
    #[serde(default)]
    pub complementary_training_project: Vec<String>,
    #[serde(default)]
    pub recommendation_letters: Vec<String>,
    pub thesis_language: Option<String>,
    pub phd_already_done: Option<String>,
    pub institution: Option<String>,
    pub thesis_domain: Option<String>,
    #[serde(default)]
    pub non_defended: bool,
    pub defense_date: Option<NaiveDate>,
    pub non_defense_reason: Option<String>,
}

/// A choice with a free-text alternative: the free text wins when the
/// choice is `OTHER`.
fn collapse_other(choice: Option<String>, other: Option<String>) -> Option<String> {
    match choice.as_deref() {
        Some(OTHER) => other,
        _ => choice,
    }
}

impl CleanForm for ProjectForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        match self.financing_type.as_deref() {
            Some(FINANCING_WORK_CONTRACT) => {
                if self.work_contract_type.is_none() && self.work_contract_type_other.is_none() {
                    errors.required("work_contract_type");
                } else if self.work_contract_type.as_deref() == Some(OTHER)
                    && self.work_contract_type_other.is_none()
                {
                    errors.required("work_contract_type_other");
                }
                if self.eft.is_none() {
                    errors.required("eft");
                }
            }
            Some(FINANCING_SEARCH_SCHOLARSHIP) => {
                if self.scholarship.is_none() && self.scholarship_other.is_none() {
                    errors.required("scholarship");
                } else if self.scholarship.as_deref() == Some(OTHER) && self.scholarship_other.is_none() {
                    errors.required("scholarship_other");
                }
            }
            _ => {}
        }

        if self.admission_type.as_deref() == Some(ADMISSION_TYPE_PRE_ADMISSION)
            && self.justification.is_none()
        {
            errors.required("justification");
        }

        if self.non_defended && self.non_defense_reason.is_none() {
            errors.required("non_defense_reason");
        }
    }

    fn into_payload(mut self) -> Value {
        if self.admission_type.as_deref() != Some(ADMISSION_TYPE_PRE_ADMISSION) {
            self.justification = None;
        }
        let financing = self.financing_type.as_deref();
        if financing != Some(FINANCING_WORK_CONTRACT) {
            self.work_contract_type = None;
            self.work_contract_type_other = None;
            self.eft = None;
        }
        if financing != Some(FINANCING_SEARCH_SCHOLARSHIP) {
            self.scholarship = None;
            self.scholarship_other = None;
        }
        if financing.is_none() {
            self.planned_duration = None;
            self.dedicated_time = None;
        }
        if !matches!(
            self.phd_already_done.as_deref(),
            Some(PHD_ALREADY_DONE_YES | PHD_ALREADY_DONE_PARTIAL)
        ) {
            self.institution = None;
            self.thesis_domain = None;
            self.non_defended = false;
            self.defense_date = None;
            self.non_defense_reason = None;
        }
        if self.non_defended {
            self.defense_date = None;
        } else {
            self.non_defense_reason = None;
        }

        let proximity_commission = self
            .proximity_commission_cde
            .or(self.proximity_commission_cdss);

        json!({
            "type_admission": self.admission_type,
            "justification": self.justification,
            "commission_proximite": proximity_commission,
            "type_financement": self.financing_type,
            "type_contrat_travail": collapse_other(self.work_contract_type, self.work_contract_type_other),
            "eft": self.eft,
            "bourse_recherche": collapse_other(self.scholarship, self.scholarship_other),
            "duree_prevue": self.planned_duration,
            "temps_consacre": self.dedicated_time,
            "titre_projet": self.project_title,
            "institut_these": self.thesis_institute,
            "lieu_these": self.thesis_location,
            "autre_lieu_these": self.other_thesis_location,
            "resume_projet": self.project_resume,
            "documents_projet": self.project_documents,
            "graphe_gantt": self.gantt_graph,
            "proposition_programme_doctoral": self.program_proposition,
            "projet_formation_complementaire": self.complementary_training_project,
            "lettres_recommandation": self.recommendation_letters,
            "langue_redaction_these": self.thesis_language,
            "doctorat_deja_realise": self.phd_already_done,
            "institution": self.institution,
            "domaine_these": self.thesis_domain,
            "non_soutenue": self.non_defended,
            "date_soutenance": self.defense_date,
            "raison_non_soutenue": self.non_defense_reason,
        })
    }
}

/// Known values of the work contract choice.
pub const WORK_CONTRACT_TYPES: &[&str] = &["UCLOUVAIN_ASSISTANT", "UCLOUVAIN_SCIENTIFIC_STAFF", OTHER];

/// Initial values from the remote project resource. Values outside the
/// known choices are shown as `OTHER` with their free text.
pub fn initial(project: &Value) -> Value {
    let field = |key: &str| project.get(key).cloned().unwrap_or(Value::Null);
    let split_other = |value: Value, known: &dyn Fn(&str) -> bool| match value.as_str() {
        Some(text) if !known(text) => (json!(OTHER), json!(text)),
        _ => (value, Value::Null),
    };

    let (work_contract_type, work_contract_type_other) = split_other(
        field("type_contrat_travail"),
        &|text: &str| WORK_CONTRACT_TYPES.contains(&text),
    );
    // Scholarships are referenced by uuid; anything else is free text.
    let (scholarship, scholarship_other) = split_other(field("bourse_recherche"), &|text: &str| {
        uuid::Uuid::parse_str(text).is_ok()
    });

    let commission = field("commission_proximite");
    let management_entity = project.get("sigle_entite_gestion").and_then(Value::as_str);
    let (cde, cdss) = match management_entity {
        Some("CDE" | "CLSM") => (commission, Value::Null),
        Some("CDSS") => (Value::Null, commission),
        _ => (Value::Null, Value::Null),
    };

    json!({
        "admission_type": field("type_admission"),
        "justification": field("justification"),
        "proximity_commission_cde": cde,
        "proximity_commission_cdss": cdss,
        "financing_type": field("type_financement"),
        "work_contract_type": work_contract_type,
        "work_contract_type_other": work_contract_type_other,
        "eft": field("eft"),
        "scholarship": scholarship,
        "scholarship_other": scholarship_other,
        "planned_duration": field("duree_prevue"),
        "dedicated_time": field("temps_consacre"),
        "project_title": field("titre_projet"),
        "thesis_institute": field("institut_these"),
        "thesis_location": field("lieu_these"),
        "other_thesis_location": field("autre_lieu_these"),
        "project_resume": field("resume_projet"),
        "project_documents": field("documents_projet"),
        "gantt_graph": field("graphe_gantt"),
        "program_proposition": field("proposition_programme_doctoral"),
        "complementary_training_project": field("projet_formation_complementaire"),
        "recommendation_letters": field("lettres_recommandation"),
        "thesis_language": field("langue_redaction_these"),
        "phd_already_done": field("doctorat_deja_realise"),
        "institution": field("institution"),
        "thesis_domain": field("domaine_these"),
        "non_defended": field("raison_non_soutenue").as_str().is_some_and(|r| !r.is_empty()),
        "defense_date": field("date_soutenance"),
        "non_defense_reason": field("raison_non_soutenue"),
    })
}
