//! Doctoral training activities.
//!
//! Activities live in one of three lists. Each activity has a category
//! and, for communications and publications given at another activity,
//! a parent. The pair decides which fields the candidate fills in. All of
//! them are optional except the activity type.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use validator::Validate;

use super::{normalize, require_tokens, CleanForm, FormErrors, INVALID_CHOICE_MESSAGE};
use crate::business::BusinessError;

pub const ONE_FILE_MESSAGE: &str = "Ensure this field has no more than 1 files.";

/// The three activity lists of a doctorate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrainingNamespace {
    DoctoralTraining,
    ComplementaryTraining,
    CourseEnrollment,
}

impl TrainingNamespace {
    pub const ALL: [TrainingNamespace; 3] = [
        Self::DoctoralTraining,
        Self::ComplementaryTraining,
        Self::CourseEnrollment,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Self::DoctoralTraining => "doctoral-training",
            Self::ComplementaryTraining => "complementary-training",
            Self::CourseEnrollment => "course-enrollment",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|namespace| namespace.slug() == slug)
    }

    /// Action link needed to see the list.
    pub fn read_action(self) -> &'static str {
        match self {
            Self::DoctoralTraining => "retrieve_doctoral_training",
            Self::ComplementaryTraining => "retrieve_complementary_training",
            Self::CourseEnrollment => "retrieve_course_enrollment",
        }
    }

    /// Training context sent with the activities of the list.
    fn training_context(self) -> &'static str {
        match self {
            Self::ComplementaryTraining => "COMPLEMENTARY_TRAINING",
            Self::DoctoralTraining | Self::CourseEnrollment => "DOCTORAL_TRAINING",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityCategory {
    Conference,
    Communication,
    Publication,
    Residency,
    Service,
    Seminar,
    Vae,
    Course,
    Paper,
    UclCourse,
}

impl ActivityCategory {
    pub const ALL: [ActivityCategory; 10] = [
        Self::Conference,
        Self::Communication,
        Self::Publication,
        Self::Residency,
        Self::Service,
        Self::Seminar,
        Self::Vae,
        Self::Course,
        Self::Paper,
        Self::UclCourse,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Conference => "CONFERENCE",
            Self::Communication => "COMMUNICATION",
            Self::Publication => "PUBLICATION",
            Self::Residency => "RESIDENCY",
            Self::Service => "SERVICE",
            Self::Seminar => "SEMINAR",
            Self::Vae => "VAE",
            Self::Course => "COURSE",
            Self::Paper => "PAPER",
            Self::UclCourse => "UCL_COURSE",
        }
    }

    /// Case-insensitive, as categories appear lowercased in URLs.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_uppercase();
        Self::ALL.into_iter().find(|category| category.name() == name)
    }
}

/// Fields and remote model of one kind of activity.
#[derive(Debug, PartialEq, Eq)]
pub struct ActivityKind {
    pub object_type: &'static str,
    pub fields: &'static [&'static str],
}

const CONFERENCE: ActivityKind = ActivityKind {
    object_type: "Conference",
    fields: &[
        "type", "ects", "title", "start_date", "end_date", "participating_days", "is_online", "website",
        "country", "city", "organizing_institution", "participating_proof", "comment",
    ],
};
const CONFERENCE_COMMUNICATION: ActivityKind = ActivityKind {
    object_type: "ConferenceCommunication",
    fields: &[
        "type", "ects", "title", "summary", "committee", "acceptation_proof", "dial_reference",
        "participating_proof", "comment",
    ],
};
const CONFERENCE_PUBLICATION: ActivityKind = ActivityKind {
    object_type: "ConferencePublication",
    fields: &[
        "type", "ects", "title", "authors", "role", "keywords", "summary", "committee", "journal",
        "dial_reference", "participating_proof", "comment",
    ],
};
const COMMUNICATION: ActivityKind = ActivityKind {
    object_type: "Communication",
    fields: &[
        "type", "subtype", "title", "start_date", "is_online", "country", "city", "organizing_institution",
        "website", "subtitle", "summary", "committee", "acceptation_proof", "participating_proof",
        "dial_reference", "ects", "comment",
    ],
};
const PUBLICATION: ActivityKind = ActivityKind {
    object_type: "Publication",
    fields: &[
        "type", "title", "start_date", "authors", "role", "keywords", "summary", "journal",
        "publication_status", "dial_reference", "ects", "participating_proof", "comment",
    ],
};
const RESIDENCY: ActivityKind = ActivityKind {
    object_type: "Residency",
    fields: &[
        "type", "ects", "subtitle", "start_date", "end_date", "country", "city", "participating_proof",
        "comment",
    ],
};
const RESIDENCY_COMMUNICATION: ActivityKind = ActivityKind {
    object_type: "ResidencyCommunication",
    fields: &[
        "type", "subtype", "title", "start_date", "is_online", "organizing_institution", "website",
        "subtitle", "ects", "summary", "participating_proof", "comment",
    ],
};
const SERVICE: ActivityKind = ActivityKind {
    object_type: "Service",
    fields: &[
        "type", "title", "start_date", "end_date", "organizing_institution", "hour_volume",
        "participating_proof", "ects", "comment",
    ],
};
const SEMINAR: ActivityKind = ActivityKind {
    object_type: "Seminar",
    fields: &["type", "title", "start_date", "end_date", "hour_volume", "participating_proof", "ects"],
};
const SEMINAR_COMMUNICATION: ActivityKind = ActivityKind {
    object_type: "SeminarCommunication",
    fields: &[
        "title", "start_date", "is_online", "country", "city", "organizing_institution", "website",
        "authors", "participating_proof", "comment",
    ],
};
const VALORISATION: ActivityKind = ActivityKind {
    object_type: "Valorisation",
    fields: &["title", "subtitle", "summary", "participating_proof", "ects"],
};
const COURSE: ActivityKind = ActivityKind {
    object_type: "Course",
    fields: &[
        "type", "title", "subtitle", "organizing_institution", "start_date", "end_date", "academic_year",
        "hour_volume", "authors", "ects", "participating_proof", "comment",
    ],
};
const PAPER: ActivityKind = ActivityKind {
    object_type: "Paper",
    fields: &["type", "ects", "comment"],
};
const UCL_COURSE: ActivityKind = ActivityKind {
    object_type: "UclCourse",
    fields: &["context", "academic_year", "learning_unit_year"],
};

/// Kind of an activity of `category` in `namespace`, given under an
/// activity of `parent` category when there is one.
pub fn activity_kind(
    namespace: TrainingNamespace,
    parent: Option<ActivityCategory>,
    category: ActivityCategory,
) -> Option<&'static ActivityKind> {
    use ActivityCategory::*;
    match (namespace, parent, category) {
        (TrainingNamespace::DoctoralTraining, None, category) => match category {
            Conference => Some(&CONFERENCE),
            Residency => Some(&RESIDENCY),
            Communication => Some(&COMMUNICATION),
            Publication => Some(&PUBLICATION),
            Service => Some(&SERVICE),
            Seminar => Some(&SEMINAR),
            Vae => Some(&VALORISATION),
            Course => Some(&COURSE),
            Paper => Some(&PAPER),
            UclCourse => None,
        },
        (TrainingNamespace::DoctoralTraining, Some(parent), category) => match (parent, category) {
            (Conference, Communication) => Some(&CONFERENCE_COMMUNICATION),
            (Conference, Publication) => Some(&CONFERENCE_PUBLICATION),
            (Residency, Communication) => Some(&RESIDENCY_COMMUNICATION),
            (Seminar, Communication) => Some(&SEMINAR_COMMUNICATION),
            _ => None,
        },
        (TrainingNamespace::ComplementaryTraining, None, Course) => Some(&COURSE),
        (TrainingNamespace::CourseEnrollment, None, UclCourse) => Some(&UCL_COURSE),
        _ => None,
    }
}

/// Every field an activity may carry; `kind` decides which are bound.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ActivityForm {
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[serde(default)]
    pub participating_proof: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 0.0, max = 99.9))]
    pub participating_days: Option<f64>,
    #[serde(default)]
    pub is_online: bool,
    pub country: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub organizing_institution: Option<String>,
    #[validate(url(message = "Enter a valid URL."))]
    pub website: Option<String>,
    pub committee: Option<String>,
    #[validate(length(max = 100))]
    pub dial_reference: Option<String>,
    #[serde(default)]
    pub acceptation_proof: Vec<String>,
    #[serde(default)]
    pub summary: Vec<String>,
    #[validate(length(max = 100))]
    pub subtype: Option<String>,
    pub subtitle: Option<String>,
    #[validate(length(max = 100))]
    pub authors: Option<String>,
    #[validate(length(max = 100))]
    pub role: Option<String>,
    #[validate(length(max = 100))]
    pub keywords: Option<String>,
    #[validate(length(max = 100))]
    pub journal: Option<String>,
    pub publication_status: Option<String>,
    #[validate(length(max = 100))]
    pub hour_volume: Option<String>,
    #[validate(range(min = 0.0, max = 99.99))]
    pub ects: Option<f64>,
    pub comment: Option<String>,
    pub academic_year: Option<i32>,
    pub learning_unit_year: Option<String>,
    pub context: Option<String>,
    #[serde(skip)]
    kind: Option<&'static ActivityKind>,
}

/// Whether `value` has at most `places` decimal places.
fn has_decimal_places(value: f64, places: i32) -> bool {
    let scaled = value * 10f64.powi(places);
    (scaled - scaled.round()).abs() < 1e-6
}

impl ActivityForm {
    /// Bind the fields of `kind` only; the others are ignored.
    pub fn bind(data: &Value, kind: &'static ActivityKind) -> Result<Self, FormErrors> {
        let kept: Map<String, Value> = normalize(data)
            .as_object()
            .into_iter()
            .flatten()
            .filter(|(field, _)| kind.fields.contains(&field.as_str()))
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect();
        super::bind_form_with(&Value::Object(kept), |form: &mut Self| form.kind = Some(kind))
    }

    fn has(&self, field: &str) -> bool {
        self.kind.is_some_and(|kind| kind.fields.contains(&field))
    }
}

impl CleanForm for ActivityForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        if self.has("type") && self.activity_type.is_none() {
            errors.required("type");
        }
        for (field, files) in [
            ("participating_proof", &self.participating_proof),
            ("acceptation_proof", &self.acceptation_proof),
            ("summary", &self.summary),
        ] {
            if files.len() > 1 {
                errors.add(field, ONE_FILE_MESSAGE);
            }
        }
        if self.participating_days.is_some_and(|days| !has_decimal_places(days, 1)) {
            errors.add("participating_days", "Ensure that there are no more than 1 decimal place.");
        }
        if self.ects.is_some_and(|ects| !has_decimal_places(ects, 2)) {
            errors.add("ects", "Ensure that there are no more than 2 decimal places.");
        }
    }

    /// Only the fields of the kind; blank decimals are sent as zero.
    fn into_payload(self) -> Value {
        let Some(kind) = self.kind else {
            return json!({});
        };
        let all = json!({
            "type": self.activity_type,
            "title": self.title,
            "participating_proof": self.participating_proof,
            "start_date": self.start_date,
            "end_date": self.end_date,
            "participating_days": self.participating_days.unwrap_or(0.0),
            "is_online": self.is_online,
            "country": self.country,
            "city": self.city,
            "organizing_institution": self.organizing_institution,
            "website": self.website,
            "committee": self.committee,
            "dial_reference": self.dial_reference,
            "acceptation_proof": self.acceptation_proof,
            "summary": self.summary,
            "subtype": self.subtype,
            "subtitle": self.subtitle,
            "authors": self.authors,
            "role": self.role,
            "keywords": self.keywords,
            "journal": self.journal,
            "publication_status": self.publication_status,
            "hour_volume": self.hour_volume,
            "ects": self.ects.unwrap_or(0.0),
            "comment": self.comment,
            "academic_year": self.academic_year,
            "learning_unit_year": self.learning_unit_year,
            "context": self.context,
        });
        let mut payload: Map<String, Value> = kind
            .fields
            .iter()
            .map(|field| (field.to_string(), all[*field].clone()))
            .collect();
        payload.insert("object_type".into(), json!(kind.object_type));
        Value::Object(payload)
    }
}

/// Remote payload of an activity: its fields, where it belongs and the
/// activity it is given under.
pub fn activity_payload(
    form: ActivityForm,
    namespace: TrainingNamespace,
    category: ActivityCategory,
    parent: Option<&str>,
) -> Value {
    let mut payload = form.into_payload();
    payload["category"] = json!(category.name());
    if payload.get("context").map_or(true, Value::is_null) {
        payload["context"] = json!(namespace.training_context());
    }
    payload["parent"] = json!(parent);
    payload
}

/// The reference promoter's opinion on an activity.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssentForm {
    #[serde(default)]
    pub approbation: bool,
    pub commentaire: Option<String>,
}

impl CleanForm for AssentForm {
    fn into_payload(self) -> Value {
        json!({
            "approbation": self.approbation,
            "commentaire": self.commentaire.unwrap_or_default(),
        })
    }
}

/// Stored opinion, approving by default.
pub fn assent_initial(activity: &Value) -> Value {
    json!({
        "approbation": activity
            .get("reference_promoter_assent")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        "commentaire": activity.get("reference_promoter_comment").cloned().unwrap_or(Value::Null),
    })
}

/// Activities of a list sent together for validation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BatchActivityForm {
    #[serde(default)]
    pub activity_ids: Vec<String>,
    /// Activities of the list.
    #[serde(skip)]
    pub choices: Vec<String>,
}

impl CleanForm for BatchActivityForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        require_tokens(errors, "activity_ids", &self.activity_ids);
        if let Some(unknown) = self.activity_ids.iter().find(|id| !self.choices.contains(*id)) {
            errors.add(
                "activity_ids",
                format!("{INVALID_CHOICE_MESSAGE} {unknown} is not one of the available choices."),
            );
        }
    }

    fn into_payload(self) -> Value {
        json!({ "activity_uuids": self.activity_ids })
    }
}

/// Uuids of the activities of a list.
pub fn activity_uuids(activities: &Value) -> Vec<String> {
    activities
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|activity| activity.get("uuid").and_then(Value::as_str).map(str::to_string))
        .collect()
}

/// Whole-form errors of a rejected batch and the activities they are
/// about.
pub fn batch_errors(errors: &[BusinessError]) -> (FormErrors, Vec<String>) {
    let mut form_errors = FormErrors::new();
    let mut in_error: Vec<String> = Vec::new();
    for error in errors {
        form_errors.add_non_field(error.detail.clone());
        if let Some(activity) = &error.activity {
            if !in_error.contains(activity) {
                in_error.push(activity.clone());
            }
        }
    }
    (form_errors, in_error)
}
