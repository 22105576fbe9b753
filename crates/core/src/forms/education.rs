//! Secondary studies tab.
//!
//! The main form says whether a diploma was obtained and of which kind;
//! the Belgian or foreign sub-form then carries the diploma details.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use validator::Validate;

use super::{bind_form, bind_prefixed, prefixed, CleanForm, FormErrors, INVALID_CHOICE_MESSAGE};

pub const BELGIAN_PREFIX: &str = "belgian_diploma";
pub const FOREIGN_PREFIX: &str = "foreign_diploma";

pub const DIPLOMA_BELGIAN: &str = "BELGIAN";
pub const DIPLOMA_FOREIGN: &str = "FOREIGN";

pub const COMMUNITY_FRENCH_SPEAKING: &str = "FRENCH_SPEAKING";

pub const EDUCATIONAL_TYPE_MESSAGE: &str =
    "Educational type is required with this community of education.";
pub const INSTITUTE_MESSAGE: &str = "Please set one of institute or other institute fields.";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EducationForm {
    #[serde(default)]
    pub got_diploma: bool,
    pub academic_graduation_year: Option<i32>,
    pub diploma_type: Option<String>,
    pub result: Option<String>,
    #[serde(default)]
    pub high_school_diploma: Vec<String>,
}

impl CleanForm for EducationForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        if !self.got_diploma {
            return;
        }
        if self.academic_graduation_year.is_none() {
            errors.required("academic_graduation_year");
        }
        match self.diploma_type.as_deref() {
            None => errors.required("diploma_type"),
            Some(DIPLOMA_BELGIAN | DIPLOMA_FOREIGN) => {}
            Some(_) => errors.add("diploma_type", INVALID_CHOICE_MESSAGE),
        }
        if self.result.is_none() {
            errors.required("result");
        }
        super::require_tokens(errors, "high_school_diploma", &self.high_school_diploma);
    }

    fn into_payload(self) -> Value {
        json!({
            "academic_graduation_year": self.academic_graduation_year,
            "result": self.result,
            "high_school_diploma": self.high_school_diploma,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BelgianDiplomaForm {
    #[validate(required)]
    pub community: Option<String>,
    pub educational_type: Option<String>,
    pub educational_other: Option<String>,
    pub course_repeat: Option<bool>,
    pub course_orientation: Option<bool>,
    pub institute: Option<String>,
    pub other_institute: Option<String>,
}

impl CleanForm for BelgianDiplomaForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        if self.course_repeat.is_none() {
            errors.required("course_repeat");
        }
        if self.course_orientation.is_none() {
            errors.required("course_orientation");
        }
        if self.community.as_deref() == Some(COMMUNITY_FRENCH_SPEAKING)
            && self.educational_type.is_none()
            && self.educational_other.is_none()
        {
            errors.add("educational_type", EDUCATIONAL_TYPE_MESSAGE);
        }
        if self.institute.is_none() && self.other_institute.is_none() {
            errors.add("institute", INSTITUTE_MESSAGE);
            errors.add("other_institute", INSTITUTE_MESSAGE);
        }
    }

    fn into_payload(self) -> Value {
        json!({
            "community": self.community,
            "educational_type": self.educational_type,
            "educational_other": self.educational_other,
            "course_repeat": self.course_repeat,
            "course_orientation": self.course_orientation,
            "institute": self.institute,
            "other_institute": self.other_institute,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForeignDiplomaForm {
    #[validate(required)]
    pub foreign_diploma_type: Option<String>,
    #[validate(required)]
    pub linguistic_regime: Option<String>,
    #[validate(required)]
    pub country: Option<String>,
    #[serde(default)]
    pub high_school_transcript_translation: Vec<String>,
}

impl CleanForm for ForeignDiplomaForm {
    fn into_payload(self) -> Value {
        json!({
            "foreign_diploma_type": self.foreign_diploma_type,
            "linguistic_regime": self.linguistic_regime,
            "country": self.country,
            "high_school_transcript_translation": self.high_school_transcript_translation,
        })
    }
}

#[derive(Debug, Clone)]
pub enum Diploma {
    None,
    Belgian(BelgianDiplomaForm),
    Foreign(ForeignDiplomaForm),
}

#[derive(Debug, Clone)]
pub struct EducationForms {
    pub main: EducationForm,
    pub diploma: Diploma,
}

impl EducationForms {
    pub fn bind(data: &Value) -> Result<Self, FormErrors> {
        let main = bind_form::<EducationForm>(data)?;
        let diploma = if !main.got_diploma {
            Diploma::None
        } else if main.diploma_type.as_deref() == Some(DIPLOMA_BELGIAN) {
            Diploma::Belgian(bind_prefixed(data, BELGIAN_PREFIX)?)
        } else {
            Diploma::Foreign(bind_prefixed(data, FOREIGN_PREFIX)?)
        };
        Ok(Self { main, diploma })
    }

    /// Initial values from the remote secondary studies resource.
    pub fn initial(studies: &Value) -> Value {
        let mut values = Map::new();
        let belgian = studies.get(BELGIAN_PREFIX).filter(|v| !v.is_null());
        let foreign = studies.get(FOREIGN_PREFIX).filter(|v| !v.is_null());
        let diploma = belgian.or(foreign);

        values.insert("got_diploma".into(), Value::Bool(diploma.is_some()));
        if let Some(diploma) = diploma {
            let diploma_type = if belgian.is_some() { DIPLOMA_BELGIAN } else { DIPLOMA_FOREIGN };
            values.insert("diploma_type".into(), json!(diploma_type));
            for key in ["academic_graduation_year", "result"] {
                values.insert(key.into(), diploma.get(key).cloned().unwrap_or(Value::Null));
            }
        }
        values.insert(
            "high_school_diploma".into(),
            studies.get("high_school_diploma").cloned().unwrap_or(json!([])),
        );
        for (prefix, diploma) in [(BELGIAN_PREFIX, belgian), (FOREIGN_PREFIX, foreign)] {
            if let Some(Value::Object(fields)) = diploma {
                for (field, value) in fields {
                    values.insert(prefixed(prefix, field), value.clone());
                }
            }
        }
        Value::Object(values)
    }

    pub fn into_payload(self) -> Value {
        let main = self.main.into_payload();
        let with_main = |diploma: Value| {
            let mut diploma = diploma;
            diploma["academic_graduation_year"] = main["academic_graduation_year"].clone();
            diploma["result"] = main["result"].clone();
            diploma
        };
        let (belgian, foreign) = match self.diploma {
            Diploma::None => (Value::Null, Value::Null),
            Diploma::Belgian(form) => (with_main(form.into_payload()), Value::Null),
            Diploma::Foreign(form) => (Value::Null, with_main(form.into_payload())),
        };
        json!({
            "high_school_diploma": main["high_school_diploma"],
            BELGIAN_PREFIX: belgian,
            FOREIGN_PREFIX: foreign,
        })
    }
}
