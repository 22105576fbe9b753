//! Curriculum experiences: professional activities and previous studies.
//!
//! Experiences belong to the person and are listed on the curriculum tab.
//! Each one is created, edited and deleted on its own page.
//!
//! An educational experience is a base form and one row per academic year
//! between its start and its end. Which fields the candidate fills in
//! depends on the admission context: fields of other contexts keep their
//! stored value and never raise an error.

use chrono::{Datelike, Months, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use validator::Validate;

use super::address::BE_ISO_CODE;
use super::{bind_form, bind_form_with, CleanForm, FormErrors, INVALID_CHOICE_MESSAGE, REQUIRED_MESSAGE};
use crate::context::AdmissionContext;

pub const DATES_ORDER_MESSAGE: &str = "The start date must be equals or lower than the end date.";
pub const NO_ACADEMIC_YEAR_MESSAGE: &str = "At least one academic year is required.";
pub const ACQUIRED_ABOVE_REGISTERED_MESSAGE: &str =
    "This value cannot be greater than the entered credits number";

/// Activity kinds of a professional experience.
pub const ACTIVITY_TYPES: &[&str] = &["ILLNESS", "INTERNSHIP", "OTHER", "UNEMPLOYMENT", "VOLUNTEERING", "WORK"];
pub const ACTIVITY_WORK: &str = "WORK";
pub const ACTIVITY_OTHER: &str = "OTHER";
pub const ACTIVITY_SECTORS: &[&str] = &["PUBLIC", "PRIVATE", "ASSOCIATIVE"];

pub const TRANSCRIPT_ONE_FOR_ALL_YEARS: &str = "ONE_FOR_ALL_YEARS";
pub const TRANSCRIPT_ONE_A_YEAR: &str = "ONE_A_YEAR";

pub const EVALUATION_ECTS_CREDITS: &str = "ECTS_CREDITS";
pub const EVALUATION_NO_CREDIT_SYSTEM: &str = "NO_CREDIT_SYSTEM";
/// Evaluation systems counting credits per year.
pub const EVALUATION_SYSTEMS_WITH_CREDITS: &[&str] = &[EVALUATION_ECTS_CREDITS, "NON_EUROPEAN_CREDITS"];

/// Belgian studies count ECTS credits from this academic year on.
pub const FIRST_YEAR_WITH_ECTS_BE: i32 = 2004;
/// Regimes whose documents need no translation.
pub const LINGUISTIC_REGIMES_WITHOUT_TRANSLATION: &[&str] = &["FR", "NL", "DE", "EN", "IT", "ES", "PT"];

pub const MINIMUM_CREDIT_NUMBER: f64 = 0.0;

/// Submitted key of the academic year rows.
pub const YEARS_FIELD: &str = "years";
/// Remote key of the enrolled years.
pub const REMOTE_YEARS_FIELD: &str = "educationalexperienceyear_set";

// ---------------------------------------------------------------------------
// Professional experience
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProfessionalExperienceForm {
    #[validate(required, range(min = 1, max = 12))]
    pub start_date_month: Option<u32>,
    #[validate(required)]
    pub start_date_year: Option<i32>,
    #[validate(required, range(min = 1, max = 12))]
    pub end_date_month: Option<u32>,
    #[validate(required)]
    pub end_date_year: Option<i32>,
    #[validate(required)]
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    pub role: Option<String>,
    pub sector: Option<String>,
    pub institute_name: Option<String>,
    #[serde(default)]
    pub certificate: Vec<String>,
    pub activity: Option<String>,
    #[serde(skip)]
    period: Option<(NaiveDate, NaiveDate)>,
}

/// First and last day of the months the experience spans.
fn month_period(start: (i32, u32), end: (i32, u32)) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(start.0, start.1, 1)?;
    let last = NaiveDate::from_ymd_opt(end.0, end.1, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()?;
    Some((first, last))
}

impl CleanForm for ProfessionalExperienceForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        if let (Some(start_month), Some(start_year), Some(end_month), Some(end_year)) = (
            self.start_date_month,
            self.start_date_year,
            self.end_date_month,
            self.end_date_year,
        ) {
            if (start_year, start_month) > (end_year, end_month) {
                errors.add_non_field(DATES_ORDER_MESSAGE);
            }
            self.period = month_period((start_year, start_month), (end_year, end_month));
            if self.period.is_none() {
                errors.add("start_date_year", "Enter a valid year.");
            }
        }

        let activity_type = self.activity_type.as_deref();
        if activity_type.is_some_and(|kind| !ACTIVITY_TYPES.contains(&kind)) {
            errors.add("type", INVALID_CHOICE_MESSAGE);
        }
        if self.sector.as_deref().is_some_and(|sector| !ACTIVITY_SECTORS.contains(&sector)) {
            errors.add("sector", INVALID_CHOICE_MESSAGE);
        }

        if activity_type == Some(ACTIVITY_WORK) {
            for (field, value) in [
                ("role", &self.role),
                ("sector", &self.sector),
                ("institute_name", &self.institute_name),
            ] {
                if value.is_none() {
                    errors.required(field);
                }
            }
        } else {
            self.role = None;
            self.sector = None;
            self.institute_name = None;
        }

        if activity_type == Some(ACTIVITY_OTHER) {
            self.certificate.clear();
            if self.activity.is_none() {
                errors.required("activity");
            }
        } else {
            self.activity = None;
        }
    }

    fn into_payload(self) -> Value {
        let (start_date, end_date) = self.period.unzip();
        json!({
            "start_date": start_date,
            "end_date": end_date,
            "type": self.activity_type,
            "role": self.role.unwrap_or_default(),
            "sector": self.sector.unwrap_or_default(),
            "institute_name": self.institute_name.unwrap_or_default(),
            "certificate": self.certificate,
            "activity": self.activity.unwrap_or_default(),
        })
    }
}

/// Form values of a stored professional experience: dates become
/// month/year pairs.
pub fn professional_initial(experience: &Value) -> Value {
    let mut initial = experience.as_object().cloned().unwrap_or_default();
    for field in ["start_date", "end_date"] {
        let date = initial
            .remove(field)
            .and_then(|value| value.as_str().and_then(|s| s.parse::<NaiveDate>().ok()));
        if let Some(date) = date {
            initial.insert(format!("{field}_month"), json!(date.month()));
            initial.insert(format!("{field}_year"), json!(date.year()));
        }
    }
    Value::Object(initial)
}

// ---------------------------------------------------------------------------
// Educational experience
// ---------------------------------------------------------------------------

const BASE_FIELDS: &[&str] = &[
    "start",
    "end",
    "country",
    "other_institute",
    "institute_name",
    "institute_address",
    "institute",
    "program",
    "other_program",
    "education_name",
    "obtained_diploma",
    "graduate_degree",
];

const GENERAL_FIELDS: &[&str] = &[
    "evaluation_type",
    "linguistic_regime",
    "transcript_type",
    "obtained_grade",
    "graduate_degree_translation",
    "transcript",
    "transcript_translation",
];

const DOCTORATE_FIELDS: &[&str] = &[
    "expected_graduation_date",
    "rank_in_diploma",
    "dissertation_title",
    "dissertation_score",
    "dissertation_summary",
];

const YEAR_FIELDS: &[&str] = &[
    "academic_year",
    "is_enrolled",
    "result",
    "registered_credit_number",
    "acquired_credit_number",
    "transcript",
    "transcript_translation",
];

pub const YEAR_RESULTS: &[&str] = &["FAILURE", "NO_RESULT", "SUCCESS", "SUCCESS_WITH_RESIDUAL_CREDITS"];

/// Whether `field` of the base form is filled in within `context`.
pub fn is_editable(context: AdmissionContext, field: &str) -> bool {
    BASE_FIELDS.contains(&field)
        || (context != AdmissionContext::ContinuingEducation && GENERAL_FIELDS.contains(&field))
        || (context == AdmissionContext::Doctorate && DOCTORATE_FIELDS.contains(&field))
}

/// Whether `field` of a year row is filled in within `context`.
pub fn is_year_editable(context: AdmissionContext, field: &str) -> bool {
    field == "academic_year"
        || (context != AdmissionContext::ContinuingEducation && YEAR_FIELDS.contains(&field))
}

/// Records errors of editable fields only.
struct ContextErrors<'a> {
    errors: &'a mut FormErrors,
    editable: &'a dyn Fn(&str) -> bool,
}

impl ContextErrors<'_> {
    fn add(&mut self, field: &str, message: &str) {
        if (self.editable)(field) {
            self.errors.add(field, message);
        }
    }

    fn required(&mut self, field: &str) {
        self.add(field, REQUIRED_MESSAGE);
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EducationalExperienceForm {
    #[validate(required)]
    pub start: Option<i32>,
    #[validate(required)]
    pub end: Option<i32>,
    #[validate(required)]
    pub country: Option<String>,
    #[serde(default)]
    pub other_institute: bool,
    pub institute_name: Option<String>,
    pub institute_address: Option<String>,
    pub institute: Option<String>,
    pub program: Option<String>,
    #[serde(default)]
    pub other_program: bool,
    pub education_name: Option<String>,
    pub evaluation_type: Option<String>,
    pub linguistic_regime: Option<String>,
    pub transcript_type: Option<String>,
    #[validate(required)]
    pub obtained_diploma: Option<bool>,
    pub obtained_grade: Option<String>,
    #[serde(default)]
    pub graduate_degree: Vec<String>,
    #[serde(default)]
    pub graduate_degree_translation: Vec<String>,
    #[serde(default)]
    pub transcript: Vec<String>,
    #[serde(default)]
    pub transcript_translation: Vec<String>,
    pub rank_in_diploma: Option<String>,
    pub expected_graduation_date: Option<NaiveDate>,
    pub dissertation_title: Option<String>,
    pub dissertation_score: Option<String>,
    #[serde(default)]
    pub dissertation_summary: Vec<String>,
    #[serde(skip, default = "default_context")]
    context: AdmissionContext,
}

fn default_context() -> AdmissionContext {
    AdmissionContext::Doctorate
}

impl EducationalExperienceForm {
    fn is_belgian(&self) -> bool {
        self.country.as_deref() == Some(BE_ISO_CODE)
    }

    fn needs_no_translation(&self) -> bool {
        self.linguistic_regime
            .as_deref()
            .map_or(true, |regime| LINGUISTIC_REGIMES_WITHOUT_TRANSLATION.contains(&regime))
    }

    fn clean_institute(&mut self, errors: &mut ContextErrors<'_>) {
        if self.other_institute {
            if self.institute_name.is_none() {
                errors.required("institute_name");
            }
            if self.institute_address.is_none() {
                errors.required("institute_address");
            }
            self.institute = None;
        } else {
            if self.institute.is_none() {
                errors.required("institute");
            }
            self.institute_name = None;
            self.institute_address = None;
        }
    }

    fn clean_diploma(&mut self, errors: &mut ContextErrors<'_>) {
        if self.obtained_diploma == Some(true) {
            if self.obtained_grade.is_none() {
                errors.required("obtained_grade");
            }
            if self.expected_graduation_date.is_none() {
                errors.required("expected_graduation_date");
            }
            if self.dissertation_title.is_none() {
                errors.required("dissertation_title");
            }
            if self.dissertation_score.is_none() {
                errors.required("dissertation_score");
            }
        } else {
            self.expected_graduation_date = None;
            self.dissertation_title = None;
            self.dissertation_score = None;
            self.dissertation_summary.clear();
            self.graduate_degree.clear();
            self.graduate_degree_translation.clear();
            self.rank_in_diploma = None;
        }
    }

    fn clean_belgian(&mut self, errors: &mut ContextErrors<'_>) {
        if self.other_program {
            if self.education_name.is_none() {
                errors.required("education_name");
            }
            self.program = None;
        } else {
            if self.program.is_none() {
                errors.required("program");
            }
            self.education_name = None;
        }
        self.linguistic_regime = None;
        self.graduate_degree_translation.clear();
        self.transcript_translation.clear();
    }

    fn clean_foreign(&mut self, errors: &mut ContextErrors<'_>) {
        if self.education_name.is_none() {
            errors.required("education_name");
        }
        if self.linguistic_regime.is_none() {
            errors.required("linguistic_regime");
        }
        if self.needs_no_translation() {
            self.graduate_degree_translation.clear();
            self.transcript_translation.clear();
        }
        self.program = None;
    }
}

impl CleanForm for EducationalExperienceForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        let context = self.context;
        let editable = move |field: &str| is_editable(context, field);
        let mut errors = ContextErrors {
            errors,
            editable: &editable,
        };

        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                errors.errors.add_non_field(DATES_ORDER_MESSAGE);
            }
        }
        if self.evaluation_type.is_none() {
            errors.required("evaluation_type");
        }
        match self.transcript_type.as_deref() {
            None => errors.required("transcript_type"),
            Some(TRANSCRIPT_ONE_FOR_ALL_YEARS | TRANSCRIPT_ONE_A_YEAR) => {}
            Some(_) => errors.add("transcript_type", INVALID_CHOICE_MESSAGE),
        }

        self.clean_institute(&mut errors);
        if self.transcript_type.as_deref() != Some(TRANSCRIPT_ONE_FOR_ALL_YEARS) {
            self.transcript.clear();
            self.transcript_translation.clear();
        }
        self.clean_diploma(&mut errors);
        if self.is_belgian() {
            self.clean_belgian(&mut errors);
        } else if self.country.is_some() {
            self.clean_foreign(&mut errors);
        }
    }

    fn into_payload(self) -> Value {
        json!({
            "country": self.country,
            "institute": self.institute,
            "institute_name": self.institute_name.unwrap_or_default(),
            "institute_address": self.institute_address.unwrap_or_default(),
            "program": self.program,
            "education_name": self.education_name.unwrap_or_default(),
            "evaluation_type": self.evaluation_type,
            "linguistic_regime": self.linguistic_regime,
            "transcript_type": self.transcript_type,
            "obtained_diploma": self.obtained_diploma,
            "obtained_grade": self.obtained_grade,
            "graduate_degree": self.graduate_degree,
            "graduate_degree_translation": self.graduate_degree_translation,
            "transcript": self.transcript,
            "transcript_translation": self.transcript_translation,
            "rank_in_diploma": self.rank_in_diploma.unwrap_or_default(),
            "expected_graduation_date": self.expected_graduation_date,
            "dissertation_title": self.dissertation_title.unwrap_or_default(),
            "dissertation_score": self.dissertation_score.unwrap_or_default(),
            "dissertation_summary": self.dissertation_summary,
        })
    }
}

/// One academic year of an educational experience.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExperienceYearForm {
    #[validate(required)]
    pub academic_year: Option<i32>,
    #[serde(default = "enrolled_by_default")]
    pub is_enrolled: bool,
    pub result: Option<String>,
    pub registered_credit_number: Option<f64>,
    pub acquired_credit_number: Option<f64>,
    #[serde(default)]
    pub transcript: Vec<String>,
    #[serde(default)]
    pub transcript_translation: Vec<String>,
}

fn enrolled_by_default() -> bool {
    true
}

impl CleanForm for ExperienceYearForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        if self.result.as_deref().is_some_and(|result| !YEAR_RESULTS.contains(&result)) {
            errors.add("result", INVALID_CHOICE_MESSAGE);
        }
    }

    fn into_payload(self) -> Value {
        json!({
            "academic_year": self.academic_year,
            "result": self.result,
            "registered_credit_number": self.registered_credit_number,
            "acquired_credit_number": self.acquired_credit_number,
            "transcript": self.transcript,
            "transcript_translation": self.transcript_translation,
        })
    }
}

/// Year-level requirements derived from the base form.
struct YearRules {
    belgian: bool,
    credits_required: bool,
    transcript_required: bool,
    translation_required: bool,
}

impl YearRules {
    fn of(base: &EducationalExperienceForm) -> Self {
        let transcript_required = base.transcript_type.as_deref() == Some(TRANSCRIPT_ONE_A_YEAR);
        let belgian = base.is_belgian();
        Self {
            belgian,
            credits_required: base
                .evaluation_type
                .as_deref()
                .is_some_and(|system| EVALUATION_SYSTEMS_WITH_CREDITS.contains(&system)),
            transcript_required,
            translation_required: transcript_required
                && base.country.is_some()
                && !belgian
                && !base.needs_no_translation(),
        }
    }

    fn counts_credits(&self, year: i32) -> bool {
        if self.belgian {
            year >= FIRST_YEAR_WITH_ECTS_BE
        } else {
            self.credits_required
        }
    }

    fn clean(&self, row: &mut ExperienceYearForm, errors: &mut ContextErrors<'_>) {
        if row.result.is_none() {
            errors.required("result");
        }

        if row.academic_year.is_some_and(|year| self.counts_credits(year)) {
            match row.acquired_credit_number {
                None => errors.required("acquired_credit_number"),
                Some(acquired) if acquired < MINIMUM_CREDIT_NUMBER => errors.add(
                    "acquired_credit_number",
                    &format!("This value must be equal to or greater than {MINIMUM_CREDIT_NUMBER}"),
                ),
                Some(_) => {}
            }
            match row.registered_credit_number {
                None => errors.required("registered_credit_number"),
                Some(registered) if registered <= MINIMUM_CREDIT_NUMBER => errors.add(
                    "registered_credit_number",
                    &format!("This value must be greater than {MINIMUM_CREDIT_NUMBER}"),
                ),
                Some(_) => {}
            }
            if let (Some(acquired), Some(registered)) = (row.acquired_credit_number, row.registered_credit_number) {
                if acquired > registered {
                    errors.add("acquired_credit_number", ACQUIRED_ABOVE_REGISTERED_MESSAGE);
                }
            }
        } else {
            row.acquired_credit_number = None;
            row.registered_credit_number = None;
        }

        if self.transcript_required {
            if row.transcript.is_empty() {
                errors.required("transcript");
            }
        } else {
            row.transcript.clear();
        }
        if self.translation_required {
            if row.transcript_translation.is_empty() {
                errors.required("transcript_translation");
            }
        } else {
            row.transcript_translation.clear();
        }
    }
}

fn year_prefix(index: usize) -> String {
    format!("{YEARS_FIELD}-{index}")
}

/// Keep the stored value of every key `editable` refuses.
fn restore_locked(payload: &mut Map<String, Value>, stored: &Value, editable: impl Fn(&str) -> bool) {
    let locked: Vec<String> = payload.keys().filter(|key| !editable(key)).cloned().collect();
    for key in locked {
        payload.insert(key.clone(), stored.get(&key).cloned().unwrap_or(Value::Null));
    }
}

/// An educational experience and its academic years, bound together.
#[derive(Debug, Clone)]
pub struct EducationalExperienceForms {
    pub base: EducationalExperienceForm,
    pub years: Vec<ExperienceYearForm>,
}

impl EducationalExperienceForms {
    /// Bind the base form and its `years` rows in `context`.
    pub fn bind(data: &Value, context: AdmissionContext) -> Result<Self, FormErrors> {
        let mut errors = FormErrors::new();
        let base = match bind_form_with::<EducationalExperienceForm>(data, |form| form.context = context) {
            Ok(base) => Some(base),
            Err(base_errors) => {
                errors.extend(base_errors);
                None
            }
        };

        let empty = Vec::new();
        let submitted = data.get(YEARS_FIELD).and_then(Value::as_array).unwrap_or(&empty);
        let mut years = Vec::with_capacity(submitted.len());
        for (index, row) in submitted.iter().enumerate() {
            match bind_form::<ExperienceYearForm>(row) {
                Ok(mut row) => {
                    if context == AdmissionContext::ContinuingEducation {
                        row.is_enrolled = true;
                    }
                    years.push((index, row));
                }
                Err(row_errors) => errors.extend_prefixed(&year_prefix(index), row_errors),
            }
        }

        let Some(mut base) = base else {
            return Err(errors);
        };

        let rules = YearRules::of(&base);
        let mut last_enrolled_year = None;
        for (index, row) in years.iter_mut().filter(|(_, row)| row.is_enrolled) {
            last_enrolled_year = last_enrolled_year.max(row.academic_year);
            let mut row_errors = FormErrors::new();
            let editable = move |field: &str| is_year_editable(context, field);
            rules.clean(
                row,
                &mut ContextErrors {
                    errors: &mut row_errors,
                    editable: &editable,
                },
            );
            errors.extend_prefixed(&year_prefix(*index), row_errors);
        }

        match last_enrolled_year {
            None => errors.add_non_field(NO_ACADEMIC_YEAR_MESSAGE),
            Some(year) if rules.belgian => {
                base.evaluation_type = Some(
                    if year >= FIRST_YEAR_WITH_ECTS_BE {
                        EVALUATION_ECTS_CREDITS
                    } else {
                        EVALUATION_NO_CREDIT_SYSTEM
                    }
                    .to_string(),
                );
            }
            Some(_) => {}
        }

        errors.into_result().map(|()| Self {
            base,
            years: years.into_iter().map(|(_, row)| row).collect(),
        })
    }

    /// Wire payload; fields the context does not edit keep their `stored`
    /// value.
    pub fn into_payload(self, context: AdmissionContext, stored: &Value) -> Value {
        let mut payload = match self.base.into_payload() {
            Value::Object(payload) => payload,
            _ => Map::new(),
        };
        restore_locked(&mut payload, stored, |field| is_editable(context, field));

        let stored_years = stored[REMOTE_YEARS_FIELD].as_array().cloned().unwrap_or_default();
        let years: Vec<Value> = self
            .years
            .into_iter()
            .filter(|row| row.is_enrolled)
            .map(|row| {
                let stored_year = stored_years
                    .iter()
                    .find(|stored| stored["academic_year"].as_i64() == row.academic_year.map(i64::from))
                    .cloned()
                    .unwrap_or(Value::Null);
                let mut year = match row.into_payload() {
                    Value::Object(year) => year,
                    _ => Map::new(),
                };
                restore_locked(&mut year, &stored_year, |field| is_year_editable(context, field));
                Value::Object(year)
            })
            .collect();
        payload.insert(REMOTE_YEARS_FIELD.into(), Value::Array(years));
        Value::Object(payload)
    }
}

/// Form values of a stored educational experience: the toggles are
/// derived from the free-text fields, and every academic year between
/// the first and the last enrolled one gets a row.
pub fn educational_initial(experience: &Value) -> Value {
    let mut initial = experience.as_object().cloned().unwrap_or_default();
    let stored_years = initial
        .remove(REMOTE_YEARS_FIELD)
        .and_then(|years| years.as_array().cloned())
        .unwrap_or_default();
    let is_filled = |field: &str| initial.get(field).and_then(Value::as_str).is_some_and(|s| !s.is_empty());
    let other_program = is_filled("education_name");
    let other_institute = is_filled("institute_name");
    initial.insert("other_program".into(), json!(other_program));
    initial.insert("other_institute".into(), json!(other_institute));

    let enrolled: Vec<i64> = stored_years
        .iter()
        .filter_map(|year| year["academic_year"].as_i64())
        .collect();
    let rows: Vec<Value> = match (enrolled.iter().min(), enrolled.iter().max()) {
        (Some(&start), Some(&end)) => {
            initial.insert("start".into(), json!(start));
            initial.insert("end".into(), json!(end));
            (start..=end)
                .rev()
                .map(|academic_year| {
                    stored_years
                        .iter()
                        .find(|year| year["academic_year"].as_i64() == Some(academic_year))
                        .map(|year| {
                            let mut row = year.clone();
                            row["is_enrolled"] = json!(true);
                            row
                        })
                        .unwrap_or_else(|| json!({ "academic_year": academic_year, "is_enrolled": false }))
                })
                .collect()
        }
        _ => Vec::new(),
    };
    initial.insert(YEARS_FIELD.into(), Value::Array(rows));
    Value::Object(initial)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn professional(kind: &str) -> Value {
        json!({
            "start_date_month": 2,
            "start_date_year": 2020,
            "end_date_month": 2,
            "end_date_year": 2021,
            "type": kind,
        })
    }

    #[test]
    fn work_needs_role_sector_and_employer() {
        let errors = bind_form::<ProfessionalExperienceForm>(&professional(ACTIVITY_WORK)).unwrap_err();
        assert!(errors.has("role"));
        assert!(errors.has("sector"));
        assert!(errors.has("institute_name"));
        assert!(!errors.has("activity"));
    }

    #[test]
    fn other_activity_needs_a_description_and_drops_the_certificate() {
        let errors = bind_form::<ProfessionalExperienceForm>(&professional(ACTIVITY_OTHER)).unwrap_err();
        assert!(errors.has("activity"));

        let mut data = professional(ACTIVITY_OTHER);
        data["activity"] = json!("Sabbatical");
        data["certificate"] = json!(["token"]);
        data["role"] = json!("Librarian");
        let payload = bind_form::<ProfessionalExperienceForm>(&data).unwrap().into_payload();
        assert_eq!(payload["certificate"], json!([]));
        assert_eq!(payload["role"], "");
        assert_eq!(payload["activity"], "Sabbatical");
    }

    #[test]
    fn months_become_whole_month_dates() {
        let payload = bind_form::<ProfessionalExperienceForm>(&professional("ILLNESS"))
            .unwrap()
            .into_payload();
        assert_eq!(payload["start_date"], "2020-02-01");
        assert_eq!(payload["end_date"], "2021-02-28");
        assert_eq!(payload["activity"], "");
    }

    #[test]
    fn start_after_end_is_a_whole_form_error() {
        let mut data = professional("ILLNESS");
        data["start_date_year"] = json!(2022);
        let errors = bind_form::<ProfessionalExperienceForm>(&data).unwrap_err();
        assert_eq!(errors.non_field(), [DATES_ORDER_MESSAGE.to_string()]);
    }

    #[test]
    fn professional_initial_splits_dates() {
        let initial = professional_initial(&json!({
            "start_date": "2019-09-01",
            "end_date": "2020-06-30",
            "type": "WORK",
        }));
        assert_eq!(initial["start_date_month"], 9);
        assert_eq!(initial["end_date_year"], 2020);
        assert!(initial.get("start_date").is_none());
    }

    fn belgian(years: Value) -> Value {
        json!({
            "start": 2019,
            "end": 2020,
            "country": "BE",
            "institute": "inst-1",
            "program": "prog-1",
            "linguistic_regime": "FR",
            "evaluation_type": "NO_CREDIT_SYSTEM",
            "transcript_type": TRANSCRIPT_ONE_FOR_ALL_YEARS,
            "obtained_diploma": false,
            "transcript": ["global"],
            "transcript_translation": ["translation"],
            "years": years,
        })
    }

    fn success(year: i32) -> Value {
        json!({
            "academic_year": year,
            "is_enrolled": true,
            "result": "SUCCESS",
            "registered_credit_number": 60.0,
            "acquired_credit_number": 55.0,
        })
    }

    #[test]
    fn belgian_experience_payload() {
        let data = belgian(json!([success(2020), { "academic_year": 2019, "is_enrolled": false }]));
        let forms = EducationalExperienceForms::bind(&data, AdmissionContext::GeneralEducation).unwrap();
        let payload = forms.into_payload(AdmissionContext::GeneralEducation, &Value::Null);
        assert_eq!(payload["evaluation_type"], EVALUATION_ECTS_CREDITS);
        assert_eq!(payload["linguistic_regime"], Value::Null);
        assert_eq!(payload["transcript"], json!(["global"]));
        assert_eq!(payload["transcript_translation"], json!([]));
        assert_eq!(payload["education_name"], "");
        let years = payload[REMOTE_YEARS_FIELD].as_array().unwrap();
        assert_eq!(years.len(), 1);
        assert_eq!(years[0]["academic_year"], 2020);
        assert!(years[0].get("is_enrolled").is_none());
        assert!(payload.get("other_program").is_none());
    }

    #[test]
    fn old_belgian_years_have_no_credits() {
        let mut data = belgian(json!([success(2003)]));
        data["start"] = json!(2003);
        let forms = EducationalExperienceForms::bind(&data, AdmissionContext::GeneralEducation).unwrap();
        assert_eq!(forms.base.evaluation_type.as_deref(), Some(EVALUATION_NO_CREDIT_SYSTEM));
        assert_eq!(forms.years[0].registered_credit_number, None);
    }

    #[test]
    fn at_least_one_enrolled_year() {
        let data = belgian(json!([{ "academic_year": 2020, "is_enrolled": false }]));
        let errors = EducationalExperienceForms::bind(&data, AdmissionContext::GeneralEducation).unwrap_err();
        assert_eq!(errors.non_field(), [NO_ACADEMIC_YEAR_MESSAGE.to_string()]);
    }

    #[test]
    fn enrolled_year_checks_result_and_credits() {
        let data = belgian(json!([
            { "academic_year": 2020, "is_enrolled": true, "acquired_credit_number": 70.0, "registered_credit_number": 60.0 },
            { "academic_year": 2019, "is_enrolled": true, "result": "SUCCESS", "registered_credit_number": 0.0 },
        ]));
        let errors = EducationalExperienceForms::bind(&data, AdmissionContext::Doctorate).unwrap_err();
        assert!(errors.has("years-0-result"));
        assert_eq!(
            errors.field("years-0-acquired_credit_number"),
            [ACQUIRED_ABOVE_REGISTERED_MESSAGE.to_string()]
        );
        assert!(errors.has("years-1-acquired_credit_number"));
        assert_eq!(
            errors.field("years-1-registered_credit_number"),
            ["This value must be greater than 0".to_string()]
        );
    }

    #[test]
    fn yearly_transcripts_of_a_foreign_experience_need_translations() {
        let data = json!({
            "start": 2020,
            "end": 2020,
            "country": "AR",
            "other_institute": true,
            "institute_name": "UBA",
            "institute_address": "Buenos Aires",
            "education_name": "Philosophy",
            "linguistic_regime": "SP",
            "evaluation_type": "NON_EUROPEAN_CREDITS",
            "transcript_type": TRANSCRIPT_ONE_A_YEAR,
            "obtained_diploma": false,
            "years": [{ "academic_year": 2020, "result": "SUCCESS", "registered_credit_number": 30.0, "acquired_credit_number": 30.0 }],
        });
        let errors = EducationalExperienceForms::bind(&data, AdmissionContext::GeneralEducation).unwrap_err();
        assert!(errors.has("years-0-transcript"));
        assert!(errors.has("years-0-transcript_translation"));
    }

    #[test]
    fn obtained_diploma_needs_its_details() {
        let mut data = belgian(json!([success(2020)]));
        data["obtained_diploma"] = json!(true);
        let errors = EducationalExperienceForms::bind(&data, AdmissionContext::Doctorate).unwrap_err();
        assert!(errors.has("obtained_grade"));
        assert!(errors.has("dissertation_title"));

        // Doctorate-only fields are not asked in general education.
        let errors = EducationalExperienceForms::bind(&data, AdmissionContext::GeneralEducation).unwrap_err();
        assert!(errors.has("obtained_grade"));
        assert!(!errors.has("dissertation_title"));
    }

    #[test]
    fn continuing_education_keeps_the_stored_general_fields() {
        let data = json!({
            "start": 2020,
            "end": 2020,
            "country": "BE",
            "institute": "inst-1",
            "program": "prog-1",
            "obtained_diploma": false,
            "years": [{ "academic_year": 2020 }],
        });
        let forms = EducationalExperienceForms::bind(&data, AdmissionContext::ContinuingEducation).unwrap();
        let stored = json!({
            "transcript_type": TRANSCRIPT_ONE_A_YEAR,
            "obtained_grade": "DISTINCTION",
            REMOTE_YEARS_FIELD: [{ "academic_year": 2020, "result": "SUCCESS", "transcript": ["t"] }],
        });
        let payload = forms.into_payload(AdmissionContext::ContinuingEducation, &stored);
        assert_eq!(payload["transcript_type"], TRANSCRIPT_ONE_A_YEAR);
        assert_eq!(payload["obtained_grade"], "DISTINCTION");
        assert_eq!(payload[REMOTE_YEARS_FIELD][0]["result"], "SUCCESS");
        assert_eq!(payload[REMOTE_YEARS_FIELD][0]["transcript"], json!(["t"]));
    }

    #[test]
    fn educational_initial_fills_the_lost_years() {
        let initial = educational_initial(&json!({
            "education_name": "Philosophy",
            "institute_name": "",
            REMOTE_YEARS_FIELD: [
                { "academic_year": 2017, "result": "SUCCESS" },
                { "academic_year": 2019, "result": "FAILURE" },
            ],
        }));
        assert_eq!(initial["other_program"], true);
        assert_eq!(initial["other_institute"], false);
        assert_eq!(initial["start"], 2017);
        assert_eq!(initial["end"], 2019);
        let years: Vec<_> = initial[YEARS_FIELD]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| (row["academic_year"].as_i64().unwrap(), row["is_enrolled"].as_bool().unwrap()))
            .collect();
        assert_eq!(years, vec![(2019, true), (2018, false), (2017, true)]);
    }
}
