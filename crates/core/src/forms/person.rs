//! Identification tab.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::address::BE_ISO_CODE;
use super::{CleanForm, FormErrors};
use crate::business::ErrorKind;

pub const IDENTITY_DOCUMENT_MESSAGE: &str =
    "Please set either the identity card number or the passport number.";

pub const BUSINESS_ERRORS: &[(ErrorKind, &str)] = &[
    (ErrorKind::IdentityNumberMissing, "national_number"),
];

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PersonForm {
    #[validate(length(max = 50))]
    pub first_name: Option<String>,
    #[validate(length(max = 50))]
    pub middle_name: Option<String>,
    #[validate(required, length(max = 50))]
    pub last_name: Option<String>,
    pub first_name_in_use: Option<String>,
    #[validate(required)]
    pub sex: Option<String>,
    #[validate(required)]
    pub gender: Option<String>,
    #[serde(default)]
    pub unknown_birth_date: bool,
    pub birth_date: Option<NaiveDate>,
    #[validate(range(min = 1900, max = 2100))]
    pub birth_year: Option<i32>,
    pub birth_country: Option<String>,
    pub birth_place: Option<String>,
    #[validate(required)]
    pub country_of_citizenship: Option<String>,
    #[validate(required)]
    pub language: Option<String>,
    pub national_number: Option<String>,
    pub id_card_number: Option<String>,
    pub passport_number: Option<String>,
    pub passport_expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub id_card: Vec<String>,
    #[serde(default)]
    pub passport: Vec<String>,
    #[serde(default)]
    pub id_photo: Vec<String>,
    #[serde(default)]
    pub already_registered: bool,
    pub last_registration_year: Option<i32>,
}

impl CleanForm for PersonForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        if self.unknown_birth_date {
            if self.birth_year.is_none() {
                errors.required("birth_year");
            }
            self.birth_date = None;
        } else {
            if self.birth_date.is_none() {
                errors.required("birth_date");
            }
            self.birth_year = None;
        }

        if self.country_of_citizenship.as_deref() == Some(BE_ISO_CODE) {
            if self.national_number.is_none() {
                errors.required("national_number");
            }
        } else if self.country_of_citizenship.is_some()
            && self.id_card_number.is_none()
            && self.passport_number.is_none()
        {
            errors.add("id_card_number", IDENTITY_DOCUMENT_MESSAGE);
            errors.add("passport_number", IDENTITY_DOCUMENT_MESSAGE);
        }

        if self.passport_number.is_none() {
            self.passport_expiration_date = None;
        }

        if self.already_registered {
            if self.last_registration_year.is_none() {
                errors.required("last_registration_year");
            }
        } else {
            self.last_registration_year = None;
        }
    }

    fn into_payload(self) -> Value {
        json!({
            "first_name": self.first_name,
            "middle_name": self.middle_name,
            "last_name": self.last_name,
            "first_name_in_use": self.first_name_in_use,
            "sex": self.sex,
            "gender": self.gender,
            "birth_date": self.birth_date,
            "birth_year": self.birth_year,
            "birth_country": self.birth_country,
            "birth_place": self.birth_place,
            "country_of_citizenship": self.country_of_citizenship,
            "language": self.language,
            "national_number": self.national_number,
            "id_card_number": self.id_card_number,
            "passport_number": self.passport_number,
            "passport_expiration_date": self.passport_expiration_date,
            "id_card": self.id_card,
            "passport": self.passport,
            "id_photo": self.id_photo,
            "last_registration_year": self.last_registration_year,
        })
    }
}

/// Initial values from the remote person resource.
pub fn initial(person: &Value) -> Value {
    let mut values = person.clone();
    if let Value::Object(map) = &mut values {
        let registered = map
            .get("last_registration_year")
            .is_some_and(|year| !year.is_null());
        let unknown_birth_date = map.get("birth_date").map_or(true, Value::is_null)
            && map.get("birth_year").is_some_and(|year| !year.is_null());
        map.insert("already_registered".into(), Value::Bool(registered));
        map.insert("unknown_birth_date".into(), Value::Bool(unknown_birth_date));
    }
    values
}
