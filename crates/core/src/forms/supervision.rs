//! Supervision tab: promoters and CA members of the doctorate.

use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::{CleanForm, FormErrors, INVALID_CHOICE_MESSAGE};
use crate::business::ErrorKind;

pub const ACTOR_PROMOTER: &str = "PROMOTER";
pub const ACTOR_CA_MEMBER: &str = "CA_MEMBER";

pub const MEMBER_INTERNAL: &str = "INTERNAL";
pub const MEMBER_EXTERNAL: &str = "EXTERNAL";

const EXTERNAL_FIELDS: &[&str] = &[
    "first_name",
    "last_name",
    "email",
    "institution",
    "city",
    "country",
    "language",
];

pub const BUSINESS_ERRORS: &[(ErrorKind, &str)] = &[
    (ErrorKind::PromoterNotFound, "tutor"),
    (ErrorKind::CaMemberNotFound, "person"),
    (ErrorKind::AlreadyPromoter, "tutor"),
    (ErrorKind::AlreadyCaMember, "person"),
];

/// Add a supervision member, either known to the institution (by global
/// id) or external.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SupervisionMemberForm {
    #[validate(required)]
    #[serde(rename = "type")]
    pub actor_type: Option<String>,
    pub internal_external: Option<String>,
    /// Global id of an internal promoter.
    pub tutor: Option<String>,
    /// Global id of an internal CA member.
    pub person: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub is_doctor: Option<bool>,
    pub institution: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
}

impl SupervisionMemberForm {
    fn is_external(&self) -> bool {
        self.internal_external.as_deref() == Some(MEMBER_EXTERNAL)
    }

    fn external_value(&self, field: &str) -> &Option<String> {
        match field {
            "first_name" => &self.first_name,
            "last_name" => &self.last_name,
            "email" => &self.email,
            "institution" => &self.institution,
            "city" => &self.city,
            "country" => &self.country,
            _ => &self.language,
        }
    }
}

impl CleanForm for SupervisionMemberForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        match self.actor_type.as_deref() {
            Some(ACTOR_PROMOTER | ACTOR_CA_MEMBER) | None => {}
            Some(_) => errors.add("type", INVALID_CHOICE_MESSAGE),
        }
        if self.is_external() {
            for field in EXTERNAL_FIELDS {
                if self.external_value(field).is_none() {
                    errors.required(field);
                }
            }
        } else if self.actor_type.as_deref() == Some(ACTOR_CA_MEMBER) {
            if self.person.is_none() {
                errors.required("person");
            }
        } else if self.tutor.is_none() {
            errors.required("tutor");
        }
    }

    fn into_payload(self) -> Value {
        let is_external = self.is_external();
        let matricule = if is_external {
            None
        } else if self.actor_type.as_deref() == Some(ACTOR_CA_MEMBER) {
            self.person
        } else {
            self.tutor
        };
        let external = |value: Option<String>| if is_external { value } else { None };
        json!({
            "type": self.actor_type,
            "matricule": matricule,
            "first_name": external(self.first_name),
            "last_name": external(self.last_name),
            "email": external(self.email),
            "is_doctor": if is_external { self.is_doctor } else { None },
            "institute": external(self.institution),
            "city": external(self.city),
            "country_code": external(self.country),
            "language": external(self.language),
        })
    }
}

/// Remove a member from the supervision group.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RemoveMemberForm {
    #[validate(required)]
    #[serde(rename = "type")]
    pub actor_type: Option<String>,
    #[validate(required)]
    pub uuid_membre: Option<String>,
}

impl CleanForm for RemoveMemberForm {
    fn into_payload(self) -> Value {
        json!({ "type": self.actor_type, "uuid_membre": self.uuid_membre })
    }
}
