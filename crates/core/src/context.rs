//! Admission contexts.
//!
//! The portal serves three kinds of admission. The context is parsed once
//! from the URL prefix and then carried explicitly through every layer,
//! selecting the tab tree and the remote path segment.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::tabs::{self, TabTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdmissionContext {
    Doctorate,
    GeneralEducation,
    ContinuingEducation,
}

impl AdmissionContext {
    pub const ALL: [AdmissionContext; 3] = [
        Self::Doctorate,
        Self::GeneralEducation,
        Self::ContinuingEducation,
    ];

    /// Parse the URL/wire representation.
    pub fn from_slug(s: &str) -> Result<Self, CoreError> {
        match s {
            "doctorate" => Ok(Self::Doctorate),
            "general-education" => Ok(Self::GeneralEducation),
            "continuing-education" => Ok(Self::ContinuingEducation),
            _ => Err(CoreError::Validation(format!(
                "Invalid admission context '{s}'. Must be one of: doctorate, \
                 general-education, continuing-education"
            ))),
        }
    }

    /// URL prefix and remote path segment.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Doctorate => "doctorate",
            Self::GeneralEducation => "general-education",
            Self::ContinuingEducation => "continuing-education",
        }
    }

    /// The wizard steps offered in this context.
    pub fn tab_tree(self) -> &'static TabTree {
        match self {
            Self::Doctorate => &tabs::DOCTORATE_TABS,
            Self::GeneralEducation => &tabs::GENERAL_EDUCATION_TABS,
            Self::ContinuingEducation => &tabs::CONTINUING_EDUCATION_TABS,
        }
    }

    /// Read view URL of a tab.
    pub fn tab_url(self, admission: uuid::Uuid, tab: &str) -> String {
        format!("/{}/{admission}/{tab}", self.slug())
    }

    /// Edit view URL of a tab.
    pub fn tab_update_url(self, admission: uuid::Uuid, tab: &str) -> String {
        format!("/{}/{admission}/update/{tab}", self.slug())
    }

    /// Landing page of an admission.
    pub fn home_url(self, admission: uuid::Uuid) -> String {
        format!("/{}/{admission}", self.slug())
    }
}

impl fmt::Display for AdmissionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_roundtrip() {
        for context in AdmissionContext::ALL {
            assert_eq!(AdmissionContext::from_slug(context.slug()).unwrap(), context);
        }
    }

    #[test]
    fn unknown_slug_is_rejected() {
        assert!(AdmissionContext::from_slug("doctorat").is_err());
        assert!(AdmissionContext::from_slug("").is_err());
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&AdmissionContext::GeneralEducation).unwrap();
        assert_eq!(json, "\"general-education\"");
        let parsed: AdmissionContext = serde_json::from_str("\"continuing-education\"").unwrap();
        assert_eq!(parsed, AdmissionContext::ContinuingEducation);
    }

    #[test]
    fn urls_are_prefixed_by_context() {
        let id = uuid::Uuid::nil();
        assert_eq!(
            AdmissionContext::Doctorate.tab_update_url(id, "jury"),
            format!("/doctorate/{id}/update/jury")
        );
        assert_eq!(
            AdmissionContext::GeneralEducation.tab_url(id, "curriculum"),
            format!("/general-education/{id}/curriculum")
        );
    }
}
