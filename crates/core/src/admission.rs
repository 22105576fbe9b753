//! The admission resource as returned by the remote service.
//!
//! Only the parts the portal branches on are typed: the identifier, the
//! status code, the hypermedia action links and the stored answers to
//! dynamic questions. Everything else passes through untouched in
//! [`Admission::extra`].

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::AdmissionId;

/// Draft admission, still editable by the candidate.
pub const STATUS_DRAFT: &str = "EN_BROUILLON";
/// Submitted admission.
pub const STATUS_SUBMITTED: &str = "CONFIRMEE";
/// Submitted, waiting for the application fees to be paid.
pub const STATUS_PENDING_FEES: &str = "FRAIS_DOSSIER_EN_ATTENTE";

/// Pools for which late enrollments get a warning.
pub const LATE_MESSAGE_POOLS: &[&str] = &[
    "ADMISSION_POOL_HUE_UCL_PATHWAY_CHANGE",
    "ADMISSION_POOL_UE5_BELGIAN",
];

/// Number of days before the pool end date under which the warning shows.
pub const LATE_MESSAGE_DAYS_THRESHOLD: i64 = 30;

/// A permitted operation (`url`) or the reason it is refused (`error`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionLink {
    Url {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<String>,
    },
    Error {
        error: String,
    },
}

impl ActionLink {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Url { .. })
    }
}

/// Action links keyed by action name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(HashMap<String, ActionLink>);

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, action: impl Into<String>, link: ActionLink) {
        self.0.insert(action.into(), link);
    }

    /// Builder-style helper mostly used to describe resources in tests.
    pub fn allow(mut self, action: &str) -> Self {
        self.insert(
            action,
            ActionLink::Url {
                url: format!("/{action}"),
                method: None,
            },
        );
        self
    }

    pub fn deny(mut self, action: &str, reason: &str) -> Self {
        self.insert(
            action,
            ActionLink::Error {
                error: reason.to_string(),
            },
        );
        self
    }

    pub fn get(&self, action: &str) -> Option<&ActionLink> {
        self.0.get(action)
    }

    /// `true` iff the action is present as a URL link. Absent actions are
    /// treated as denied.
    pub fn allows(&self, action: &str) -> bool {
        self.0.get(action).is_some_and(ActionLink::is_allowed)
    }

    /// Server-provided refusal reason, if any.
    pub fn refusal(&self, action: &str) -> Option<&str> {
        match self.0.get(action)? {
            ActionLink::Error { error } => Some(error.as_str()),
            ActionLink::Url { .. } => None,
        }
    }
}

/// An in-progress or submitted application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admission {
    pub uuid: AdmissionId,
    #[serde(alias = "statut")]
    pub status: String,
    #[serde(default)]
    pub links: Links,
    #[serde(default, alias = "reponses_questions_specifiques")]
    pub specific_question_answers: Map<String, Value>,
    #[serde(default, alias = "pot_calcule")]
    pub pool: Option<String>,
    #[serde(default, alias = "annee_calculee")]
    pub year: Option<i32>,
    #[serde(default, alias = "date_fin_pot")]
    pub pool_end_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Admission {
    pub fn new(uuid: AdmissionId, status: &str, links: Links) -> Self {
        Self {
            uuid,
            status: status.to_string(),
            links,
            specific_question_answers: Map::new(),
            pool: None,
            year: None,
            pool_end_date: None,
            extra: Map::new(),
        }
    }

    pub fn is_draft(&self) -> bool {
        self.status == STATUS_DRAFT
    }

    /// Warning shown when the candidate enrolls close to the end of a
    /// pool that does not accept late applications.
    pub fn late_enrollment_notice(&self, today: NaiveDate) -> Option<String> {
        let pool = self.pool.as_deref()?;
        let end = self.pool_end_date?;
        if LATE_MESSAGE_POOLS.contains(&pool) && (end - today).num_days() < LATE_MESSAGE_DAYS_THRESHOLD {
            Some(format!("Late enrollment! Enroll before {end}"))
        } else {
            None
        }
    }
}
