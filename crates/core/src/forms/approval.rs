//! Decision of an external promoter on a doctorate admission, given from
//! the link they received by email.

use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::{CleanForm, FormErrors, INVALID_CHOICE_MESSAGE};

pub const DECISION_APPROVED: &str = "APPROVED";
pub const DECISION_REJECTED: &str = "REJECTED";

pub const SAVED_MESSAGE: &str = "Your decision has been saved.";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApprovalForm {
    #[validate(required)]
    pub decision: Option<String>,
    pub rejection_reason: Option<String>,
    /// Shown to the candidate.
    pub comment: Option<String>,
    /// Shown to the doctoral commission only.
    pub internal_comment: Option<String>,
    /// Token of the invitation, which identifies the member.
    #[serde(skip)]
    pub member: String,
}

impl ApprovalForm {
    pub fn is_approved(&self) -> bool {
        self.decision.as_deref() == Some(DECISION_APPROVED)
    }
}

impl CleanForm for ApprovalForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        match self.decision.as_deref() {
            None | Some(DECISION_APPROVED) => {}
            Some(DECISION_REJECTED) => {
                if self.rejection_reason.is_none() {
                    errors.required("rejection_reason");
                }
            }
            Some(_) => errors.add("decision", INVALID_CHOICE_MESSAGE),
        }
    }

    /// The reason only matters when the admission is rejected.
    fn into_payload(self) -> Value {
        let mut payload = json!({
            "uuid_membre": self.member,
            "commentaire_interne": self.internal_comment.unwrap_or_default(),
            "commentaire_externe": self.comment.unwrap_or_default(),
        });
        if self.decision.as_deref() != Some(DECISION_APPROVED) {
            payload["motif_refus"] = json!(self.rejection_reason.unwrap_or_default());
        }
        payload
    }
}
