//! Business errors reported by the remote admission service.
//!
//! The service rejects a request with one or more `{status_code, detail}`
//! pairs. The portal knows a fixed set of those codes as [`ErrorKind`]s,
//! which lets views attach them to form fields and lets the confirmation
//! page group them by wizard tab. Codes outside that set are kept verbatim
//! and shown as whole-form errors.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One business rule violation, as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessError {
    pub status_code: String,
    pub detail: String,
    /// Field the service attached the error to, when it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Training activity the error is about, on batch submissions.
    #[serde(default, rename = "activite_id", skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
}

impl BusinessError {
    pub fn new(status_code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            status_code: status_code.into(),
            detail: detail.into(),
            field: None,
            activity: None,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        ErrorKind::from_code(&self.status_code)
    }
}

/// Business error kinds known to the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // -- Proposition --
    MaximumPropositionsReached,
    DoctorateNotFound,
    PropositionNotFound,
    SupervisionGroupNotFound,
    ProximityCommissionCdeInconsistent,
    WorkContractInconsistent,
    InstitutionInconsistent,
    SupervisionMemberNotFound,
    PromoterNotFound,
    CaMemberNotFound,
    SignatoryNotFound,
    SignatoryAlreadyInvited,
    SignatoryNotInvited,
    AlreadyPromoter,
    AlreadyCaMember,
    JustificationRequired,
    ProjectDetailsIncomplete,
    CotutelleIncomplete,
    PromoterMissing,
    CaMemberMissing,
    CotutelleNeedsExternalPromoter,
    SupervisionFullForPromoters,
    SupervisionFullForCaMembers,
    ProximityCommissionCdssInconsistent,
    IdentificationIncomplete,
    IdentityNumberMissing,
    ResidentialAddressIncomplete,
    MandatoryLanguagesMissing,
    CurriculumFileMissing,
    SecondaryStudiesIncomplete,
    AccountingIncomplete,
    SpecificQuestionsIncomplete,
    TrainingNotFound,
    ScholarshipNotFound,
    PoolNotOpen,

    // -- Confirmation paper --
    ConfirmationPaperNotFound,
    ConfirmationPaperIncomplete,
    ConfirmationDateIncorrect,
    ExtensionRequestIncomplete,
    ExtensionOpinionIncomplete,
    ExtensionRequestUndefined,
    ConfirmationPaperIncompleteForEvaluation,

    // -- Jury --
    JuryNotFound,
    JuryMemberNotFound,
    PromoterCannotPreside,
    NonDoctorWithoutJustification,
    ExternalMemberWithoutInstitution,
    ExternalMemberWithoutCountry,
    ExternalMemberWithoutLastName,
    ExternalMemberWithoutFirstName,
    ExternalMemberWithoutTitle,
    ExternalMemberWithoutGender,
    ExternalMemberWithoutEmail,
    MemberAlreadyInJury,

    // -- Documents --
    RequestedDocumentsMissing,
}

const CODES: &[(ErrorKind, &str)] = &[
    (ErrorKind::MaximumPropositionsReached, "PROPOSITION-1"),
    (ErrorKind::DoctorateNotFound, "PROPOSITION-2"),
    (ErrorKind::PropositionNotFound, "PROPOSITION-3"),
    (ErrorKind::SupervisionGroupNotFound, "PROPOSITION-4"),
    (ErrorKind::ProximityCommissionCdeInconsistent, "PROPOSITION-5"),
    (ErrorKind::WorkContractInconsistent, "PROPOSITION-6"),
    (ErrorKind::InstitutionInconsistent, "PROPOSITION-7"),
    (ErrorKind::SupervisionMemberNotFound, "PROPOSITION-8"),
    (ErrorKind::PromoterNotFound, "PROPOSITION-9"),
    (ErrorKind::CaMemberNotFound, "PROPOSITION-10"),
    (ErrorKind::SignatoryNotFound, "PROPOSITION-11"),
    (ErrorKind::SignatoryAlreadyInvited, "PROPOSITION-12"),
    (ErrorKind::SignatoryNotInvited, "PROPOSITION-13"),
    (ErrorKind::AlreadyPromoter, "PROPOSITION-14"),
    (ErrorKind::AlreadyCaMember, "PROPOSITION-15"),
    (ErrorKind::JustificationRequired, "PROPOSITION-16"),
    (ErrorKind::ProjectDetailsIncomplete, "PROPOSITION-17"),
    (ErrorKind::CotutelleIncomplete, "PROPOSITION-18"),
    (ErrorKind::PromoterMissing, "PROPOSITION-19"),
    (ErrorKind::CaMemberMissing, "PROPOSITION-20"),
    (ErrorKind::CotutelleNeedsExternalPromoter, "PROPOSITION-21"),
    (ErrorKind::SupervisionFullForPromoters, "PROPOSITION-22"),
    (ErrorKind::SupervisionFullForCaMembers, "PROPOSITION-23"),
    (ErrorKind::ProximityCommissionCdssInconsistent, "PROPOSITION-24"),
    (ErrorKind::IdentificationIncomplete, "PROPOSITION-25"),
    (ErrorKind::IdentityNumberMissing, "PROPOSITION-26"),
    (ErrorKind::ResidentialAddressIncomplete, "PROPOSITION-27"),
    (ErrorKind::MandatoryLanguagesMissing, "PROPOSITION-28"),
    (ErrorKind::CurriculumFileMissing, "PROPOSITION-29"),
    (ErrorKind::SecondaryStudiesIncomplete, "PROPOSITION-30"),
    (ErrorKind::AccountingIncomplete, "PROPOSITION-31"),
    (ErrorKind::SpecificQuestionsIncomplete, "PROPOSITION-32"),
    (ErrorKind::TrainingNotFound, "PROPOSITION-33"),
    (ErrorKind::ScholarshipNotFound, "PROPOSITION-34"),
    (ErrorKind::PoolNotOpen, "PROPOSITION-35"),
    (ErrorKind::ConfirmationPaperNotFound, "EPREUVE-CONFIRMATION-1"),
    (ErrorKind::ConfirmationPaperIncomplete, "EPREUVE-CONFIRMATION-2"),
    (ErrorKind::ConfirmationDateIncorrect, "EPREUVE-CONFIRMATION-3"),
    (ErrorKind::ExtensionRequestIncomplete, "EPREUVE-CONFIRMATION-4"),
    (ErrorKind::ExtensionOpinionIncomplete, "EPREUVE-CONFIRMATION-5"),
    (ErrorKind::ExtensionRequestUndefined, "EPREUVE-CONFIRMATION-6"),
    (ErrorKind::ConfirmationPaperIncompleteForEvaluation, "EPREUVE-CONFIRMATION-7"),
    (ErrorKind::JuryNotFound, "JURY-1"),
    (ErrorKind::JuryMemberNotFound, "JURY-2"),
    (ErrorKind::PromoterCannotPreside, "JURY-3"),
    (ErrorKind::NonDoctorWithoutJustification, "JURY-4"),
    (ErrorKind::ExternalMemberWithoutInstitution, "JURY-5"),
    (ErrorKind::ExternalMemberWithoutCountry, "JURY-6"),
    (ErrorKind::ExternalMemberWithoutLastName, "JURY-7"),
    (ErrorKind::ExternalMemberWithoutFirstName, "JURY-8"),
    (ErrorKind::ExternalMemberWithoutTitle, "JURY-9"),
    (ErrorKind::ExternalMemberWithoutGender, "JURY-10"),
    (ErrorKind::ExternalMemberWithoutEmail, "JURY-11"),
    (ErrorKind::MemberAlreadyInJury, "JURY-12"),
    (ErrorKind::RequestedDocumentsMissing, "DOCUMENTS-1"),
];

impl ErrorKind {
    pub fn from_code(code: &str) -> Option<Self> {
        CODES
            .iter()
            .find(|(_, known)| *known == code)
            .map(|(kind, _)| *kind)
    }

    pub fn code(self) -> &'static str {
        CODES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, code)| *code)
            .unwrap_or_default()
    }
}

/// Field name associated with `kind` in a view's error table.
pub fn field_for(mapping: &[(ErrorKind, &'static str)], kind: ErrorKind) -> Option<&'static str> {
    mapping
        .iter()
        .find(|(mapped, _)| *mapped == kind)
        .map(|(_, field)| *field)
}

// ---------------------------------------------------------------------------
// Transport error heuristic
// ---------------------------------------------------------------------------

static MAX_LENGTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<field>[A-Za-z_][A-Za-z0-9_]*)\s*:\s*field value exceeds maximum length (?P<max>\d+)")
        .expect("max length pattern is valid")
});

/// Recognize an upstream "field value exceeds maximum length N" message.
///
/// Returns the offending field and the limit so the error can be shown next
/// to the field instead of as a raw transport message.
pub fn parse_max_length_error(message: &str) -> Option<(String, usize)> {
    let captures = MAX_LENGTH_RE.captures(message)?;
    let max = captures["max"].parse().ok()?;
    Some((captures["field"].to_string(), max))
}

pub fn max_length_message(max: usize) -> String {
    format!("Ensure this value has at most {max} characters.")
}
