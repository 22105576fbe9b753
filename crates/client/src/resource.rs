//! Remote sub-resources of an admission.

use admission_core::forms::training::TrainingNamespace;

/// A sub-resource of an admission on the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Person,
    Coordinates,
    SecondaryStudies,
    Curriculum,
    ProfessionalExperiences,
    ProfessionalExperience(String),
    EducationalExperiences,
    EducationalExperience(String),
    Languages,
    Accounting,
    Project,
    Cotutelle,
    Supervision,
    SupervisionMember,
    Signatures,
    TrainingChoice,
    SpecificQuestions,
    Documents,
    JuryPreparation,
    JuryMembers,
    JuryMember(String),
    JuryMemberRole(String),
    ConfirmationPapers,
    LastConfirmationPaper,
    ExtensionRequest,
    Verification,
    Submission,
    PaymentAfterSubmission,
    PaymentAfterRequest,
    Exam,
    TrainingConfig,
    /// Activities of one training namespace.
    TrainingList(TrainingNamespace),
    /// Where new activities of any namespace are created.
    TrainingActivities,
    TrainingActivity(String),
    TrainingAssent(String),
    /// Batch submission of activities.
    TrainingSubmission,
}

impl Resource {
    /// Path segment(s) below the admission.
    pub fn path(&self) -> String {
        match self {
            Self::Person => "person".into(),
            Self::Coordinates => "coordonnees".into(),
            Self::SecondaryStudies => "secondary_studies".into(),
            Self::Curriculum => "curriculum".into(),
            Self::ProfessionalExperiences => "curriculum/professional".into(),
            Self::ProfessionalExperience(id) => format!("curriculum/professional/{id}"),
            Self::EducationalExperiences => "curriculum/educational".into(),
            Self::EducationalExperience(id) => format!("curriculum/educational/{id}"),
            Self::Languages => "languages_knowledge".into(),
            Self::Accounting => "accounting".into(),
            Self::Project => "project".into(),
            Self::Cotutelle => "cotutelle".into(),
            Self::Supervision => "supervision".into(),
            Self::SupervisionMember => "supervision/member".into(),
            Self::Signatures => "request_signatures".into(),
            Self::TrainingChoice => "training_choice".into(),
            Self::SpecificQuestions => "specific_question".into(),
            Self::Documents => "documents".into(),
            Self::JuryPreparation => "jury/preparation".into(),
            Self::JuryMembers => "jury/members".into(),
            Self::JuryMember(member) => format!("jury/members/{member}"),
            Self::JuryMemberRole(member) => format!("jury/members/{member}/role"),
            Self::ConfirmationPapers => "confirmation".into(),
            Self::LastConfirmationPaper => "confirmation/last".into(),
            Self::ExtensionRequest => "confirmation/last/extension_request".into(),
            Self::Verification => "verify".into(),
            Self::Submission => "submit".into(),
            Self::PaymentAfterSubmission => "pay_after_submission".into(),
            Self::PaymentAfterRequest => "pay_after_request".into(),
            Self::Exam => "exam".into(),
            Self::TrainingConfig => "training/config".into(),
            Self::TrainingList(namespace) => namespace.slug().into(),
            Self::TrainingActivities => "doctoral-training".into(),
            Self::TrainingActivity(id) => format!("training/{id}"),
            Self::TrainingAssent(id) => format!("training/{id}/assent"),
            Self::TrainingSubmission => "training/submit".into(),
        }
    }

    /// Resources owned by the person rather than by one admission; they
    /// can be reached before any admission exists.
    pub fn is_person_level(&self) -> bool {
        matches!(
            self,
            Self::Person
                | Self::Coordinates
                | Self::SecondaryStudies
                | Self::Curriculum
                | Self::ProfessionalExperiences
                | Self::ProfessionalExperience(_)
                | Self::EducationalExperiences
                | Self::EducationalExperience(_)
                | Self::Languages
        )
    }
}
