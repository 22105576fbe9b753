//! Tab visibility and write permissions.
//!
//! The remote service is the only source of truth for what a candidate may
//! do: every admission it returns carries a set of action links. The
//! resolver maps each wizard tab to the actions it needs and answers
//! read/write questions from those links alone.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::admission::Admission;
use crate::business::{BusinessError, ErrorKind};
use crate::tabs::{self, TabTree};

/// Group name for errors that cannot be attached to a readable tab.
pub const OTHER_TAB: &str = "other";

/// Actions a tab needs on the admission's links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionRequirement {
    /// No action needed.
    Always,
    One(&'static str),
    /// Every listed action must be permitted.
    All(&'static [&'static str]),
}

impl ActionRequirement {
    fn is_met(&self, admission: &Admission) -> bool {
        match self {
            Self::Always => true,
            Self::One(action) => admission.links.allows(action),
            Self::All(actions) => actions.iter().all(|action| admission.links.allows(action)),
        }
    }

    pub fn actions(&self) -> &[&'static str] {
        match self {
            Self::Always => &[],
            Self::One(action) => std::slice::from_ref(action),
            Self::All(actions) => actions,
        }
    }
}

// ---------------------------------------------------------------------------
// Default tables
// ---------------------------------------------------------------------------

pub const READ_ACTIONS_BY_TAB: &[(&str, ActionRequirement)] = &[
    (tabs::TAB_PERSON, ActionRequirement::One("retrieve_person")),
    (tabs::TAB_COORDINATES, ActionRequirement::One("retrieve_coordinates")),
    (tabs::TAB_EDUCATION, ActionRequirement::One("retrieve_secondary_studies")),
    (tabs::TAB_CURRICULUM, ActionRequirement::One("retrieve_curriculum")),
    (tabs::TAB_EXAM, ActionRequirement::One("retrieve_exam")),
    (tabs::TAB_LANGUAGES, ActionRequirement::One("retrieve_languages")),
    (tabs::TAB_PROJECT, ActionRequirement::One("retrieve_project")),
    (tabs::TAB_COTUTELLE, ActionRequirement::One("retrieve_cotutelle")),
    (tabs::TAB_SUPERVISION, ActionRequirement::One("retrieve_supervision")),
    (tabs::TAB_ACCOUNTING, ActionRequirement::One("retrieve_accounting")),
    (tabs::TAB_TRAINING_CHOICE, ActionRequirement::One("retrieve_training_choice")),
    (tabs::TAB_SPECIFIC_QUESTIONS, ActionRequirement::One("retrieve_specific_question")),
    (tabs::TAB_CONFIRM, ActionRequirement::Always),
    (tabs::TAB_CONFIRMATION_PAPER, ActionRequirement::One("retrieve_confirmation")),
    (tabs::TAB_EXTENSION_REQUEST, ActionRequirement::One("retrieve_confirmation")),
    (tabs::TAB_JURY_PREPARATION, ActionRequirement::One("retrieve_jury_preparation")),
    (tabs::TAB_JURY, ActionRequirement::One("retrieve_jury")),
    (tabs::TAB_DOCUMENTS, ActionRequirement::One("retrieve_documents")),
];

pub const UPDATE_ACTIONS_BY_TAB: &[(&str, ActionRequirement)] = &[
    (tabs::TAB_PERSON, ActionRequirement::One("update_person")),
    (tabs::TAB_COORDINATES, ActionRequirement::One("update_coordinates")),
    (tabs::TAB_EDUCATION, ActionRequirement::One("update_secondary_studies")),
    (tabs::TAB_CURRICULUM, ActionRequirement::One("update_curriculum")),
    (tabs::TAB_EXAM, ActionRequirement::One("update_exam")),
    (tabs::TAB_LANGUAGES, ActionRequirement::One("update_languages")),
    (tabs::TAB_PROJECT, ActionRequirement::One("update_project")),
    (tabs::TAB_COTUTELLE, ActionRequirement::One("update_cotutelle")),
    (tabs::TAB_SUPERVISION, ActionRequirement::One("add_member")),
    (tabs::TAB_ACCOUNTING, ActionRequirement::One("update_accounting")),
    (tabs::TAB_TRAINING_CHOICE, ActionRequirement::One("update_training_choice")),
    (tabs::TAB_SPECIFIC_QUESTIONS, ActionRequirement::One("update_specific_question")),
    (tabs::TAB_CONFIRM, ActionRequirement::One("submit_proposition")),
    (tabs::TAB_CONFIRMATION_PAPER, ActionRequirement::One("update_confirmation")),
    (tabs::TAB_EXTENSION_REQUEST, ActionRequirement::One("update_confirmation_extension")),
    (tabs::TAB_JURY_PREPARATION, ActionRequirement::One("update_jury_preparation")),
    (tabs::TAB_JURY, ActionRequirement::One("update_jury_preparation")),
    (tabs::TAB_DOCUMENTS, ActionRequirement::One("update_documents")),
];

pub const TAB_OF_BUSINESS_EXCEPTION: &[(ErrorKind, &str)] = &[
    (ErrorKind::IdentificationIncomplete, tabs::TAB_PERSON),
    (ErrorKind::IdentityNumberMissing, tabs::TAB_PERSON),
    (ErrorKind::ResidentialAddressIncomplete, tabs::TAB_COORDINATES),
    (ErrorKind::SecondaryStudiesIncomplete, tabs::TAB_EDUCATION),
    (ErrorKind::CurriculumFileMissing, tabs::TAB_CURRICULUM),
    (ErrorKind::MandatoryLanguagesMissing, tabs::TAB_LANGUAGES),
    (ErrorKind::DoctorateNotFound, tabs::TAB_PROJECT),
    (ErrorKind::ProximityCommissionCdeInconsistent, tabs::TAB_PROJECT),
    (ErrorKind::ProximityCommissionCdssInconsistent, tabs::TAB_PROJECT),
    (ErrorKind::WorkContractInconsistent, tabs::TAB_PROJECT),
    (ErrorKind::InstitutionInconsistent, tabs::TAB_PROJECT),
    (ErrorKind::JustificationRequired, tabs::TAB_PROJECT),
    (ErrorKind::ProjectDetailsIncomplete, tabs::TAB_PROJECT),
    (ErrorKind::CotutelleIncomplete, tabs::TAB_COTUTELLE),
    (ErrorKind::SupervisionGroupNotFound, tabs::TAB_SUPERVISION),
    (ErrorKind::SupervisionMemberNotFound, tabs::TAB_SUPERVISION),
    (ErrorKind::SignatoryNotFound, tabs::TAB_SUPERVISION),
    (ErrorKind::SignatoryNotInvited, tabs::TAB_SUPERVISION),
    (ErrorKind::PromoterNotFound, tabs::TAB_SUPERVISION),
    (ErrorKind::CaMemberNotFound, tabs::TAB_SUPERVISION),
    (ErrorKind::SignatoryAlreadyInvited, tabs::TAB_SUPERVISION),
    (ErrorKind::AlreadyPromoter, tabs::TAB_SUPERVISION),
    (ErrorKind::AlreadyCaMember, tabs::TAB_SUPERVISION),
    (ErrorKind::PromoterMissing, tabs::TAB_SUPERVISION),
    (ErrorKind::CaMemberMissing, tabs::TAB_SUPERVISION),
    (ErrorKind::CotutelleNeedsExternalPromoter, tabs::TAB_SUPERVISION),
    (ErrorKind::SupervisionFullForPromoters, tabs::TAB_SUPERVISION),
    (ErrorKind::SupervisionFullForCaMembers, tabs::TAB_SUPERVISION),
    (ErrorKind::AccountingIncomplete, tabs::TAB_ACCOUNTING),
    (ErrorKind::SpecificQuestionsIncomplete, tabs::TAB_SPECIFIC_QUESTIONS),
    (ErrorKind::MaximumPropositionsReached, tabs::TAB_TRAINING_CHOICE),
    (ErrorKind::TrainingNotFound, tabs::TAB_TRAINING_CHOICE),
    (ErrorKind::ScholarshipNotFound, tabs::TAB_TRAINING_CHOICE),
    (ErrorKind::ConfirmationPaperNotFound, tabs::TAB_CONFIRMATION_PAPER),
    (ErrorKind::ConfirmationPaperIncomplete, tabs::TAB_CONFIRMATION_PAPER),
    (ErrorKind::ConfirmationDateIncorrect, tabs::TAB_CONFIRMATION_PAPER),
    (ErrorKind::ConfirmationPaperIncompleteForEvaluation, tabs::TAB_CONFIRMATION_PAPER),
    (ErrorKind::ExtensionRequestIncomplete, tabs::TAB_EXTENSION_REQUEST),
    (ErrorKind::ExtensionOpinionIncomplete, tabs::TAB_EXTENSION_REQUEST),
    (ErrorKind::ExtensionRequestUndefined, tabs::TAB_EXTENSION_REQUEST),
    (ErrorKind::JuryNotFound, tabs::TAB_JURY),
    (ErrorKind::JuryMemberNotFound, tabs::TAB_JURY),
    (ErrorKind::PromoterCannotPreside, tabs::TAB_JURY),
    (ErrorKind::NonDoctorWithoutJustification, tabs::TAB_JURY),
    (ErrorKind::ExternalMemberWithoutInstitution, tabs::TAB_JURY),
    (ErrorKind::ExternalMemberWithoutCountry, tabs::TAB_JURY),
    (ErrorKind::ExternalMemberWithoutLastName, tabs::TAB_JURY),
    (ErrorKind::ExternalMemberWithoutFirstName, tabs::TAB_JURY),
    (ErrorKind::ExternalMemberWithoutTitle, tabs::TAB_JURY),
    (ErrorKind::ExternalMemberWithoutGender, tabs::TAB_JURY),
    (ErrorKind::ExternalMemberWithoutEmail, tabs::TAB_JURY),
    (ErrorKind::MemberAlreadyInJury, tabs::TAB_JURY),
    (ErrorKind::RequestedDocumentsMissing, tabs::TAB_DOCUMENTS),
];

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Decides tab visibility and write access from an admission's links.
#[derive(Debug, Clone)]
pub struct TabPermissionResolver {
    read: HashMap<&'static str, ActionRequirement>,
    update: HashMap<&'static str, ActionRequirement>,
    exceptions: HashMap<ErrorKind, &'static str>,
}

impl Default for TabPermissionResolver {
    fn default() -> Self {
        Self::from_tables(READ_ACTIONS_BY_TAB, UPDATE_ACTIONS_BY_TAB, TAB_OF_BUSINESS_EXCEPTION)
    }
}

impl TabPermissionResolver {
    pub fn from_tables(
        read: &[(&'static str, ActionRequirement)],
        update: &[(&'static str, ActionRequirement)],
        exceptions: &[(ErrorKind, &'static str)],
    ) -> Self {
        Self {
            read: read.iter().copied().collect(),
            update: update.iter().copied().collect(),
            exceptions: exceptions.iter().copied().collect(),
        }
    }

    pub fn read_requirement(&self, tab: &str) -> ActionRequirement {
        self.read.get(tab).copied().unwrap_or(ActionRequirement::Always)
    }

    pub fn update_requirement(&self, tab: &str) -> ActionRequirement {
        self.update.get(tab).copied().unwrap_or(ActionRequirement::Always)
    }

    pub fn can_read_tab(&self, admission: &Admission, tab: &str) -> bool {
        self.read_requirement(tab).is_met(admission)
    }

    /// A tab is only writable when it is also readable.
    pub fn can_update_tab(&self, admission: &Admission, tab: &str) -> bool {
        self.can_read_tab(admission, tab) && self.update_requirement(tab).is_met(admission)
    }

    pub fn can_make_action(&self, admission: &Admission, action: &str) -> bool {
        admission.links.allows(action)
    }

    /// Tab to blame for a business status code, or [`OTHER_TAB`].
    pub fn tab_for_exception(&self, status_code: &str) -> &'static str {
        ErrorKind::from_code(status_code)
            .and_then(|kind| self.exceptions.get(&kind).copied())
            .unwrap_or(OTHER_TAB)
    }

    /// Group verification errors by tab, in tree order.
    ///
    /// Errors whose tab is not part of `tree` or is not readable by the
    /// candidate land in the trailing [`OTHER_TAB`] group so that none is
    /// lost.
    pub fn group_errors_by_tab(
        &self,
        tree: &TabTree,
        admission: &Admission,
        errors: &[BusinessError],
    ) -> IndexMap<&'static str, Vec<BusinessError>> {
        let mut by_tab: HashMap<&'static str, Vec<BusinessError>> = HashMap::new();
        for error in errors {
            let tab = self.tab_for_exception(&error.status_code);
            let tab = if tab != OTHER_TAB && tree.contains(tab) && self.can_read_tab(admission, tab) {
                tab
            } else {
                OTHER_TAB
            };
            by_tab.entry(tab).or_default().push(error.clone());
        }

        let mut grouped = IndexMap::new();
        for tab in tree.flattened() {
            if let Some(errors) = by_tab.remove(tab.name) {
                grouped.insert(tab.name, errors);
            }
        }
        if let Some(errors) = by_tab.remove(OTHER_TAB) {
            grouped.insert(OTHER_TAB, errors);
        }
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::{Links, STATUS_DRAFT};
    use crate::context::AdmissionContext;
    use crate::tabs::Tab;

    fn admission(links: Links) -> Admission {
        Admission::new(uuid::Uuid::new_v4(), STATUS_DRAFT, links)
    }

    fn all_actions() -> Vec<&'static str> {
        let mut actions: Vec<_> = READ_ACTIONS_BY_TAB
            .iter()
            .chain(UPDATE_ACTIONS_BY_TAB)
            .flat_map(|(_, requirement)| requirement.actions().to_vec())
            .collect();
        actions.sort_unstable();
        actions.dedup();
        actions
    }

    #[test]
    fn single_action_tab() {
        let resolver = TabPermissionResolver::default();
        let allowed = admission(Links::new().allow("retrieve_person"));
        let refused = admission(Links::new().deny("retrieve_person", "Not yet"));
        let absent = admission(Links::new());

        assert!(resolver.can_read_tab(&allowed, tabs::TAB_PERSON));
        assert!(!resolver.can_read_tab(&refused, tabs::TAB_PERSON));
        assert!(!resolver.can_read_tab(&absent, tabs::TAB_PERSON));
    }

    #[test]
    fn empty_requirement_is_always_readable() {
        let resolver = TabPermissionResolver::default();
        assert!(resolver.can_read_tab(&admission(Links::new()), tabs::TAB_CONFIRM));
    }

    #[test]
    fn all_requirement_needs_every_action() {
        const BOTH: &[&str] = &["retrieve_a", "retrieve_b"];
        let resolver =
            TabPermissionResolver::from_tables(&[("t", ActionRequirement::All(BOTH))], &[], &[]);

        let one = admission(Links::new().allow("retrieve_a"));
        let both = admission(Links::new().allow("retrieve_a").allow("retrieve_b"));
        let one_refused = admission(Links::new().allow("retrieve_a").deny("retrieve_b", "no"));

        assert!(!resolver.can_read_tab(&one, "t"));
        assert!(resolver.can_read_tab(&both, "t"));
        assert!(!resolver.can_read_tab(&one_refused, "t"));
    }

    #[test]
    fn can_make_action_needs_url() {
        let resolver = TabPermissionResolver::default();
        let admission = admission(Links::new().allow("submit_proposition").deny("cancel", "Too late"));
        assert!(resolver.can_make_action(&admission, "submit_proposition"));
        assert!(!resolver.can_make_action(&admission, "cancel"));
        assert!(!resolver.can_make_action(&admission, "pay_after_submission"));
    }

    #[test]
    fn read_follows_links_for_every_tab_and_link_set() {
        let resolver = TabPermissionResolver::default();
        let actions = all_actions();
        for (tab, requirement) in READ_ACTIONS_BY_TAB {
            for (index, missing) in actions.iter().enumerate() {
                let links = actions
                    .iter()
                    .filter(|action| *action != missing)
                    .fold(Links::new(), |links, action| links.allow(action));
                let admission = admission(links);
                let expected = requirement.actions().iter().all(|action| action != missing);
                assert_eq!(
                    resolver.can_read_tab(&admission, tab),
                    expected,
                    "tab {tab} without {missing} (#{index})"
                );
            }
        }
    }

    #[test]
    fn update_implies_read_for_every_tab_and_link_set() {
        let resolver = TabPermissionResolver::default();
        let actions = all_actions();
        // Every action alone, every action missing, and all of them.
        let mut link_sets: Vec<Vec<&str>> = actions.iter().map(|action| vec![*action]).collect();
        link_sets.extend(
            actions
                .iter()
                .map(|missing| actions.iter().copied().filter(|a| a != missing).collect()),
        );
        link_sets.push(actions.clone());

        let mut granted = 0;
        for (tab, _) in UPDATE_ACTIONS_BY_TAB {
            for set in &link_sets {
                let admission = admission(set.iter().fold(Links::new(), |links, a| links.allow(a)));
                if resolver.can_update_tab(&admission, tab) {
                    granted += 1;
                    assert!(resolver.can_read_tab(&admission, tab), "tab {tab} writable but hidden with {set:?}");
                }
            }
        }
        assert!(granted > 0);
    }

    #[test]
    fn update_link_alone_does_not_open_a_hidden_tab() {
        let resolver = TabPermissionResolver::default();
        let admission = admission(Links::new().allow("update_person"));
        assert!(!resolver.can_read_tab(&admission, tabs::TAB_PERSON));
        assert!(!resolver.can_update_tab(&admission, tabs::TAB_PERSON));
    }

    #[test]
    fn every_writable_tab_has_an_update_action() {
        let resolver = TabPermissionResolver::default();
        for context in AdmissionContext::ALL {
            for tab in context.tab_tree().flattened() {
                assert_ne!(
                    resolver.update_requirement(tab.name),
                    ActionRequirement::Always,
                    "tab {} of {context} is writable without any action",
                    tab.name
                );
            }
        }
    }

    #[test]
    fn jury_is_writable_with_jury_preparation_update() {
        let resolver = TabPermissionResolver::default();
        let admission = admission(
            Links::new()
                .allow("retrieve_jury")
                .allow("update_jury_preparation"),
        );
        assert!(resolver.can_update_tab(&admission, tabs::TAB_JURY));
    }

    #[test]
    fn tab_for_exception_falls_back_to_other() {
        let resolver = TabPermissionResolver::default();
        assert_eq!(resolver.tab_for_exception("PROPOSITION-25"), tabs::TAB_PERSON);
        assert_eq!(resolver.tab_for_exception("JURY-4"), tabs::TAB_JURY);
        assert_eq!(resolver.tab_for_exception("PROPOSITION-35"), OTHER_TAB);
        assert_eq!(resolver.tab_for_exception("SOMETHING-1"), OTHER_TAB);
    }

    #[test]
    fn groups_errors_in_tree_order_with_other_last() {
        let resolver = TabPermissionResolver::default();
        let tree = AdmissionContext::Doctorate.tab_tree();
        let admission = admission(
            Links::new()
                .allow("retrieve_person")
                .allow("retrieve_languages"),
        );
        let errors = vec![
            BusinessError::new("PROPOSITION-28", "Languages missing"),
            BusinessError::new("UNKNOWN-1", "Unexpected"),
            BusinessError::new("PROPOSITION-25", "Identification incomplete"),
            BusinessError::new("PROPOSITION-31", "Accounting incomplete"),
        ];

        let grouped = resolver.group_errors_by_tab(tree, &admission, &errors);

        let keys: Vec<_> = grouped.keys().copied().collect();
        assert_eq!(keys, vec![tabs::TAB_PERSON, tabs::TAB_LANGUAGES, OTHER_TAB]);
        // Accounting is not readable, so it is reported with the unknown code.
        assert_eq!(grouped[OTHER_TAB].len(), 2);
    }

    #[test]
    fn tabs_outside_tree_are_grouped_as_other() {
        let resolver = TabPermissionResolver::default();
        const PERSONAL: &[Tab] = &[Tab::new(tabs::TAB_PERSON, "Identification", "user")];
        let tree = TabTree::from_table(&[(Tab::new("personal", "Personal", "user"), PERSONAL)]);
        let admission = admission(Links::new().allow("retrieve_languages"));
        let errors = [BusinessError::new("PROPOSITION-28", "Languages missing")];

        let grouped = resolver.group_errors_by_tab(&tree, &admission, &errors);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[OTHER_TAB], errors.to_vec());
    }
}
