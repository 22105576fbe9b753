//! Wizard tab trees.
//!
//! Each admission context has a two-level tree of tabs: a top-level tab
//! groups an ordered list of child tabs, and only child tabs carry a form
//! or a read view. The trees are declared as constant tables and frozen
//! into [`TabTree`] values on first use.

use std::sync::LazyLock;

use serde::Serialize;

/// One step of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tab {
    /// Stable key, used in URLs and in the action tables.
    pub name: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

impl Tab {
    pub const fn new(name: &'static str, label: &'static str, icon: &'static str) -> Self {
        Self { name, label, icon }
    }
}

/// A top-level tab and its ordered children.
#[derive(Debug, Clone, Serialize)]
pub struct TabGroup {
    pub parent: Tab,
    pub children: Vec<Tab>,
}

/// Immutable two-level tab tree of one admission context.
#[derive(Debug, Clone, Serialize)]
pub struct TabTree {
    groups: Vec<TabGroup>,
}

impl TabTree {
    pub fn new(groups: Vec<TabGroup>) -> Self {
        Self { groups }
    }

    /// Build a tree from a declarative table.
    pub fn from_table(table: &[(Tab, &[Tab])]) -> Self {
        Self::new(
            table
                .iter()
                .map(|(parent, children)| TabGroup {
                    parent: *parent,
                    children: children.to_vec(),
                })
                .collect(),
        )
    }

    pub fn groups(&self) -> &[TabGroup] {
        &self.groups
    }

    /// Child tabs in traversal order (parents in order, children in order).
    pub fn flattened(&self) -> impl Iterator<Item = &Tab> {
        self.groups.iter().flat_map(|group| group.children.iter())
    }

    pub fn get(&self, name: &str) -> Option<&Tab> {
        self.flattened().find(|tab| tab.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn parent_of(&self, name: &str) -> Option<&Tab> {
        self.groups
            .iter()
            .find(|group| group.children.iter().any(|tab| tab.name == name))
            .map(|group| &group.parent)
    }

    /// The tab immediately following `name` in traversal order.
    ///
    /// Returns `None` for the last tab and for unknown names.
    pub fn next_tab(&self, name: &str) -> Option<&Tab> {
        let mut tabs = self.flattened().skip_while(|tab| tab.name != name);
        tabs.next()?;
        tabs.next()
    }

    pub fn first_tab(&self) -> Option<&Tab> {
        self.flattened().next()
    }
}

// ---------------------------------------------------------------------------
// Tab names
// ---------------------------------------------------------------------------

pub const TAB_PERSON: &str = "person";
pub const TAB_COORDINATES: &str = "coordonnees";
pub const TAB_EDUCATION: &str = "education";
pub const TAB_CURRICULUM: &str = "curriculum";
pub const TAB_EXAM: &str = "exam";
pub const TAB_LANGUAGES: &str = "languages";
pub const TAB_PROJECT: &str = "project";
pub const TAB_COTUTELLE: &str = "cotutelle";
pub const TAB_SUPERVISION: &str = "supervision";
pub const TAB_ACCOUNTING: &str = "accounting";
pub const TAB_TRAINING_CHOICE: &str = "training-choice";
pub const TAB_SPECIFIC_QUESTIONS: &str = "specific-questions";
pub const TAB_CONFIRM: &str = "confirm";
pub const TAB_CONFIRMATION_PAPER: &str = "confirmation-paper";
pub const TAB_EXTENSION_REQUEST: &str = "extension-request";
pub const TAB_JURY_PREPARATION: &str = "jury-preparation";
pub const TAB_JURY: &str = "jury";
pub const TAB_DOCUMENTS: &str = "documents";

// ---------------------------------------------------------------------------
// Declarative tables
// ---------------------------------------------------------------------------

const PERSONAL: Tab = Tab::new("personal", "Personal data", "user");
const PERSON: Tab = Tab::new(TAB_PERSON, "Identification", "user");
const COORDINATES: Tab = Tab::new(TAB_COORDINATES, "Contact details", "home");
const EXPERIENCE: Tab = Tab::new("experience", "Previous experience", "list-alt");
const EDUCATION: Tab = Tab::new(TAB_EDUCATION, "Secondary studies", "graduation-cap");
const CURRICULUM: Tab = Tab::new(TAB_CURRICULUM, "Curriculum", "list-alt");
const EXAM: Tab = Tab::new(TAB_EXAM, "Exam", "file-signature");
const LANGUAGES: Tab = Tab::new(TAB_LANGUAGES, "Language knowledge", "language");
const DOCTORATE: Tab = Tab::new("doctorate", "Doctoral project", "graduation-cap");
const PROJECT: Tab = Tab::new(TAB_PROJECT, "Research project", "book-open");
const COTUTELLE: Tab = Tab::new(TAB_COTUTELLE, "Cotutelle", "link");
const SUPERVISION: Tab = Tab::new(TAB_SUPERVISION, "Supervision", "people-group");
const TRAINING: Tab = Tab::new("training-choice-group", "Course choice", "person-chalkboard");
const TRAINING_CHOICE: Tab = Tab::new(TAB_TRAINING_CHOICE, "Course choice", "person-chalkboard");
const ADDITIONAL: Tab = Tab::new("additional-information", "Additional information", "info-circle");
const SPECIFIC_QUESTIONS: Tab = Tab::new(TAB_SPECIFIC_QUESTIONS, "Specific aspects", "info-circle");
const ACCOUNTING: Tab = Tab::new(TAB_ACCOUNTING, "Accounting", "calculator");
const COMPLETION: Tab = Tab::new("completion", "Completion", "flag");
const CONFIRM: Tab = Tab::new(TAB_CONFIRM, "Confirmation", "check");
const CONFIRMATION: Tab = Tab::new("confirmation-group", "Confirmation exam", "award");
const CONFIRMATION_PAPER: Tab = Tab::new(TAB_CONFIRMATION_PAPER, "Confirmation paper", "award");
const EXTENSION_REQUEST: Tab = Tab::new(TAB_EXTENSION_REQUEST, "New deadline", "calendar-plus");
const DEFENSE: Tab = Tab::new("defense", "Defense", "person-chalkboard");
const JURY_PREPARATION: Tab = Tab::new(TAB_JURY_PREPARATION, "Defense method", "info-circle");
const JURY: Tab = Tab::new(TAB_JURY, "Jury composition", "people-line");
const DOCUMENT_REQUESTS: Tab = Tab::new("document-requests", "Documents", "folder-open");
const DOCUMENTS: Tab = Tab::new(TAB_DOCUMENTS, "Requested documents", "folder-open");

const DOCTORATE_TABLE: &[(Tab, &[Tab])] = &[
    (PERSONAL, &[PERSON, COORDINATES]),
    (EXPERIENCE, &[EDUCATION, CURRICULUM, LANGUAGES]),
    (DOCTORATE, &[PROJECT, COTUTELLE, SUPERVISION]),
    (ADDITIONAL, &[ACCOUNTING]),
    (COMPLETION, &[CONFIRM]),
    (CONFIRMATION, &[CONFIRMATION_PAPER, EXTENSION_REQUEST]),
    (DEFENSE, &[JURY_PREPARATION, JURY]),
    (DOCUMENT_REQUESTS, &[DOCUMENTS]),
];

const GENERAL_EDUCATION_TABLE: &[(Tab, &[Tab])] = &[
    (PERSONAL, &[PERSON, COORDINATES]),
    (EXPERIENCE, &[EDUCATION, CURRICULUM, EXAM]),
    (TRAINING, &[TRAINING_CHOICE]),
    (ADDITIONAL, &[SPECIFIC_QUESTIONS, ACCOUNTING]),
    (COMPLETION, &[CONFIRM]),
    (DOCUMENT_REQUESTS, &[DOCUMENTS]),
];

const CONTINUING_EDUCATION_TABLE: &[(Tab, &[Tab])] = &[
    (PERSONAL, &[PERSON, COORDINATES]),
    (EXPERIENCE, &[EDUCATION, CURRICULUM]),
    (TRAINING, &[TRAINING_CHOICE]),
    (ADDITIONAL, &[SPECIFIC_QUESTIONS]),
    (COMPLETION, &[CONFIRM]),
];

pub static DOCTORATE_TABS: LazyLock<TabTree> =
    LazyLock::new(|| TabTree::from_table(DOCTORATE_TABLE));

pub static GENERAL_EDUCATION_TABS: LazyLock<TabTree> =
    LazyLock::new(|| TabTree::from_table(GENERAL_EDUCATION_TABLE));

pub static CONTINUING_EDUCATION_TABS: LazyLock<TabTree> =
    LazyLock::new(|| TabTree::from_table(CONTINUING_EDUCATION_TABLE));
