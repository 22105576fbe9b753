//! Doctorate-only steps: research project, supervision, confirmation paper
//! and jury.

use admission_client::{Resource, ServiceError};
use admission_core::business::ErrorKind;
use admission_core::forms::confirmation_paper::{self, ConfirmationPaperForm, ExtensionRequestForm};
use admission_core::forms::cotutelle::{self, CotutelleForm};
use admission_core::forms::jury::{self, JuryMemberForm, JuryPreparationForm};
use admission_core::forms::project::{self, ProjectForm};
use admission_core::forms::supervision::{self, SupervisionMemberForm};
use admission_core::forms::{bind_form, CleanForm, FormErrors};
use admission_core::tabs::{
    TAB_CONFIRMATION_PAPER, TAB_COTUTELLE, TAB_EXTENSION_REQUEST, TAB_JURY, TAB_JURY_PREPARATION,
    TAB_PROJECT, TAB_SUPERVISION,
};
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{TabData, TabForm, Wizard};

fn bind<F: CleanForm>(submitted: &Value) -> Result<Value, FormErrors> {
    bind_form::<F>(submitted).map(CleanForm::into_payload)
}

/// A missing resource is a normal state for resources created later on.
async fn retrieve_optional(wizard: &Wizard<'_>, resource: Resource) -> Result<Option<Value>, ServiceError> {
    match wizard.retrieve(resource).await {
        Ok(Value::Null) | Err(ServiceError::NotFound(_)) => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(e),
    }
}

/// Stay on the read view of `tab` after a successful change.
fn back_to(wizard: &Wizard<'_>, tab: &str) -> Option<String> {
    wizard.uuid().map(|uuid| wizard.context.tab_url(uuid, tab))
}

pub struct ProjectTab;

#[async_trait]
impl TabForm for ProjectTab {
    fn tab(&self) -> &'static str {
        TAB_PROJECT
    }

    fn business_errors(&self) -> &'static [(ErrorKind, &'static str)] {
        project::BUSINESS_ERRORS
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError> {
        let project = wizard.retrieve(Resource::Project).await?;
        Ok(TabData::new(project::initial(&project)))
    }

    fn bind(&self, _: &Wizard<'_>, _: &TabData, submitted: &Value) -> Result<Value, FormErrors> {
        bind::<ProjectForm>(submitted)
    }

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError> {
        wizard.update(Resource::Project, payload).await
    }
}

pub struct CotutelleTab;

#[async_trait]
impl TabForm for CotutelleTab {
    fn tab(&self) -> &'static str {
        TAB_COTUTELLE
    }

    fn business_errors(&self) -> &'static [(ErrorKind, &'static str)] {
        cotutelle::BUSINESS_ERRORS
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError> {
        let cotutelle = wizard.retrieve(Resource::Cotutelle).await?;
        Ok(TabData::new(cotutelle::initial(&cotutelle)))
    }

    fn bind(&self, _: &Wizard<'_>, _: &TabData, submitted: &Value) -> Result<Value, FormErrors> {
        bind::<CotutelleForm>(submitted)
    }

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError> {
        wizard.update(Resource::Cotutelle, payload).await
    }
}

/// Adds a member to the supervision group. Removal and signature requests
/// have their own endpoints.
pub struct SupervisionTab;

#[async_trait]
impl TabForm for SupervisionTab {
    fn tab(&self) -> &'static str {
        TAB_SUPERVISION
    }

    fn business_errors(&self) -> &'static [(ErrorKind, &'static str)] {
        supervision::BUSINESS_ERRORS
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError> {
        let group = wizard.retrieve(Resource::Supervision).await?;
        Ok(TabData {
            initial: json!({}),
            context: json!({ "supervision": group }),
        })
    }

    fn bind(&self, _: &Wizard<'_>, _: &TabData, submitted: &Value) -> Result<Value, FormErrors> {
        bind::<SupervisionMemberForm>(submitted)
    }

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError> {
        wizard.update(Resource::Supervision, payload).await
    }

    async fn after_success(&self, wizard: &Wizard<'_>, _: &Value) -> Option<String> {
        back_to(wizard, TAB_SUPERVISION)
    }
}

pub struct ConfirmationPaperTab;

#[async_trait]
impl TabForm for ConfirmationPaperTab {
    fn tab(&self) -> &'static str {
        TAB_CONFIRMATION_PAPER
    }

    fn business_errors(&self) -> &'static [(ErrorKind, &'static str)] {
        confirmation_paper::BUSINESS_ERRORS
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError> {
        let paper = retrieve_optional(wizard, Resource::LastConfirmationPaper).await?;
        Ok(TabData {
            initial: confirmation_paper::initial(paper.as_ref()),
            context: json!({ "confirmation_paper": paper }),
        })
    }

    fn bind(&self, _: &Wizard<'_>, _: &TabData, submitted: &Value) -> Result<Value, FormErrors> {
        bind::<ConfirmationPaperForm>(submitted)
    }

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError> {
        wizard.update(Resource::LastConfirmationPaper, payload).await
    }
}

pub struct ExtensionRequestTab;

#[async_trait]
impl TabForm for ExtensionRequestTab {
    fn tab(&self) -> &'static str {
        TAB_EXTENSION_REQUEST
    }

    fn business_errors(&self) -> &'static [(ErrorKind, &'static str)] {
        confirmation_paper::EXTENSION_BUSINESS_ERRORS
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError> {
        let paper = retrieve_optional(wizard, Resource::LastConfirmationPaper).await?;
        Ok(TabData {
            initial: confirmation_paper::extension_initial(paper.as_ref()),
            context: json!({ "confirmation_paper": paper }),
        })
    }

    fn bind(&self, _: &Wizard<'_>, _: &TabData, submitted: &Value) -> Result<Value, FormErrors> {
        bind::<ExtensionRequestForm>(submitted)
    }

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError> {
        wizard.update(Resource::ExtensionRequest, payload).await
    }
}

pub struct JuryPreparationTab;

#[async_trait]
impl TabForm for JuryPreparationTab {
    fn tab(&self) -> &'static str {
        TAB_JURY_PREPARATION
    }

    fn business_errors(&self) -> &'static [(ErrorKind, &'static str)] {
        jury::PREPARATION_BUSINESS_ERRORS
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError> {
        let preparation = wizard.retrieve(Resource::JuryPreparation).await?;
        Ok(TabData::new(jury::preparation_initial(&preparation)))
    }

    fn bind(&self, _: &Wizard<'_>, _: &TabData, submitted: &Value) -> Result<Value, FormErrors> {
        bind::<JuryPreparationForm>(submitted)
    }

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError> {
        wizard.update(Resource::JuryPreparation, payload).await
    }
}

/// Adds a jury member. Member edition, removal and role changes have their
/// own endpoints.
pub struct JuryTab;

#[async_trait]
impl TabForm for JuryTab {
    fn tab(&self) -> &'static str {
        TAB_JURY
    }

    fn business_errors(&self) -> &'static [(ErrorKind, &'static str)] {
        jury::MEMBER_BUSINESS_ERRORS
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError> {
        let members = wizard.retrieve(Resource::JuryMembers).await?;
        Ok(TabData {
            initial: json!({}),
            context: json!({ "members": members }),
        })
    }

    fn bind(&self, _: &Wizard<'_>, _: &TabData, submitted: &Value) -> Result<Value, FormErrors> {
        bind::<JuryMemberForm>(submitted)
    }

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError> {
        wizard.post(Resource::JuryMembers, payload).await
    }

    async fn after_success(&self, wizard: &Wizard<'_>, _: &Value) -> Option<String> {
        back_to(wizard, TAB_JURY)
    }
}
