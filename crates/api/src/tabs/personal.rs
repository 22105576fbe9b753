//! Person and coordinates: resources of the candidate, shared by every
//! admission.

use admission_client::{Resource, ServiceError};
use admission_core::business::ErrorKind;
use admission_core::forms::coordinates::CoordinatesForms;
use admission_core::forms::person::{self, PersonForm};
use admission_core::forms::{bind_form, CleanForm, FormErrors};
use admission_core::tabs::{TAB_COORDINATES, TAB_PERSON};
use async_trait::async_trait;
use serde_json::Value;

use super::{TabData, TabForm, Wizard};

pub struct PersonTab;

#[async_trait]
impl TabForm for PersonTab {
    fn tab(&self) -> &'static str {
        TAB_PERSON
    }

    fn business_errors(&self) -> &'static [(ErrorKind, &'static str)] {
        person::BUSINESS_ERRORS
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError> {
        let person = wizard.retrieve(Resource::Person).await?;
        Ok(TabData::new(person::initial(&person)))
    }

    fn bind(&self, _: &Wizard<'_>, _: &TabData, submitted: &Value) -> Result<Value, FormErrors> {
        bind_form::<PersonForm>(submitted).map(CleanForm::into_payload)
    }

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError> {
        wizard.update(Resource::Person, payload).await
    }
}

pub struct CoordinatesTab;

#[async_trait]
impl TabForm for CoordinatesTab {
    fn tab(&self) -> &'static str {
        TAB_COORDINATES
    }

    async fn load(&self, wizard: &Wizard<'_>) -> Result<TabData, ServiceError> {
        let coordinates = wizard.retrieve(Resource::Coordinates).await?;
        Ok(TabData::new(CoordinatesForms::initial(&coordinates)))
    }

    fn bind(&self, _: &Wizard<'_>, _: &TabData, submitted: &Value) -> Result<Value, FormErrors> {
        CoordinatesForms::bind(submitted).map(CoordinatesForms::into_payload)
    }

    async fn invoke(&self, wizard: &Wizard<'_>, payload: &Value) -> Result<Value, ServiceError> {
        wizard.update(Resource::Coordinates, payload).await
    }
}
