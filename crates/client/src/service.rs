use admission_core::admission::Admission;
use admission_core::context::AdmissionContext;
use admission_core::types::AdmissionId;
use async_trait::async_trait;
use serde_json::Value;

use crate::error::ServiceError;
use crate::identity::Identity;
use crate::resource::Resource;

/// Operations of the remote admission service used by the portal.
///
/// `admission` is `None` in create mode, before the candidate has an
/// admission: only person-level resources are reachable then.
#[async_trait]
pub trait AdmissionService: Send + Sync {
    /// Admissions of the candidate, all contexts together.
    async fn list_propositions(&self, identity: &Identity) -> Result<Value, ServiceError>;

    async fn get_proposition(
        &self,
        identity: &Identity,
        context: AdmissionContext,
        admission: AdmissionId,
    ) -> Result<Admission, ServiceError>;

    /// Create an admission from a training choice. Returns the new
    /// admission's `{uuid}`.
    async fn create_proposition(
        &self,
        identity: &Identity,
        context: AdmissionContext,
        payload: &Value,
    ) -> Result<Value, ServiceError>;

    async fn cancel_proposition(
        &self,
        identity: &Identity,
        context: AdmissionContext,
        admission: AdmissionId,
    ) -> Result<(), ServiceError>;

    async fn retrieve(
        &self,
        identity: &Identity,
        context: AdmissionContext,
        admission: Option<AdmissionId>,
        resource: &Resource,
    ) -> Result<Value, ServiceError>;

    /// Replace a resource (PUT).
    async fn update(
        &self,
        identity: &Identity,
        context: AdmissionContext,
        admission: Option<AdmissionId>,
        resource: &Resource,
        payload: &Value,
    ) -> Result<Value, ServiceError>;

    async fn post(
        &self,
        identity: &Identity,
        context: AdmissionContext,
        admission: AdmissionId,
        resource: &Resource,
        payload: &Value,
    ) -> Result<Value, ServiceError>;

    async fn delete(
        &self,
        identity: &Identity,
        context: AdmissionContext,
        admission: AdmissionId,
        resource: &Resource,
    ) -> Result<(), ServiceError>;

    /// Supervision of a doctorate as seen by an external member through
    /// their invitation token. Anonymous.
    async fn external_supervision(
        &self,
        admission: AdmissionId,
        token: &str,
    ) -> Result<Value, ServiceError>;

    /// Approve or reject a doctorate as an external member. Anonymous.
    async fn external_decision(
        &self,
        admission: AdmissionId,
        token: &str,
        approved: bool,
        payload: &Value,
    ) -> Result<Value, ServiceError>;
}
