//! HTTP implementation of [`AdmissionService`] using [`reqwest`].

use std::time::Duration;

use admission_core::admission::Admission;
use admission_core::business::BusinessError;
use admission_core::context::AdmissionContext;
use admission_core::types::AdmissionId;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::error::ServiceError;
use crate::identity::Identity;
use crate::resource::Resource;
use crate::service::AdmissionService;

/// DRF key for errors not bound to a field.
const NON_FIELD_ERRORS: &str = "non_field_errors";

/// HTTP client for the remote admission service.
pub struct AdmissionApi {
    client: reqwest::Client,
    base_url: String,
}

impl AdmissionApi {
    /// * `base_url` - e.g. `http://host:8000/api/v1/admission`.
    /// * `timeout` - applied to every call; there is no retry.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// URL of a resource, person-level when there is no admission yet.
    pub fn resource_url(
        &self,
        context: AdmissionContext,
        admission: Option<AdmissionId>,
        resource: &Resource,
    ) -> Result<String, ServiceError> {
        match admission {
            Some(uuid) => Ok(format!("{}/{context}/{uuid}/{}", self.base_url, resource.path())),
            None if resource.is_person_level() => {
                Ok(format!("{}/person/{}", self.base_url, resource.path()))
            }
            None => Err(ServiceError::NotFound(format!(
                "'{}' requires an existing admission",
                resource.path()
            ))),
        }
    }

    fn admission_url(&self, context: AdmissionContext, admission: AdmissionId) -> String {
        format!("{}/{context}/{admission}", self.base_url)
    }

    /// URL of the invitation an external member received by email.
    pub fn external_url(&self, admission: AdmissionId, token: &str) -> String {
        format!(
            "{}/{}/{admission}/external/{token}",
            self.base_url,
            AdmissionContext::Doctorate
        )
    }

    async fn send(
        &self,
        identity: Option<&Identity>,
        method: Method,
        url: String,
        payload: Option<&Value>,
    ) -> Result<Value, ServiceError> {
        tracing::debug!(%method, %url, "Calling admission service");
        let mut request = self.client.request(method, &url);
        for (name, value) in identity.into_iter().flat_map(Identity::headers) {
            request = request.header(name, value);
        }
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(%url, error = %e, "Admission service unreachable");
            ServiceError::Request(e)
        })?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        classify_response(status, &body)
    }
}

// ---- response classification ----

/// Map a raw answer of the remote service to a value or a [`ServiceError`].
pub fn classify_response(status: u16, body: &str) -> Result<Value, ServiceError> {
    match status {
        204 => Ok(Value::Null),
        200..=299 if body.trim().is_empty() => Ok(Value::Null),
        200..=299 => serde_json::from_str(body).map_err(|e| ServiceError::Decode(e.to_string())),
        400 => {
            let errors = serde_json::from_str::<Value>(body)
                .map(|value| business_errors(&value))
                .unwrap_or_default();
            if errors.is_empty() {
                Err(ServiceError::Api {
                    status,
                    body: body.to_string(),
                })
            } else {
                Err(ServiceError::Business(errors))
            }
        }
        403 => Err(ServiceError::PermissionDenied(detail_of(body))),
        404 => Err(ServiceError::NotFound(detail_of(body))),
        _ => Err(ServiceError::Api {
            status,
            body: body.to_string(),
        }),
    }
}

fn detail_of(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("detail").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// Business errors of a DRF-style 400 body.
///
/// Accepts a single `{status_code, detail}` object or a map of field name
/// (or `non_field_errors`) to a list of such objects or plain messages.
fn business_errors(body: &Value) -> Vec<BusinessError> {
    if let Some(error) = business_error(body, None) {
        return vec![error];
    }
    let Some(fields) = body.as_object() else {
        return Vec::new();
    };
    let mut errors = Vec::new();
    for (key, entries) in fields {
        let field = (key != NON_FIELD_ERRORS).then_some(key.as_str());
        let entries = match entries {
            Value::Array(items) => items.iter().collect(),
            single => vec![single],
        };
        for entry in entries {
            if let Some(error) = business_error(entry, field) {
                errors.push(error);
            } else if let Some(message) = entry.as_str() {
                errors.push(BusinessError {
                    status_code: String::new(),
                    detail: message.to_string(),
                    field: field.map(str::to_string),
                    activity: None,
                });
            }
        }
    }
    errors
}

fn business_error(value: &Value, field: Option<&str>) -> Option<BusinessError> {
    let status_code = value.get("status_code")?.as_str()?;
    let detail = value.get("detail").and_then(Value::as_str).unwrap_or_default();
    let activity = value.get("activite_id").and_then(Value::as_str);
    Some(BusinessError {
        status_code: status_code.to_string(),
        detail: detail.to_string(),
        field: field.map(str::to_string),
        activity: activity.map(str::to_string),
    })
}

#[async_trait]
impl AdmissionService for AdmissionApi {
    async fn list_propositions(&self, identity: &Identity) -> Result<Value, ServiceError> {
        let url = format!("{}/propositions", self.base_url);
        self.send(Some(identity), Method::GET, url, None).await
    }

    async fn get_proposition(
        &self,
        identity: &Identity,
        context: AdmissionContext,
        admission: AdmissionId,
    ) -> Result<Admission, ServiceError> {
        let url = self.admission_url(context, admission);
        let value = self.send(Some(identity), Method::GET, url, None).await?;
        serde_json::from_value(value).map_err(|e| ServiceError::Decode(e.to_string()))
    }

    async fn create_proposition(
        &self,
        identity: &Identity,
        context: AdmissionContext,
        payload: &Value,
    ) -> Result<Value, ServiceError> {
        let url = format!("{}/{context}", self.base_url);
        self.send(Some(identity), Method::POST, url, Some(payload)).await
    }

    async fn cancel_proposition(
        &self,
        identity: &Identity,
        context: AdmissionContext,
        admission: AdmissionId,
    ) -> Result<(), ServiceError> {
        let url = self.admission_url(context, admission);
        self.send(Some(identity), Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn retrieve(
        &self,
        identity: &Identity,
        context: AdmissionContext,
        admission: Option<AdmissionId>,
        resource: &Resource,
    ) -> Result<Value, ServiceError> {
        let url = self.resource_url(context, admission, resource)?;
        self.send(Some(identity), Method::GET, url, None).await
    }

    async fn update(
        &self,
        identity: &Identity,
        context: AdmissionContext,
        admission: Option<AdmissionId>,
        resource: &Resource,
        payload: &Value,
    ) -> Result<Value, ServiceError> {
        let url = self.resource_url(context, admission, resource)?;
        self.send(Some(identity), Method::PUT, url, Some(payload)).await
    }

    async fn post(
        &self,
        identity: &Identity,
        context: AdmissionContext,
        admission: AdmissionId,
        resource: &Resource,
        payload: &Value,
    ) -> Result<Value, ServiceError> {
        let url = self.resource_url(context, Some(admission), resource)?;
        self.send(Some(identity), Method::POST, url, Some(payload)).await
    }

    async fn delete(
        &self,
        identity: &Identity,
        context: AdmissionContext,
        admission: AdmissionId,
        resource: &Resource,
    ) -> Result<(), ServiceError> {
        let url = self.resource_url(context, Some(admission), resource)?;
        self.send(Some(identity), Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn external_supervision(
        &self,
        admission: AdmissionId,
        token: &str,
    ) -> Result<Value, ServiceError> {
        let url = self.external_url(admission, token);
        self.send(None, Method::GET, url, None).await
    }

    async fn external_decision(
        &self,
        admission: AdmissionId,
        token: &str,
        approved: bool,
        payload: &Value,
    ) -> Result<Value, ServiceError> {
        let verb = if approved { "approve" } else { "reject" };
        let url = format!("{}/{verb}", self.external_url(admission, token));
        self.send(None, Method::POST, url, Some(payload)).await
    }
}
