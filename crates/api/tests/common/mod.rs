//! Shared helpers of the integration tests: a scripted admission service
//! and the request/response plumbing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use admission_api::auth::jwt::{generate_access_token, JwtConfig};
use admission_api::config::ServerConfig;
use admission_api::router::build_app_router;
use admission_api::state::AppState;
use admission_client::{AdmissionService, Identity, Resource, ServiceError};
use admission_core::admission::{Admission, Links, STATUS_DRAFT};
use admission_core::business::BusinessError;
use admission_core::context::AdmissionContext;
use admission_core::permissions::{READ_ACTIONS_BY_TAB, UPDATE_ACTIONS_BY_TAB};
use admission_core::types::AdmissionId;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        admission_api_url: "http://admission.test".to_string(),
        admission_api_timeout_secs: 5,
        default_language: "en".to_string(),
        session_ttl_secs: 900,
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

pub fn candidate() -> Identity {
    Identity {
        global_id: "00345678".to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        email: "jane.doe@example.com".to_string(),
        language: "en".to_string(),
    }
}

/// Bearer token of [`candidate`].
pub fn token() -> String {
    generate_access_token(&candidate(), &test_config().jwt).unwrap()
}

/// Links granting every read and update action of the wizard.
pub fn all_links() -> Links {
    READ_ACTIONS_BY_TAB
        .iter()
        .chain(UPDATE_ACTIONS_BY_TAB)
        .flat_map(|(_, requirement)| requirement.actions().to_vec())
        .fold(Links::new(), |links, action| links.allow(action))
}

pub fn draft(uuid: AdmissionId, links: Links) -> Admission {
    Admission::new(uuid, STATUS_DRAFT, links)
}

// ---------------------------------------------------------------------------
// Scripted admission service
// ---------------------------------------------------------------------------

/// One call received by the fake service.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub payload: Value,
}

/// Failure scripted for a resource path.
#[derive(Debug, Clone)]
pub enum Failure {
    Business(Vec<BusinessError>),
    PermissionDenied(String),
    Api(u16, String),
}

impl Failure {
    fn to_error(&self) -> ServiceError {
        match self {
            Self::Business(errors) => ServiceError::Business(errors.clone()),
            Self::PermissionDenied(message) => ServiceError::PermissionDenied(message.clone()),
            Self::Api(status, body) => ServiceError::Api {
                status: *status,
                body: body.clone(),
            },
        }
    }
}

/// In-memory stand-in for the remote admission service.
///
/// Resources are keyed by their path (`Resource::path`). Writes are
/// recorded and answered with the scripted response, `{}` by default.
#[derive(Default)]
pub struct FakeAdmissionService {
    admissions: Mutex<HashMap<AdmissionId, Admission>>,
    resources: Mutex<HashMap<String, Value>>,
    responses: Mutex<HashMap<String, Value>>,
    failures: Mutex<HashMap<String, Failure>>,
    calls: Mutex<Vec<Call>>,
    created: Mutex<Option<AdmissionId>>,
}

impl FakeAdmissionService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_admission(&self, admission: Admission) -> &Self {
        self.admissions.lock().unwrap().insert(admission.uuid, admission);
        self
    }

    pub fn with_resource(&self, resource: Resource, value: Value) -> &Self {
        self.resources.lock().unwrap().insert(resource.path(), value);
        self
    }

    /// Answer of writes to `resource`.
    pub fn with_response(&self, resource: Resource, value: Value) -> &Self {
        self.responses.lock().unwrap().insert(resource.path(), value);
        self
    }

    pub fn failing(&self, resource: Resource, failure: Failure) -> &Self {
        self.failures.lock().unwrap().insert(resource.path(), failure);
        self
    }

    /// Uuid returned by the next creation.
    pub fn creating(&self, uuid: AdmissionId) -> &Self {
        *self.created.lock().unwrap() = Some(uuid);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Writes only, reads left out.
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.method != "GET")
            .collect()
    }

    fn record(&self, method: &'static str, path: String, payload: Value) {
        self.calls.lock().unwrap().push(Call {
            method,
            path,
            payload,
        });
    }

    fn check(&self, path: &str) -> Result<(), ServiceError> {
        match self.failures.lock().unwrap().get(path) {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }

    /// Supervision an external member sees through `token`.
    pub fn with_external(&self, token: &str, value: Value) -> &Self {
        self.resources.lock().unwrap().insert(external_path(token), value);
        self
    }

    pub fn failing_external(&self, token: &str, failure: Failure) -> &Self {
        self.failures.lock().unwrap().insert(external_path(token), failure);
        self
    }

    fn write(&self, method: &'static str, resource: &Resource, payload: &Value) -> Result<Value, ServiceError> {
        self.write_path(method, resource.path(), payload)
    }

    fn write_path(&self, method: &'static str, path: String, payload: &Value) -> Result<Value, ServiceError> {
        self.record(method, path.clone(), payload.clone());
        self.check(&path)?;
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(&path)
            .cloned()
            .unwrap_or_else(|| json!({})))
    }
}

#[async_trait]
impl AdmissionService for FakeAdmissionService {
    async fn list_propositions(&self, _identity: &Identity) -> Result<Value, ServiceError> {
        let admissions: Vec<Value> = self
            .admissions
            .lock()
            .unwrap()
            .values()
            .map(|admission| json!({ "uuid": admission.uuid, "status": admission.status }))
            .collect();
        Ok(json!(admissions))
    }

    async fn get_proposition(
        &self,
        _identity: &Identity,
        _context: AdmissionContext,
        admission: AdmissionId,
    ) -> Result<Admission, ServiceError> {
        self.admissions
            .lock()
            .unwrap()
            .get(&admission)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("Admission {admission}")))
    }

    async fn create_proposition(
        &self,
        _identity: &Identity,
        context: AdmissionContext,
        payload: &Value,
    ) -> Result<Value, ServiceError> {
        self.record("POST", context.slug().to_string(), payload.clone());
        let uuid = self.created.lock().unwrap().unwrap_or_else(Uuid::new_v4);
        Ok(json!({ "uuid": uuid }))
    }

    async fn cancel_proposition(
        &self,
        _identity: &Identity,
        _context: AdmissionContext,
        admission: AdmissionId,
    ) -> Result<(), ServiceError> {
        self.record("DELETE", admission.to_string(), Value::Null);
        Ok(())
    }

    async fn retrieve(
        &self,
        _identity: &Identity,
        _context: AdmissionContext,
        _admission: Option<AdmissionId>,
        resource: &Resource,
    ) -> Result<Value, ServiceError> {
        let path = resource.path();
        self.record("GET", path.clone(), Value::Null);
        Ok(self
            .resources
            .lock()
            .unwrap()
            .get(&path)
            .cloned()
            .unwrap_or_else(|| json!({})))
    }

    async fn update(
        &self,
        _identity: &Identity,
        _context: AdmissionContext,
        _admission: Option<AdmissionId>,
        resource: &Resource,
        payload: &Value,
    ) -> Result<Value, ServiceError> {
        self.write("PUT", resource, payload)
    }

    async fn post(
        &self,
        _identity: &Identity,
        _context: AdmissionContext,
        _admission: AdmissionId,
        resource: &Resource,
        payload: &Value,
    ) -> Result<Value, ServiceError> {
        self.write("POST", resource, payload)
    }

    async fn delete(
        &self,
        _identity: &Identity,
        _context: AdmissionContext,
        _admission: AdmissionId,
        resource: &Resource,
    ) -> Result<(), ServiceError> {
        self.write("DELETE", resource, &Value::Null).map(|_| ())
    }

    async fn external_supervision(
        &self,
        _admission: AdmissionId,
        token: &str,
    ) -> Result<Value, ServiceError> {
        let path = external_path(token);
        self.record("GET", path.clone(), Value::Null);
        self.check(&path)?;
        self.resources
            .lock()
            .unwrap()
            .get(&path)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("Invitation {token}")))
    }

    async fn external_decision(
        &self,
        _admission: AdmissionId,
        token: &str,
        approved: bool,
        payload: &Value,
    ) -> Result<Value, ServiceError> {
        self.check(&external_path(token))?;
        let verb = if approved { "approve" } else { "reject" };
        self.write_path("POST", format!("{}/{verb}", external_path(token)), payload)
    }
}

/// Key of the supervision seen through an invitation token.
pub fn external_path(token: &str) -> String {
    format!("external/{token}")
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Build the full application router, with the production middleware
/// stack, on top of `service`.
pub fn build_test_app(service: Arc<FakeAdmissionService>) -> Router {
    let config = test_config();
    let state = AppState::new(config.clone(), service);
    build_app_router(state, &config)
}

/// Same application as [`build_test_app`], keeping the state to share the
/// session store between requests.
pub fn build_test_app_with_state(service: Arc<FakeAdmissionService>) -> (Router, AppState) {
    let config = test_config();
    let state = AppState::new(config.clone(), service);
    (build_app_router(state.clone(), &config), state)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}
