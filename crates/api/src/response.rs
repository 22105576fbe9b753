//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope.

use admission_core::forms::FormErrors;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// JSON rendering of a wizard form: its values, and its errors once
/// submitted.
#[derive(Debug, Serialize)]
pub struct FormPage {
    pub tab: &'static str,
    pub values: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FormErrors>,
    /// Whatever else the page shows (dynamic questions, lists, deadlines).
    #[serde(skip_serializing_if = "Value::is_null")]
    pub context: Value,
}

impl FormPage {
    pub fn new(tab: &'static str, values: Value, context: Value) -> Self {
        Self {
            tab,
            values,
            errors: None,
            context,
        }
    }

    pub fn with_errors(mut self, errors: FormErrors) -> Self {
        self.errors = Some(errors);
        self
    }
}

impl IntoResponse for FormPage {
    /// 422 when the page carries errors, 200 otherwise.
    fn into_response(self) -> Response {
        let status = if self.errors.is_some() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::OK
        };
        (status, Json(DataResponse { data: self })).into_response()
    }
}
