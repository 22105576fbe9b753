use admission_client::ServiceError;
use admission_core::error::CoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Form rejections are not errors: the wizard renders them as 422 pages.
/// `AppError` covers what cannot be recovered in place, such as a tab the
/// candidate may not open or an unreachable admission service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `admission_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failed call to the remote admission service.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::UnknownTab { .. } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", core.to_string())
                }
                CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            },

            // --- Admission service errors ---
            AppError::Service(err) => classify_service_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a remote service error into an HTTP status, error code, and message.
///
/// - Permission refusals map to 403 and missing resources to 404.
/// - Business errors outside a form submission map to 400.
/// - Transport and protocol failures map to 502.
fn classify_service_error(err: &ServiceError) -> (StatusCode, &'static str, String) {
    match err {
        ServiceError::PermissionDenied(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
        ServiceError::Business(_) => (StatusCode::BAD_REQUEST, "BUSINESS_ERROR", err.to_string()),
        ServiceError::Api { .. } | ServiceError::Request(_) | ServiceError::Decode(_) => {
            tracing::error!(error = %err, "Admission service failure");
            (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "The admission service is unavailable".to_string(),
            )
        }
    }
}
