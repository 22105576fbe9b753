use admission_core::business::BusinessError;

/// Failures of a call to the remote admission service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The service rejected the call with one or more business errors.
    #[error("Rejected by the admission service: {}", summary(.0))]
    Business(Vec<BusinessError>),

    /// The action is not allowed for this candidate.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-2xx answer.
    #[error("Admission service error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

fn summary(errors: &[BusinessError]) -> String {
    errors
        .iter()
        .map(|error| format!("[{}] {}", error.status_code, error.detail))
        .collect::<Vec<_>>()
        .join("; ")
}
