#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown tab '{tab}' for context {context}")]
    UnknownTab { context: &'static str, tab: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}
