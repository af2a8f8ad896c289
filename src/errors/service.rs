use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Caller-facing messages for internal failures; the underlying cause stays in the logs.
pub const RELATIONSHIPS_UNAVAILABLE: &str =
    "Unable to retrieve relationships at this time. Please try again!";
pub const ENTITIES_UNAVAILABLE: &str = "Unable to retrieve entities at this time. Please try again!";

/// Service-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Request input failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Requested record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Storage access failed; carries only a fixed caller-facing message
    #[error("Internal error: {0}")]
    Internal(&'static str),
}

impl ServiceError {
    pub fn relationships_unavailable() -> Self {
        ServiceError::Internal(RELATIONSHIPS_UNAVAILABLE)
    }

    pub fn entities_unavailable() -> Self {
        ServiceError::Internal(ENTITIES_UNAVAILABLE)
    }

    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::Validation(_) | ServiceError::NotFound(_))
    }

    /// Check if this is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "VALIDATION_FAILED",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message that is safe to hand back to a caller
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Validation(message) | ServiceError::NotFound(message) => {
                message.clone()
            }
            ServiceError::Internal(message) => message.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.error_code(),
            "message": self.public_message(),
        });

        (self.status_code(), Json(body)).into_response()
    }
}

/// A stored or supplied string that names no variant of a fixed enumeration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl From<UnknownVariant> for ServiceError {
    fn from(err: UnknownVariant) -> Self {
        ServiceError::Validation(err.to_string())
    }
}
