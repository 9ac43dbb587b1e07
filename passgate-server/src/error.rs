//! API error handling module
//!
//! Provides a unified error type for all API endpoints, mapping ceremony
//! failures to 400-class responses with a stable machine-readable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use passgate_core::{CeremonyError, StoreError};
use thiserror::Error;

/// API error type for all endpoints
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Ceremony-level failure surfaced by the core
    #[error(transparent)]
    Ceremony(#[from] CeremonyError),

    /// Store failure outside a ceremony (introspection endpoints)
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Ceremony(CeremonyError::Store(_)) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            // Every other ceremony failure is the client's doing.
            Self::Ceremony(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for programmatic error handling
    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::Ceremony(err) => match err {
                CeremonyError::Validation(_) => "INVALID_INPUT",
                CeremonyError::UnknownUser(_) => "UNKNOWN_USER",
                CeremonyError::NoCredentials(_) => "NO_CREDENTIALS",
                CeremonyError::NoPendingChallenge { .. } => "NO_PENDING_CHALLENGE",
                CeremonyError::CredentialNotFound { .. } => "CREDENTIAL_NOT_FOUND",
                CeremonyError::CounterRegression { .. } => "COUNTER_REGRESSION",
                CeremonyError::Verification(_) => "VERIFICATION_FAILED",
                CeremonyError::Store(_) => "INTERNAL_ERROR",
            },
            Self::Store(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let message = self.to_string();

        match &self {
            // A replayed or rewound counter points at credential cloning;
            // keep its log line distinct from ordinary rejections.
            Self::Ceremony(CeremonyError::CounterRegression {
                credential_id,
                stored,
                asserted,
            }) => {
                tracing::warn!(
                    status = %status,
                    code = code,
                    credential_id = %credential_id,
                    stored = stored,
                    asserted = asserted,
                    "counter regression rejected"
                );
            }
            Self::Ceremony(CeremonyError::Store(e)) | Self::Store(e) => {
                tracing::error!(status = %status, code = code, error = %e, "storage failure");
            }
            _ => {
                tracing::warn!(status = %status, code = code, error = %message, "request rejected");
            }
        }

        let body = serde_json::json!({
            "error": message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
