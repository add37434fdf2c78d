//! API error type and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use promptly_error::{BillingError, BillingErrorKind, DatabaseError, GenerateError, TransportError};
use serde_json::json;
use tracing::error;

/// Errors surfaced to API clients.
///
/// Machine-readable codes ride in the `error` field of the JSON body; the
/// quota and plan gates use fixed codes (`limit_reached`, `upgrade_required`)
/// that clients branch on.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Missing or unknown bearer token.
    Unauthorized,
    /// The request payload failed validation.
    Validation(String),
    /// The referenced resource does not exist or is not owned by the caller.
    NotFound(String),
    /// The daily generation cap is exhausted.
    LimitReached,
    /// A live send requires the pro plan.
    UpgradeRequired,
    /// Webhook signature verification failed.
    InvalidSignature,
    /// The mail transport refused or failed the send.
    Transport(String),
    /// An upstream service (generator, billing API) failed.
    Upstream(String),
    /// Anything else; details are logged, not leaked.
    Internal(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, String) {
        match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            ApiError::LimitReached => (StatusCode::TOO_MANY_REQUESTS, "limit_reached".to_string()),
            ApiError::UpgradeRequired => {
                (StatusCode::PAYMENT_REQUIRED, "upgrade_required".to_string())
            }
            ApiError::InvalidSignature => {
                (StatusCode::BAD_REQUEST, "invalid_signature".to_string())
            }
            ApiError::Transport(message) => (StatusCode::BAD_GATEWAY, message.clone()),
            ApiError::Upstream(message) => (StatusCode::BAD_GATEWAY, message.clone()),
            ApiError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error".to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (status, code) = self.status_and_code();
        write!(f, "{status}: {code}")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            error!(detail = %detail, "Internal error");
        }
        let (status, code) = self.status_and_code();
        (status, Json(json!({ "error": code }))).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(error: DatabaseError) -> Self {
        if error.is_not_found() {
            ApiError::NotFound("Not found".to_string())
        } else {
            ApiError::Internal(error.to_string())
        }
    }
}

impl From<GenerateError> for ApiError {
    fn from(error: GenerateError) -> Self {
        error!(error = %error, "Copy generation failed");
        ApiError::Upstream("generation_failed".to_string())
    }
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        ApiError::Transport(error.kind().to_string())
    }
}

impl From<BillingError> for ApiError {
    fn from(error: BillingError) -> Self {
        match error.kind() {
            BillingErrorKind::MissingSignature
            | BillingErrorKind::InvalidSignature
            | BillingErrorKind::StaleTimestamp { .. } => ApiError::InvalidSignature,
            BillingErrorKind::Parse(_) => ApiError::Validation("invalid_payload".to_string()),
            BillingErrorKind::Api { .. } => ApiError::Upstream("billing_failed".to_string()),
            BillingErrorKind::Configuration(_) => ApiError::Internal(error.to_string()),
        }
    }
}
