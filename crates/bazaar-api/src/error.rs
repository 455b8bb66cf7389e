//! Maps auth and application errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bazaar_auth::AuthError;
use bazaar_core::error::{AppError, ErrorKind};

/// Message returned for server-side faults.
const INTERNAL_MESSAGE: &str = "Something went wrong. Please try again later.";

/// Failure body: `{ "success": false, "message": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
}

/// Error type returned by every handler and extractor.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A failure from the trust-and-access core.
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// Any other application failure.
    #[error(transparent)]
    App(#[from] AppError),
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
        ErrorKind::Authorization => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::ExternalService => StatusCode::BAD_GATEWAY,
        ErrorKind::Internal
        | ErrorKind::Database
        | ErrorKind::Cache
        | ErrorKind::Configuration
        | ErrorKind::Serialization => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (kind, message) = match &self {
            ApiError::Auth(AuthError::AccessControl(source)) => {
                tracing::error!(error = %source, "Access control fault");
                (ErrorKind::Internal, self.to_string())
            }
            ApiError::Auth(err) => (err.kind(), err.to_string()),
            ApiError::App(err) if err.kind.is_internal() => {
                tracing::error!(kind = %err.kind, error = %err.message, "Internal server error");
                (err.kind, INTERNAL_MESSAGE.to_string())
            }
            ApiError::App(err) => (err.kind, err.message.clone()),
        };

        let body = ApiErrorResponse {
            success: false,
            message,
        };

        (status_for(kind), Json(body)).into_response()
    }
}
