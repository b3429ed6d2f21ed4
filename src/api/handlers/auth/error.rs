//! Error taxonomy shared by the SRP handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Failure classes for registration and login operations.
///
/// Each variant maps to exactly one status code, so handlers never
/// hand-assemble response tuples and clients can tell a missing challenge
/// (retryable by re-challenging) from a bad proof (wrong credentials).
#[derive(Debug, Error)]
pub enum AuthError {
    /// A request field is missing or malformed.
    #[error("{0}")]
    Validation(String),
    /// The named user has no stored credential record.
    #[error("Unknown user")]
    NotFound,
    /// Registration hit a username that already has a record.
    #[error("User already exists")]
    Conflict,
    /// The operation arrived out of protocol order.
    #[error("No pending challenge")]
    ProtocolOrder,
    /// The submitted ephemeral or proof does not match the stored verifier.
    #[error("Credential mismatch")]
    CredentialMismatch,
    /// The caller exceeded the configured request budget.
    #[error("Too many requests")]
    RateLimited,
    /// Unexpected condition; details are logged, never sent to the client.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::ProtocolOrder => StatusCode::FORBIDDEN,
            Self::CredentialMismatch => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(err) => {
                error!("Unhandled error: {err:#}");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };
        (status, self.to_string()).into_response()
    }
}
