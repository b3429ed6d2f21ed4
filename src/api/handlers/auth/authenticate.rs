//! Authentication endpoint: verify the client proof against a pending
//! challenge.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use super::engine::{self, HandshakeError};
use super::error::AuthError;
use super::rate_limit::RateLimitAction;
use super::session::extract_binding_id;
use super::state::AuthState;
use super::types::{AuthRequest, AuthResponse};
use super::utils::{check_rate_limits, decode_hex_field};
use crate::api::handlers::valid_username;

#[utoipa::path(
    post,
    path = "/auth",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Mutual authentication succeeded", body = AuthResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 401, description = "Credential mismatch", body = String),
        (status = 403, description = "No pending challenge", body = String),
        (status = 429, description = "Rate limited", body = String)
    ),
    tag = "srp"
)]
pub async fn authenticate(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<AuthRequest>>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    if request.user.is_empty() {
        return Err(AuthError::Validation("Missing user".to_string()));
    }
    if !valid_username(&request.user) {
        return Err(AuthError::Validation("Invalid user".to_string()));
    }
    let a_pub = decode_hex_field(&request.a_pub, "A")?;
    let proof = decode_hex_field(&request.proof, "M1")?;

    check_rate_limits(
        &headers,
        &auth_state,
        &request.user,
        RateLimitAction::Authenticate,
    )?;

    // no binding, an expired one, or one without a challenge all read the same
    let Some(binding) = extract_binding_id(&headers) else {
        return Err(AuthError::ProtocolOrder);
    };
    let Some(pending) = auth_state.sessions().take_pending(binding).await else {
        return Err(AuthError::ProtocolOrder);
    };

    // the challenge is consumed either way; a mismatched username cannot
    // spend someone else's challenge and learn from the response
    if pending.username != request.user {
        debug!(
            "Auth for {} on a challenge issued to {}",
            request.user, pending.username
        );
        return Err(AuthError::ProtocolOrder);
    }

    debug!("Resolving pending challenge: {pending:?}");
    match engine::server_verify(&pending.b, &pending.verifier, &a_pub, &proof) {
        Ok(server_proof) => {
            auth_state
                .sessions()
                .mark_authenticated(binding, pending.username.clone())
                .await;
            debug!("Authenticated {}", pending.username);
            Ok((
                StatusCode::OK,
                Json(AuthResponse {
                    proof: hex::encode(server_proof),
                }),
            ))
        }
        Err(HandshakeError::InvalidPublicEphemeral) => {
            debug!("Rejected degenerate public ephemeral for {}", pending.username);
            Err(AuthError::CredentialMismatch)
        }
        Err(HandshakeError::ProofMismatch) => {
            debug!("Client proof mismatch for {}", pending.username);
            Err(AuthError::CredentialMismatch)
        }
    }
}
