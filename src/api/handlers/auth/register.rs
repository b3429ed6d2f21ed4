//! Registration endpoint for SRP credential records.

use anyhow::Context;
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use super::error::AuthError;
use super::rate_limit::RateLimitAction;
use super::state::AuthState;
use super::store::{RegisterOutcome, UserRecord, UserStore};
use super::types::RegisterRequest;
use super::utils::{check_rate_limits, decode_hex_field};
use crate::api::handlers::valid_username;

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 204, description = "Credential record stored"),
        (status = 400, description = "Validation error", body = String),
        (status = 409, description = "User already exists", body = String),
        (status = 429, description = "Rate limited", body = String)
    ),
    tag = "srp"
)]
pub async fn register(
    headers: HeaderMap,
    store: Extension<Arc<UserStore>>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> Result<StatusCode, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    // usernames are stored byte-for-byte, no trimming or case folding
    if request.user.is_empty() {
        return Err(AuthError::Validation("Missing user".to_string()));
    }
    if !valid_username(&request.user) {
        return Err(AuthError::Validation("Invalid user".to_string()));
    }
    decode_hex_field(&request.salt, "salt")?;
    decode_hex_field(&request.verifier, "verifier")?;

    check_rate_limits(&headers, &auth_state, &request.user, RateLimitAction::Register)?;

    let record = UserRecord {
        username: request.user,
        salt: request.salt,
        verifier: request.verifier,
    };
    let username = record.username.clone();
    match store
        .register(record)
        .await
        .context("Failed to persist registration")?
    {
        RegisterOutcome::Registered => {
            debug!("Registered user {username}");
            Ok(StatusCode::NO_CONTENT)
        }
        RegisterOutcome::Conflict => Err(AuthError::Conflict),
    }
}
