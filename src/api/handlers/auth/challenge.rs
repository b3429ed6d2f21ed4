//! Challenge endpoint: start the server side of an SRP handshake.

use anyhow::Context;
use axum::{
    extract::{Extension, Query},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::debug;

use super::engine;
use super::error::AuthError;
use super::rate_limit::RateLimitAction;
use super::session::{extract_binding_id, session_cookie};
use super::state::{AuthState, PendingLogin};
use super::store::UserStore;
use super::types::{ChallengeQuery, ChallengeResponse};
use super::utils::check_rate_limits;
use crate::api::handlers::valid_username;

#[utoipa::path(
    get,
    path = "/challenge",
    params(
        ("user" = String, Query, description = "Username to challenge")
    ),
    responses(
        (status = 200, description = "Challenge issued", body = ChallengeResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 404, description = "Unknown user", body = String),
        (status = 429, description = "Rate limited", body = String)
    ),
    tag = "srp"
)]
pub async fn challenge(
    headers: HeaderMap,
    store: Extension<Arc<UserStore>>,
    auth_state: Extension<Arc<AuthState>>,
    query: Option<Query<ChallengeQuery>>,
) -> Result<impl IntoResponse, AuthError> {
    let user = query
        .and_then(|Query(query)| query.user)
        .unwrap_or_default();
    if user.is_empty() {
        return Err(AuthError::Validation("Missing user".to_string()));
    }
    if !valid_username(&user) {
        return Err(AuthError::Validation("Invalid user".to_string()));
    }

    check_rate_limits(&headers, &auth_state, &user, RateLimitAction::Challenge)?;

    // unknown users get a 404 before any session state is touched
    let record = store.lookup(&user).await.ok_or(AuthError::NotFound)?;
    let verifier = hex::decode(&record.verifier)
        .with_context(|| format!("Stored verifier for {user} is not valid hex"))?;

    let handshake =
        engine::server_challenge(&verifier).context("Failed to start SRP handshake")?;
    let b_pub_hex = hex::encode(&handshake.b_pub);

    let pending = PendingLogin {
        username: user.clone(),
        b: handshake.b,
        b_pub: handshake.b_pub,
        verifier,
    };
    let binding = extract_binding_id(&headers);
    let (binding_id, minted) = auth_state.sessions().store_challenge(binding, pending).await;

    let mut response_headers = HeaderMap::new();
    if minted {
        let cookie = session_cookie(&auth_state, binding_id)
            .context("Failed to build session cookie")?;
        response_headers.insert(SET_COOKIE, cookie);
    }

    debug!("Issued challenge for {user}");
    Ok((
        StatusCode::OK,
        response_headers,
        Json(ChallengeResponse {
            salt: record.salt,
            b_pub: b_pub_hex,
        }),
    ))
}
