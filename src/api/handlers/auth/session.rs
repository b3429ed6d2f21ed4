//! Session binding endpoints and cookie plumbing.
//!
//! A binding id is minted when a challenge is issued and travels in the
//! `pruvi_session` cookie (or an `Authorization: Bearer` header for
//! non-browser clients). The id is an opaque handle; all protocol state
//! stays server-side in the [`super::state::SessionStore`].

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, COOKIE, InvalidHeaderValue, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{state::AuthState, types::SessionResponse};

pub(super) const SESSION_COOKIE_NAME: &str = "pruvi_session";

#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Session is authenticated", body = SessionResponse),
        (status = 204, description = "No authenticated session")
    ),
    tag = "srp"
)]
pub async fn session(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    // Missing or stale bindings read as "no session" to avoid leaking auth state.
    let Some(binding) = extract_binding_id(&headers) else {
        return StatusCode::NO_CONTENT.into_response();
    };
    match auth_state.sessions().authenticated_user(binding).await {
        Some(user) => (StatusCode::OK, Json(SessionResponse { user })).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 204, description = "Session binding cleared")
    ),
    tag = "srp"
)]
pub async fn logout(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    if let Some(binding) = extract_binding_id(&headers) {
        auth_state.sessions().remove(binding).await;
    }

    // Always clear the cookie, even if the binding was already gone.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(auth_state.config()) {
        response_headers.insert(SET_COOKIE, cookie);
    }
    (StatusCode::NO_CONTENT, response_headers).into_response()
}

/// Build a `HttpOnly` cookie carrying the session binding id.
pub(super) fn session_cookie(
    auth_state: &AuthState,
    binding: Uuid,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = auth_state.config().session_ttl_seconds();
    // Only mark cookies secure when the service is served over HTTPS.
    let secure = auth_state.config().session_cookie_secure();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={binding}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(
    auth_config: &super::state::AuthConfig,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let secure = auth_config.session_cookie_secure();
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Session binding id from the request, bearer header first, then cookie.
///
/// Unparseable ids read as absent; the caller treats that the same as a
/// request that never had a binding.
pub(super) fn extract_binding_id(headers: &HeaderMap) -> Option<Uuid> {
    let token = extract_binding_token(headers)?;
    Uuid::parse_str(&token).ok()
}

fn extract_binding_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let Some((key, val)) = pair.trim().split_once('=') else {
            continue;
        };
        if key.trim() == SESSION_COOKIE_NAME {
            return Some(val.trim().to_string());
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
