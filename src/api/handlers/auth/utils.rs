//! Small helpers shared by the SRP handlers.

use axum::http::HeaderMap;

use super::error::AuthError;
use super::rate_limit::{RateLimitAction, RateLimitDecision};
use super::state::AuthState;
use crate::api::handlers::valid_hex;

/// Decode a hex-encoded protocol field, naming the field in the error.
pub(super) fn decode_hex_field(value: &str, field: &str) -> Result<Vec<u8>, AuthError> {
    if value.is_empty() {
        return Err(AuthError::Validation(format!("Missing {field}")));
    }
    if !valid_hex(value) {
        return Err(AuthError::Validation(format!("Invalid {field}")));
    }
    hex::decode(value).map_err(|_| AuthError::Validation(format!("Invalid {field}")))
}

/// Consult the rate limiter for both the client IP and the username.
pub(super) fn check_rate_limits(
    headers: &HeaderMap,
    auth_state: &AuthState,
    username: &str,
    action: RateLimitAction,
) -> Result<(), AuthError> {
    let client_ip = extract_client_ip(headers);
    if auth_state.rate_limiter().check_ip(client_ip.as_deref(), action)
        == RateLimitDecision::Limited
    {
        return Err(AuthError::RateLimited);
    }
    if auth_state.rate_limiter().check_username(username, action) == RateLimitDecision::Limited {
        return Err(AuthError::RateLimited);
    }
    Ok(())
}

/// Extract a client IP for rate limiting from common proxy headers.
pub(super) fn extract_client_ip(headers: &axum::http::HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
