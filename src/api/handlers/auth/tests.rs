//! Auth module tests.
//!
//! These drive the handlers directly (no HTTP server) through the full
//! register, challenge, and auth state machine, with a real store on a
//! temp directory and the client half of the engine playing the peer.

use super::authenticate::authenticate;
use super::challenge::challenge;
use super::engine;
use super::rate_limit::NoopRateLimiter;
use super::register::register;
use super::state::{AuthConfig, AuthState};
use super::store::UserStore;
use super::types::{AuthRequest, ChallengeQuery, RegisterRequest};
use anyhow::{ensure, Context, Result};
use axum::extract::{Extension, Query};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

fn fixture() -> (TempDir, Extension<Arc<UserStore>>, Extension<Arc<AuthState>>) {
    fixture_with_ttl(30 * 60)
}

fn fixture_with_ttl(
    ttl_seconds: u64,
) -> (TempDir, Extension<Arc<UserStore>>, Extension<Arc<AuthState>>) {
    let dir = TempDir::new().expect("temp dir");
    let store = Extension(Arc::new(UserStore::new(dir.path().join("users.json"))));
    let config = AuthConfig::new("http://localhost:8080".to_string())
        .with_session_ttl_seconds(ttl_seconds);
    let state = Extension(Arc::new(AuthState::new(config, Arc::new(NoopRateLimiter))));
    (dir, store, state)
}

async fn register_user(
    store: &Extension<Arc<UserStore>>,
    state: &Extension<Arc<AuthState>>,
    username: &str,
    password: &str,
) -> Result<()> {
    let salt = engine::generate_salt()?;
    let verifier = engine::generate_verifier(username, password, &salt);
    let response = register(
        HeaderMap::new(),
        store.clone(),
        state.clone(),
        Some(Json(RegisterRequest {
            user: username.to_string(),
            salt: hex::encode(&salt),
            verifier: hex::encode(verifier),
        })),
    )
    .await
    .into_response();
    ensure!(
        response.status() == StatusCode::NO_CONTENT,
        "register failed: {}",
        response.status()
    );
    Ok(())
}

async fn challenge_user(
    store: &Extension<Arc<UserStore>>,
    state: &Extension<Arc<AuthState>>,
    headers: HeaderMap,
    username: &str,
) -> Response {
    challenge(
        headers,
        store.clone(),
        state.clone(),
        Some(Query(ChallengeQuery {
            user: Some(username.to_string()),
        })),
    )
    .await
    .into_response()
}

fn auth_request(username: &str, session: &engine::ClientSession) -> AuthRequest {
    AuthRequest {
        user: username.to_string(),
        a_pub: hex::encode(session.public_ephemeral()),
        proof: hex::encode(session.proof()),
    }
}

/// Turn a challenge response's `Set-Cookie` into request headers.
fn cookie_header(response: &Response) -> Result<HeaderMap> {
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .context("missing set-cookie")?;
    let pair = cookie
        .to_str()?
        .split(';')
        .next()
        .context("empty cookie")?
        .to_string();
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(&pair)?);
    Ok(headers)
}

async fn read_json(response: Response) -> Result<serde_json::Value> {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&body)?)
}

#[tokio::test]
async fn register_missing_payload_is_bad_request() {
    let (_dir, store, state) = fixture();
    let response = register(HeaderMap::new(), store, state, None)
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_missing_or_malformed_fields() {
    let (_dir, store, state) = fixture();
    let cases = [
        ("", "00ff", "beef"),
        ("alice", "", "beef"),
        ("alice", "00ff", ""),
        ("alice", "not-hex", "beef"),
        ("alice", "00ff", "abc"),
    ];
    for (user, salt, verifier) in cases {
        let response = register(
            HeaderMap::new(),
            store.clone(),
            state.clone(),
            Some(Json(RegisterRequest {
                user: user.to_string(),
                salt: salt.to_string(),
                verifier: verifier.to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "case ({user}, {salt}, {verifier})"
        );
    }
}

#[tokio::test]
async fn duplicate_register_conflicts_and_keeps_first_record() -> Result<()> {
    let (_dir, store, state) = fixture();
    register_user(&store, &state, "alice", "first password").await?;
    let first = store.lookup("alice").await.context("record missing")?;

    let response = register(
        HeaderMap::new(),
        store.clone(),
        state.clone(),
        Some(Json(RegisterRequest {
            user: "alice".to_string(),
            salt: "00ff".to_string(),
            verifier: "beef".to_string(),
        })),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let kept = store.lookup("alice").await.context("record missing")?;
    assert_eq!(kept, first);
    Ok(())
}

#[tokio::test]
async fn challenge_requires_user_param() {
    let (_dir, store, state) = fixture();

    let response = challenge(HeaderMap::new(), store.clone(), state.clone(), None)
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = challenge(
        HeaderMap::new(),
        store,
        state,
        Some(Query(ChallengeQuery { user: None })),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn challenge_for_unknown_user_is_not_found() {
    let (_dir, store, state) = fixture();
    let response = challenge_user(&store, &state, HeaderMap::new(), "nobody").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    // no binding was minted for the failed challenge
    assert!(response.headers().get(SET_COOKIE).is_none());
}

#[tokio::test]
async fn challenge_reuses_a_live_binding() -> Result<()> {
    let (_dir, store, state) = fixture();
    register_user(&store, &state, "alice", "correct horse").await?;

    let first = challenge_user(&store, &state, HeaderMap::new(), "alice").await;
    assert_eq!(first.status(), StatusCode::OK);
    let headers = cookie_header(&first)?;

    let second = challenge_user(&store, &state, headers, "alice").await;
    assert_eq!(second.status(), StatusCode::OK);
    // same binding, so no fresh cookie
    assert!(second.headers().get(SET_COOKIE).is_none());
    Ok(())
}

#[tokio::test]
async fn full_protocol_flow_over_handlers() -> Result<()> {
    let (_dir, store, state) = fixture();
    register_user(&store, &state, "alice", "correct horse").await?;

    let response = challenge_user(&store, &state, HeaderMap::new(), "alice").await;
    assert_eq!(response.status(), StatusCode::OK);
    let auth_headers = cookie_header(&response)?;
    let body = read_json(response).await?;
    let salt = hex::decode(body["salt"].as_str().context("salt")?)?;
    let b_pub = hex::decode(body["B"].as_str().context("B")?)?;

    let client = engine::client_begin("alice", "correct horse")?;
    let session = client.prove(&salt, &b_pub)?;

    let response = authenticate(
        auth_headers.clone(),
        state.clone(),
        Some(Json(auth_request("alice", &session))),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await?;
    let server_proof = hex::decode(body["M2"].as_str().context("M2")?)?;

    // the server proved knowledge of the verifier too
    session.verify_server(&server_proof)?;

    // and the login shows up on the session endpoint
    let response = super::session::session(auth_headers, state.clone())
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await?;
    assert_eq!(body["user"], "alice");
    Ok(())
}

#[tokio::test]
async fn auth_without_challenge_is_forbidden() -> Result<()> {
    let (_dir, store, state) = fixture();
    register_user(&store, &state, "alice", "correct horse").await?;

    let request = AuthRequest {
        user: "alice".to_string(),
        a_pub: "0a".to_string(),
        proof: "0b".to_string(),
    };

    // no session binding at all
    let response = authenticate(HeaderMap::new(), state.clone(), Some(Json(request)))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // a binding the server never minted
    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        HeaderValue::from_str(&format!("pruvi_session={}", Uuid::new_v4()))?,
    );
    let response = authenticate(
        headers,
        state.clone(),
        Some(Json(AuthRequest {
            user: "alice".to_string(),
            a_pub: "0a".to_string(),
            proof: "0b".to_string(),
        })),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn replayed_proof_is_forbidden() -> Result<()> {
    let (_dir, store, state) = fixture();
    register_user(&store, &state, "alice", "correct horse").await?;

    let response = challenge_user(&store, &state, HeaderMap::new(), "alice").await;
    let auth_headers = cookie_header(&response)?;
    let body = read_json(response).await?;
    let salt = hex::decode(body["salt"].as_str().context("salt")?)?;
    let b_pub = hex::decode(body["B"].as_str().context("B")?)?;

    let client = engine::client_begin("alice", "correct horse")?;
    let session = client.prove(&salt, &b_pub)?;

    let first = authenticate(
        auth_headers.clone(),
        state.clone(),
        Some(Json(auth_request("alice", &session))),
    )
    .await
    .into_response();
    assert_eq!(first.status(), StatusCode::OK);

    // the same proof again hits a consumed challenge
    let replay = authenticate(
        auth_headers,
        state.clone(),
        Some(Json(auth_request("alice", &session))),
    )
    .await
    .into_response();
    assert_eq!(replay.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn tampered_proof_is_unauthorized_and_preserves_record() -> Result<()> {
    let (_dir, store, state) = fixture();
    register_user(&store, &state, "alice", "correct horse").await?;
    let before = store.lookup("alice").await.context("record missing")?;

    let response = challenge_user(&store, &state, HeaderMap::new(), "alice").await;
    let auth_headers = cookie_header(&response)?;
    let body = read_json(response).await?;
    let salt = hex::decode(body["salt"].as_str().context("salt")?)?;
    let b_pub = hex::decode(body["B"].as_str().context("B")?)?;

    let client = engine::client_begin("alice", "correct horse")?;
    let session = client.prove(&salt, &b_pub)?;

    let mut proof = session.proof().to_vec();
    proof[0] ^= 0x01;
    let response = authenticate(
        auth_headers.clone(),
        state.clone(),
        Some(Json(AuthRequest {
            user: "alice".to_string(),
            a_pub: hex::encode(session.public_ephemeral()),
            proof: hex::encode(proof),
        })),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // the stored record is untouched by the failed attempt
    let after = store.lookup("alice").await.context("record missing")?;
    assert_eq!(after, before);

    // and the challenge was consumed: the correct proof is too late now
    let late = authenticate(
        auth_headers,
        state.clone(),
        Some(Json(auth_request("alice", &session))),
    )
    .await
    .into_response();
    assert_eq!(late.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn wrong_username_cannot_spend_a_challenge() -> Result<()> {
    let (_dir, store, state) = fixture();
    register_user(&store, &state, "alice", "correct horse").await?;
    register_user(&store, &state, "bob", "other horse").await?;

    // the binding holds a challenge for alice
    let response = challenge_user(&store, &state, HeaderMap::new(), "alice").await;
    let auth_headers = cookie_header(&response)?;
    let body = read_json(response).await?;
    let salt = hex::decode(body["salt"].as_str().context("salt")?)?;
    let b_pub = hex::decode(body["B"].as_str().context("B")?)?;

    // bob answers it with his own credentials
    let client = engine::client_begin("bob", "other horse")?;
    let session = client.prove(&salt, &b_pub)?;
    let response = authenticate(
        auth_headers,
        state.clone(),
        Some(Json(auth_request("bob", &session))),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn expired_binding_reads_as_no_challenge() -> Result<()> {
    let (_dir, store, state) = fixture_with_ttl(0);
    register_user(&store, &state, "alice", "correct horse").await?;

    let response = challenge_user(&store, &state, HeaderMap::new(), "alice").await;
    assert_eq!(response.status(), StatusCode::OK);
    let auth_headers = cookie_header(&response)?;
    let body = read_json(response).await?;
    let salt = hex::decode(body["salt"].as_str().context("salt")?)?;
    let b_pub = hex::decode(body["B"].as_str().context("B")?)?;

    let client = engine::client_begin("alice", "correct horse")?;
    let session = client.prove(&salt, &b_pub)?;
    let response = authenticate(
        auth_headers,
        state.clone(),
        Some(Json(auth_request("alice", &session))),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn degenerate_client_ephemeral_is_unauthorized() -> Result<()> {
    let (_dir, store, state) = fixture();
    register_user(&store, &state, "alice", "correct horse").await?;

    let response = challenge_user(&store, &state, HeaderMap::new(), "alice").await;
    let auth_headers = cookie_header(&response)?;

    // A == 0 mod N must never reach key agreement
    let response = authenticate(
        auth_headers,
        state.clone(),
        Some(Json(AuthRequest {
            user: "alice".to_string(),
            a_pub: hex::encode([0u8; 256]),
            proof: hex::encode([0u8; 32]),
        })),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
