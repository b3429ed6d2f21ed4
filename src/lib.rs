//! # Pruvi (SRP-6a Authentication Service)
//!
//! `pruvi` is a password authentication service built on the SRP-6a
//! zero-knowledge proof protocol. Clients never send their password; the
//! server never stores it. Registration stores a one-way verifier, and a
//! successful login ends with both sides holding a mutual proof of the
//! shared session key.
//!
//! ## Protocol Flow
//!
//! - **`POST /register`** stores `{user, salt, verifier}`. The username is
//!   an opaque, case-sensitive identifier; the first registration wins and
//!   later attempts for the same name are rejected.
//! - **`GET /challenge?user=`** replies with the stored salt and a fresh
//!   server public ephemeral `B`, and binds the pending handshake to a
//!   session cookie.
//! - **`POST /auth`** takes the client ephemeral `A` and proof `M1`,
//!   verifies them against the pending challenge on the caller's session,
//!   and replies with the server proof `M2`.
//!
//! Each challenge is good for exactly one authentication attempt: success,
//! mismatch, or replay all consume it.
//!
//! ## Suite
//!
//! The cryptographic suite is fixed: RFC 5054 2048-bit group, SHA-256,
//! 16-byte salts, and hex encoding for every value on the wire. The client
//! half of the handshake lives in [`api::handlers::auth::engine`] so that
//! Rust clients (and the integration tests) can drive a full login.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
