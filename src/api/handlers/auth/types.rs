//! Wire types for the SRP endpoints.
//!
//! Protocol values keep their textbook names on the wire (`B`, `A`, `M1`,
//! `M2`) and travel as lowercase hex.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    /// Opaque, case-sensitive username.
    pub user: String,
    /// Hex-encoded salt chosen by the client.
    pub salt: String,
    /// Hex-encoded SRP verifier derived from the password.
    pub verifier: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ChallengeQuery {
    pub user: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ChallengeResponse {
    /// Salt stored at registration, returned verbatim.
    pub salt: String,
    /// Server public ephemeral, fresh per challenge.
    #[serde(rename = "B")]
    pub b_pub: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AuthRequest {
    pub user: String,
    /// Client public ephemeral.
    #[serde(rename = "A")]
    pub a_pub: String,
    /// Client proof of the shared session key.
    #[serde(rename = "M1")]
    pub proof: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    /// Server proof, closing the mutual authentication.
    #[serde(rename = "M2")]
    pub proof: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    /// Username authenticated on this session binding.
    pub user: String,
}
