//! SRP-6a handshake primitives.
//!
//! The suite is fixed: RFC 5054 2048-bit group, SHA-256, 16-byte salts,
//! 32-byte private ephemerals. Values cross this module as raw bytes; hex
//! encoding happens at the wire.
//!
//! The server side is two calls: [`server_challenge`] mints `(b, B)` for a
//! stored verifier, and [`server_verify`] checks the client's `(A, M1)` and
//! returns `M2`. The client side ([`client_begin`] and friends) mirrors it
//! so Rust callers and the integration tests can drive a complete login.

use anyhow::{Context, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use srp::client::{SrpClient, SrpClientVerifier};
use srp::groups::G_2048;
use srp::server::SrpServer;
use thiserror::Error;

pub const SALT_LENGTH: usize = 16;
const EPHEMERAL_LENGTH: usize = 32;

/// Handshake failures that map to a credential mismatch, not a server bug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandshakeError {
    /// The peer's public ephemeral is degenerate (e.g. `A mod N == 0`).
    #[error("Invalid public ephemeral")]
    InvalidPublicEphemeral,
    /// The peer's proof does not match the negotiated session key.
    #[error("Proof mismatch")]
    ProofMismatch,
}

/// Server half of one handshake, parked between challenge and proof.
pub struct ServerHandshake {
    /// Private ephemeral; never leaves the server.
    pub b: Vec<u8>,
    /// Public ephemeral sent to the client.
    pub b_pub: Vec<u8>,
}

fn srp_server() -> SrpServer<'static, Sha256> {
    SrpServer::new(&G_2048)
}

fn srp_client() -> SrpClient<'static, Sha256> {
    SrpClient::new(&G_2048)
}

fn random_bytes<const N: usize>(what: &str) -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    OsRng
        .try_fill_bytes(&mut bytes)
        .with_context(|| format!("Failed to generate {what}"))?;
    Ok(bytes)
}

/// Fresh random salt for a new registration.
pub fn generate_salt() -> Result<Vec<u8>> {
    Ok(random_bytes::<SALT_LENGTH>("salt")?.to_vec())
}

/// Password verifier as stored by the server.
///
/// The username is part of the derivation, so the same password under two
/// usernames yields unrelated verifiers.
#[must_use]
pub fn generate_verifier(username: &str, password: &str, salt: &[u8]) -> Vec<u8> {
    srp_client().compute_verifier(username.as_bytes(), password.as_bytes(), salt)
}

/// Start the server side of a handshake for a stored verifier.
///
/// # Errors
/// Fails only if the system random source does.
pub fn server_challenge(verifier: &[u8]) -> Result<ServerHandshake> {
    let b = random_bytes::<EPHEMERAL_LENGTH>("server ephemeral")?;
    let b_pub = srp_server().compute_public_ephemeral(&b, verifier);
    Ok(ServerHandshake {
        b: b.to_vec(),
        b_pub,
    })
}

/// Check the client's `(A, M1)` against a pending challenge.
///
/// Returns the server proof `M2` on success. Both failure modes consume
/// the challenge; callers decide what to tell the client.
pub fn server_verify(
    b: &[u8],
    verifier: &[u8],
    a_pub: &[u8],
    proof: &[u8],
) -> Result<Vec<u8>, HandshakeError> {
    let session = srp_server()
        .process_reply(b, verifier, a_pub)
        .map_err(|_| HandshakeError::InvalidPublicEphemeral)?;
    session
        .verify_client(proof)
        .map_err(|_| HandshakeError::ProofMismatch)?;
    Ok(session.proof().to_vec())
}

/// Client credentials plus a fresh private ephemeral.
pub struct ClientHandshake {
    username: String,
    password: String,
    a: Vec<u8>,
}

/// Start the client side of a handshake.
///
/// # Errors
/// Fails only if the system random source does.
pub fn client_begin(username: &str, password: &str) -> Result<ClientHandshake> {
    let a = random_bytes::<EPHEMERAL_LENGTH>("client ephemeral")?;
    Ok(ClientHandshake {
        username: username.to_string(),
        password: password.to_string(),
        a: a.to_vec(),
    })
}

impl ClientHandshake {
    /// Process the server's `(salt, B)` and produce `(A, M1)`.
    pub fn prove(&self, salt: &[u8], b_pub: &[u8]) -> Result<ClientSession, HandshakeError> {
        let client = srp_client();
        let verifier = client
            .process_reply(
                &self.a,
                self.username.as_bytes(),
                self.password.as_bytes(),
                salt,
                b_pub,
            )
            .map_err(|_| HandshakeError::InvalidPublicEphemeral)?;
        let a_pub = client.compute_public_ephemeral(&self.a);
        Ok(ClientSession { a_pub, verifier })
    }
}

/// Client state awaiting the server proof `M2`.
pub struct ClientSession {
    a_pub: Vec<u8>,
    verifier: SrpClientVerifier<Sha256>,
}

impl ClientSession {
    /// Public ephemeral `A` to send alongside the proof.
    #[must_use]
    pub fn public_ephemeral(&self) -> &[u8] {
        &self.a_pub
    }

    /// Client proof `M1`.
    #[must_use]
    pub fn proof(&self) -> &[u8] {
        self.verifier.proof()
    }

    /// Check the server proof `M2`, closing the mutual authentication.
    pub fn verify_server(&self, proof: &[u8]) -> Result<(), HandshakeError> {
        self.verifier
            .verify_server(proof)
            .map_err(|_| HandshakeError::ProofMismatch)
    }
}
