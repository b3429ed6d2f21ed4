//! SRP-6a handlers and supporting modules.
//!
//! ## Protocol State
//!
//! Each session binding walks a small state machine: `Init` when minted,
//! `Challenged` once `/challenge` parks a pending handshake on it, and
//! `Authenticated` after a successful `/auth`. A challenge is good for
//! exactly one attempt; success, mismatch, and replay all consume it, and
//! an expired binding is indistinguishable from one that never had a
//! challenge.
//!
//! ## Storage
//!
//! Credential records live in a JSON snapshot on disk ([`store`]), loaded
//! lazily and rewritten whole on registration. The first record for a
//! username wins; later registrations conflict and change nothing.
//!
//! ## Throttling
//!
//! Every operation consults a [`RateLimiter`] before touching state. The
//! default [`NoopRateLimiter`] imposes no policy; deployments that face
//! the open internet should supply one.

pub(crate) mod authenticate;
pub(crate) mod challenge;
pub mod engine;
mod error;
mod rate_limit;
pub(crate) mod register;
pub(crate) mod session;
mod state;
pub(crate) mod store;
pub(crate) mod types;
mod utils;

pub use error::AuthError;
pub use rate_limit::{NoopRateLimiter, RateLimiter};
pub use state::{AuthConfig, AuthState, SessionStore};
pub use store::{RegisterOutcome, UserRecord, UserStore};

#[cfg(test)]
mod tests;
