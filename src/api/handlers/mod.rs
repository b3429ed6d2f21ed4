//! API handlers and shared validation helpers for Pruvi.
//!
//! This module organizes the service's route handlers and provides the
//! common input checks used by the SRP endpoints before any state is
//! touched.

pub mod auth;
pub mod health;
pub mod root;

use regex::Regex;

/// Usernames are opaque byte-for-byte identifiers: no trimming, no case
/// folding. Only presence and length are policed.
pub fn valid_username(username: &str) -> bool {
    !username.is_empty() && username.len() <= 256
}

/// Protocol values (salts, verifiers, ephemerals, proofs) travel as hex
/// strings with an even number of digits.
pub fn valid_hex(value: &str) -> bool {
    Regex::new(r"^(?:[0-9a-fA-F]{2})+$").is_ok_and(|re| re.is_match(value))
}
