//! Anonymous session tokens.
//!
//! `PgAuthProvider` keeps the plaintext token of the session it bootstrapped
//! in memory; `anonymous_sessions` holds only its SHA-256 hash.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generate the token for a new anonymous session.
///
/// Returns `(plaintext_token, sha256_hex_hash)`; the hash is the value
/// written to `anonymous_sessions.token_hash`.
pub fn generate_session_token() -> (String, String) {
    let plaintext = Uuid::new_v4().to_string();
    let hash = hash_session_token(&plaintext);
    (plaintext, hash)
}

/// Compute the `anonymous_sessions.token_hash` value for a session token.
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
