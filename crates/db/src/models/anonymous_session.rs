//! Anonymous session model and DTOs.

use sqlx::FromRow;
use volunteer_core::types::{DbId, Timestamp};

/// A row from the `anonymous_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct AnonymousSession {
    pub id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for creating a new anonymous session.
pub struct CreateAnonymousSession {
    pub token_hash: String,
    pub expires_at: Timestamp,
}
