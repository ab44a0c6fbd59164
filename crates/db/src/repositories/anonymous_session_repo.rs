//! Repository for the `anonymous_sessions` table.

use sqlx::PgPool;

use crate::models::anonymous_session::{AnonymousSession, CreateAnonymousSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, token_hash, expires_at, created_at";

/// Provides create and lookup operations for anonymous sessions.
pub struct AnonymousSessionRepo;

impl AnonymousSessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAnonymousSession,
    ) -> Result<AnonymousSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO anonymous_sessions (token_hash, expires_at)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AnonymousSession>(&query)
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find an unexpired session by its token hash.
    pub async fn find_active(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<AnonymousSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM anonymous_sessions
             WHERE token_hash = $1
               AND expires_at > NOW()"
        );
        sqlx::query_as::<_, AnonymousSession>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }
}
