//! Port implementations over PostgreSQL.

use async_trait::async_trait;
use tokio::sync::RwLock;
use volunteer_core::ports::{
    AuthProvider, NewVolunteerSubmission, RecordStore, Session, StoreError,
};
use volunteer_core::types::SubmissionId;

use crate::models::anonymous_session::{AnonymousSession, CreateAnonymousSession};
use crate::repositories::{AnonymousSessionRepo, VolunteerSubmissionRepo};
use crate::token::{generate_session_token, hash_session_token};
use crate::DbPool;

/// SQLSTATE for `insufficient_privilege`.
const INSUFFICIENT_PRIVILEGE: &str = "42501";

/// Default anonymous session lifetime in hours.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Map a sqlx error into a [`StoreError`], keeping the database message.
pub fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(INSUFFICIENT_PRIVILEGE) => {
            StoreError::Unauthorized(db.message().to_string())
        }
        sqlx::Error::Database(db) => StoreError::Rejected(db.message().to_string()),
        _ => StoreError::Unavailable(err.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Record store
// ---------------------------------------------------------------------------

/// [`RecordStore`] backed by the `volunteer_submissions` table.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: DbPool,
}

impl PgRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn exists_by_mobile(&self, mobile: &str) -> Result<bool, StoreError> {
        VolunteerSubmissionRepo::exists_by_mobile(&self.pool, mobile)
            .await
            .map_err(store_error)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        VolunteerSubmissionRepo::exists_by_email(&self.pool, email)
            .await
            .map_err(store_error)
    }

    async fn insert(&self, record: &NewVolunteerSubmission) -> Result<SubmissionId, StoreError> {
        let row = VolunteerSubmissionRepo::create(&self.pool, record)
            .await
            .map_err(store_error)?;
        tracing::debug!(submission_id = row.id, "Inserted volunteer submission");
        Ok(row.id)
    }
}

// ---------------------------------------------------------------------------
// Auth provider
// ---------------------------------------------------------------------------

/// [`AuthProvider`] that issues anonymous sessions stored in
/// `anonymous_sessions`.
///
/// The plaintext token of the current session is held in memory only.
#[derive(Debug)]
pub struct PgAuthProvider {
    pool: DbPool,
    ttl: chrono::Duration,
    current: RwLock<Option<String>>,
}

impl PgAuthProvider {
    pub fn new(pool: DbPool) -> Self {
        Self::with_ttl(pool, chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }

    pub fn with_ttl(pool: DbPool, ttl: chrono::Duration) -> Self {
        Self {
            pool,
            ttl,
            current: RwLock::new(None),
        }
    }

    fn to_session(row: &AnonymousSession) -> Session {
        Session {
            id: row.id.to_string(),
            anonymous: true,
            expires_at: Some(row.expires_at),
        }
    }
}

#[async_trait]
impl AuthProvider for PgAuthProvider {
    async fn get_session(&self) -> Result<Option<Session>, StoreError> {
        let Some(token) = self.current.read().await.clone() else {
            return Ok(None);
        };

        let row = AnonymousSessionRepo::find_active(&self.pool, &hash_session_token(&token))
            .await
            .map_err(store_error)?;

        match row {
            Some(row) => Ok(Some(Self::to_session(&row))),
            None => {
                tracing::debug!("Cached anonymous session expired");
                *self.current.write().await = None;
                Ok(None)
            }
        }
    }

    async fn create_anonymous_session(&self) -> Result<Session, StoreError> {
        let (token, token_hash) = generate_session_token();
        let input = CreateAnonymousSession {
            token_hash,
            expires_at: chrono::Utc::now() + self.ttl,
        };
        let row = AnonymousSessionRepo::create(&self.pool, &input)
            .await
            .map_err(store_error)?;

        *self.current.write().await = Some(token);
        tracing::info!(session_id = row.id, "Anonymous session created");
        Ok(Self::to_session(&row))
    }
}
