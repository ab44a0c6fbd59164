/// Record store primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Identifier returned by the record store for a persisted submission.
pub type SubmissionId = DbId;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
