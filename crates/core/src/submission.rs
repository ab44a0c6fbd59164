//! Submission pipeline: ensure a session, then insert the record.
//!
//! Two fallible stages, each with its own failure kind, so that callers (and
//! tests) can tell an auth bootstrap failure from a rejected write. Neither
//! stage retries; a retry is a fresh call to [`SubmissionService::submit`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::application::VolunteerApplication;
use crate::messages::MessageKey;
use crate::ports::{AuthProvider, NewVolunteerSubmission, RecordStore, Session, StoreError};
use crate::types::SubmissionId;

/// Stage at which a submission failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No session existed and an anonymous one could not be created.
    AuthBootstrapFailed,
    /// The store rejected or failed the insert.
    StoreWriteFailed,
    /// A stage did not finish within the submit timeout.
    Timeout,
}

/// A failed submission attempt. `Display` is the underlying message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct SubmissionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl SubmissionError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Heading shown above the verbatim message.
    pub fn headline_key(&self) -> MessageKey {
        match self.kind {
            ErrorKind::AuthBootstrapFailed => MessageKey::AuthFailed,
            ErrorKind::StoreWriteFailed | ErrorKind::Timeout => MessageKey::SubmitError,
        }
    }
}

/// `Ok(id)` when the record was stored.
pub type SubmissionOutcome = Result<SubmissionId, SubmissionError>;

/// Writes applications to the record store under a bootstrapped session.
pub struct SubmissionService {
    store: Arc<dyn RecordStore>,
    auth: Arc<dyn AuthProvider>,
    timeout: Duration,
}

impl SubmissionService {
    pub fn new(store: Arc<dyn RecordStore>, auth: Arc<dyn AuthProvider>, timeout: Duration) -> Self {
        Self {
            store,
            auth,
            timeout,
        }
    }

    /// Submit one application.
    ///
    /// The draft is not modified. At most one anonymous bootstrap and exactly
    /// one insert are attempted; if the bootstrap fails no write is made.
    pub async fn submit(&self, app: &VolunteerApplication) -> SubmissionOutcome {
        let session = self.ensure_session().await?;
        tracing::debug!(session_id = %session.id, anonymous = session.anonymous, "Session ready");

        let record = NewVolunteerSubmission::from_application(app);
        let id = self.insert(&record).await?;
        tracing::info!(submission_id = id, "Volunteer application submitted");
        Ok(id)
    }

    async fn ensure_session(&self) -> Result<Session, SubmissionError> {
        let existing = self
            .bounded("session lookup", self.auth.get_session())
            .await
            .map_err(|e| SubmissionError::new(ErrorKind::Timeout, e))?;

        match existing {
            Ok(Some(session)) => return Ok(session),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed, bootstrapping a new one");
            }
        }

        match self
            .bounded("anonymous sign-in", self.auth.create_anonymous_session())
            .await
        {
            Ok(Ok(session)) => Ok(session),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Anonymous sign-in failed");
                Err(SubmissionError::new(
                    ErrorKind::AuthBootstrapFailed,
                    e.message(),
                ))
            }
            Err(message) => {
                tracing::error!(error = %message, "Anonymous sign-in timed out");
                Err(SubmissionError::new(ErrorKind::Timeout, message))
            }
        }
    }

    async fn insert(&self, record: &NewVolunteerSubmission) -> Result<SubmissionId, SubmissionError> {
        match self.bounded("insert", self.store.insert(record)).await {
            Ok(Ok(id)) => Ok(id),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Submission insert failed");
                Err(SubmissionError::new(ErrorKind::StoreWriteFailed, e.message()))
            }
            Err(message) => {
                tracing::error!(error = %message, "Submission insert timed out");
                Err(SubmissionError::new(ErrorKind::Timeout, message))
            }
        }
    }

    /// Run `fut` under the submit timeout. The outer `Err` is the timeout
    /// message.
    async fn bounded<T>(
        &self,
        stage: &str,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<Result<T, StoreError>, String> {
        tokio::time::timeout(self.timeout, fut).await.map_err(|_| {
            format!("{stage} timed out after {}ms", self.timeout.as_millis())
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
