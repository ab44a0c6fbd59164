//! In-memory store and auth provider.
//!
//! Not durable. Used by tests and by the intake binary's dry-run mode. Both
//! adapters can be told to fail or to stall so that error and timeout paths
//! can be exercised without a database.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::ports::{AuthProvider, NewVolunteerSubmission, RecordStore, Session, StoreError};
use crate::types::SubmissionId;

// ---------------------------------------------------------------------------
// Record store
// ---------------------------------------------------------------------------

/// Vector-backed [`RecordStore`].
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: Mutex<Vec<(SubmissionId, NewVolunteerSubmission)>>,
    lookup_failure: Mutex<Option<String>>,
    insert_failure: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
    mobile_lookups: AtomicUsize,
    email_lookups: AtomicUsize,
    inserts: AtomicUsize,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing record without counting it as an insert call.
    pub fn seed(&self, record: NewVolunteerSubmission) -> SubmissionId {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let id = records.len() as SubmissionId + 1;
        records.push((id, record));
        id
    }

    /// Make every existence lookup fail with `message`.
    pub fn fail_lookups_with(&self, message: &str) {
        *self.lookup_failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.into());
    }

    /// Make every insert fail with `message`.
    pub fn fail_inserts_with(&self, message: &str) {
        *self.insert_failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.into());
    }

    /// Clear injected failures.
    pub fn heal(&self) {
        *self.lookup_failure.lock().unwrap_or_else(|e| e.into_inner()) = None;
        *self.insert_failure.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Sleep for `delay` before answering any call.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap_or_else(|e| e.into_inner()) = Some(delay);
    }

    pub fn records(&self) -> Vec<(SubmissionId, NewVolunteerSubmission)> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn mobile_lookups(&self) -> usize {
        self.mobile_lookups.load(Ordering::SeqCst)
    }

    pub fn email_lookups(&self) -> usize {
        self.email_lookups.load(Ordering::SeqCst)
    }

    /// Number of `insert` calls, successful or not.
    pub fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    async fn stall(&self) {
        let delay = *self.delay.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn lookup_failure(&self) -> Option<StoreError> {
        self.lookup_failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .map(StoreError::Unavailable)
    }

    fn exists(&self, pred: impl Fn(&NewVolunteerSubmission) -> bool) -> bool {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|(_, r)| pred(r))
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn exists_by_mobile(&self, mobile: &str) -> Result<bool, StoreError> {
        self.mobile_lookups.fetch_add(1, Ordering::SeqCst);
        self.stall().await;
        if let Some(err) = self.lookup_failure() {
            return Err(err);
        }
        Ok(self.exists(|r| r.mobile == mobile))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        self.email_lookups.fetch_add(1, Ordering::SeqCst);
        self.stall().await;
        if let Some(err) = self.lookup_failure() {
            return Err(err);
        }
        Ok(self.exists(|r| r.email.as_deref() == Some(email)))
    }

    async fn insert(&self, record: &NewVolunteerSubmission) -> Result<SubmissionId, StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.stall().await;
        let failure = self
            .insert_failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(message) = failure {
            return Err(StoreError::Rejected(message));
        }
        Ok(self.seed(record.clone()))
    }
}

// ---------------------------------------------------------------------------
// Auth provider
// ---------------------------------------------------------------------------

/// [`AuthProvider`] that hands out numbered anonymous sessions.
#[derive(Debug, Default)]
pub struct InMemoryAuthProvider {
    session: Mutex<Option<Session>>,
    lookup_failure: Mutex<Option<String>>,
    bootstrap_failure: Mutex<Option<String>>,
    bootstraps: AtomicUsize,
}

impl InMemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-established session.
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
            ..Self::default()
        }
    }

    /// Make `get_session` fail with `message`.
    pub fn fail_session_lookup_with(&self, message: &str) {
        *self
            .lookup_failure
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(message.into());
    }

    /// Make anonymous bootstrap fail with `message`.
    pub fn fail_bootstrap_with(&self, message: &str) {
        *self
            .bootstrap_failure
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(message.into());
    }

    /// Number of `create_anonymous_session` calls, successful or not.
    pub fn bootstrap_calls(&self) -> usize {
        self.bootstraps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn get_session(&self) -> Result<Option<Session>, StoreError> {
        let failure = self
            .lookup_failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(message) = failure {
            return Err(StoreError::Unavailable(message));
        }
        Ok(self.session.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn create_anonymous_session(&self) -> Result<Session, StoreError> {
        let n = self.bootstraps.fetch_add(1, Ordering::SeqCst) + 1;
        let failure = self
            .bootstrap_failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(message) = failure {
            return Err(StoreError::Unauthorized(message));
        }
        let session = Session {
            id: format!("anon-{n}"),
            anonymous: true,
            expires_at: None,
        };
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
        Ok(session)
    }
}
