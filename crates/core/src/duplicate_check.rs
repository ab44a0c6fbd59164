//! Duplicate registration check.
//!
//! Before the form leaves step 1 the mobile number (and the email, when
//! given) are looked up in the record store. A mobile hit wins over an email
//! hit. Store failures are reported as [`DuplicateOutcome::CheckFailed`] and
//! the caller's [`DuplicateCheckPolicy`] decides whether that blocks.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::messages::MessageKey;
use crate::ports::{RecordStore, StoreError};

// ---------------------------------------------------------------------------
// Outcome / policy
// ---------------------------------------------------------------------------

/// Result of one uniqueness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateOutcome {
    Unique,
    DuplicateMobile,
    DuplicateEmail,
    /// The store could not answer; carries the reason for logs.
    CheckFailed(String),
}

impl DuplicateOutcome {
    /// Message key to show the user when this outcome blocks the form.
    pub fn message_key(&self) -> Option<MessageKey> {
        match self {
            Self::Unique => None,
            Self::DuplicateMobile => Some(MessageKey::DuplicateMobile),
            Self::DuplicateEmail => Some(MessageKey::DuplicateEmail),
            Self::CheckFailed(_) => Some(MessageKey::CheckFailed),
        }
    }

    /// Whether the form must stay on step 1 under `policy`.
    pub fn blocks(&self, policy: DuplicateCheckPolicy) -> bool {
        match self {
            Self::Unique => false,
            Self::DuplicateMobile | Self::DuplicateEmail => true,
            Self::CheckFailed(_) => policy == DuplicateCheckPolicy::FailClosed,
        }
    }
}

/// What to do when the check itself fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateCheckPolicy {
    /// Proceed as if unique.
    #[default]
    FailOpen,
    /// Stay on step 1 and ask the user to retry.
    FailClosed,
}

impl DuplicateCheckPolicy {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "fail_open" => Ok(Self::FailOpen),
            "fail_closed" => Ok(Self::FailClosed),
            _ => Err(CoreError::Validation(format!(
                "Invalid duplicate check policy '{s}'. Must be one of: fail_open, fail_closed"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FailOpen => "fail_open",
            Self::FailClosed => "fail_closed",
        }
    }
}

// ---------------------------------------------------------------------------
// Checker
// ---------------------------------------------------------------------------

/// Runs uniqueness checks against a [`RecordStore`].
pub struct DuplicateChecker {
    store: Arc<dyn RecordStore>,
    timeout: Duration,
}

impl DuplicateChecker {
    pub fn new(store: Arc<dyn RecordStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Query the store for an existing registration.
    ///
    /// Mobile is always looked up; email only when non-empty and only if the
    /// mobile is free. Both lookups together are bounded by the configured timeout.
    pub async fn check_unique(&self, mobile: &str, email: &str) -> DuplicateOutcome {
        let outcome = match tokio::time::timeout(self.timeout, self.lookup(mobile, email)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => DuplicateOutcome::CheckFailed(e.to_string()),
            Err(_) => DuplicateOutcome::CheckFailed(format!(
                "duplicate check timed out after {}ms",
                self.timeout.as_millis()
            )),
        };

        match &outcome {
            DuplicateOutcome::CheckFailed(reason) => {
                tracing::warn!(reason = %reason, "Duplicate check failed");
            }
            other => tracing::debug!(outcome = ?other, "Duplicate check completed"),
        }
        outcome
    }

    async fn lookup(&self, mobile: &str, email: &str) -> Result<DuplicateOutcome, StoreError> {
        if self.store.exists_by_mobile(mobile).await? {
            return Ok(DuplicateOutcome::DuplicateMobile);
        }
        if !email.is_empty() && self.store.exists_by_email(email).await? {
            return Ok(DuplicateOutcome::DuplicateEmail);
        }
        Ok(DuplicateOutcome::Unique)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
