//! Ports to the external record store and auth provider.
//!
//! The core depends only on these traits. `volunteer-db` implements them on
//! PostgreSQL; [`crate::memory`] implements them in memory for tests and dry
//! runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::VolunteerApplication;
use crate::error::CoreError;
use crate::types::{SubmissionId, Timestamp};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure reported by a store or auth backend. The message is the backend's
/// own, kept verbatim for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or failed internally.
    #[error("{0}")]
    Unavailable(String),

    /// The backend refused the operation (constraint, policy, bad input).
    #[error("{0}")]
    Rejected(String),

    /// The caller is not authorized for the operation.
    #[error("{0}")]
    Unauthorized(String),
}

impl StoreError {
    pub fn message(&self) -> &str {
        match self {
            Self::Unavailable(m) | Self::Rejected(m) | Self::Unauthorized(m) => m,
        }
    }
}

// ---------------------------------------------------------------------------
// Persisted record
// ---------------------------------------------------------------------------

/// Review status of a stored submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    /// Parse a status string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(CoreError::Validation(format!(
                "Invalid submission status '{s}'. Must be one of: pending, approved, rejected"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// The record written to the store for one application.
///
/// Empty optional fields are `None` (`null` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVolunteerSubmission {
    pub full_name: String,
    pub mobile: String,
    pub email: Option<String>,
    pub facebook_url: Option<String>,
    pub twitter_url: Option<String>,
    pub instagram_url: Option<String>,
    pub volunteer_types: Vec<String>,
    pub has_organization: bool,
    pub organization: Option<String>,
    pub status: SubmissionStatus,
}

impl NewVolunteerSubmission {
    /// Map a draft 1:1 onto the stored shape with status `pending`.
    ///
    /// `organization` is kept only when `has_organization` is set.
    pub fn from_application(app: &VolunteerApplication) -> Self {
        Self {
            full_name: app.full_name.clone(),
            mobile: app.mobile.clone(),
            email: non_empty(&app.email),
            facebook_url: non_empty(&app.facebook_url),
            twitter_url: non_empty(&app.twitter_url),
            instagram_url: non_empty(&app.instagram_url),
            volunteer_types: app.volunteer_type_ids(),
            has_organization: app.has_organization,
            organization: if app.has_organization {
                non_empty(&app.organization)
            } else {
                None
            },
            status: SubmissionStatus::Pending,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// An authenticated context authorizing writes to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque session identifier issued by the provider.
    pub id: String,
    /// Whether the session was bootstrapped without a user identity.
    pub anonymous: bool,
    pub expires_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Remote store of volunteer submissions.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Whether any submission already uses this mobile number.
    async fn exists_by_mobile(&self, mobile: &str) -> Result<bool, StoreError>;

    /// Whether any submission already uses this email address.
    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError>;

    /// Insert one record atomically, returning its id.
    async fn insert(&self, record: &NewVolunteerSubmission) -> Result<SubmissionId, StoreError>;
}

/// Source of the session that authorizes store writes.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The current session, if one exists.
    async fn get_session(&self) -> Result<Option<Session>, StoreError>;

    /// Create a fresh anonymous session and make it current.
    async fn create_anonymous_session(&self) -> Result<Session, StoreError>;
}
