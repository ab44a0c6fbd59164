//! Volunteer submission row.

use serde::Serialize;
use sqlx::FromRow;
use volunteer_core::error::CoreError;
use volunteer_core::ports::SubmissionStatus;
use volunteer_core::types::{DbId, Timestamp};

/// A row from the `volunteer_submissions` table.
///
/// Inserts use the core's `NewVolunteerSubmission` directly.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VolunteerSubmission {
    pub id: DbId,
    pub full_name: String,
    pub mobile: String,
    pub email: Option<String>,
    pub facebook_url: Option<String>,
    pub twitter_url: Option<String>,
    pub instagram_url: Option<String>,
    pub volunteer_types: Vec<String>,
    pub has_organization: bool,
    pub organization: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl VolunteerSubmission {
    pub fn status(&self) -> Result<SubmissionStatus, CoreError> {
        SubmissionStatus::from_str_db(&self.status)
    }
}
