//! Repository for the `volunteer_submissions` table.

use sqlx::PgPool;
use volunteer_core::ports::NewVolunteerSubmission;
use volunteer_core::types::DbId;

use crate::models::volunteer_submission::VolunteerSubmission;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, full_name, mobile, email, facebook_url, twitter_url, instagram_url, \
                       volunteer_types, has_organization, organization, status, \
                       created_at, updated_at";

/// Provides insert and lookup operations for volunteer submissions.
pub struct VolunteerSubmissionRepo;

impl VolunteerSubmissionRepo {
    /// Whether any submission uses this mobile number.
    pub async fn exists_by_mobile(pool: &PgPool, mobile: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM volunteer_submissions WHERE mobile = $1)",
        )
        .bind(mobile)
        .fetch_one(pool)
        .await
    }

    /// Whether any submission uses this email address.
    pub async fn exists_by_email(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM volunteer_submissions WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(pool)
        .await
    }

    /// Insert a new submission, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &NewVolunteerSubmission,
    ) -> Result<VolunteerSubmission, sqlx::Error> {
        let query = format!(
            "INSERT INTO volunteer_submissions
                (full_name, mobile, email, facebook_url, twitter_url, instagram_url,
                 volunteer_types, has_organization, organization, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VolunteerSubmission>(&query)
            .bind(&input.full_name)
            .bind(&input.mobile)
            .bind(&input.email)
            .bind(&input.facebook_url)
            .bind(&input.twitter_url)
            .bind(&input.instagram_url)
            .bind(&input.volunteer_types)
            .bind(input.has_organization)
            .bind(&input.organization)
            .bind(input.status.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a submission by its primary key.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<VolunteerSubmission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM volunteer_submissions WHERE id = $1");
        sqlx::query_as::<_, VolunteerSubmission>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
