//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod anonymous_session_repo;
pub mod volunteer_submission_repo;

pub use anonymous_session_repo::AnonymousSessionRepo;
pub use volunteer_submission_repo::VolunteerSubmissionRepo;
