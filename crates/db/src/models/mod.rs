//! Database row structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the table row
//! and, where the insert shape differs from the core's record, a create DTO.

pub mod anonymous_session;
pub mod volunteer_submission;
