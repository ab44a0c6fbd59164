//! Volunteer intake core.
//!
//! Pure domain logic for the four-step volunteer application form: the
//! draft model, per-step validation, the duplicate registration check, the
//! anonymous-session submission pipeline, and the form state controller that
//! ties them together. Storage and authentication are reached only through
//! the traits in [`ports`]; concrete adapters live in `volunteer-db` and in
//! [`memory`].

pub mod application;
pub mod config;
pub mod duplicate_check;
pub mod error;
pub mod form;
pub mod memory;
pub mod messages;
pub mod ports;
pub mod step;
pub mod submission;
pub mod types;
pub mod validation;
