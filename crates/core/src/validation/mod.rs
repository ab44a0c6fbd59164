//! Form validation engine.
//!
//! Pure field rules and the per-step evaluator. Nothing here performs I/O.

pub mod engine;
pub mod rules;

pub use engine::{validate_all, validate_field, validate_step};
pub use rules::ValidationResult;
