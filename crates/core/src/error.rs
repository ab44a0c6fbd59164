/// Errors raised outside the form state machine: bad input values, bad
/// configuration, or an intent the form can no longer accept.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Unknown step number, volunteer type id, status or config value.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The form has already been submitted.
    #[error("Conflict: {0}")]
    Conflict(String),
}
