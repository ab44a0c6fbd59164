//! Multi-step form orchestration.

pub mod controller;
pub mod state;

pub use controller::{
    CheckReport, FormController, NextOutcome, PendingCheck, PendingSubmission, SubmissionReport,
    SubmitOutcome, SubmitStart,
};
pub use state::{FormSession, FormSnapshot, FormState};
