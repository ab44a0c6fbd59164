//! Headless driver for the volunteer intake form.
//!
//! Loads a draft application, walks it through the four steps and submits
//! it, standing in for the UI shell that would normally forward the user's
//! intents.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use volunteer_core::application::VolunteerApplication;
use volunteer_core::form::{FormController, NextOutcome, SubmitOutcome};
use volunteer_core::step::Step;
use volunteer_core::submission::SubmissionError;
use volunteer_core::types::SubmissionId;

/// How a driven form run ended.
#[derive(Debug)]
pub enum DriveOutcome {
    Submitted(SubmissionId),
    /// Stopped on `step` by validation or the duplicate check.
    Blocked { step: Step, reasons: Vec<String> },
    Failed(SubmissionError),
}

impl DriveOutcome {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Submitted(_) => ExitCode::SUCCESS,
            Self::Blocked { .. } | Self::Failed(_) => ExitCode::from(1),
        }
    }
}

/// Parse a draft application from JSON.
pub fn parse_draft(json: &str) -> anyhow::Result<VolunteerApplication> {
    serde_json::from_str(json).context("Draft is not a valid volunteer application")
}

/// Read and parse a draft application file.
pub fn load_draft(path: &Path) -> anyhow::Result<VolunteerApplication> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read draft {}", path.display()))?;
    parse_draft(&raw)
}

/// Drive the form from its current step through submission.
pub async fn drive(form: &mut FormController) -> DriveOutcome {
    while form.step() != Step::Organization {
        let step = form.step();
        match form.advance().await {
            NextOutcome::Advanced(to) => {
                tracing::info!(from = step.to_number(), to = to.to_number(), "Advanced");
            }
            _ => return blocked(form, step),
        }
    }

    match form.submit().await {
        SubmitOutcome::Submitted(id) => DriveOutcome::Submitted(id),
        SubmitOutcome::Failed(err) => DriveOutcome::Failed(err),
        _ => blocked(form, Step::Organization),
    }
}

fn blocked(form: &FormController, step: Step) -> DriveOutcome {
    let mut reasons: Vec<String> = form
        .field_errors()
        .iter()
        .map(|(field, message)| format!("{}: {message}", field.as_str()))
        .collect();
    if let Some(duplicate) = form.duplicate_error() {
        reasons.push(duplicate.to_string());
    }
    tracing::warn!(step = step.to_number(), reasons = ?reasons, "Form blocked");
    DriveOutcome::Blocked { step, reasons }
}
