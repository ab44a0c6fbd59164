//! Form state machine states and caller-facing views.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::application::{Field, VolunteerApplication};
use crate::step::{Step, TOTAL_STEPS};
use crate::submission::SubmissionError;
use crate::types::SubmissionId;

// ---------------------------------------------------------------------------
// Form state
// ---------------------------------------------------------------------------

/// Where the form is in its lifecycle.
///
/// `Failed` is entered only transiently: a failed submission passes through
/// it on the way back to `Step4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "submissionId", rename_all = "snake_case")]
pub enum FormState {
    Step1,
    Step2,
    Step3,
    Step4,
    Submitting,
    Submitted(SubmissionId),
    Failed,
}

impl FormState {
    /// The editing state for `step`.
    pub fn at(step: Step) -> Self {
        match step {
            Step::Contact => Self::Step1,
            Step::SocialLinks => Self::Step2,
            Step::VolunteerTypes => Self::Step3,
            Step::Organization => Self::Step4,
        }
    }

    /// The step whose fields are shown. Submission states sit on step 4.
    pub fn step(self) -> Step {
        match self {
            Self::Step1 => Step::Contact,
            Self::Step2 => Step::SocialLinks,
            Self::Step3 => Step::VolunteerTypes,
            Self::Step4 | Self::Submitting | Self::Submitted(_) | Self::Failed => {
                Step::Organization
            }
        }
    }

    /// Whether the state accepts field edits and navigation.
    pub fn is_editing(self) -> bool {
        matches!(self, Self::Step1 | Self::Step2 | Self::Step3 | Self::Step4)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Submitted(_))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Step1 => "step1",
            Self::Step2 => "step2",
            Self::Step3 => "step3",
            Self::Step4 => "step4",
            Self::Submitting => "submitting",
            Self::Submitted(_) => "submitted",
            Self::Failed => "failed",
        }
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// The per-session flags exposed to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSession {
    /// 1-based step number.
    pub step: u8,
    pub submitting: bool,
    pub duplicate_error: Option<String>,
}

/// Everything a UI layer needs to render the form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub step: u8,
    pub total_steps: u8,
    pub state: &'static str,
    pub checking: bool,
    pub submitting: bool,
    pub application: VolunteerApplication,
    /// Translated messages keyed by field.
    pub field_errors: BTreeMap<Field, String>,
    pub duplicate_error: Option<String>,
    pub submission_error: Option<SubmissionError>,
    pub submission_id: Option<SubmissionId>,
    /// Completed fraction, `step / TOTAL_STEPS`.
    pub progress: f32,
}

pub(crate) fn progress(step: Step) -> f32 {
    f32::from(step.to_number()) / f32::from(TOTAL_STEPS)
}
