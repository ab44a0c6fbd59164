//! Form step definitions.
//!
//! The intake form is split into four ordered field groups. Each step knows
//! its 1-based number, its title message key, and which fields it validates.

use serde::{Deserialize, Serialize};

use crate::application::Field;
use crate::error::CoreError;
use crate::messages::MessageKey;

/// Total number of steps in the form.
pub const TOTAL_STEPS: u8 = 4;

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// Maximum step number (1-based).
pub const MAX_STEP: u8 = 4;

/// The four steps of the volunteer intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Contact,
    SocialLinks,
    VolunteerTypes,
    Organization,
}

impl Step {
    /// Convert a 1-based step number to a `Step`.
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Self::Contact),
            2 => Ok(Self::SocialLinks),
            3 => Ok(Self::VolunteerTypes),
            4 => Ok(Self::Organization),
            _ => Err(CoreError::Validation(format!(
                "Invalid step number {n}. Must be between {MIN_STEP} and {MAX_STEP}"
            ))),
        }
    }

    /// Convert to a 1-based step number.
    pub fn to_number(self) -> u8 {
        match self {
            Self::Contact => 1,
            Self::SocialLinks => 2,
            Self::VolunteerTypes => 3,
            Self::Organization => 4,
        }
    }

    /// Message key of the step heading.
    pub fn title_key(self) -> MessageKey {
        match self {
            Self::Contact => MessageKey::Step1Title,
            Self::SocialLinks => MessageKey::Step2Title,
            Self::VolunteerTypes => MessageKey::Step3Title,
            Self::Organization => MessageKey::Step4Title,
        }
    }

    /// Fields validated when leaving this step.
    ///
    /// `Organization` is listed for step 4 but is only checked when
    /// `has_organization` is set.
    pub fn fields(self) -> &'static [Field] {
        match self {
            Self::Contact => &[Field::FullName, Field::Mobile, Field::Email],
            Self::SocialLinks => &[Field::FacebookUrl, Field::TwitterUrl, Field::InstagramUrl],
            Self::VolunteerTypes => &[Field::VolunteerTypes],
            Self::Organization => &[Field::HasOrganization, Field::Organization],
        }
    }

    /// The following step, or `None` on the last step.
    pub fn next(self) -> Option<Self> {
        Self::from_number(self.to_number() + 1).ok()
    }

    /// The preceding step, or `None` on the first step.
    pub fn prev(self) -> Option<Self> {
        Self::from_number(self.to_number().checked_sub(1)?).ok()
    }

    /// All steps in order.
    pub fn all() -> [Self; TOTAL_STEPS as usize] {
        [
            Self::Contact,
            Self::SocialLinks,
            Self::VolunteerTypes,
            Self::Organization,
        ]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_from_number_valid() {
        assert_eq!(Step::from_number(1).unwrap(), Step::Contact);
        assert_eq!(Step::from_number(4).unwrap(), Step::Organization);
    }

    #[test]
    fn step_from_number_invalid() {
        assert!(Step::from_number(0).is_err());
        assert!(Step::from_number(5).is_err());
        assert!(Step::from_number(255).is_err());
    }

    #[test]
    fn step_numbers_match_order() {
        for (i, step) in Step::all().into_iter().enumerate() {
            assert_eq!(step.to_number() as usize, i + 1);
        }
    }

    #[test]
    fn next_and_prev_stop_at_bounds() {
        assert_eq!(Step::Contact.prev(), None);
        assert_eq!(Step::Contact.next(), Some(Step::SocialLinks));
        assert_eq!(Step::Organization.next(), None);
        assert_eq!(Step::Organization.prev(), Some(Step::VolunteerTypes));
    }

    #[test]
    fn every_field_belongs_to_exactly_one_step() {
        let mut seen: Vec<Field> = Step::all()
            .into_iter()
            .flat_map(|s| s.fields().iter().copied())
            .collect();
        let total = seen.len();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), total);
        assert_eq!(total, Field::ALL.len());
    }
}
