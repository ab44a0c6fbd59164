//! Field rules and the validation result type.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use validator::{ValidateEmail, ValidateUrl};

use crate::application::Field;
use crate::messages::MessageKey;

/// Mobile numbers are exactly 11 ASCII digits starting with `01`.
pub const MOBILE_PATTERN: &str = r"^01[0-9]{9}$";

/// Minimum number of characters in `full_name`.
pub const MIN_FULL_NAME_CHARS: usize = 2;

static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(MOBILE_PATTERN).expect("valid regex"));

/// Outcome of validating a step (or the whole application).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationResult {
    Valid,
    Invalid(BTreeMap<Field, MessageKey>),
}

impl ValidationResult {
    /// Build a result from collected violations.
    pub fn from_errors(errors: BTreeMap<Field, MessageKey>) -> Self {
        if errors.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(errors)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Field violations, empty when valid.
    pub fn errors(&self) -> BTreeMap<Field, MessageKey> {
        match self {
            Self::Valid => BTreeMap::new(),
            Self::Invalid(errors) => errors.clone(),
        }
    }

    /// Combine two results; violations from both are kept.
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Valid, other) => other,
            (this, Self::Valid) => this,
            (Self::Invalid(mut a), Self::Invalid(b)) => {
                a.extend(b);
                Self::Invalid(a)
            }
        }
    }
}

/// `full_name` must have at least two characters.
pub fn check_full_name(value: &str) -> Option<MessageKey> {
    if value.chars().count() < MIN_FULL_NAME_CHARS {
        Some(MessageKey::FullNameTooShort)
    } else {
        None
    }
}

/// Whether `value` matches [`MOBILE_PATTERN`] exactly, with no whitespace
/// tolerance.
pub fn is_valid_mobile(value: &str) -> bool {
    MOBILE_RE.is_match(value)
}

pub fn check_mobile(value: &str) -> Option<MessageKey> {
    if is_valid_mobile(value) {
        None
    } else {
        Some(MessageKey::MobileInvalid)
    }
}

/// Optional email: empty passes, anything else must be a valid address.
pub fn check_optional_email(value: &str) -> Option<MessageKey> {
    if value.is_empty() || value.validate_email() {
        None
    } else {
        Some(MessageKey::EmailInvalid)
    }
}

/// Optional URL: empty passes, anything else must parse as an absolute URL.
pub fn check_optional_url(value: &str) -> Option<MessageKey> {
    if value.is_empty() || value.validate_url() {
        None
    } else {
        Some(MessageKey::UrlInvalid)
    }
}

/// `organization` is required iff `has_organization` is set.
pub fn check_organization(has_organization: bool, organization: &str) -> Option<MessageKey> {
    if has_organization && organization.trim().is_empty() {
        Some(MessageKey::OrganizationRequired)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- mobile --

    #[test]
    fn mobile_accepts_eleven_digits_with_prefix() {
        assert!(is_valid_mobile("01712345678"));
        assert!(is_valid_mobile("01812345678"));
        assert!(is_valid_mobile("01000000000"));
    }

    #[test]
    fn mobile_rejects_missing_prefix() {
        assert!(!is_valid_mobile("1712345678"));
        assert!(!is_valid_mobile("02712345678"));
    }

    #[test]
    fn mobile_rejects_wrong_length() {
        assert!(!is_valid_mobile("017123456"));
        assert!(!is_valid_mobile("011234567890"));
        assert!(!is_valid_mobile(""));
    }

    #[test]
    fn mobile_rejects_surrounding_whitespace() {
        assert!(!is_valid_mobile(" 01712345678"));
        assert!(!is_valid_mobile("01712345678 "));
        assert!(!is_valid_mobile("01712345678\n"));
    }

    #[test]
    fn mobile_rejects_non_ascii_digits() {
        // Bengali digits are not accepted even though they are numeric.
        assert!(!is_valid_mobile("০১৭১২৩৪৫৬৭৮"));
        assert!(!is_valid_mobile("0171234567a"));
    }

    // -- full name --

    #[test]
    fn full_name_counts_characters() {
        assert_eq!(check_full_name(""), Some(MessageKey::FullNameTooShort));
        assert_eq!(check_full_name("K"), Some(MessageKey::FullNameTooShort));
        assert_eq!(check_full_name("Ka"), None);
        // Two characters, six bytes.
        assert_eq!(check_full_name("কর"), None);
    }

    // -- optional email / url --

    #[test]
    fn empty_optionals_are_valid() {
        assert_eq!(check_optional_email(""), None);
        assert_eq!(check_optional_url(""), None);
    }

    #[test]
    fn email_syntax() {
        assert_eq!(check_optional_email("karim@example.com"), None);
        assert_eq!(
            check_optional_email("karim.example.com"),
            Some(MessageKey::EmailInvalid)
        );
        assert_eq!(check_optional_email("karim@"), Some(MessageKey::EmailInvalid));
    }

    #[test]
    fn url_must_be_absolute() {
        assert_eq!(check_optional_url("https://facebook.com/karim"), None);
        assert_eq!(
            check_optional_url("facebook.com/karim"),
            Some(MessageKey::UrlInvalid)
        );
        assert_eq!(check_optional_url("/karim"), Some(MessageKey::UrlInvalid));
    }

    // -- organization --

    #[test]
    fn organization_required_only_when_flagged() {
        assert_eq!(
            check_organization(true, ""),
            Some(MessageKey::OrganizationRequired)
        );
        assert_eq!(check_organization(true, "Red Crescent"), None);
        assert_eq!(check_organization(false, ""), None);
        assert_eq!(check_organization(false, "anything"), None);
    }

    // -- merge --

    #[test]
    fn merge_keeps_all_violations() {
        let a = ValidationResult::from_errors(BTreeMap::from([(
            Field::Mobile,
            MessageKey::MobileInvalid,
        )]));
        let b = ValidationResult::from_errors(BTreeMap::from([(
            Field::VolunteerTypes,
            MessageKey::VolunteerTypesEmpty,
        )]));
        let merged = a.merge(ValidationResult::Valid).merge(b);
        assert_eq!(merged.errors().len(), 2);
        assert!(ValidationResult::Valid.merge(ValidationResult::Valid).is_valid());
    }
}
