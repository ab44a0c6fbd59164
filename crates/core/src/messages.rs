//! User-facing message keys and the translation port.
//!
//! The core never owns translated copy. Validators and the controller deal
//! in [`MessageKey`]s; a [`Translator`] supplied by the deployment turns them
//! into display strings. [`DefaultMessages`] provides the built-in English
//! fallback.

use serde::Serialize;

/// Keys for every string the core can surface to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MessageKey {
    // Field validation
    FullNameTooShort,
    MobileInvalid,
    EmailInvalid,
    UrlInvalid,
    VolunteerTypesEmpty,
    OrganizationRequired,

    // Duplicate check
    DuplicateMobile,
    DuplicateEmail,
    CheckFailed,

    // Submission
    SubmitError,
    AuthFailed,
    SuccessTitle,
    SuccessMessage,

    // Step headings
    Step1Title,
    Step2Title,
    Step3Title,
    Step4Title,

    // Volunteer type labels
    TypeField,
    TypeSocial,
    TypeContent,
    TypeTranslation,
    TypeEvent,
    TypeAny,
}

impl MessageKey {
    /// Dotted lookup key, relative to the `volunteer` namespace.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullNameTooShort => "errors.fullNameTooShort",
            Self::MobileInvalid => "errors.mobileInvalid",
            Self::EmailInvalid => "errors.emailInvalid",
            Self::UrlInvalid => "errors.urlInvalid",
            Self::VolunteerTypesEmpty => "errors.volunteerTypesEmpty",
            Self::OrganizationRequired => "errors.organizationRequired",
            Self::DuplicateMobile => "errors.duplicateMobile",
            Self::DuplicateEmail => "errors.duplicateEmail",
            Self::CheckFailed => "errors.checkFailed",
            Self::SubmitError => "errors.submitError",
            Self::AuthFailed => "errors.authFailed",
            Self::SuccessTitle => "success.title",
            Self::SuccessMessage => "success.message",
            Self::Step1Title => "step1Title",
            Self::Step2Title => "step2Title",
            Self::Step3Title => "step3Title",
            Self::Step4Title => "step4Title",
            Self::TypeField => "types.field",
            Self::TypeSocial => "types.social",
            Self::TypeContent => "types.content",
            Self::TypeTranslation => "types.translation",
            Self::TypeEvent => "types.event",
            Self::TypeAny => "types.any",
        }
    }
}

/// Localized string lookup.
pub trait Translator: Send + Sync {
    fn translate(&self, key: MessageKey) -> String;
}

/// Built-in English copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessages;

impl DefaultMessages {
    pub fn text(key: MessageKey) -> &'static str {
        match key {
            MessageKey::FullNameTooShort => "Name must be at least 2 characters",
            MessageKey::MobileInvalid => {
                "Invalid mobile number format (must be 11 digits starting with 01)"
            }
            MessageKey::EmailInvalid => "Invalid email address",
            MessageKey::UrlInvalid => "Invalid URL",
            MessageKey::VolunteerTypesEmpty => "Select at least one volunteer type",
            MessageKey::OrganizationRequired => "Organization name is required",
            MessageKey::DuplicateMobile => "This phone number is already registered",
            MessageKey::DuplicateEmail => "This email is already registered",
            MessageKey::CheckFailed => {
                "We could not verify your details right now. Please try again."
            }
            MessageKey::SubmitError => "Failed to submit form",
            MessageKey::AuthFailed => "Failed to authenticate. Please try again.",
            MessageKey::SuccessTitle => "Application received",
            MessageKey::SuccessMessage => "Thank you for volunteering. We will be in touch soon.",
            MessageKey::Step1Title => "Personal information",
            MessageKey::Step2Title => "Social media",
            MessageKey::Step3Title => "How would you like to help?",
            MessageKey::Step4Title => "Organization",
            MessageKey::TypeField => "Field work",
            MessageKey::TypeSocial => "Social media",
            MessageKey::TypeContent => "Content creation",
            MessageKey::TypeTranslation => "Translation",
            MessageKey::TypeEvent => "Event management",
            MessageKey::TypeAny => "Anything needed",
        }
    }
}

impl Translator for DefaultMessages {
    fn translate(&self, key: MessageKey) -> String {
        Self::text(key).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KEYS: [MessageKey; 23] = [
        MessageKey::FullNameTooShort,
        MessageKey::MobileInvalid,
        MessageKey::EmailInvalid,
        MessageKey::UrlInvalid,
        MessageKey::VolunteerTypesEmpty,
        MessageKey::OrganizationRequired,
        MessageKey::DuplicateMobile,
        MessageKey::DuplicateEmail,
        MessageKey::CheckFailed,
        MessageKey::SubmitError,
        MessageKey::AuthFailed,
        MessageKey::SuccessTitle,
        MessageKey::SuccessMessage,
        MessageKey::Step1Title,
        MessageKey::Step2Title,
        MessageKey::Step3Title,
        MessageKey::Step4Title,
        MessageKey::TypeField,
        MessageKey::TypeSocial,
        MessageKey::TypeContent,
        MessageKey::TypeTranslation,
        MessageKey::TypeEvent,
        MessageKey::TypeAny,
    ];

    #[test]
    fn every_key_has_default_text() {
        for key in ALL_KEYS {
            assert!(!DefaultMessages.translate(key).is_empty(), "{key:?}");
        }
    }

    #[test]
    fn lookup_keys_are_unique() {
        let mut keys: Vec<&str> = ALL_KEYS.iter().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), ALL_KEYS.len());
    }
}
