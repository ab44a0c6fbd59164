//! The volunteer application draft.
//!
//! [`VolunteerApplication`] is the mutable record the form controller owns
//! for one session. Fields are plain strings so that the UI can hold partial
//! input; emptiness of an optional field means "not provided".

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::messages::MessageKey;

// ---------------------------------------------------------------------------
// Volunteer types
// ---------------------------------------------------------------------------

/// The fixed set of volunteering options offered on step 3.
///
/// Declaration order is the display order and the order in which a set of
/// types is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolunteerType {
    Field,
    Social,
    Content,
    Translation,
    Event,
    Any,
}

impl VolunteerType {
    pub const ALL: [VolunteerType; 6] = [
        Self::Field,
        Self::Social,
        Self::Content,
        Self::Translation,
        Self::Event,
        Self::Any,
    ];

    /// Parse a stored option id.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "field" => Ok(Self::Field),
            "social" => Ok(Self::Social),
            "content" => Ok(Self::Content),
            "translation" => Ok(Self::Translation),
            "event" => Ok(Self::Event),
            "any" => Ok(Self::Any),
            _ => Err(CoreError::Validation(format!(
                "Invalid volunteer type '{s}'. Must be one of: field, social, content, translation, event, any"
            ))),
        }
    }

    /// Option id as stored in the `volunteer_types` array.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Social => "social",
            Self::Content => "content",
            Self::Translation => "translation",
            Self::Event => "event",
            Self::Any => "any",
        }
    }

    /// Message key for the checkbox label.
    pub fn label_key(self) -> MessageKey {
        match self {
            Self::Field => MessageKey::TypeField,
            Self::Social => MessageKey::TypeSocial,
            Self::Content => MessageKey::TypeContent,
            Self::Translation => MessageKey::TypeTranslation,
            Self::Event => MessageKey::TypeEvent,
            Self::Any => MessageKey::TypeAny,
        }
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// Names of the editable fields, used as keys for per-field errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FullName,
    Mobile,
    Email,
    FacebookUrl,
    TwitterUrl,
    InstagramUrl,
    VolunteerTypes,
    HasOrganization,
    Organization,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Self::FullName,
        Self::Mobile,
        Self::Email,
        Self::FacebookUrl,
        Self::TwitterUrl,
        Self::InstagramUrl,
        Self::VolunteerTypes,
        Self::HasOrganization,
        Self::Organization,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Mobile => "mobile",
            Self::Email => "email",
            Self::FacebookUrl => "facebookUrl",
            Self::TwitterUrl => "twitterUrl",
            Self::InstagramUrl => "instagramUrl",
            Self::VolunteerTypes => "volunteerTypes",
            Self::HasOrganization => "hasOrganization",
            Self::Organization => "organization",
        }
    }
}

/// A single user edit forwarded by the UI shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    FullName(String),
    Mobile(String),
    Email(String),
    FacebookUrl(String),
    TwitterUrl(String),
    InstagramUrl(String),
    /// Replace the whole selection.
    VolunteerTypes(BTreeSet<VolunteerType>),
    /// Check (`true`) or uncheck (`false`) one option.
    ToggleVolunteerType(VolunteerType, bool),
    HasOrganization(bool),
    Organization(String),
}

impl FieldEdit {
    /// The field this edit targets.
    pub fn field(&self) -> Field {
        match self {
            Self::FullName(_) => Field::FullName,
            Self::Mobile(_) => Field::Mobile,
            Self::Email(_) => Field::Email,
            Self::FacebookUrl(_) => Field::FacebookUrl,
            Self::TwitterUrl(_) => Field::TwitterUrl,
            Self::InstagramUrl(_) => Field::InstagramUrl,
            Self::VolunteerTypes(_) | Self::ToggleVolunteerType(..) => Field::VolunteerTypes,
            Self::HasOrganization(_) => Field::HasOrganization,
            Self::Organization(_) => Field::Organization,
        }
    }
}

// ---------------------------------------------------------------------------
// Application draft
// ---------------------------------------------------------------------------

/// The volunteer application being filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolunteerApplication {
    pub full_name: String,
    pub mobile: String,
    pub email: String,
    pub facebook_url: String,
    pub twitter_url: String,
    pub instagram_url: String,
    pub volunteer_types: BTreeSet<VolunteerType>,
    pub has_organization: bool,
    pub organization: String,
}

impl VolunteerApplication {
    /// Apply an edit. Returns `true` if the stored value changed.
    ///
    /// Turning `has_organization` off clears `organization`.
    pub fn apply(&mut self, edit: FieldEdit) -> bool {
        fn replace(slot: &mut String, value: String) -> bool {
            if *slot == value {
                return false;
            }
            *slot = value;
            true
        }

        match edit {
            FieldEdit::FullName(v) => replace(&mut self.full_name, v),
            FieldEdit::Mobile(v) => replace(&mut self.mobile, v),
            FieldEdit::Email(v) => replace(&mut self.email, v),
            FieldEdit::FacebookUrl(v) => replace(&mut self.facebook_url, v),
            FieldEdit::TwitterUrl(v) => replace(&mut self.twitter_url, v),
            FieldEdit::InstagramUrl(v) => replace(&mut self.instagram_url, v),
            FieldEdit::VolunteerTypes(types) => {
                if self.volunteer_types == types {
                    return false;
                }
                self.volunteer_types = types;
                true
            }
            FieldEdit::ToggleVolunteerType(ty, true) => self.volunteer_types.insert(ty),
            FieldEdit::ToggleVolunteerType(ty, false) => self.volunteer_types.remove(&ty),
            FieldEdit::HasOrganization(value) => {
                let changed = self.has_organization != value;
                self.has_organization = value;
                if !value && !self.organization.is_empty() {
                    self.organization.clear();
                    return true;
                }
                changed
            }
            FieldEdit::Organization(v) => replace(&mut self.organization, v),
        }
    }

    /// Option ids of the selected volunteer types, in declaration order.
    pub fn volunteer_type_ids(&self) -> Vec<String> {
        self.volunteer_types
            .iter()
            .map(|t| t.as_str().to_string())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
