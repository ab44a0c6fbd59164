//! Step evaluator: pure logic, no I/O.

use std::collections::BTreeMap;

use crate::application::{Field, VolunteerApplication};
use crate::messages::MessageKey;
use crate::step::Step;

use super::rules::{
    check_full_name, check_mobile, check_optional_email, check_optional_url, check_organization,
    ValidationResult,
};

/// Validate a single field against the current draft.
pub fn validate_field(field: Field, app: &VolunteerApplication) -> Option<MessageKey> {
    match field {
        Field::FullName => check_full_name(&app.full_name),
        Field::Mobile => check_mobile(&app.mobile),
        Field::Email => check_optional_email(&app.email),
        Field::FacebookUrl => check_optional_url(&app.facebook_url),
        Field::TwitterUrl => check_optional_url(&app.twitter_url),
        Field::InstagramUrl => check_optional_url(&app.instagram_url),
        Field::VolunteerTypes => app
            .volunteer_types
            .is_empty()
            .then_some(MessageKey::VolunteerTypesEmpty),
        // A bool is always present.
        Field::HasOrganization => None,
        Field::Organization => check_organization(app.has_organization, &app.organization),
    }
}

/// Validate the fields belonging to `step`.
pub fn validate_step(step: Step, app: &VolunteerApplication) -> ValidationResult {
    let errors: BTreeMap<Field, MessageKey> = step
        .fields()
        .iter()
        .filter_map(|&field| validate_field(field, app).map(|msg| (field, msg)))
        .collect();
    ValidationResult::from_errors(errors)
}

/// Validate all four step groups at once.
pub fn validate_all(app: &VolunteerApplication) -> ValidationResult {
    Step::all()
        .into_iter()
        .map(|step| validate_step(step, app))
        .fold(ValidationResult::Valid, ValidationResult::merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::VolunteerType;

    fn valid_application() -> VolunteerApplication {
        VolunteerApplication {
            full_name: "Karim Rahman".into(),
            mobile: "01812345678".into(),
            volunteer_types: [VolunteerType::Field].into(),
            ..Default::default()
        }
    }

    #[test]
    fn valid_application_passes_every_step() {
        let app = valid_application();
        for step in Step::all() {
            assert!(validate_step(step, &app).is_valid(), "{step:?}");
        }
        assert!(validate_all(&app).is_valid());
    }

    #[test]
    fn step1_reports_only_step1_fields() {
        let app = VolunteerApplication {
            full_name: "K".into(),
            mobile: "1712345678".into(),
            email: "not-an-email".into(),
            facebook_url: "nope".into(),
            ..Default::default()
        };
        let errors = validate_step(Step::Contact, &app).errors();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[&Field::FullName], MessageKey::FullNameTooShort);
        assert_eq!(errors[&Field::Mobile], MessageKey::MobileInvalid);
        assert_eq!(errors[&Field::Email], MessageKey::EmailInvalid);
    }

    #[test]
    fn step2_checks_each_url() {
        let app = VolunteerApplication {
            facebook_url: "https://facebook.com/karim".into(),
            twitter_url: "twitter".into(),
            instagram_url: "".into(),
            ..valid_application()
        };
        let errors = validate_step(Step::SocialLinks, &app).errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[&Field::TwitterUrl], MessageKey::UrlInvalid);
    }

    #[test]
    fn step3_requires_a_volunteer_type() {
        let mut app = valid_application();
        app.volunteer_types.clear();
        let result = validate_step(Step::VolunteerTypes, &app);
        assert_eq!(
            result.errors().get(&Field::VolunteerTypes),
            Some(&MessageKey::VolunteerTypesEmpty)
        );
    }

    #[test]
    fn step4_organization_conditional() {
        let mut app = valid_application();
        app.has_organization = true;
        app.organization = String::new();
        assert!(!validate_step(Step::Organization, &app).is_valid());

        app.organization = "Red Crescent".into();
        assert!(validate_step(Step::Organization, &app).is_valid());

        app.has_organization = false;
        app.organization = String::new();
        assert!(validate_step(Step::Organization, &app).is_valid());
    }

    #[test]
    fn validate_all_collects_across_steps() {
        let app = VolunteerApplication {
            has_organization: true,
            ..Default::default()
        };
        let errors = validate_all(&app).errors();
        assert!(errors.contains_key(&Field::FullName));
        assert!(errors.contains_key(&Field::Mobile));
        assert!(errors.contains_key(&Field::VolunteerTypes));
        assert!(errors.contains_key(&Field::Organization));
        assert!(!errors.contains_key(&Field::Email));
    }
}
