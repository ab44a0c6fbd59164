//! The form state controller.
//!
//! One controller drives one form session. It owns the draft and the session
//! flags, gates each step on validation, checks for duplicates when leaving
//! step 1 and runs the submission pipeline from step 4.
//!
//! The two I/O-bound intents are split in two phases so that the controller
//! is never borrowed across an await:
//!
//! 1. [`FormController::next`] / [`FormController::begin_submit`] validate,
//!    set the in-flight flag and hand back a pending operation.
//! 2. The caller awaits the pending operation's `run()` and feeds the report
//!    to [`FormController::apply_check`] / [`FormController::finish_submit`].
//!
//! Every pending operation carries a token. A report is applied only if its
//! token is still the latest one issued, so results superseded by an edit or
//! a reset are dropped on arrival.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::application::{Field, FieldEdit, VolunteerApplication};
use crate::config::IntakeConfig;
use crate::duplicate_check::{DuplicateCheckPolicy, DuplicateChecker, DuplicateOutcome};
use crate::error::CoreError;
use crate::messages::{DefaultMessages, MessageKey, Translator};
use crate::ports::{AuthProvider, RecordStore};
use crate::step::{Step, TOTAL_STEPS};
use crate::submission::{SubmissionError, SubmissionOutcome, SubmissionService};
use crate::types::SubmissionId;
use crate::validation::{validate_all, validate_step, ValidationResult};

use super::state::{progress, FormSession, FormSnapshot, FormState};

// ---------------------------------------------------------------------------
// Intent outcomes
// ---------------------------------------------------------------------------

/// Result of a `next` intent (or of applying a duplicate check report).
#[derive(Debug)]
pub enum NextOutcome {
    /// Moved forward to this step.
    Advanced(Step),
    /// The current step has field errors; nothing moved.
    Invalid(BTreeMap<Field, MessageKey>),
    /// The duplicate check refused step 1.
    Blocked(DuplicateOutcome),
    /// Step 1 is valid; run the check and pass its report to `apply_check`.
    CheckPending(PendingCheck),
    /// A duplicate check or a submission is already in flight.
    Busy,
    /// `next` does not apply in the current state (step 4, submitted).
    Unavailable,
    /// The check report was superseded and has been dropped.
    Stale,
}

/// Result of `begin_submit`.
#[derive(Debug)]
pub enum SubmitStart {
    /// Validation passed; run the submission and pass its report to
    /// `finish_submit`.
    Pending(PendingSubmission),
    /// At least one step group has field errors.
    Invalid(BTreeMap<Field, MessageKey>),
    /// A submission or a duplicate check is already in flight.
    Busy,
    /// Not on step 4, or already submitted.
    Unavailable,
}

/// Final result of a `submit` intent.
#[derive(Debug)]
pub enum SubmitOutcome {
    Submitted(SubmissionId),
    /// The attempt failed; the form is back on step 4 with data intact.
    Failed(SubmissionError),
    Invalid(BTreeMap<Field, MessageKey>),
    Busy,
    Unavailable,
    /// The report belonged to an attempt that is no longer current.
    Discarded,
}

// ---------------------------------------------------------------------------
// Pending operations
// ---------------------------------------------------------------------------

/// A duplicate check issued by `next` on step 1.
pub struct PendingCheck {
    token: u64,
    mobile: String,
    email: String,
    checker: Arc<DuplicateChecker>,
}

impl PendingCheck {
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Query the store.
    pub async fn run(self) -> CheckReport {
        let outcome = self.checker.check_unique(&self.mobile, &self.email).await;
        CheckReport {
            token: self.token,
            outcome,
        }
    }
}

impl fmt::Debug for PendingCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCheck")
            .field("token", &self.token)
            .field("mobile", &self.mobile)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Outcome of a [`PendingCheck`], stamped with its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub token: u64,
    pub outcome: DuplicateOutcome,
}

/// A submission issued by `begin_submit`. Holds a copy of the draft taken at
/// the moment the submit was accepted.
pub struct PendingSubmission {
    token: u64,
    application: VolunteerApplication,
    service: Arc<SubmissionService>,
}

impl PendingSubmission {
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Run the submission pipeline.
    pub async fn run(self) -> SubmissionReport {
        let outcome = self.service.submit(&self.application).await;
        SubmissionReport {
            token: self.token,
            outcome,
        }
    }
}

impl fmt::Debug for PendingSubmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingSubmission")
            .field("token", &self.token)
            .field("application", &self.application)
            .finish_non_exhaustive()
    }
}

/// Outcome of a [`PendingSubmission`], stamped with its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    pub token: u64,
    pub outcome: SubmissionOutcome,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// State machine for one volunteer intake form session.
pub struct FormController {
    application: VolunteerApplication,
    state: FormState,
    checking: bool,
    check_token: u64,
    submit_token: u64,
    field_errors: BTreeMap<Field, String>,
    duplicate_error: Option<String>,
    submission_error: Option<SubmissionError>,
    policy: DuplicateCheckPolicy,
    checker: Arc<DuplicateChecker>,
    service: Arc<SubmissionService>,
    translator: Arc<dyn Translator>,
}

impl FormController {
    pub fn new(
        checker: Arc<DuplicateChecker>,
        service: Arc<SubmissionService>,
        policy: DuplicateCheckPolicy,
    ) -> Self {
        Self {
            application: VolunteerApplication::default(),
            state: FormState::Step1,
            checking: false,
            check_token: 0,
            submit_token: 0,
            field_errors: BTreeMap::new(),
            duplicate_error: None,
            submission_error: None,
            policy,
            checker,
            service,
            translator: Arc::new(DefaultMessages),
        }
    }

    /// Wire a controller straight to a store and an auth provider.
    pub fn from_ports(
        store: Arc<dyn RecordStore>,
        auth: Arc<dyn AuthProvider>,
        config: &IntakeConfig,
    ) -> Self {
        let checker = DuplicateChecker::new(store.clone(), config.check_timeout);
        let service = SubmissionService::new(store, auth, config.submit_timeout);
        Self::new(Arc::new(checker), Arc::new(service), config.duplicate_policy)
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    /// Start from a prefilled draft instead of an empty one.
    pub fn with_application(mut self, application: VolunteerApplication) -> Self {
        self.application = application;
        self
    }

    // -- accessors --

    pub fn application(&self) -> &VolunteerApplication {
        &self.application
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn step(&self) -> Step {
        self.state.step()
    }

    pub fn is_checking(&self) -> bool {
        self.checking
    }

    pub fn is_submitting(&self) -> bool {
        self.state == FormState::Submitting
    }

    pub fn field_errors(&self) -> &BTreeMap<Field, String> {
        &self.field_errors
    }

    pub fn field_error(&self, field: Field) -> Option<&str> {
        self.field_errors.get(&field).map(String::as_str)
    }

    pub fn duplicate_error(&self) -> Option<&str> {
        self.duplicate_error.as_deref()
    }

    pub fn submission_error(&self) -> Option<&SubmissionError> {
        self.submission_error.as_ref()
    }

    /// Translated heading of the last failed submission. The detail is
    /// [`SubmissionError::message`].
    pub fn submission_error_headline(&self) -> Option<String> {
        self.submission_error
            .as_ref()
            .map(|e| self.translator.translate(e.headline_key()))
    }

    /// Heading and verbatim message of the last failed submission, joined
    /// for single-line display.
    pub fn submission_error_text(&self) -> Option<String> {
        let headline = self.submission_error_headline()?;
        self.submission_error
            .as_ref()
            .map(|e| format!("{headline} - {}", e.message))
    }

    pub fn session(&self) -> FormSession {
        FormSession {
            step: self.step().to_number(),
            submitting: self.is_submitting(),
            duplicate_error: self.duplicate_error.clone(),
        }
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            step: self.step().to_number(),
            total_steps: TOTAL_STEPS,
            state: self.state.as_str(),
            checking: self.checking,
            submitting: self.is_submitting(),
            application: self.application.clone(),
            field_errors: self.field_errors.clone(),
            duplicate_error: self.duplicate_error.clone(),
            submission_error: self.submission_error.clone(),
            submission_id: match self.state {
                FormState::Submitted(id) => Some(id),
                _ => None,
            },
            progress: progress(self.step()),
        }
    }

    // -- edits --

    /// Apply one field edit.
    ///
    /// Clears the edited field's error. Changing `mobile` or `email` also
    /// clears the duplicate error. Changing any step 1 field supersedes an
    /// in-flight check.
    pub fn edit_field(&mut self, edit: FieldEdit) -> Result<(), CoreError> {
        if self.state.is_terminal() {
            return Err(CoreError::Conflict(
                "Application already submitted; reset the form to start again".to_string(),
            ));
        }

        let field = edit.field();
        if !self.application.apply(edit) {
            return Ok(());
        }

        self.field_errors.remove(&field);
        if field == Field::HasOrganization {
            self.field_errors.remove(&Field::Organization);
        }

        if matches!(field, Field::Mobile | Field::Email) {
            self.duplicate_error = None;
        }
        // A pending check was issued for the step 1 values it validated.
        if self.checking && Step::Contact.fields().contains(&field) {
            self.checking = false;
            self.check_token += 1;
            tracing::debug!(
                field = field.as_str(),
                "Step 1 changed, in-flight duplicate check superseded"
            );
        }
        Ok(())
    }

    // -- navigation --

    /// Try to move to the next step.
    pub fn next(&mut self) -> NextOutcome {
        if self.checking || self.state == FormState::Submitting {
            return NextOutcome::Busy;
        }
        let step = match self.state {
            FormState::Step1 | FormState::Step2 | FormState::Step3 => self.state.step(),
            _ => return NextOutcome::Unavailable,
        };

        let result = validate_step(step, &self.application);
        self.record_errors(step.fields(), &result);
        if let ValidationResult::Invalid(errors) = result {
            tracing::debug!(step = step.to_number(), errors = errors.len(), "Step invalid");
            return NextOutcome::Invalid(errors);
        }

        if step == Step::Contact {
            self.checking = true;
            self.check_token += 1;
            tracing::debug!(token = self.check_token, "Duplicate check issued");
            return NextOutcome::CheckPending(PendingCheck {
                token: self.check_token,
                mobile: self.application.mobile.clone(),
                email: self.application.email.clone(),
                checker: self.checker.clone(),
            });
        }

        self.advance_from(step)
    }

    /// Apply a duplicate check report issued by [`next`](Self::next).
    pub fn apply_check(&mut self, report: CheckReport) -> NextOutcome {
        if !self.checking || report.token != self.check_token || self.state != FormState::Step1 {
            tracing::debug!(
                token = report.token,
                latest = self.check_token,
                "Discarding stale duplicate check result"
            );
            return NextOutcome::Stale;
        }
        self.checking = false;

        let outcome = report.outcome;
        if outcome.blocks(self.policy) {
            self.duplicate_error = outcome.message_key().map(|k| self.translator.translate(k));
            tracing::info!(outcome = ?outcome, policy = self.policy.as_str(), "Step 1 blocked");
            return NextOutcome::Blocked(outcome);
        }

        if let DuplicateOutcome::CheckFailed(reason) = &outcome {
            tracing::warn!(reason = %reason, "Duplicate check failed, continuing (fail-open)");
        }
        self.duplicate_error = None;
        self.advance_from(Step::Contact)
    }

    /// Run `next` to completion, awaiting the duplicate check on step 1.
    pub async fn advance(&mut self) -> NextOutcome {
        match self.next() {
            NextOutcome::CheckPending(pending) => {
                let report = pending.run().await;
                self.apply_check(report)
            }
            other => other,
        }
    }

    /// Move back one step. Never validates. Returns the new step.
    pub fn prev(&mut self) -> Option<Step> {
        if !self.state.is_editing() || self.checking {
            return None;
        }
        let target = self.state.step().prev()?;
        self.enter(FormState::at(target));
        Some(target)
    }

    // -- submission --

    /// Validate and start a submission from step 4.
    ///
    /// Step 4 is validated first, then every step group, so a draft that
    /// went stale on an earlier step is still refused.
    pub fn begin_submit(&mut self) -> SubmitStart {
        if self.checking || self.state == FormState::Submitting {
            return SubmitStart::Busy;
        }
        if self.state != FormState::Step4 {
            return SubmitStart::Unavailable;
        }

        let result = validate_step(Step::Organization, &self.application);
        self.record_errors(Step::Organization.fields(), &result);
        if let ValidationResult::Invalid(errors) = result {
            return SubmitStart::Invalid(errors);
        }

        let result = validate_all(&self.application);
        self.record_errors(&Field::ALL, &result);
        if let ValidationResult::Invalid(errors) = result {
            tracing::info!(
                fields = ?errors.keys().map(|f| f.as_str()).collect::<Vec<_>>(),
                "Submit refused, earlier steps invalid"
            );
            return SubmitStart::Invalid(errors);
        }

        self.submission_error = None;
        self.submit_token += 1;
        self.enter(FormState::Submitting);
        SubmitStart::Pending(PendingSubmission {
            token: self.submit_token,
            application: self.application.clone(),
            service: self.service.clone(),
        })
    }

    /// Apply the report of a submission issued by
    /// [`begin_submit`](Self::begin_submit).
    pub fn finish_submit(&mut self, report: SubmissionReport) -> SubmitOutcome {
        if self.state != FormState::Submitting || report.token != self.submit_token {
            tracing::debug!(token = report.token, "Discarding stale submission result");
            return SubmitOutcome::Discarded;
        }

        match report.outcome {
            Ok(id) => {
                self.enter(FormState::Submitted(id));
                SubmitOutcome::Submitted(id)
            }
            Err(err) => {
                tracing::warn!(kind = ?err.kind, error = %err, "Submission failed");
                self.enter(FormState::Failed);
                self.enter(FormState::Step4);
                self.submission_error = Some(err.clone());
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Run a submission to completion.
    pub async fn submit(&mut self) -> SubmitOutcome {
        match self.begin_submit() {
            SubmitStart::Pending(pending) => {
                let report = pending.run().await;
                self.finish_submit(report)
            }
            SubmitStart::Invalid(errors) => SubmitOutcome::Invalid(errors),
            SubmitStart::Busy => SubmitOutcome::Busy,
            SubmitStart::Unavailable => SubmitOutcome::Unavailable,
        }
    }

    /// Discard the draft and start over on step 1.
    ///
    /// Any in-flight check or submission report is discarded on arrival.
    pub fn reset(&mut self) {
        self.application = VolunteerApplication::default();
        self.checking = false;
        self.check_token += 1;
        self.submit_token += 1;
        self.field_errors.clear();
        self.duplicate_error = None;
        self.submission_error = None;
        self.enter(FormState::Step1);
    }

    // -- internals --

    fn advance_from(&mut self, step: Step) -> NextOutcome {
        match step.next() {
            Some(target) => {
                self.enter(FormState::at(target));
                NextOutcome::Advanced(target)
            }
            None => NextOutcome::Unavailable,
        }
    }

    fn enter(&mut self, state: FormState) {
        tracing::debug!(from = self.state.as_str(), to = state.as_str(), "Form transition");
        if let FormState::Submitted(id) = state {
            tracing::info!(submission_id = id, "Form submitted");
        }
        self.state = state;
    }

    /// Replace the errors of `fields` with the violations in `result`.
    fn record_errors(&mut self, fields: &[Field], result: &ValidationResult) {
        for field in fields {
            self.field_errors.remove(field);
        }
        for (field, key) in result.errors() {
            self.field_errors
                .insert(field, self.translator.translate(key));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::VolunteerType;
    use crate::memory::{InMemoryAuthProvider, InMemoryRecordStore};
    use assert_matches::assert_matches;

    fn controller(store: &Arc<InMemoryRecordStore>) -> FormController {
        FormController::from_ports(
            store.clone(),
            Arc::new(InMemoryAuthProvider::new()),
            &IntakeConfig::default(),
        )
    }

    fn fill_contact(form: &mut FormController) {
        form.edit_field(FieldEdit::FullName("Karim Rahman".into())).unwrap();
        form.edit_field(FieldEdit::Mobile("01812345678".into())).unwrap();
    }

    // -- edits --

    #[test]
    fn edit_clears_that_fields_error() {
        let store = Arc::new(InMemoryRecordStore::new());
        let mut form = controller(&store);
        assert_matches!(form.next(), NextOutcome::Invalid(_));
        assert!(form.field_error(Field::FullName).is_some());
        assert!(form.field_error(Field::Mobile).is_some());

        form.edit_field(FieldEdit::FullName("Karim".into())).unwrap();
        assert!(form.field_error(Field::FullName).is_none());
        assert!(form.field_error(Field::Mobile).is_some());
    }

    #[test]
    fn errors_are_translated() {
        let store = Arc::new(InMemoryRecordStore::new());
        let mut form = controller(&store);
        form.edit_field(FieldEdit::FullName("K".into())).unwrap();
        form.next();
        assert_eq!(
            form.field_error(Field::FullName),
            Some("Name must be at least 2 characters")
        );
    }

    // -- next --

    #[test]
    fn step1_next_issues_a_check_and_sets_checking() {
        let store = Arc::new(InMemoryRecordStore::new());
        let mut form = controller(&store);
        fill_contact(&mut form);

        let pending = assert_matches!(form.next(), NextOutcome::CheckPending(p) => p);
        assert_eq!(pending.token(), 1);
        assert!(form.is_checking());
        assert_matches!(form.next(), NextOutcome::Busy);
        assert_eq!(form.state(), FormState::Step1);
    }

    #[tokio::test]
    async fn unique_check_advances_to_step2() {
        let store = Arc::new(InMemoryRecordStore::new());
        let mut form = controller(&store);
        fill_contact(&mut form);
        assert_matches!(form.advance().await, NextOutcome::Advanced(Step::SocialLinks));
        assert_eq!(form.state(), FormState::Step2);
        assert!(!form.is_checking());
    }

    #[test]
    fn step4_next_is_unavailable() {
        let store = Arc::new(InMemoryRecordStore::new());
        let mut form = controller(&store);
        form.state = FormState::Step4;
        assert_matches!(form.next(), NextOutcome::Unavailable);
    }

    #[test]
    fn report_with_old_token_is_stale() {
        let store = Arc::new(InMemoryRecordStore::new());
        let mut form = controller(&store);
        fill_contact(&mut form);
        assert_matches!(form.next(), NextOutcome::CheckPending(_));

        let outcome = form.apply_check(CheckReport {
            token: 0,
            outcome: DuplicateOutcome::Unique,
        });
        assert_matches!(outcome, NextOutcome::Stale);
        assert!(form.is_checking());
    }

    #[test]
    fn fail_open_advances_on_check_failure() {
        let store = Arc::new(InMemoryRecordStore::new());
        let mut form = controller(&store);
        fill_contact(&mut form);
        let token = assert_matches!(form.next(), NextOutcome::CheckPending(p) => p.token());
        let outcome = form.apply_check(CheckReport {
            token,
            outcome: DuplicateOutcome::CheckFailed("connection reset".into()),
        });
        assert_matches!(outcome, NextOutcome::Advanced(Step::SocialLinks));
        assert_eq!(form.duplicate_error(), None);
    }

    // -- prev --

    #[test]
    fn prev_on_step1_does_nothing() {
        let store = Arc::new(InMemoryRecordStore::new());
        let mut form = controller(&store);
        assert_eq!(form.prev(), None);
        assert_eq!(form.state(), FormState::Step1);
    }

    // -- submit --

    #[test]
    fn submit_outside_step4_is_unavailable() {
        let store = Arc::new(InMemoryRecordStore::new());
        let mut form = controller(&store);
        assert_matches!(form.begin_submit(), SubmitStart::Unavailable);
    }

    #[test]
    fn submit_requires_organization_when_affiliated() {
        let store = Arc::new(InMemoryRecordStore::new());
        let mut form = controller(&store).with_application(VolunteerApplication {
            full_name: "Karim Rahman".into(),
            mobile: "01812345678".into(),
            volunteer_types: [VolunteerType::Any].into(),
            has_organization: true,
            ..Default::default()
        });
        form.state = FormState::Step4;

        let errors = assert_matches!(form.begin_submit(), SubmitStart::Invalid(e) => e);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[&Field::Organization], MessageKey::OrganizationRequired);
        assert_eq!(form.state(), FormState::Step4);
        assert_eq!(store.insert_calls(), 0);
    }

    #[test]
    fn stale_submission_report_is_discarded() {
        let store = Arc::new(InMemoryRecordStore::new());
        let mut form = controller(&store);
        let outcome = form.finish_submit(SubmissionReport {
            token: 9,
            outcome: Ok(1),
        });
        assert_matches!(outcome, SubmitOutcome::Discarded);
        assert_eq!(form.state(), FormState::Step1);
    }

    #[test]
    fn snapshot_reflects_session() {
        let store = Arc::new(InMemoryRecordStore::new());
        let mut form = controller(&store);
        fill_contact(&mut form);
        form.state = FormState::Step3;

        let snapshot = form.snapshot();
        assert_eq!(snapshot.step, 3);
        assert_eq!(snapshot.total_steps, 4);
        assert_eq!(snapshot.state, "step3");
        assert_eq!(snapshot.progress, 0.75);
        assert_eq!(snapshot.application.full_name, "Karim Rahman");
        assert_eq!(
            form.session(),
            FormSession {
                step: 3,
                submitting: false,
                duplicate_error: None,
            }
        );
    }
}
