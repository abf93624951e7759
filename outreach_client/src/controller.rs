use std::{collections::BTreeMap, fmt};

use outreach_models::contact::{
    validation::{validate_field, FieldError},
    ContactField, ContactFormInput,
};
use tracing::{debug, warn};

use crate::api::{ContactApi, ContactApiResponse};

pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";
pub const NETWORK_ERROR_MESSAGE: &str =
    "Unable to send message. Please try again or email us directly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Validating,
    /// At least one field failed validation, nothing was sent.
    Invalid,
    /// The request is in flight and the submit control is disabled.
    Submitting,
    Success,
    Error,
}

/// Feedback shown below the form after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMessage {
    Success,
    Error(String),
}

/// Called with the new state and whether the submit control is enabled on
/// every state change.
pub type TransitionListener = Box<dyn FnMut(FormState, bool) + Send>;

/// Drives the contact form from user input to a submission.
///
/// A submission always ends in [`FormState::Idle`]; the state it passed
/// through before is returned by [`submit`](Self::submit).
pub struct ContactFormController<Api> {
    api: Api,
    form: ContactFormInput,
    state: FormState,
    field_errors: BTreeMap<ContactField, FieldError>,
    focus: Option<ContactField>,
    submit_enabled: bool,
    message: Option<FormMessage>,
    listener: Option<TransitionListener>,
}

impl<Api: ContactApi> ContactFormController<Api> {
    pub fn new(api: Api) -> Self {
        Self {
            api,
            form: ContactFormInput::default(),
            state: FormState::Idle,
            field_errors: BTreeMap::new(),
            focus: None,
            submit_enabled: true,
            message: None,
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: impl FnMut(FormState, bool) + Send + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn form(&self) -> &ContactFormInput {
        &self.form
    }

    pub fn field_error(&self, field: ContactField) -> Option<&FieldError> {
        self.field_errors.get(&field)
    }

    /// Fields that currently show an error, in form order.
    pub fn field_errors(&self) -> impl Iterator<Item = &FieldError> {
        self.field_errors.values()
    }

    /// The field that should receive the input focus.
    pub fn focus(&self) -> Option<ContactField> {
        self.focus
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn message(&self) -> Option<&FormMessage> {
        self.message.as_ref()
    }

    /// Updates the value of a field. Like typing into it, this clears the
    /// field's error.
    pub fn set(&mut self, field: ContactField, value: impl Into<String>) {
        let value = Some(value.into());
        match field {
            ContactField::Name => self.form.name = value,
            ContactField::Organization => self.form.organization = value,
            ContactField::Role => self.form.role = value,
            ContactField::Email => self.form.email = value,
            ContactField::Phone => self.form.phone = value,
            ContactField::Message => self.form.message = value,
            ContactField::Consent => self.form.consent = value,
        }
        self.clear_field_error(field);
    }

    pub fn set_honeypot(&mut self, value: impl Into<String>) {
        self.form.website = Some(value.into());
    }

    /// Validates a single field, e.g. when it loses focus, and updates its
    /// error.
    pub fn validate_field(&mut self, field: ContactField) -> bool {
        match validate_field(field, self.form.get(field)) {
            Ok(()) => {
                self.field_errors.remove(&field);
                true
            }
            Err(err) => {
                self.field_errors.insert(field, err);
                false
            }
        }
    }

    pub fn clear_field_error(&mut self, field: ContactField) {
        self.field_errors.remove(&field);
    }

    pub async fn submit(&mut self) -> FormState {
        self.message = None;
        self.transition(FormState::Validating);

        let mut valid = true;
        for field in ContactField::ALL {
            valid &= self.validate_field(field);
        }

        if !valid {
            self.focus = self.field_errors.keys().next().copied();
            return self.finish(FormState::Invalid);
        }

        if self.form.honeypot_filled() {
            debug!("honeypot filled, not contacting the server");
            self.message = Some(FormMessage::Success);
            return self.finish(FormState::Success);
        }

        self.submit_enabled = false;
        self.transition(FormState::Submitting);

        let outcome = match self.api.submit(self.form.clone()).await {
            Ok(ContactApiResponse { success: true, .. }) => {
                self.form = ContactFormInput::default();
                self.message = Some(FormMessage::Success);
                FormState::Success
            }
            Ok(ContactApiResponse { message, .. }) => {
                let message = message
                    .filter(|x| !x.is_empty())
                    .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.into());
                self.message = Some(FormMessage::Error(message));
                FormState::Error
            }
            Err(err) => {
                warn!("Failed to submit contact form: {err:#}");
                self.message = Some(FormMessage::Error(NETWORK_ERROR_MESSAGE.into()));
                FormState::Error
            }
        };

        self.submit_enabled = true;
        self.finish(outcome)
    }

    fn finish(&mut self, outcome: FormState) -> FormState {
        self.transition(outcome);
        self.transition(FormState::Idle);
        outcome
    }

    fn transition(&mut self, state: FormState) {
        debug!(from = ?self.state, to = ?state, "form state changed");
        self.state = state;
        if let Some(listener) = &mut self.listener {
            listener(state, self.submit_enabled);
        }
    }
}

impl<Api: fmt::Debug> fmt::Debug for ContactFormController<Api> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactFormController")
            .field("api", &self.api)
            .field("state", &self.state)
            .field("field_errors", &self.field_errors)
            .field("focus", &self.focus)
            .field("submit_enabled", &self.submit_enabled)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use anyhow::anyhow;
    use outreach_models::contact::validation::RuleViolation;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::api::{tests::serve_pending, HttpContactApi, MockContactApi};

    fn fill<Api: ContactApi>(sut: &mut ContactFormController<Api>) {
        sut.set(ContactField::Name, "Jane Doe");
        sut.set(ContactField::Organization, "Acme Corp");
        sut.set(ContactField::Role, "CTO");
        sut.set(ContactField::Email, "jane@example.com");
        sut.set(ContactField::Message, "We would like to talk.");
        sut.set(ContactField::Consent, "on");
    }

    fn api(response: anyhow::Result<ContactApiResponse>) -> MockContactApi {
        let mut api = MockContactApi::new();
        api.expect_submit()
            .once()
            .return_once(|_| Box::pin(std::future::ready(response)));
        api
    }

    fn recorder() -> (
        Arc<Mutex<Vec<(FormState, bool)>>>,
        impl FnMut(FormState, bool) + Send + 'static,
    ) {
        let transitions = Arc::new(Mutex::new(Vec::new()));
        let listener = {
            let transitions = Arc::clone(&transitions);
            move |state, enabled| transitions.lock().unwrap().push((state, enabled))
        };
        (transitions, listener)
    }

    #[tokio::test]
    async fn success() {
        // Arrange
        let (transitions, listener) = recorder();
        let mut sut = ContactFormController::new(api(Ok(ContactApiResponse {
            success: true,
            message: Some("Message sent successfully".into()),
        })))
        .with_listener(listener);
        fill(&mut sut);

        // Act
        let result = sut.submit().await;

        // Assert
        assert_eq!(result, FormState::Success);
        assert_eq!(sut.state(), FormState::Idle);
        assert_eq!(sut.message(), Some(&FormMessage::Success));
        assert_eq!(sut.form(), &ContactFormInput::default());
        assert!(sut.submit_enabled());
        assert_eq!(
            *transitions.lock().unwrap(),
            [
                (FormState::Validating, true),
                (FormState::Submitting, false),
                (FormState::Success, true),
                (FormState::Idle, true),
            ]
        );
    }

    #[tokio::test]
    async fn invalid() {
        // Arrange
        let (transitions, listener) = recorder();
        let mut sut = ContactFormController::new(MockContactApi::new()).with_listener(listener);
        fill(&mut sut);
        sut.set(ContactField::Email, "not-an-email");
        sut.set(ContactField::Message, "too short");

        // Act
        let result = sut.submit().await;

        // Assert
        assert_eq!(result, FormState::Invalid);
        assert_eq!(sut.focus(), Some(ContactField::Email));
        assert_eq!(
            sut.field_errors()
                .map(|err| (err.field, err.violation))
                .collect::<Vec<_>>(),
            [
                (ContactField::Email, RuleViolation::Pattern),
                (ContactField::Message, RuleViolation::MinLength(10)),
            ]
        );
        assert_eq!(
            sut.field_error(ContactField::Message).unwrap().to_string(),
            "Please enter your message (at least 10 characters)"
        );
        assert_eq!(
            *transitions.lock().unwrap(),
            [
                (FormState::Validating, true),
                (FormState::Invalid, true),
                (FormState::Idle, true),
            ]
        );
    }

    #[tokio::test]
    async fn honeypot() {
        // Arrange
        let mut sut = ContactFormController::new(MockContactApi::new());
        fill(&mut sut);
        sut.set_honeypot("http://spam.example");

        // Act
        let result = sut.submit().await;

        // Assert
        assert_eq!(result, FormState::Success);
        assert_eq!(sut.message(), Some(&FormMessage::Success));
    }

    #[tokio::test]
    async fn server_error() {
        // Arrange
        let mut sut = ContactFormController::new(api(Ok(ContactApiResponse {
            success: false,
            message: Some("Too many requests. Please try again later.".into()),
        })));
        fill(&mut sut);

        // Act
        let result = sut.submit().await;

        // Assert
        assert_eq!(result, FormState::Error);
        assert_eq!(
            sut.message(),
            Some(&FormMessage::Error(
                "Too many requests. Please try again later.".into()
            ))
        );
        assert!(sut.submit_enabled());
        assert_eq!(sut.form().name.as_deref(), Some("Jane Doe"));
    }

    #[tokio::test]
    async fn server_error_without_message() {
        // Arrange
        let mut sut = ContactFormController::new(api(Ok(ContactApiResponse {
            success: false,
            message: None,
        })));
        fill(&mut sut);

        // Act
        let result = sut.submit().await;

        // Assert
        assert_eq!(result, FormState::Error);
        assert_eq!(
            sut.message(),
            Some(&FormMessage::Error(GENERIC_ERROR_MESSAGE.into()))
        );
    }

    #[tokio::test]
    async fn network_error() {
        // Arrange
        let mut sut = ContactFormController::new(api(Err(anyhow!("connection refused"))));
        fill(&mut sut);

        // Act
        let result = sut.submit().await;

        // Assert
        assert_eq!(result, FormState::Error);
        assert_eq!(
            sut.message(),
            Some(&FormMessage::Error(NETWORK_ERROR_MESSAGE.into()))
        );
        assert!(sut.submit_enabled());
        assert_eq!(sut.state(), FormState::Idle);
    }

    #[tokio::test]
    async fn endpoint_never_responds() {
        // Arrange
        let (transitions, listener) = recorder();
        let api = HttpContactApi::new(serve_pending().await, Duration::from_millis(200)).unwrap();
        let mut sut = ContactFormController::new(api).with_listener(listener);
        fill(&mut sut);

        // Act
        let result = tokio::time::timeout(Duration::from_secs(5), sut.submit())
            .await
            .unwrap();

        // Assert
        assert_eq!(result, FormState::Error);
        assert_eq!(
            sut.message(),
            Some(&FormMessage::Error(NETWORK_ERROR_MESSAGE.into()))
        );
        assert!(sut.submit_enabled());
        assert_eq!(
            *transitions.lock().unwrap(),
            [
                (FormState::Validating, true),
                (FormState::Submitting, false),
                (FormState::Error, true),
                (FormState::Idle, true),
            ]
        );
    }

    #[test]
    fn field_feedback() {
        let mut sut = ContactFormController::new(MockContactApi::new());

        sut.set(ContactField::Name, "J");
        assert!(!sut.validate_field(ContactField::Name));
        assert_eq!(
            sut.field_error(ContactField::Name).unwrap().to_string(),
            "Please enter your full name"
        );

        sut.set(ContactField::Name, "Ja");
        assert!(sut.field_error(ContactField::Name).is_none());

        sut.set(ContactField::Name, "J");
        sut.validate_field(ContactField::Name);
        sut.clear_field_error(ContactField::Name);
        assert!(sut.field_error(ContactField::Name).is_none());

        assert!(sut.validate_field(ContactField::Phone));
    }
}
