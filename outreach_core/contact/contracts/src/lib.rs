use std::future::Future;

use outreach_models::contact::{
    ContactFormInput, ContactRequestMetadata, ContactValidationError,
};
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactService: Send + Sync + 'static {
    /// Runs a contact form submission through the abuse checks, validates
    /// it and forwards it to the configured recipient.
    ///
    /// Submissions with a filled honeypot are silently dropped and reported
    /// as successful.
    fn submit(
        &self,
        input: ContactFormInput,
        meta: ContactRequestMetadata,
    ) -> impl Future<Output = Result<(), ContactSubmitError>> + Send;
}

#[derive(Debug, Error)]
pub enum ContactSubmitError {
    #[error(transparent)]
    Validation(#[from] ContactValidationError),
    #[error("Too many requests. Please try again later.")]
    RateLimited,
    #[error("Failed to send message. Please try again.")]
    Send,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockContactService {
    pub fn with_submit(
        mut self,
        input: ContactFormInput,
        meta: ContactRequestMetadata,
        result: Result<(), ContactSubmitError>,
    ) -> Self {
        self.expect_submit()
            .once()
            .with(mockall::predicate::eq(input), mockall::predicate::eq(meta))
            .return_once(|_, _| Box::pin(std::future::ready(result)));
        self
    }
}
