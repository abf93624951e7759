use chrono::{DateTime, SecondsFormat, Utc};
use outreach_core_contact_contracts::{ContactService, ContactSubmitError};
use outreach_email_contracts::{Email, EmailService};
use outreach_models::{
    contact::{ContactFormInput, ContactRequestMetadata, ContactSubmission},
    email_address::EmailAddressWithName,
};
use outreach_persistence_contracts::SubmissionLogRepository;
use outreach_shared_contracts::{
    rate_limit::{RateLimitDecision, RateLimitService},
    time::TimeService,
};
use outreach_utils::trace_instrument;
use tracing::{debug, error, warn};

#[derive(Debug, Clone)]
pub struct ContactServiceImpl<Time, RateLimit, Email, SubmissionLog> {
    time: Time,
    rate_limit: RateLimit,
    email: Email,
    submission_log: SubmissionLog,
    config: ContactServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ContactServiceConfig {
    /// Mailbox that receives the contact requests.
    pub recipient: EmailAddressWithName,
}

impl<Time, RateLimit, Email, SubmissionLog> ContactServiceImpl<Time, RateLimit, Email, SubmissionLog> {
    pub fn new(
        time: Time,
        rate_limit: RateLimit,
        email: Email,
        submission_log: SubmissionLog,
        config: ContactServiceConfig,
    ) -> Self {
        Self {
            time,
            rate_limit,
            email,
            submission_log,
            config,
        }
    }
}

impl<Time, RateLimit, EmailS, SubmissionLog> ContactService
    for ContactServiceImpl<Time, RateLimit, EmailS, SubmissionLog>
where
    Time: TimeService,
    RateLimit: RateLimitService,
    EmailS: EmailService,
    SubmissionLog: SubmissionLogRepository,
{
    #[trace_instrument(skip(self, input))]
    async fn submit(
        &self,
        input: ContactFormInput,
        meta: ContactRequestMetadata,
    ) -> Result<(), ContactSubmitError> {
        if input.honeypot_filled() {
            debug!("honeypot field filled, dropping submission");
            return Ok(());
        }

        let now = self.time.now();

        match self
            .rate_limit
            .check(&meta.client_ip.to_string(), now)
            .await?
        {
            RateLimitDecision::Allowed => {}
            RateLimitDecision::Limited => return Err(ContactSubmitError::RateLimited),
        }

        let submission = input.validate()?;
        let organization = submission.organization.clone();

        let email = Email {
            recipient: self.config.recipient.clone(),
            subject: format!(
                "New Consultation Request from {} - {}",
                submission.name, submission.organization
            ),
            body: format_body(&submission, &meta, now),
            reply_to: Some(submission.email.with_name(submission.name)),
        };

        match self.email.send(email).await {
            Ok(true) => {}
            Ok(false) => {
                error!("mail transport rejected the contact message");
                return Err(ContactSubmitError::Send);
            }
            Err(err) => {
                error!("Failed to send contact message: {err:#}");
                return Err(ContactSubmitError::Send);
            }
        }

        if let Err(err) = self.submission_log.record(&organization, now).await {
            warn!("Failed to write submission log: {err:#}");
        }

        Ok(())
    }
}

fn format_body(
    submission: &ContactSubmission,
    meta: &ContactRequestMetadata,
    now: DateTime<Utc>,
) -> String {
    format!(
        "New Contact Form Submission\n\
         ============================\n\
         \n\
         Name: {name}\n\
         Organization: {organization}\n\
         Role/Title: {role}\n\
         Email: {email}\n\
         Phone: {phone}\n\
         \n\
         Message:\n\
         ---------\n\
         {message}\n\
         \n\
         ---\n\
         Submitted: {time} (unix {timestamp})\n\
         IP: {ip}\n\
         User Agent: {user_agent}\n",
        name = submission.name,
        organization = submission.organization,
        role = submission.role,
        email = submission.email,
        phone = submission.phone.as_deref().unwrap_or_default(),
        message = submission.message,
        time = now.to_rfc3339_opts(SecondsFormat::Secs, true),
        timestamp = now.timestamp(),
        ip = meta.client_ip,
        user_agent = meta.user_agent.as_deref().unwrap_or("unknown"),
    )
}
