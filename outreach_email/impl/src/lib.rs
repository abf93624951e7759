use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use lettre::{
    message::{header::ContentType, Mailbox, MessageBuilder},
    transport::smtp::authentication::Credentials,
    AsyncSendmailTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use outreach_email_contracts::{Email, EmailService};
use outreach_models::email_address::EmailAddressWithName;
use outreach_utils::{trace_instrument, Apply};

#[derive(Debug, Clone)]
pub struct EmailServiceImpl {
    from: Mailbox,
    transport: MailTransport,
    timeout: Duration,
}

/// How outgoing mail leaves the process.
///
/// `Smtp` talks to a mail server directly, `Sendmail` hands the message to a
/// local sendmail-compatible binary, which is used when no smtp server is
/// configured.
#[derive(Debug, Clone)]
pub enum MailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Sendmail {
        transport: Arc<AsyncSendmailTransport<Tokio1Executor>>,
        command: PathBuf,
    },
}

#[derive(Debug, Clone)]
pub struct SmtpTransportConfig {
    pub host: String,
    pub port: u16,
    pub security: SmtpSecurity,
    pub credentials: Option<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// Implicit TLS, usually port 465
    Tls,
    /// STARTTLS upgrade, usually port 587
    StartTls,
    /// Unencrypted, only for local relays and testing
    None,
}

impl MailTransport {
    pub fn smtp(config: &SmtpTransportConfig, timeout: Duration) -> anyhow::Result<Self> {
        let builder = match config.security {
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            }
            SmtpSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            }
        };

        let transport = builder
            .port(config.port)
            .timeout(Some(timeout))
            .apply_map(config.credentials.clone(), |builder, (username, password)| {
                builder.credentials(Credentials::new(username, password))
            })
            .build();

        Ok(Self::Smtp(transport))
    }

    pub fn sendmail(command: impl Into<PathBuf>) -> Self {
        let command = command.into();
        Self::Sendmail {
            transport: Arc::new(AsyncSendmailTransport::new_with_command(command.as_os_str())),
            command,
        }
    }

    async fn send(&self, message: Message) -> anyhow::Result<bool> {
        match self {
            Self::Smtp(transport) => transport
                .send(message)
                .await
                .map(|response| response.is_positive())
                .map_err(Into::into),
            Self::Sendmail { transport, .. } => transport
                .send(message)
                .await
                .map(|()| true)
                .map_err(Into::into),
        }
    }
}

impl EmailServiceImpl {
    pub fn new(from: EmailAddressWithName, transport: MailTransport, timeout: Duration) -> Self {
        Self {
            from: from.0,
            transport,
            timeout,
        }
    }

    fn build_message(&self, email: Email) -> anyhow::Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(email.recipient.0)
            .apply_map(email.reply_to, |builder, reply_to| {
                MessageBuilder::reply_to(builder, reply_to.0)
            })
            .subject(email.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(email.body)
            .context("Failed to build email message")
    }
}

impl EmailService for EmailServiceImpl {
    #[trace_instrument(skip(self))]
    async fn send(&self, email: Email) -> anyhow::Result<bool> {
        let message = self.build_message(email)?;

        tokio::time::timeout(self.timeout, self.transport.send(message))
            .await
            .map_err(|_| anyhow!("timeout"))?
    }

    #[trace_instrument(skip(self))]
    async fn ping(&self) -> anyhow::Result<()> {
        match &self.transport {
            MailTransport::Smtp(transport) => transport
                .test_connection()
                .await?
                .then_some(())
                .ok_or_else(|| anyhow!("Failed to ping smtp server")),
            MailTransport::Sendmail { command, .. } => tokio::fs::metadata(command)
                .await
                .map(|_| ())
                .with_context(|| format!("sendmail command {} not found", command.display())),
        }
    }
}
