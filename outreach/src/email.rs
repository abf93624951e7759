use anyhow::Context;
use outreach_config::{EmailConfig, SmtpSecurity};
use outreach_email_impl::{EmailServiceImpl, MailTransport, SmtpTransportConfig};

pub const DEFAULT_SENDMAIL_COMMAND: &str = "/usr/sbin/sendmail";

/// Set up the mail transport: smtp if a server is configured, the local
/// sendmail binary otherwise
pub fn connect(config: &EmailConfig) -> anyhow::Result<EmailServiceImpl> {
    let timeout = config.timeout.into();

    let transport = match &config.smtp {
        Some(smtp) => MailTransport::smtp(
            &SmtpTransportConfig {
                host: smtp.host.clone(),
                port: smtp.port,
                security: match smtp.security {
                    SmtpSecurity::Tls => outreach_email_impl::SmtpSecurity::Tls,
                    SmtpSecurity::StartTls => outreach_email_impl::SmtpSecurity::StartTls,
                    SmtpSecurity::None => outreach_email_impl::SmtpSecurity::None,
                },
                credentials: smtp.username.clone().zip(smtp.password.clone()),
            },
            timeout,
        )
        .context("Failed to configure smtp transport")?,
        None => MailTransport::sendmail(
            config
                .sendmail_command
                .clone()
                .unwrap_or_else(|| DEFAULT_SENDMAIL_COMMAND.into()),
        ),
    };

    let from = config.from.clone().with_name(config.from_name.clone());

    Ok(EmailServiceImpl::new(from, transport, timeout))
}
