use anyhow::bail;
use clap::{Args, Subcommand};
use outreach_client::{
    api::HttpContactApi,
    controller::{ContactFormController, FormMessage, FormState},
};
use outreach_config::Duration;
use outreach_models::contact::ContactField;
use tracing::info;
use url::Url;

#[derive(Debug, Subcommand)]
pub enum ContactCommand {
    /// Submit the contact form of a deployed website
    Submit {
        /// Url of the contact form endpoint
        #[arg(long, default_value = "http://127.0.0.1:8000/server/send-contact")]
        endpoint: Url,
        /// Give up if the endpoint does not respond in time
        #[arg(long, default_value = "10s")]
        timeout: Duration,
        #[command(flatten)]
        form: ContactFormArgs,
    },
}

#[derive(Debug, Args)]
pub struct ContactFormArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    organization: String,
    #[arg(long)]
    role: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    message: String,
    /// Acknowledge that the service is offered to businesses only
    #[arg(long)]
    consent: bool,
}

impl ContactCommand {
    pub async fn invoke(self) -> anyhow::Result<()> {
        match self {
            ContactCommand::Submit {
                endpoint,
                timeout,
                form,
            } => submit(endpoint, timeout, form).await,
        }
    }
}

async fn submit(endpoint: Url, timeout: Duration, form: ContactFormArgs) -> anyhow::Result<()> {
    let api = HttpContactApi::new(endpoint, timeout.into())?;
    let mut controller = ContactFormController::new(api).with_listener(|state, _| {
        if state == FormState::Submitting {
            info!("Submitting contact form");
        }
    });

    controller.set(ContactField::Name, form.name);
    controller.set(ContactField::Organization, form.organization);
    controller.set(ContactField::Role, form.role);
    controller.set(ContactField::Email, form.email);
    if let Some(phone) = form.phone {
        controller.set(ContactField::Phone, phone);
    }
    controller.set(ContactField::Message, form.message);
    if form.consent {
        controller.set(ContactField::Consent, "on");
    }

    match controller.submit().await {
        FormState::Success => {
            println!("Message sent successfully");
            Ok(())
        }
        FormState::Invalid => {
            for err in controller.field_errors() {
                eprintln!("{}: {err}", err.field);
            }
            bail!("Invalid contact form")
        }
        _ => match controller.message() {
            Some(FormMessage::Error(message)) => bail!("{message}"),
            _ => bail!("Failed to submit contact form"),
        },
    }
}
