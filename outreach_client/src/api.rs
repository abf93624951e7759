use std::{future::Future, time::Duration};

use anyhow::Context;
use outreach_models::contact::ContactFormInput;
use outreach_utils::{outreach_version, trace_instrument};
use serde::{Deserialize, Serialize};
use url::Url;

/// The contact form endpoint of the server.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait ContactApi: Send + Sync + 'static {
    /// Posts the form and returns the result reported by the server,
    /// regardless of the http status code.
    fn submit(
        &self,
        form: ContactFormInput,
    ) -> impl Future<Output = anyhow::Result<ContactApiResponse>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContactApiResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Upper bound for a whole request, including reading the response.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpContactApi {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpContactApi {
    pub fn new(endpoint: Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("outreach-client/{}", outreach_version()))
            .timeout(timeout)
            .build()
            .context("Failed to build http client")?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl ContactApi for HttpContactApi {
    #[trace_instrument(skip(self, form))]
    async fn submit(&self, form: ContactFormInput) -> anyhow::Result<ContactApiResponse> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&FormBody::from(&form))
            .send()
            .await
            .context("Failed to reach the contact endpoint")?;

        let status = response.status();
        response
            .json()
            .await
            .with_context(|| format!("Invalid response from the contact endpoint ({status})"))
    }
}

#[derive(Serialize)]
struct FormBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    consent: Option<&'a str>,
    website: &'a str,
}

impl<'a> From<&'a ContactFormInput> for FormBody<'a> {
    fn from(value: &'a ContactFormInput) -> Self {
        Self {
            name: value.name.as_deref(),
            organization: value.organization.as_deref(),
            role: value.role.as_deref(),
            email: value.email.as_deref(),
            phone: value.phone.as_deref(),
            message: value.message.as_deref(),
            consent: value.consent.as_deref(),
            website: value.website.as_deref().unwrap_or_default(),
        }
    }
}
