use outreach_models::contact::ContactFormInput;
use serde::Deserialize;

/// The raw contact form as posted by the website. Unknown fields are
/// ignored, missing ones are reported by the validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiContactForm {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub consent: Option<String>,
    /// honeypot
    pub website: Option<String>,
}

impl ApiContactForm {
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "name" => &mut self.name,
            "organization" => &mut self.organization,
            "role" => &mut self.role,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "message" => &mut self.message,
            "consent" => &mut self.consent,
            "website" => &mut self.website,
            _ => return,
        };
        *slot = Some(value);
    }
}

impl From<ApiContactForm> for ContactFormInput {
    fn from(value: ApiContactForm) -> Self {
        Self {
            name: value.name,
            organization: value.organization,
            role: value.role,
            email: value.email,
            phone: value.phone,
            message: value.message,
            consent: value.consent,
            website: value.website,
        }
    }
}
