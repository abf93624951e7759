use std::{fmt, net::IpAddr};

use thiserror::Error;
use validation::{validate_field, FieldError, RuleViolation, ValidationRule};

use crate::email_address::EmailAddress;

pub mod sanitize;
pub mod validation;

/// A field of the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContactField {
    Name,
    Organization,
    Role,
    Email,
    Phone,
    Message,
    Consent,
}

impl ContactField {
    /// All fields in the order they appear on the form.
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::Organization,
        Self::Role,
        Self::Email,
        Self::Phone,
        Self::Message,
        Self::Consent,
    ];

    /// The form field name as submitted by the browser.
    pub fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Organization => "organization",
            Self::Role => "role",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Message => "message",
            Self::Consent => "consent",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Organization => "Organization",
            Self::Role => "Role",
            Self::Email => "Email address",
            Self::Phone => "Phone number",
            Self::Message => "Message",
            Self::Consent => "Consent",
        }
    }

    pub fn rule(self) -> &'static ValidationRule {
        validation::rule(self)
    }

    /// Number of characters kept by the sanitizer.
    pub fn sanitized_length(self) -> usize {
        match self {
            Self::Name | Self::Role => 100,
            Self::Organization => 200,
            Self::Email => 254,
            Self::Phone => 20,
            Self::Message => 2000,
            Self::Consent => 8,
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The raw fields of a contact form submission.
///
/// `website` is the honeypot: it is hidden from humans and must stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFormInput {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub consent: Option<String>,
    pub website: Option<String>,
}

/// A validated and sanitized contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub organization: String,
    pub role: String,
    pub email: EmailAddress,
    pub phone: Option<String>,
    pub message: String,
}

/// Information about the http request that carried a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRequestMetadata {
    pub client_ip: IpAddr,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContactValidationError {
    #[error("Missing required field: {0}")]
    MissingField(ContactField),
    #[error("You must acknowledge the B2B-only policy")]
    ConsentRequired,
    #[error("{} is too short", .0.label())]
    TooShort(ContactField),
    #[error("{} is too long", .0.label())]
    TooLong(ContactField),
    #[error("Invalid {}", .0.label().to_lowercase())]
    Invalid(ContactField),
}

impl ContactFormInput {
    pub fn get(&self, field: ContactField) -> Option<&str> {
        match field {
            ContactField::Name => self.name.as_deref(),
            ContactField::Organization => self.organization.as_deref(),
            ContactField::Role => self.role.as_deref(),
            ContactField::Email => self.email.as_deref(),
            ContactField::Phone => self.phone.as_deref(),
            ContactField::Message => self.message.as_deref(),
            ContactField::Consent => self.consent.as_deref(),
        }
    }

    pub fn honeypot_filled(&self) -> bool {
        self.website.as_deref().is_some_and(|x| !x.is_empty())
    }

    /// Runs the per-field rules on every field and returns the failing ones
    /// in form order.
    pub fn field_errors(&self) -> Vec<FieldError> {
        ContactField::ALL
            .into_iter()
            .filter_map(|field| validate_field(field, self.get(field)).err())
            .collect()
    }

    /// Authoritative validation of a submission.
    ///
    /// Presence of the required fields is checked first, then the consent
    /// checkbox, then the remaining rules of each field. Values that pass are
    /// sanitized, and the required and minimum length checks are repeated on
    /// the sanitized values, so markup alone does not count as content.
    pub fn validate(&self) -> Result<ContactSubmission, ContactValidationError> {
        for field in ContactField::ALL.into_iter().filter(|f| f.rule().required) {
            if self.get(field).map_or(true, |x| x.trim().is_empty()) {
                return Err(ContactValidationError::MissingField(field));
            }
        }

        if validate_field(ContactField::Consent, self.get(ContactField::Consent)).is_err() {
            return Err(ContactValidationError::ConsentRequired);
        }

        for field in ContactField::ALL {
            if let Err(err) = validate_field(field, self.get(field)) {
                return Err(match err.violation {
                    RuleViolation::Required => ContactValidationError::MissingField(field),
                    RuleViolation::MinLength(_) => ContactValidationError::TooShort(field),
                    RuleViolation::MaxLength(_) => ContactValidationError::TooLong(field),
                    RuleViolation::Pattern => ContactValidationError::Invalid(field),
                });
            }
        }

        let clean = |field: ContactField| {
            let value =
                sanitize::sanitize(self.get(field).unwrap_or_default(), field.sanitized_length());
            let rule = field.rule();
            if rule.required && value.is_empty() {
                return Err(ContactValidationError::MissingField(field));
            }
            if rule
                .min_length
                .is_some_and(|min| !value.is_empty() && value.chars().count() < min)
            {
                return Err(ContactValidationError::TooShort(field));
            }
            Ok(value)
        };

        let name = clean(ContactField::Name)?;
        let organization = clean(ContactField::Organization)?;
        let role = clean(ContactField::Role)?;
        let email = clean(ContactField::Email)?
            .parse::<EmailAddress>()
            .map_err(|_| ContactValidationError::Invalid(ContactField::Email))?;
        let phone = Some(clean(ContactField::Phone)?).filter(|x| !x.is_empty());
        let message = clean(ContactField::Message)?;

        Ok(ContactSubmission {
            name,
            organization,
            role,
            email,
            phone,
            message,
        })
    }
}
