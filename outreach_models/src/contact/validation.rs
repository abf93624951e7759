//! Per-field validation rules of the contact form.
//!
//! The same table is used by the client before a submission is sent and by
//! the server before a submission is accepted.

use std::{borrow::Cow, fmt, sync::LazyLock};

use regex::Regex;

use super::ContactField;

#[derive(Debug)]
pub struct ValidationRule {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<&'static LazyLock<Regex>>,
    pub kind: FieldKind,
    /// Message shown to the user if the field is invalid.
    pub message: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Skips length and pattern checks, the value must be one of
    /// [`CHECKED_VALUES`].
    Checkbox,
}

/// Values a browser (or client) may submit for a checked checkbox.
pub const CHECKED_VALUES: [&str; 3] = ["on", "1", "true"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleViolation {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Pattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: ContactField,
    pub violation: RuleViolation,
}

impl FieldError {
    pub fn message(&self) -> Cow<'static, str> {
        match self.violation {
            RuleViolation::MaxLength(max) => format!("Maximum {max} characters allowed").into(),
            _ => self.field.rule().message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

pub static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\s+()-]*$").unwrap());

static NAME: ValidationRule = ValidationRule {
    required: true,
    min_length: Some(2),
    max_length: Some(100),
    pattern: None,
    kind: FieldKind::Text,
    message: "Please enter your full name",
};

static ORGANIZATION: ValidationRule = ValidationRule {
    required: true,
    min_length: Some(2),
    max_length: Some(200),
    pattern: None,
    kind: FieldKind::Text,
    message: "Please enter your organization name",
};

static ROLE: ValidationRule = ValidationRule {
    required: true,
    min_length: Some(2),
    max_length: Some(100),
    pattern: None,
    kind: FieldKind::Text,
    message: "Please enter your role or title",
};

static EMAIL: ValidationRule = ValidationRule {
    required: true,
    min_length: None,
    max_length: Some(254),
    pattern: Some(&EMAIL_REGEX),
    kind: FieldKind::Text,
    message: "Please enter a valid email address",
};

static PHONE: ValidationRule = ValidationRule {
    required: false,
    min_length: None,
    max_length: Some(20),
    pattern: Some(&PHONE_REGEX),
    kind: FieldKind::Text,
    message: "Please enter a valid phone number",
};

static MESSAGE: ValidationRule = ValidationRule {
    required: true,
    min_length: Some(10),
    max_length: Some(2000),
    pattern: None,
    kind: FieldKind::Text,
    message: "Please enter your message (at least 10 characters)",
};

static CONSENT: ValidationRule = ValidationRule {
    required: true,
    min_length: None,
    max_length: None,
    pattern: None,
    kind: FieldKind::Checkbox,
    message: "Please acknowledge that you understand this is B2B only",
};

pub(super) fn rule(field: ContactField) -> &'static ValidationRule {
    match field {
        ContactField::Name => &NAME,
        ContactField::Organization => &ORGANIZATION,
        ContactField::Role => &ROLE,
        ContactField::Email => &EMAIL,
        ContactField::Phone => &PHONE,
        ContactField::Message => &MESSAGE,
        ContactField::Consent => &CONSENT,
    }
}

pub fn is_checked(value: &str) -> bool {
    CHECKED_VALUES.contains(&value.trim())
}

/// Checks a raw field value against the rule of `field`.
///
/// The value is trimmed first, so whitespace-only values count as absent.
/// Rules are applied in the order required, min length, max length, pattern;
/// if several fail, the last one is reported.
pub fn validate_field(field: ContactField, raw: Option<&str>) -> Result<(), FieldError> {
    let rule = field.rule();
    let value = raw.unwrap_or_default().trim();

    let mut violation = None;
    match rule.kind {
        FieldKind::Checkbox => {
            if rule.required && !is_checked(value) {
                violation = Some(RuleViolation::Required);
            }
        }
        FieldKind::Text if value.is_empty() => {
            if rule.required {
                violation = Some(RuleViolation::Required);
            }
        }
        FieldKind::Text => {
            let length = value.chars().count();
            if let Some(min) = rule.min_length.filter(|&min| length < min) {
                violation = Some(RuleViolation::MinLength(min));
            }
            if let Some(max) = rule.max_length.filter(|&max| length > max) {
                violation = Some(RuleViolation::MaxLength(max));
            }
            if rule.pattern.is_some_and(|pattern| !pattern.is_match(value)) {
                violation = Some(RuleViolation::Pattern);
            }
        }
    }

    match violation {
        Some(violation) => Err(FieldError { field, violation }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required() {
        for raw in [None, Some(""), Some("   ")] {
            assert_eq!(
                validate_field(ContactField::Name, raw),
                Err(FieldError {
                    field: ContactField::Name,
                    violation: RuleViolation::Required
                })
            );
        }
    }

    #[test]
    fn optional_empty_is_valid() {
        assert_eq!(validate_field(ContactField::Phone, None), Ok(()));
        assert_eq!(validate_field(ContactField::Phone, Some("  ")), Ok(()));
    }

    #[test]
    fn min_length_boundary() {
        for field in ContactField::ALL {
            let Some(min) = field.rule().min_length else {
                continue;
            };

            let too_short = format!("  {}  ", "a".repeat(min - 1));
            let just_right = format!("  {}  ", "a".repeat(min));

            assert_eq!(
                validate_field(field, Some(&too_short)).map_err(|err| err.violation),
                Err(RuleViolation::MinLength(min)),
                "{field}"
            );
            assert_eq!(validate_field(field, Some(&just_right)), Ok(()), "{field}");
        }
    }

    #[test]
    fn length_counts_characters() {
        // 100 multi-byte characters
        let name = "ä".repeat(100);
        assert_eq!(validate_field(ContactField::Name, Some(&name)), Ok(()));
    }

    #[test]
    fn max_length_message() {
        let err = validate_field(ContactField::Phone, Some(&"1".repeat(21))).unwrap_err();

        assert_eq!(err.violation, RuleViolation::MaxLength(20));
        assert_eq!(err.to_string(), "Maximum 20 characters allowed");
    }

    #[test]
    fn last_violation_wins() {
        // too long and not matching the pattern
        let err = validate_field(ContactField::Phone, Some(&"x".repeat(21))).unwrap_err();

        assert_eq!(err.violation, RuleViolation::Pattern);
        assert_eq!(err.to_string(), "Please enter a valid phone number");
    }

    #[test]
    fn email() {
        for invalid in ["not-an-email", "a@b", "@missing-local.com", "a b@c.de"] {
            assert_eq!(
                validate_field(ContactField::Email, Some(invalid)).map_err(|err| err.violation),
                Err(RuleViolation::Pattern),
                "{invalid}"
            );
        }
        assert_eq!(
            validate_field(ContactField::Email, Some("user@example.com")),
            Ok(())
        );
    }

    #[test]
    fn phone() {
        assert_eq!(
            validate_field(ContactField::Phone, Some("+49 (0) 30-1234")),
            Ok(())
        );
    }

    #[test]
    fn checkbox() {
        for checked in ["on", "1", "true", " on "] {
            assert_eq!(validate_field(ContactField::Consent, Some(checked)), Ok(()));
        }
        for unchecked in [None, Some(""), Some("off"), Some("yes"), Some("0")] {
            let err = validate_field(ContactField::Consent, unchecked).unwrap_err();
            assert_eq!(err.violation, RuleViolation::Required);
            assert_eq!(
                err.to_string(),
                "Please acknowledge that you understand this is B2B only"
            );
        }
    }
}
