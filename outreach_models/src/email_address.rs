use std::{fmt, str::FromStr};

use lettre::{message::Mailbox, Address};
use serde::{Deserialize, Serialize};

/// A syntactically valid email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress(pub Address);

/// An email address with an optional display name, e.g.
/// `Jane Doe <jane@example.com>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddressWithName(pub Mailbox);

impl EmailAddress {
    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }

    pub fn with_name(self, name: impl Into<String>) -> EmailAddressWithName {
        EmailAddressWithName(Mailbox::new(Some(name.into()), self.0))
    }
}

impl EmailAddressWithName {
    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub fn email(&self) -> &str {
        self.0.email.as_ref()
    }
}

impl From<EmailAddress> for EmailAddressWithName {
    fn from(value: EmailAddress) -> Self {
        Self(Mailbox::new(None, value.0))
    }
}

impl FromStr for EmailAddress {
    type Err = lettre::address::AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl FromStr for EmailAddressWithName {
    type Err = lettre::address::AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for EmailAddressWithName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_name() {
        let address = "jane@example.com".parse::<EmailAddress>().unwrap();

        let mailbox = address.with_name("Jane Doe");

        assert_eq!(mailbox.name(), Some("Jane Doe"));
        assert_eq!(mailbox.email(), "jane@example.com");
    }

    #[test]
    fn parse_mailbox() {
        let mailbox = "Website <contact@example.com>"
            .parse::<EmailAddressWithName>()
            .unwrap();

        assert_eq!(mailbox.name(), Some("Website"));
        assert_eq!(mailbox.email(), "contact@example.com");
    }
}
