use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized (trimmed, lower-cased) e-mail address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Maximum length accepted for an address (RFC 5321 path limit)
    pub const MAX_LEN: usize = 254;

    /// Parse and normalize an e-mail address
    ///
    /// # Errors
    /// Returns an error if the address is empty, too long, or not of the form `local@domain.tld`
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let email = raw.trim().to_lowercase();

        if email.is_empty() {
            return Err(EmailError::Empty);
        }
        if email.len() > Self::MAX_LEN {
            return Err(EmailError::TooLong(email.len()));
        }

        let Some((local, domain)) = email.split_once('@') else {
            return Err(EmailError::InvalidFormat);
        };

        let domain_ok = domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !domain.contains("..");
        if local.is_empty() || domain.contains('@') || !domain_ok || email.contains(char::is_whitespace)
        {
            return Err(EmailError::InvalidFormat);
        }

        Ok(Self(email))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email is required")]
    Empty,
    #[error("Email is too long ({0} characters)")]
    TooLong(usize),
    #[error("Email format is invalid")]
    InvalidFormat,
}
