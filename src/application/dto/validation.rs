use std::collections::BTreeMap;

use crate::domain::value_objects::Email;
use crate::presentation::middleware::error::AppError;

/// Body-level validation run after deserialization
pub trait Validate {
    /// # Errors
    /// Returns [`AppError::Validation`] listing every invalid field
    fn validate(&self) -> Result<(), AppError>;
}

/// Collects per-field messages; the first message for a field wins
#[derive(Debug, Default)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// Record `message` for `field` unless `ok` holds
    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) {
        if !ok {
            self.add(field, message);
        }
    }

    /// Non-blank text of at most `max` characters
    pub fn text(&mut self, field: &str, value: &str, max: usize) {
        if value.trim().is_empty() {
            self.add(field, "Must not be empty");
        } else if value.chars().count() > max {
            self.add(field, format!("Must be at most {max} characters"));
        }
    }

    /// Same as [`Self::text`] when present
    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(value) = value {
            self.text(field, value, max);
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if let Err(e) = Email::parse(value) {
            self.add(field, e.to_string());
        }
    }

    pub fn password(&mut self, field: &str, value: &str) {
        use crate::infrastructure::auth::password::{MAX_PASSWORD_LEN, MIN_PASSWORD_LEN};

        let len = value.chars().count();
        if len < MIN_PASSWORD_LEN {
            self.add(field, format!("Must be at least {MIN_PASSWORD_LEN} characters"));
        } else if len > MAX_PASSWORD_LEN {
            self.add(field, format!("Must be at most {MAX_PASSWORD_LEN} characters"));
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// # Errors
    /// Returns [`AppError::Validation`] when any field was recorded
    pub fn finish(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation { errors: self.0 })
        }
    }
}
