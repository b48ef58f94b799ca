//! Field-level form validation.
//!
//! Validation collects one message per failing field so a form can show every
//! problem at once. Inputs are trimmed before their length is checked.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::email::{Email, EmailError};

/// Field name to message map describing why a submission was rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an error set with a single failing field.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message for `field`. The first message per field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_owned())
            .or_insert_with(|| message.into());
    }

    /// Returns true if no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Iterate over failing fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `Ok(value)` if nothing failed, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }

    /// Check that a trimmed text field has between `min` and `max` characters.
    ///
    /// Returns the trimmed value either way so callers can keep building.
    pub fn text(&mut self, field: &str, label: &str, value: &str, min: usize, max: usize) -> String {
        let trimmed = value.trim();
        let len = trimmed.chars().count();
        if len < min {
            self.add(field, format!("{label} is required"));
        } else if len > max {
            self.add(field, format!("{label} must be less than {max} characters"));
        }
        trimmed.to_owned()
    }

    /// Check an optional text field: blank becomes `None`, otherwise at most `max` characters.
    pub fn optional_text(
        &mut self,
        field: &str,
        label: &str,
        value: Option<&str>,
        max: usize,
    ) -> Option<String> {
        let trimmed = value.map(str::trim).filter(|v| !v.is_empty())?;
        if trimmed.chars().count() > max {
            self.add(field, format!("{label} must be less than {max} characters"));
        }
        Some(trimmed.to_owned())
    }

    /// Parse an email field, recording a message on failure.
    pub fn email(&mut self, field: &str, value: &str) -> Option<Email> {
        match Email::parse(value) {
            Ok(email) => Some(email),
            Err(EmailError::TooLong { max }) => {
                self.add(field, format!("Email must be less than {max} characters"));
                None
            }
            Err(_) => {
                self.add(field, "Invalid email address");
                None
            }
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("validation failed")?;
        for (i, (field, message)) in self.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// A validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: Email,
    pub message: String,
}

impl ContactSubmission {
    /// Maximum name length.
    pub const NAME_MAX: usize = 100;
    /// Maximum message length.
    pub const MESSAGE_MAX: usize = 1000;

    /// Validate raw form input.
    ///
    /// - `name`: 1-100 characters after trimming
    /// - `email`: a valid address of at most 255 characters
    /// - `message`: 1-1000 characters after trimming
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn parse(name: &str, email: &str, message: &str) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.text("name", "Name", name, 1, Self::NAME_MAX);
        let email = errors.email("email", email);
        let message = errors.text("message", "Message", message, 1, Self::MESSAGE_MAX);

        match email {
            Some(email) if errors.is_empty() => Ok(Self {
                name,
                email,
                message,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_submission_is_trimmed() {
        let submission =
            ContactSubmission::parse("  Ada  ", "ada@example.com", "  Hello there ").unwrap();
        assert_eq!(submission.name, "Ada");
        assert_eq!(submission.email.as_str(), "ada@example.com");
        assert_eq!(submission.message, "Hello there");
    }

    #[test]
    fn test_name_bounds() {
        let err = ContactSubmission::parse("   ", "ada@example.com", "Hi").unwrap_err();
        assert_eq!(err.get("name"), Some("Name is required"));

        let long = "n".repeat(101);
        let err = ContactSubmission::parse(&long, "ada@example.com", "Hi").unwrap_err();
        assert_eq!(err.get("name"), Some("Name must be less than 100 characters"));

        let max = "n".repeat(100);
        assert!(ContactSubmission::parse(&max, "ada@example.com", "Hi").is_ok());
    }

    #[test]
    fn test_email_rules() {
        let err = ContactSubmission::parse("Ada", "not-an-email", "Hi").unwrap_err();
        assert_eq!(err.get("email"), Some("Invalid email address"));

        let long = format!("{}@example.com", "a".repeat(250));
        let err = ContactSubmission::parse("Ada", &long, "Hi").unwrap_err();
        assert_eq!(err.get("email"), Some("Email must be less than 255 characters"));
    }

    #[test]
    fn test_message_bounds() {
        let err = ContactSubmission::parse("Ada", "ada@example.com", "").unwrap_err();
        assert_eq!(err.get("message"), Some("Message is required"));

        let long = "m".repeat(1001);
        let err = ContactSubmission::parse("Ada", "ada@example.com", &long).unwrap_err();
        assert_eq!(
            err.get("message"),
            Some("Message must be less than 1000 characters")
        );
    }

    #[test]
    fn test_reports_every_failing_field() {
        let err = ContactSubmission::parse("", "bad", "").unwrap_err();
        let fields: Vec<&str> = err.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, ["email", "message", "name"]);
    }

    #[test]
    fn test_only_failing_field_is_reported() {
        let err = ContactSubmission::parse("Ada", "bad", "Hello").unwrap_err();
        assert_eq!(err.iter().count(), 1);
        assert!(err.get("name").is_none());
    }

    #[test]
    fn test_display_lists_fields() {
        let err = ValidationErrors::single("rating", "Rating must be between 1 and 5");
        assert_eq!(
            err.to_string(),
            "validation failed: rating: Rating must be between 1 and 5"
        );
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        let mut errors = ValidationErrors::new();
        assert_eq!(errors.optional_text("phone", "Phone", Some("  "), 10), None);
        assert_eq!(
            errors.optional_text("phone", "Phone", Some(" 555 "), 10).as_deref(),
            Some("555")
        );
        assert!(errors.is_empty());
    }
}
