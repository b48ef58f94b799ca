//! Contact form messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::{ContactId, ContactStatus, ContactSubmission, Email, ValidationErrors};

/// A message left through the public contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: Email,
    pub message: String,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

/// Public contact form request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    /// Validate the submission.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn validate(&self) -> Result<ContactSubmission, ValidationErrors> {
        ContactSubmission::parse(&self.name, &self.email, &self.message)
    }
}

/// Admin status change request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StatusUpdate {
    pub status: ContactStatus,
}

/// Admin reply request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyForm {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

/// A reply that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub subject: String,
    pub message: String,
}

impl ReplyForm {
    /// Validate the reply: both subject and message are required.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn validate(&self) -> Result<Reply, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let subject = errors.text("subject", "Subject", &self.subject, 1, 200);
        let message = errors.text("message", "Message", &self.message, 1, 5000);
        errors.finish(|| Reply { subject, message })
    }
}
