//! Unified error handling with Sentry integration.
//!
//! Every route handler returns `Result<T, AppError>`. Server-side failures are
//! captured to Sentry and logged before a generic response goes out; client
//! errors carry a JSON body `{"error": ...}` with extra keys where useful
//! (`fields` for validation, `hint` and `sql` for a refused bootstrap). Every
//! error body also carries an error-level `notice` with the same message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use folio_core::{TransitionError, ValidationErrors};

use crate::db::RepositoryError;
use crate::services::{AuthError, BootstrapError, ContactError, ContentError, Notice};

/// Hint returned when the self-service bootstrap is refused.
pub const BOOTSTRAP_HINT: &str = "Unable to auto-assign the admin role. Use the setup key, the \
                                  local bypass, or run the manual SQL statement.";

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Admin bootstrap failed.
    #[error("Bootstrap error: {0}")]
    Bootstrap(#[from] BootstrapError),

    /// Request fields failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Disallowed contact status change.
    #[error("Transition error: {0}")]
    Transition(#[from] TransitionError),

    /// `replied` requested through a plain status update.
    #[error("Use the reply action to mark a contact as replied")]
    ReplyRequired,

    /// Session backend failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::Validation(errors) => Self::Validation(errors),
            ContentError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<ContactError> for AppError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::Transition(e) => Self::Transition(e),
            ContactError::ReplyRequired => Self::ReplyRequired,
            ContactError::Validation(errors) => Self::Validation(errors),
            ContactError::Repository(e) => Self::Database(e),
        }
    }
}

impl AppError {
    /// True for failures that are the server's fault.
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_)
            ) | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
                | Self::Bootstrap(BootstrapError::Repository(_) | BootstrapError::Session(_))
                | Self::Session(_)
        )
    }

    fn status(&self) -> StatusCode {
        if self.is_server_error() {
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::PolicyViolation(_) => StatusCode::FORBIDDEN,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::IdentityAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Bootstrap(err) => match err {
                BootstrapError::PolicyRejected { .. }
                | BootstrapError::InvalidSetupKey
                | BootstrapError::SetupKeyDisabled
                | BootstrapError::BypassDisabled => StatusCode::FORBIDDEN,
                BootstrapError::MissingSetupKey => StatusCode::BAD_REQUEST,
                BootstrapError::NotSignedIn => StatusCode::UNAUTHORIZED,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Transition(_) | Self::ReplyRequired => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        if self.is_server_error() {
            // Don't expose internal error details to clients
            return json!({ "error": "Internal server error" });
        }
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => json!({ "error": "Not found" }),
                RepositoryError::Conflict(msg) => json!({ "error": msg }),
                RepositoryError::PolicyViolation(_) => {
                    json!({ "error": "Not allowed by access policy" })
                }
                _ => json!({ "error": "Internal server error" }),
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => json!({ "error": "Invalid credentials" }),
                AuthError::IdentityAlreadyExists => {
                    json!({ "error": "An account with this email already exists" })
                }
                AuthError::WeakPassword(msg) => json!({ "error": msg }),
                AuthError::InvalidEmail(_) => json!({ "error": "Invalid email address" }),
                _ => json!({ "error": "Authentication error" }),
            },
            Self::Bootstrap(BootstrapError::PolicyRejected { sql }) => json!({
                "error": "Unable to auto-assign the admin role",
                "hint": BOOTSTRAP_HINT,
                "sql": sql,
            }),
            Self::Bootstrap(err) => json!({ "error": err.to_string() }),
            Self::Validation(errors) => json!({
                "error": "Validation failed",
                "fields": errors,
            }),
            Self::Transition(err) => json!({ "error": err.to_string() }),
            Self::ReplyRequired => json!({ "error": self.to_string() }),
            Self::NotFound(msg) => json!({ "error": msg }),
            Self::Session(_) => json!({ "error": "Internal server error" }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let mut body = self.body();
        let notice = body["error"].as_str().map(Notice::error);
        if let (Some(fields), Some(notice)) = (body.as_object_mut(), notice) {
            fields.insert("notice".to_owned(), json!(notice));
        }

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the signed-in identity.
///
/// Call this after successful sign-in to associate errors with the identity.
pub fn set_sentry_user(identity_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(identity_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on sign-out to stop associating errors with the identity.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for admin actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("bootstrap", "Ran admin bootstrap", Some(&[("method", "setup_key")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb
                .data
                .insert((*key).to_string(), Value::String((*value).to_string()));
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
