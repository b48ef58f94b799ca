//! Data-service layer.
//!
//! The service layer never talks to `sqlx` directly. It goes through the store
//! traits below, which have two implementations:
//!
//! - [`PgStore`] - `PostgreSQL` via sqlx (production)
//! - [`MemoryStore`] - in-process tables (tests and local previews)
//!
//! ## Tables
//!
//! - `identities`, `identity_passwords` - Sign-in principals
//! - `user_roles` - Role assignments, unique per (identity, role)
//! - `projects`, `blog_posts`, `blog_comments`, `testimonials`, `contacts`, `resume`
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p folio-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::{Serialize, de::DeserializeOwned};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use folio_core::{AppRole, BlogPostId, ContactId, ContactStatus, ContactSubmission, Email, IdentityId};

use crate::models::{
    BlogComment, BlogPost, CommentDraft, Contact, Identity, Project, Resume, RoleAssignment,
    Testimonial,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur in repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique slug).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The write was refused by an access policy.
    #[error("policy violation: {0}")]
    PolicyViolation(String),
}

impl RepositoryError {
    /// Map a unique violation to [`RepositoryError::Conflict`].
    pub(crate) fn conflict_or(e: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

// =============================================================================
// Store Traits
// =============================================================================

/// A content row managed through a [`RecordStore`].
pub trait Record: Clone + Serialize + Send + Sync + 'static {
    /// Primary key type.
    type Id: Copy + Eq + Hash + Display + DeserializeOwned + Send + Sync + 'static;
    /// Full field set written by create and update.
    type Draft: Send + Sync;

    /// Short lowercase name used in logs.
    const KIND: &'static str;
    /// Human-readable name used in notices.
    const LABEL: &'static str;

    /// Returns the primary key.
    fn id(&self) -> Self::Id;

    /// Listing order key: flag first, then recency. Sorted descending.
    fn sort_key(&self) -> (bool, DateTime<Utc>);
}

/// Sort records by [`Record::sort_key`], flagged and newest first.
pub fn sort_records<T: Record>(records: &mut [T]) {
    records.sort_by_key(|r| std::cmp::Reverse(r.sort_key()));
}

/// CRUD access to one content table.
pub trait RecordStore<T: Record>: Send + Sync {
    /// All rows, flagged first then newest first.
    fn list(&self) -> impl Future<Output = Result<Vec<T>, RepositoryError>> + Send;

    /// One row by primary key.
    fn get(&self, id: T::Id) -> impl Future<Output = Result<Option<T>, RepositoryError>> + Send;

    /// Insert a new row.
    fn insert(&self, draft: &T::Draft) -> impl Future<Output = Result<T, RepositoryError>> + Send;

    /// Overwrite every editable field of a row.
    ///
    /// Returns [`RepositoryError::NotFound`] if the row does not exist.
    fn update(
        &self,
        id: T::Id,
        draft: &T::Draft,
    ) -> impl Future<Output = Result<T, RepositoryError>> + Send;

    /// Delete a row. Returns false if it did not exist.
    fn delete(&self, id: T::Id) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// Role assignment storage.
pub trait RoleStore: Send + Sync {
    /// Role labels assigned to an identity. Duplicates are passed through.
    fn roles_for(
        &self,
        identity: IdentityId,
    ) -> impl Future<Output = Result<Vec<AppRole>, RepositoryError>> + Send;

    /// Returns true if any identity holds the admin role.
    fn admin_exists(&self) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Self-service role insert, subject to the role-write policy.
    ///
    /// The policy admits the write only while no admin exists.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::Conflict`] if the pair is already assigned
    /// - [`RepositoryError::PolicyViolation`] if the policy refuses the write
    fn insert_role(
        &self,
        identity: IdentityId,
        role: AppRole,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Operator grant with conflict-ignored semantics. Returns true if a row
    /// was written.
    fn grant_role(
        &self,
        identity: IdentityId,
        role: AppRole,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Remove a role assignment. Returns true if a row was removed.
    fn revoke_role(
        &self,
        identity: IdentityId,
        role: AppRole,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Every role assignment with its identity's email, oldest first.
    fn role_assignments(
        &self,
    ) -> impl Future<Output = Result<Vec<RoleAssignment>, RepositoryError>> + Send;
}

/// Identity and password storage.
pub trait IdentityStore: Send + Sync {
    /// Create an identity with a password hash.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] if the email is taken.
    fn create_identity(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> impl Future<Output = Result<Identity, RepositoryError>> + Send;

    /// Identity and password hash by email (case-insensitive).
    fn credentials_by_email(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<(Identity, String)>, RepositoryError>> + Send;

    /// Identity by email (case-insensitive).
    fn identity_by_email(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<Identity>, RepositoryError>> + Send;
}

/// Project lookups beyond plain CRUD.
pub trait ProjectStore: Send + Sync {
    /// Project by slug.
    fn project_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Project>, RepositoryError>> + Send;
}

/// Public blog reads and comment storage.
pub trait BlogStore: Send + Sync {
    /// Published posts, newest first.
    fn published_posts(&self) -> impl Future<Output = Result<Vec<BlogPost>, RepositoryError>> + Send;

    /// A published post by slug.
    fn published_post_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<BlogPost>, RepositoryError>> + Send;

    /// Approved comments on a post, oldest first.
    fn approved_comments(
        &self,
        post: BlogPostId,
    ) -> impl Future<Output = Result<Vec<BlogComment>, RepositoryError>> + Send;

    /// Insert a comment. Comments are always stored unapproved.
    fn insert_comment(
        &self,
        draft: &CommentDraft,
    ) -> impl Future<Output = Result<BlogComment, RepositoryError>> + Send;
}

/// Contact form submissions.
pub trait ContactStore: Send + Sync {
    /// All contacts, newest first.
    fn contacts(&self) -> impl Future<Output = Result<Vec<Contact>, RepositoryError>> + Send;

    /// One contact by id.
    fn contact(
        &self,
        id: ContactId,
    ) -> impl Future<Output = Result<Option<Contact>, RepositoryError>> + Send;

    /// Store a validated submission with status `unread`.
    fn insert_contact(
        &self,
        submission: &ContactSubmission,
    ) -> impl Future<Output = Result<Contact, RepositoryError>> + Send;

    /// Overwrite a contact's status.
    ///
    /// Returns [`RepositoryError::NotFound`] if the contact does not exist.
    fn set_contact_status(
        &self,
        id: ContactId,
        status: ContactStatus,
    ) -> impl Future<Output = Result<Contact, RepositoryError>> + Send;

    /// Delete a contact. Returns false if it did not exist.
    fn delete_contact(&self, id: ContactId)
    -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// Backend liveness probe.
pub trait HealthCheck: Send + Sync {
    /// Returns `Ok` if the backend answers.
    fn ping(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Everything the site needs from its data service.
pub trait Store:
    RoleStore
    + IdentityStore
    + ProjectStore
    + BlogStore
    + ContactStore
    + HealthCheck
    + RecordStore<Project>
    + RecordStore<BlogPost>
    + RecordStore<Testimonial>
    + RecordStore<Resume>
    + Clone
    + 'static
{
}

impl<T> Store for T where
    T: RoleStore
        + IdentityStore
        + ProjectStore
        + BlogStore
        + ContactStore
        + HealthCheck
        + RecordStore<Project>
        + RecordStore<BlogPost>
        + RecordStore<Testimonial>
        + RecordStore<Resume>
        + Clone
        + 'static
{
}
