//! `PostgreSQL` store.
//!
//! Queries are built at runtime with `sqlx::query_as` over private row
//! structs; each row converts into its model through `TryFrom`, which is where
//! stored text (emails, labels) is re-validated.

mod blog;
mod contacts;
mod identities;
mod projects;
mod resume;
mod roles;
mod testimonials;

use sqlx::PgPool;

use folio_core::Email;

use super::{HealthCheck, RepositoryError};

/// Store backed by a `PostgreSQL` connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for session storage and migrations.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl HealthCheck for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Re-validate an email read from the database.
fn stored_email(raw: &str) -> Result<Email, RepositoryError> {
    Email::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))
}
