//! Identities and password hashes.

use chrono::{DateTime, Utc};

use folio_core::{Email, IdentityId};

use super::{PgStore, stored_email};
use crate::db::{IdentityStore, RepositoryError};
use crate::models::Identity;

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: IdentityId,
    email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = RepositoryError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            email: stored_email(&row.email)?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    identity: IdentityRow,
    password_hash: Option<String>,
}

impl IdentityStore for PgStore {
    async fn create_identity(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<Identity, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: IdentityRow = sqlx::query_as(
            r"
            INSERT INTO identities (id, email)
            VALUES ($1, $2)
            RETURNING id, email, created_at
            ",
        )
        .bind(IdentityId::generate())
        .bind(email.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::conflict_or(e, "email already exists"))?;

        sqlx::query(
            r"
            INSERT INTO identity_passwords (identity_id, password_hash)
            VALUES ($1, $2)
            ",
        )
        .bind(row.id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        row.try_into()
    }

    async fn credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(Identity, String)>, RepositoryError> {
        let row: Option<CredentialRow> = sqlx::query_as(
            r"
            SELECT i.id, i.email, i.created_at, p.password_hash
            FROM identities i
            LEFT JOIN identity_passwords p ON p.identity_id = i.id
            WHERE lower(i.email) = lower($1)
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let Some(password_hash) = row.password_hash else {
            return Ok(None);
        };

        Ok(Some((row.identity.try_into()?, password_hash)))
    }

    async fn identity_by_email(&self, email: &Email) -> Result<Option<Identity>, RepositoryError> {
        let row: Option<IdentityRow> = sqlx::query_as(
            "SELECT id, email, created_at FROM identities WHERE lower(email) = lower($1)",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Identity::try_from).transpose()
    }
}
