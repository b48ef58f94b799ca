//! Contact form submissions.

use chrono::{DateTime, Utc};

use folio_core::{ContactId, ContactStatus, ContactSubmission};

use super::{PgStore, stored_email};
use crate::db::{ContactStore, RepositoryError};
use crate::models::Contact;

const COLUMNS: &str = "id, name, email, message, status, created_at";

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: ContactId,
    name: String,
    email: String,
    message: String,
    status: ContactStatus,
    created_at: DateTime<Utc>,
}

impl TryFrom<ContactRow> for Contact {
    type Error = RepositoryError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            email: stored_email(&row.email)?,
            message: row.message,
            status: row.status,
            created_at: row.created_at,
        })
    }
}

impl ContactStore for PgStore {
    async fn contacts(&self) -> Result<Vec<Contact>, RepositoryError> {
        let rows: Vec<ContactRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM contacts ORDER BY created_at DESC"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Contact::try_from).collect()
    }

    async fn contact(&self, id: ContactId) -> Result<Option<Contact>, RepositoryError> {
        let row: Option<ContactRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM contacts WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Contact::try_from).transpose()
    }

    async fn insert_contact(
        &self,
        submission: &ContactSubmission,
    ) -> Result<Contact, RepositoryError> {
        let row: ContactRow = sqlx::query_as(&format!(
            r"
            INSERT INTO contacts (id, name, email, message, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "
        ))
        .bind(ContactId::generate())
        .bind(&submission.name)
        .bind(submission.email.as_str())
        .bind(&submission.message)
        .bind(ContactStatus::Unread)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn set_contact_status(
        &self,
        id: ContactId,
        status: ContactStatus,
    ) -> Result<Contact, RepositoryError> {
        let row: Option<ContactRow> = sqlx::query_as(&format!(
            "UPDATE contacts SET status = $2 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Contact::try_from)
            .transpose()?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_contact(&self, id: ContactId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
