//! The resume row. Sections are stored as JSONB documents.

use chrono::{DateTime, Utc};
use sqlx::types::Json;

use folio_core::{Certifications, Education, Experience, IdentityId, ResumeId, SkillSet};

use super::{PgStore, stored_email};
use crate::db::{RecordStore, RepositoryError};
use crate::models::{Resume, ResumeDraft};

const RESUME_EXISTS: &str = "a resume already exists; edit it instead";

const COLUMNS: &str = "id, user_id, full_name, email, phone, summary, skills, experience, \
                       education, certifications, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ResumeRow {
    id: ResumeId,
    user_id: Option<IdentityId>,
    full_name: String,
    email: String,
    phone: Option<String>,
    summary: Option<String>,
    skills: Json<SkillSet>,
    experience: Json<Experience>,
    education: Json<Education>,
    certifications: Json<Certifications>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ResumeRow> for Resume {
    type Error = RepositoryError;

    fn try_from(row: ResumeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            full_name: row.full_name,
            email: stored_email(&row.email)?,
            phone: row.phone,
            summary: row.summary,
            skills: row.skills.0,
            experience: row.experience.0,
            education: row.education.0,
            certifications: row.certifications.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl RecordStore<Resume> for PgStore {
    /// At most one row; `resume_single_row` enforces it.
    async fn list(&self) -> Result<Vec<Resume>, RepositoryError> {
        let rows: Vec<ResumeRow> = sqlx::query_as(&format!("SELECT {COLUMNS} FROM resume"))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Resume::try_from).collect()
    }

    async fn get(&self, id: ResumeId) -> Result<Option<Resume>, RepositoryError> {
        let row: Option<ResumeRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM resume WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Resume::try_from).transpose()
    }

    async fn insert(&self, draft: &ResumeDraft) -> Result<Resume, RepositoryError> {
        let row: ResumeRow = sqlx::query_as(&format!(
            r"
            INSERT INTO resume (id, user_id, full_name, email, phone, summary, skills,
                                experience, education, certifications)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {COLUMNS}
            "
        ))
        .bind(ResumeId::generate())
        .bind(draft.user_id)
        .bind(&draft.full_name)
        .bind(draft.email.as_str())
        .bind(&draft.phone)
        .bind(&draft.summary)
        .bind(Json(&draft.skills))
        .bind(Json(&draft.experience))
        .bind(Json(&draft.education))
        .bind(Json(&draft.certifications))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_or(e, RESUME_EXISTS))?;

        row.try_into()
    }

    async fn update(&self, id: ResumeId, draft: &ResumeDraft) -> Result<Resume, RepositoryError> {
        let row: Option<ResumeRow> = sqlx::query_as(&format!(
            r"
            UPDATE resume
            SET user_id = $2, full_name = $3, email = $4, phone = $5, summary = $6,
                skills = $7, experience = $8, education = $9, certifications = $10,
                updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id)
        .bind(draft.user_id)
        .bind(&draft.full_name)
        .bind(draft.email.as_str())
        .bind(&draft.phone)
        .bind(&draft.summary)
        .bind(Json(&draft.skills))
        .bind(Json(&draft.experience))
        .bind(Json(&draft.education))
        .bind(Json(&draft.certifications))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Resume::try_from)
            .transpose()?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: ResumeId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM resume WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
