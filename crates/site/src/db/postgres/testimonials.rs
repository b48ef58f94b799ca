//! Testimonials.

use chrono::{DateTime, Utc};

use folio_core::TestimonialId;

use super::PgStore;
use crate::db::{RecordStore, RepositoryError};
use crate::models::{Testimonial, TestimonialDraft};

const COLUMNS: &str =
    "id, name, position, company, content, avatar_url, rating, featured, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct TestimonialRow {
    id: TestimonialId,
    name: String,
    position: Option<String>,
    company: Option<String>,
    content: String,
    avatar_url: Option<String>,
    rating: i16,
    featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TestimonialRow> for Testimonial {
    fn from(row: TestimonialRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            position: row.position,
            company: row.company,
            content: row.content,
            avatar_url: row.avatar_url,
            rating: row.rating,
            featured: row.featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl RecordStore<Testimonial> for PgStore {
    async fn list(&self) -> Result<Vec<Testimonial>, RepositoryError> {
        let rows: Vec<TestimonialRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM testimonials ORDER BY featured DESC, created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Testimonial::from).collect())
    }

    async fn get(&self, id: TestimonialId) -> Result<Option<Testimonial>, RepositoryError> {
        let row: Option<TestimonialRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM testimonials WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Testimonial::from))
    }

    async fn insert(&self, draft: &TestimonialDraft) -> Result<Testimonial, RepositoryError> {
        let row: TestimonialRow = sqlx::query_as(&format!(
            r"
            INSERT INTO testimonials (id, name, position, company, content, avatar_url, rating, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "
        ))
        .bind(TestimonialId::generate())
        .bind(&draft.name)
        .bind(&draft.position)
        .bind(&draft.company)
        .bind(&draft.content)
        .bind(&draft.avatar_url)
        .bind(draft.rating)
        .bind(draft.featured)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(
        &self,
        id: TestimonialId,
        draft: &TestimonialDraft,
    ) -> Result<Testimonial, RepositoryError> {
        let row: Option<TestimonialRow> = sqlx::query_as(&format!(
            r"
            UPDATE testimonials
            SET name = $2, position = $3, company = $4, content = $5, avatar_url = $6,
                rating = $7, featured = $8, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.position)
        .bind(&draft.company)
        .bind(&draft.content)
        .bind(&draft.avatar_url)
        .bind(draft.rating)
        .bind(draft.featured)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Testimonial::from).ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: TestimonialId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM testimonials WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
