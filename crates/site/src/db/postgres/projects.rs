//! Projects.

use chrono::{DateTime, Utc};

use folio_core::{ProjectId, TechStack};

use super::PgStore;
use crate::db::{ProjectStore, RecordStore, RepositoryError};
use crate::models::{Project, ProjectDraft};

const COLUMNS: &str = "id, title, description, tech_stack, image_url, demo_url, code_url, \
                       featured, slug, case_study_content, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: ProjectId,
    title: String,
    description: String,
    tech_stack: TechStack,
    image_url: Option<String>,
    demo_url: Option<String>,
    code_url: Option<String>,
    featured: bool,
    slug: Option<String>,
    case_study_content: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            tech_stack: row.tech_stack,
            image_url: row.image_url,
            demo_url: row.demo_url,
            code_url: row.code_url,
            featured: row.featured,
            slug: row.slug,
            case_study_content: row.case_study_content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SLUG_TAKEN: &str = "a project with this slug already exists";

impl RecordStore<Project> for PgStore {
    async fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        let rows: Vec<ProjectRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM projects ORDER BY featured DESC, created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn get(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError> {
        let row: Option<ProjectRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM projects WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Project::from))
    }

    async fn insert(&self, draft: &ProjectDraft) -> Result<Project, RepositoryError> {
        let row: ProjectRow = sqlx::query_as(&format!(
            r"
            INSERT INTO projects (id, title, description, tech_stack, image_url, demo_url,
                                  code_url, featured, slug, case_study_content)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {COLUMNS}
            "
        ))
        .bind(ProjectId::generate())
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.tech_stack)
        .bind(&draft.image_url)
        .bind(&draft.demo_url)
        .bind(&draft.code_url)
        .bind(draft.featured)
        .bind(draft.slug.as_str())
        .bind(&draft.case_study_content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_or(e, SLUG_TAKEN))?;

        Ok(row.into())
    }

    async fn update(&self, id: ProjectId, draft: &ProjectDraft) -> Result<Project, RepositoryError> {
        let row: Option<ProjectRow> = sqlx::query_as(&format!(
            r"
            UPDATE projects
            SET title = $2, description = $3, tech_stack = $4, image_url = $5, demo_url = $6,
                code_url = $7, featured = $8, slug = $9, case_study_content = $10,
                updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.tech_stack)
        .bind(&draft.image_url)
        .bind(&draft.demo_url)
        .bind(&draft.code_url)
        .bind(draft.featured)
        .bind(draft.slug.as_str())
        .bind(&draft.case_study_content)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_or(e, SLUG_TAKEN))?;

        row.map(Project::from).ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: ProjectId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl ProjectStore for PgStore {
    async fn project_by_slug(&self, slug: &str) -> Result<Option<Project>, RepositoryError> {
        let row: Option<ProjectRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM projects WHERE slug = $1"))
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Project::from))
    }
}
