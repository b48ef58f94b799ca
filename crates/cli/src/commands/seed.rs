//! Sample content for local development.
//!
//! Rows go through the same validation as the admin dashboard. Running the
//! command twice skips anything whose slug already exists.

use folio_core::{Email, EmailError, IdentityId};
use folio_site::db::{IdentityStore, PgStore, Record, RecordStore, RepositoryError};
use folio_site::models::{BlogPostForm, DraftForm, ProjectForm, TestimonialForm};
use folio_site::services::{ContentError, ContentManager};
use serde_json::{Value, json};
use thiserror::Error;

use super::{ConnectError, connect};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("No identity registered with email: {0}")]
    UnknownIdentity(Email),

    #[error("Invalid seed data: {0}")]
    Data(#[from] serde_json::Error),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

fn projects() -> Vec<Value> {
    vec![
        json!({
            "title": "Folio",
            "description": "This portfolio: a blog, a case-study gallery and an admin dashboard.",
            "tech_stack": "Rust, Axum, PostgreSQL",
            "code_url": "https://github.com/folio-site/folio",
            "featured": true,
            "case_study_content": "Built as a JSON service with server-side authorization.",
        }),
        json!({
            "title": "Ledger Sync",
            "description": "Nightly reconciliation between two accounting systems.",
            "tech_stack": ["Go", "React", "Postgres"],
        }),
    ]
}

fn posts() -> Vec<Value> {
    vec![json!({
        "title": "Hello, World!",
        "excerpt": "First post.",
        "content": "Welcome to the blog. Posts are written in the admin dashboard.",
        "published": true,
        "tags": ["meta"],
        "categories": ["announcements"],
    })]
}

fn testimonials() -> Vec<Value> {
    vec![json!({
        "name": "Sam Rivera",
        "position": "CTO",
        "company": "Analytical Engines",
        "content": "Shipped on time and left the codebase better than it found it.",
        "rating": 5,
        "featured": true,
    })]
}

/// Insert every row of `rows`, skipping slug conflicts.
async fn seed<F>(store: &PgStore, actor: IdentityId, rows: Vec<Value>) -> Result<usize, SeedError>
where
    F: DraftForm,
    PgStore: RecordStore<F::Record>,
{
    let manager = ContentManager::<PgStore, F::Record>::new(store);
    let mut created = 0;

    for row in rows {
        let form: F = serde_json::from_value(row)?;
        match manager.create(actor, form).await {
            Ok(_) => created += 1,
            Err(ContentError::Repository(RepositoryError::Conflict(reason))) => {
                tracing::info!(kind = <F::Record as Record>::KIND, %reason, "Skipping existing row");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(created)
}

/// Seed projects, a published post and a testimonial.
pub async fn run(author_email: &str) -> Result<(), SeedError> {
    let store = PgStore::new(connect().await?);
    let email = Email::parse(author_email)?;
    let author = store
        .identity_by_email(&email)
        .await?
        .ok_or(SeedError::UnknownIdentity(email))?;

    let project_count = seed::<ProjectForm>(&store, author.id, projects()).await?;
    let post_count = seed::<BlogPostForm>(&store, author.id, posts()).await?;
    let testimonial_count = seed::<TestimonialForm>(&store, author.id, testimonials()).await?;

    tracing::info!(
        projects = project_count,
        posts = post_count,
        testimonials = testimonial_count,
        "Seed complete"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn validates<F: DraftForm>(rows: Vec<Value>) {
        for row in rows {
            let form: F = serde_json::from_value(row).unwrap();
            assert!(form.into_draft(IdentityId::generate()).is_ok());
        }
    }

    #[test]
    fn test_seed_rows_validate() {
        validates::<ProjectForm>(projects());
        validates::<BlogPostForm>(posts());
        validates::<TestimonialForm>(testimonials());
    }
}
