//! Content managers.
//!
//! One [`ContentManager`] per content table. Every operation assumes the caller
//! already passed the admin gate; it validates, writes through the store, logs
//! the outcome, and returns a [`Notice`] for the dashboard.

use std::marker::PhantomData;

use serde::Serialize;

use folio_core::IdentityId;

use crate::db::{Record, RecordStore, RepositoryError};
use crate::models::DraftForm;

/// Severity of a dashboard notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A user-visible message describing an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Errors from a content write.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("validation failed")]
    Validation(#[from] folio_core::ValidationErrors),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// CRUD over one content table.
pub struct ContentManager<'a, S, T> {
    store: &'a S,
    record: PhantomData<fn() -> T>,
}

impl<'a, S, T> ContentManager<'a, S, T>
where
    S: RecordStore<T>,
    T: Record,
{
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self {
            store,
            record: PhantomData,
        }
    }

    /// All rows, flagged first then newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    pub async fn list(&self) -> Result<Vec<T>, RepositoryError> {
        self.store.list().await.inspect_err(|e| {
            tracing::error!(kind = T::KIND, error = %e, "Failed to list content");
        })
    }

    /// Validate a form and insert it.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Validation` if the form is invalid (nothing is
    /// written), or `ContentError::Repository` if the write fails.
    pub async fn create<F>(&self, actor: IdentityId, form: F) -> Result<(T, Notice), ContentError>
    where
        F: DraftForm<Record = T>,
    {
        let draft = form.into_draft(actor)?;
        let record = self.store.insert(&draft).await.inspect_err(|e| {
            tracing::error!(kind = T::KIND, error = %e, "Failed to create content");
        })?;

        tracing::info!(kind = T::KIND, id = %record.id(), %actor, "Content created");
        let notice = Notice::success(format!("{} created successfully", T::LABEL));
        Ok((record, notice))
    }

    /// Validate a form and overwrite an existing row with it.
    ///
    /// # Errors
    ///
    /// As [`Self::create`], plus `RepositoryError::NotFound` for a missing row.
    pub async fn update<F>(
        &self,
        actor: IdentityId,
        id: T::Id,
        form: F,
    ) -> Result<(T, Notice), ContentError>
    where
        F: DraftForm<Record = T>,
    {
        let draft = form.into_draft(actor)?;
        let record = self.store.update(id, &draft).await.inspect_err(|e| {
            tracing::error!(kind = T::KIND, %id, error = %e, "Failed to update content");
        })?;

        tracing::info!(kind = T::KIND, %id, %actor, "Content updated");
        let notice = Notice::success(format!("{} updated successfully", T::LABEL));
        Ok((record, notice))
    }

    /// Delete a row by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row does not exist.
    pub async fn delete(&self, actor: IdentityId, id: T::Id) -> Result<Notice, RepositoryError> {
        let deleted = self.store.delete(id).await.inspect_err(|e| {
            tracing::error!(kind = T::KIND, %id, error = %e, "Failed to delete content");
        })?;
        if !deleted {
            return Err(RepositoryError::NotFound);
        }

        tracing::info!(kind = T::KIND, %id, %actor, "Content deleted");
        Ok(Notice::success(format!("{} deleted successfully", T::LABEL)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{BlogPost, BlogPostForm, Project, ProjectForm, Testimonial, TestimonialForm};

    fn project(title: &str, featured: bool) -> ProjectForm {
        ProjectForm {
            title: title.to_owned(),
            description: "Description".to_owned(),
            featured,
            ..ProjectForm::default()
        }
    }

    #[tokio::test]
    async fn test_project_lifecycle() {
        let store = MemoryStore::new();
        let manager = ContentManager::<_, Project>::new(&store);
        let actor = IdentityId::generate();

        let (created, notice) = manager.create(actor, project("Folio", false)).await.unwrap();
        assert_eq!(notice, Notice::success("Project created successfully"));
        assert_eq!(created.slug.as_deref(), Some("folio"));

        let (updated, _) = manager
            .update(actor, created.id, project("Folio v2", true))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert!(updated.featured);
        assert_eq!(updated.created_at, created.created_at);

        let notice = manager.delete(actor, created.id).await.unwrap();
        assert_eq!(notice.message, "Project deleted successfully");
        assert!(manager.list().await.unwrap().is_empty());
        assert!(matches!(
            manager.delete(actor, created.id).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_invalid_form_writes_nothing() {
        let store = MemoryStore::new();
        let manager = ContentManager::<_, Testimonial>::new(&store);
        let form: TestimonialForm =
            serde_json::from_str(r#"{"name": "Sam", "content": "Great", "rating": 9}"#).unwrap();

        let err = manager.create(IdentityId::generate(), form).await.unwrap_err();
        assert!(matches!(err, ContentError::Validation(ref e) if e.get("rating").is_some()));
        assert!(manager.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blog_listing_published_first() {
        let store = MemoryStore::new();
        let manager = ContentManager::<_, BlogPost>::new(&store);
        let actor = IdentityId::generate();

        let form = |title: &str, published: bool| BlogPostForm {
            title: title.to_owned(),
            content: "Body".to_owned(),
            published,
            ..BlogPostForm::default()
        };
        manager.create(actor, form("Published", true)).await.unwrap();
        manager.create(actor, form("Draft", false)).await.unwrap();

        let titles: Vec<String> = manager
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, ["Published", "Draft"]);
    }
}
