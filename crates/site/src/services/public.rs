//! Public read paths.
//!
//! Everything here is reachable without signing in, so every read applies the
//! visibility filter: published posts only, approved comments only.

use serde::Serialize;

use folio_core::SkillSet;

use crate::db::{BlogStore, ProjectStore, RecordStore, RepositoryError};
use crate::models::{BlogComment, BlogPost, CommentForm, Project, Resume, Testimonial};
use crate::services::content::ContentError;

/// Data for the marketing page.
#[derive(Debug, Clone, Serialize)]
pub struct Portfolio {
    pub featured_projects: Vec<Project>,
    pub testimonials: Vec<Testimonial>,
    /// Skills from the resume, empty when there is no resume.
    pub skills: SkillSet,
}

/// Read-only views over published content.
pub struct PublicContent<'a, S> {
    store: &'a S,
}

impl<'a, S> PublicContent<'a, S>
where
    S: BlogStore
        + ProjectStore
        + RecordStore<Project>
        + RecordStore<Testimonial>
        + RecordStore<Resume>,
{
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Published posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    pub async fn published_posts(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        self.store.published_posts().await
    }

    /// A published post by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for unknown or unpublished slugs.
    pub async fn post(&self, slug: &str) -> Result<BlogPost, RepositoryError> {
        self.store
            .published_post_by_slug(slug)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Approved comments on a published post, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for unknown or unpublished slugs.
    pub async fn approved_comments(&self, slug: &str) -> Result<Vec<BlogComment>, RepositoryError> {
        let post = self.post(slug).await?;
        self.store.approved_comments(post.id).await
    }

    /// Submit a comment on a published post. It stays hidden until approved.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Validation` with every failing field, or
    /// `ContentError::Repository` (`NotFound` for unknown slugs).
    #[tracing::instrument(skip(self, form))]
    pub async fn submit_comment(
        &self,
        slug: &str,
        form: CommentForm,
    ) -> Result<BlogComment, ContentError> {
        let post = self.post(slug).await?;
        let draft = form.into_draft(post.id)?;
        let comment = self.store.insert_comment(&draft).await?;

        tracing::info!(id = %comment.id, post = %post.id, "Comment submitted for moderation");
        Ok(comment)
    }

    /// All projects, featured first then newest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    pub async fn projects(&self) -> Result<Vec<Project>, RepositoryError> {
        <S as RecordStore<Project>>::list(self.store).await
    }

    /// A project case study by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for unknown slugs.
    pub async fn project(&self, slug: &str) -> Result<Project, RepositoryError> {
        self.store
            .project_by_slug(slug)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// All testimonials, featured first then newest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    pub async fn testimonials(&self) -> Result<Vec<Testimonial>, RepositoryError> {
        <S as RecordStore<Testimonial>>::list(self.store).await
    }

    /// The current resume, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    pub async fn resume(&self) -> Result<Option<Resume>, RepositoryError> {
        let resumes = <S as RecordStore<Resume>>::list(self.store).await?;
        Ok(resumes.into_iter().next())
    }

    /// Marketing page aggregate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if any read fails.
    pub async fn portfolio(&self) -> Result<Portfolio, RepositoryError> {
        let featured_projects = self
            .projects()
            .await?
            .into_iter()
            .filter(|p| p.featured)
            .collect();
        let testimonials = self.testimonials().await?;
        let skills = self.resume().await?.map(|r| r.skills).unwrap_or_default();

        Ok(Portfolio {
            featured_projects,
            testimonials,
            skills,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use folio_core::IdentityId;

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{BlogPostForm, ProjectForm};
    use crate::services::content::ContentManager;

    async fn post(store: &MemoryStore, title: &str, published: bool) -> BlogPost {
        let form = BlogPostForm {
            title: title.to_owned(),
            content: "Body".to_owned(),
            published,
            ..BlogPostForm::default()
        };
        ContentManager::<_, BlogPost>::new(store)
            .create(IdentityId::generate(), form)
            .await
            .unwrap()
            .0
    }

    fn comment() -> CommentForm {
        CommentForm {
            author_name: "Reader".to_owned(),
            author_email: "reader@example.com".to_owned(),
            content: "Nice post".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_unpublished_posts_hidden() {
        let store = MemoryStore::new();
        post(&store, "Live", true).await;
        post(&store, "Draft", false).await;
        let public = PublicContent::new(&store);

        let titles: Vec<String> = public
            .published_posts()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, ["Live"]);
        assert!(public.post("live").await.is_ok());
        assert!(matches!(public.post("draft").await, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_comments_hidden_until_approved() {
        let store = MemoryStore::new();
        let live = post(&store, "Live", true).await;
        let public = PublicContent::new(&store);

        let submitted = public.submit_comment("live", comment()).await.unwrap();
        assert!(!submitted.approved);
        assert!(public.approved_comments("live").await.unwrap().is_empty());

        assert!(store.approve_comment(submitted.id));
        let visible = public.approved_comments("live").await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].blog_post_id, live.id);
    }

    #[tokio::test]
    async fn test_comment_on_unpublished_post_rejected() {
        let store = MemoryStore::new();
        let draft = post(&store, "Draft", false).await;
        let public = PublicContent::new(&store);

        assert!(matches!(
            public.submit_comment("draft", comment()).await,
            Err(ContentError::Repository(RepositoryError::NotFound))
        ));
        assert!(store.all_comments(draft.id).is_empty());
    }

    #[tokio::test]
    async fn test_portfolio_aggregate() {
        let store = MemoryStore::new();
        let projects = ContentManager::<_, Project>::new(&store);
        let actor = IdentityId::generate();
        for (title, featured) in [("Hidden", false), ("Shown", true)] {
            let form = ProjectForm {
                title: title.to_owned(),
                description: "Description".to_owned(),
                featured,
                ..ProjectForm::default()
            };
            projects.create(actor, form).await.unwrap();
        }

        let portfolio = PublicContent::new(&store).portfolio().await.unwrap();
        assert_eq!(portfolio.featured_projects.len(), 1);
        assert_eq!(portfolio.featured_projects[0].title, "Shown");
        assert!(portfolio.testimonials.is_empty());
        assert_eq!(portfolio.skills, SkillSet::default());
    }
}
