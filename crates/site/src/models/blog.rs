//! Blog posts and reader comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::{BlogPostId, CommentId, Email, IdentityId, Slug, ValidationErrors};

use super::{DraftForm, comma_list, optional_url};
use crate::db::Record;

/// Average reading speed used for `reading_time`.
pub const WORDS_PER_MINUTE: usize = 200;

/// Estimated reading time in whole minutes, never less than one.
#[must_use]
pub fn reading_time(content: &str) -> i32 {
    let minutes = content.split_whitespace().count().div_ceil(WORDS_PER_MINUTE);
    i32::try_from(minutes.max(1)).unwrap_or(i32::MAX)
}

/// A blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogPost {
    pub id: BlogPostId,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub featured_image: Option<String>,
    pub published: bool,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub meta_description: Option<String>,
    /// Estimated reading time in minutes.
    pub reading_time: i32,
    /// Identity that last wrote the post. Cleared if the identity is deleted.
    pub author_id: Option<IdentityId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for BlogPost {
    type Id = BlogPostId;
    type Draft = BlogPostDraft;

    const KIND: &'static str = "blog_post";
    const LABEL: &'static str = "Blog post";

    fn id(&self) -> BlogPostId {
        self.id
    }

    fn sort_key(&self) -> (bool, DateTime<Utc>) {
        (self.published, self.created_at)
    }
}

/// Validated blog post fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogPostDraft {
    pub title: String,
    pub slug: Slug,
    pub excerpt: Option<String>,
    pub content: String,
    pub featured_image: Option<String>,
    pub published: bool,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub meta_description: Option<String>,
    pub reading_time: i32,
    pub author_id: IdentityId,
}

/// Blog post create/update request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogPostForm {
    #[serde(default)]
    pub title: String,
    /// Explicit slug; derived from the title when blank.
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: String,
    pub featured_image: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default, deserialize_with = "comma_list")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "comma_list")]
    pub categories: Vec<String>,
    pub meta_description: Option<String>,
}

impl DraftForm for BlogPostForm {
    type Record = BlogPost;

    fn into_draft(self, actor: IdentityId) -> Result<BlogPostDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = errors.text("title", "Title", &self.title, 1, 200);
        let content = errors.text("content", "Content", &self.content, 1, 100_000);
        let excerpt = errors.optional_text("excerpt", "Excerpt", self.excerpt.as_deref(), 500);
        let meta_description = errors.optional_text(
            "meta_description",
            "Meta description",
            self.meta_description.as_deref(),
            160,
        );
        let featured_image = optional_url(
            &mut errors,
            "featured_image",
            "Featured image",
            self.featured_image.as_deref(),
        );

        let slug = match Slug::explicit_or_derived(self.slug.as_deref(), &title) {
            Ok(slug) => Some(slug),
            Err(e) => {
                if errors.get("title").is_none() {
                    errors.add("slug", format!("Slug is invalid: {e}"));
                }
                None
            }
        };

        match slug {
            Some(slug) if errors.is_empty() => Ok(BlogPostDraft {
                reading_time: reading_time(&content),
                title,
                slug,
                excerpt,
                content,
                featured_image,
                published: self.published,
                tags: self.tags,
                categories: self.categories,
                meta_description,
                author_id: actor,
            }),
            _ => Err(errors),
        }
    }
}

/// A reader comment on a blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogComment {
    pub id: CommentId,
    pub blog_post_id: BlogPostId,
    pub author_name: String,
    #[serde(skip_serializing)]
    pub author_email: Email,
    pub content: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Validated comment fields. There is no approval field: new comments are
/// always stored unapproved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    pub blog_post_id: BlogPostId,
    pub author_name: String,
    pub author_email: Email,
    pub content: String,
}

/// Public comment submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub content: String,
}

impl CommentForm {
    /// Validate a comment for `post`.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn into_draft(self, post: BlogPostId) -> Result<CommentDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let author_name = errors.text("author_name", "Name", &self.author_name, 1, 100);
        let author_email = errors.email("author_email", &self.author_email);
        let content = errors.text("content", "Comment", &self.content, 1, 2000);

        match author_email {
            Some(author_email) if errors.is_empty() => Ok(CommentDraft {
                blog_post_id: post,
                author_name,
                author_email,
                content,
            }),
            _ => Err(errors),
        }
    }
}
