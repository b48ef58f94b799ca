//! Blog posts and comments.

use chrono::{DateTime, Utc};

use folio_core::{BlogPostId, CommentId, IdentityId};

use super::{PgStore, stored_email};
use crate::db::{BlogStore, RecordStore, RepositoryError};
use crate::models::{BlogComment, BlogPost, BlogPostDraft, CommentDraft};

const COLUMNS: &str = "id, title, slug, excerpt, content, featured_image, published, tags, \
                       categories, meta_description, reading_time, author_id, created_at, updated_at";

const COMMENT_COLUMNS: &str =
    "id, blog_post_id, author_name, author_email, content, approved, created_at";

const SLUG_TAKEN: &str = "a post with this slug already exists";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: BlogPostId,
    title: String,
    slug: String,
    excerpt: Option<String>,
    content: String,
    featured_image: Option<String>,
    published: bool,
    tags: Vec<String>,
    categories: Vec<String>,
    meta_description: Option<String>,
    reading_time: i32,
    author_id: Option<IdentityId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PostRow> for BlogPost {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            excerpt: row.excerpt,
            content: row.content,
            featured_image: row.featured_image,
            published: row.published,
            tags: row.tags,
            categories: row.categories,
            meta_description: row.meta_description,
            reading_time: row.reading_time,
            author_id: row.author_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: CommentId,
    blog_post_id: BlogPostId,
    author_name: String,
    author_email: String,
    content: String,
    approved: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<CommentRow> for BlogComment {
    type Error = RepositoryError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            blog_post_id: row.blog_post_id,
            author_name: row.author_name,
            author_email: stored_email(&row.author_email)?,
            content: row.content,
            approved: row.approved,
            created_at: row.created_at,
        })
    }
}

impl RecordStore<BlogPost> for PgStore {
    async fn list(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        let rows: Vec<PostRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM blog_posts ORDER BY published DESC, created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BlogPost::from).collect())
    }

    async fn get(&self, id: BlogPostId) -> Result<Option<BlogPost>, RepositoryError> {
        let row: Option<PostRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM blog_posts WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(BlogPost::from))
    }

    async fn insert(&self, draft: &BlogPostDraft) -> Result<BlogPost, RepositoryError> {
        let row: PostRow = sqlx::query_as(&format!(
            r"
            INSERT INTO blog_posts (id, title, slug, excerpt, content, featured_image, published,
                                    tags, categories, meta_description, reading_time, author_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {COLUMNS}
            "
        ))
        .bind(BlogPostId::generate())
        .bind(&draft.title)
        .bind(draft.slug.as_str())
        .bind(&draft.excerpt)
        .bind(&draft.content)
        .bind(&draft.featured_image)
        .bind(draft.published)
        .bind(&draft.tags)
        .bind(&draft.categories)
        .bind(&draft.meta_description)
        .bind(draft.reading_time)
        .bind(draft.author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_or(e, SLUG_TAKEN))?;

        Ok(row.into())
    }

    async fn update(&self, id: BlogPostId, draft: &BlogPostDraft) -> Result<BlogPost, RepositoryError> {
        let row: Option<PostRow> = sqlx::query_as(&format!(
            r"
            UPDATE blog_posts
            SET title = $2, slug = $3, excerpt = $4, content = $5, featured_image = $6,
                published = $7, tags = $8, categories = $9, meta_description = $10,
                reading_time = $11, author_id = $12, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(draft.slug.as_str())
        .bind(&draft.excerpt)
        .bind(&draft.content)
        .bind(&draft.featured_image)
        .bind(draft.published)
        .bind(&draft.tags)
        .bind(&draft.categories)
        .bind(&draft.meta_description)
        .bind(draft.reading_time)
        .bind(draft.author_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_or(e, SLUG_TAKEN))?;

        row.map(BlogPost::from).ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: BlogPostId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl BlogStore for PgStore {
    async fn published_posts(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        let rows: Vec<PostRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM blog_posts WHERE published ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BlogPost::from).collect())
    }

    async fn published_post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, RepositoryError> {
        let row: Option<PostRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM blog_posts WHERE slug = $1 AND published"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BlogPost::from))
    }

    async fn approved_comments(&self, post: BlogPostId) -> Result<Vec<BlogComment>, RepositoryError> {
        let rows: Vec<CommentRow> = sqlx::query_as(&format!(
            r"
            SELECT {COMMENT_COLUMNS} FROM blog_comments
            WHERE blog_post_id = $1 AND approved
            ORDER BY created_at
            "
        ))
        .bind(post)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BlogComment::try_from).collect()
    }

    async fn insert_comment(&self, draft: &CommentDraft) -> Result<BlogComment, RepositoryError> {
        let row: CommentRow = sqlx::query_as(&format!(
            r"
            INSERT INTO blog_comments (id, blog_post_id, author_name, author_email, content, approved)
            VALUES ($1, $2, $3, $4, $5, false)
            RETURNING {COMMENT_COLUMNS}
            "
        ))
        .bind(CommentId::generate())
        .bind(draft.blog_post_id)
        .bind(&draft.author_name)
        .bind(draft.author_email.as_str())
        .bind(&draft.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }
}
