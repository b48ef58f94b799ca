//! In-process store.
//!
//! Holds every table in memory behind a single lock. Used by tests and local
//! previews; it enforces the same constraints as the database schema (unique
//! email, unique role pair, unique slugs) and the same role-write policy.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use folio_core::{
    AppRole, BlogPostId, CommentId, ContactId, ContactStatus, ContactSubmission, Email, IdentityId,
    ProjectId, ResumeId, RoleAssignmentId, TestimonialId,
};

use super::{
    BlogStore, ContactStore, HealthCheck, IdentityStore, ProjectStore, Record, RecordStore,
    RepositoryError, RoleStore, sort_records,
};
use crate::models::{
    BlogComment, BlogPost, BlogPostDraft, CommentDraft, Contact, Identity, Project, ProjectDraft,
    Resume, ResumeDraft, RoleAssignment, Testimonial, TestimonialDraft,
};

/// In-memory implementation of every store trait.
///
/// Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    identities: Vec<IdentityRow>,
    roles: Vec<RoleRow>,
    projects: Vec<Project>,
    posts: Vec<BlogPost>,
    comments: Vec<BlogComment>,
    testimonials: Vec<Testimonial>,
    contacts: Vec<Contact>,
    resumes: Vec<Resume>,
    clock: Option<DateTime<Utc>>,
    unavailable: bool,
}

struct IdentityRow {
    identity: Identity,
    password_hash: String,
}

struct RoleRow {
    id: RoleAssignmentId,
    identity: IdentityId,
    role: AppRole,
    created_at: DateTime<Utc>,
}

impl Tables {
    /// Strictly increasing timestamps so recency ordering is deterministic.
    fn now(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.clock {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.clock = Some(next);
        next
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.unavailable {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn has_role(&self, identity: IdentityId, role: AppRole) -> bool {
        self.roles
            .iter()
            .any(|r| r.identity == identity && r.role == role)
    }
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.tables.lock().unavailable = unavailable;
    }

    /// Every comment on a post, approved or not.
    #[must_use]
    pub fn all_comments(&self, post: BlogPostId) -> Vec<BlogComment> {
        self.tables
            .lock()
            .comments
            .iter()
            .filter(|c| c.blog_post_id == post)
            .cloned()
            .collect()
    }

    /// Approve a comment. Returns false if it does not exist.
    pub fn approve_comment(&self, id: CommentId) -> bool {
        let mut tables = self.tables.lock();
        match tables.comments.iter_mut().find(|c| c.id == id) {
            Some(comment) => {
                comment.approved = true;
                true
            }
            None => false,
        }
    }
}

// =============================================================================
// Generic CRUD
// =============================================================================

/// How a record type maps onto its in-memory table.
trait MemoryRecord: Record {
    fn table(tables: &mut Tables) -> &mut Vec<Self>;

    fn from_draft(id: Self::Id, draft: &Self::Draft, now: DateTime<Utc>) -> Self;

    fn apply(&mut self, draft: &Self::Draft, now: DateTime<Utc>);

    fn generate_id() -> Self::Id;

    /// Value that must be unique across the table, if any.
    fn unique_key(&self) -> Option<&str> {
        None
    }

    /// The table holds at most one row.
    const SINGLETON: bool = false;
}

fn ensure_unique<T: MemoryRecord>(rows: &[T], candidate: &T) -> Result<(), RepositoryError> {
    let Some(key) = candidate.unique_key() else {
        return Ok(());
    };
    let taken = rows
        .iter()
        .any(|row| row.id() != candidate.id() && row.unique_key() == Some(key));
    if taken {
        return Err(RepositoryError::Conflict(format!(
            "{} slug already exists",
            T::KIND
        )));
    }
    Ok(())
}

impl MemoryStore {
    fn list_row<T: MemoryRecord>(&self) -> Result<Vec<T>, RepositoryError> {
        let mut tables = self.tables.lock();
        tables.check()?;
        let mut rows = T::table(&mut tables).clone();
        sort_records(&mut rows);
        Ok(rows)
    }

    fn get_row<T: MemoryRecord>(&self, id: T::Id) -> Result<Option<T>, RepositoryError> {
        let mut tables = self.tables.lock();
        tables.check()?;
        Ok(T::table(&mut tables).iter().find(|r| r.id() == id).cloned())
    }

    fn insert_row<T: MemoryRecord>(&self, draft: &T::Draft) -> Result<T, RepositoryError> {
        let mut tables = self.tables.lock();
        tables.check()?;
        let now = tables.now();
        let row = T::from_draft(T::generate_id(), draft, now);
        let rows = T::table(&mut tables);
        if T::SINGLETON && !rows.is_empty() {
            return Err(RepositoryError::Conflict(format!(
                "a {} already exists; edit it instead",
                T::KIND
            )));
        }
        ensure_unique(rows, &row)?;
        rows.push(row.clone());
        Ok(row)
    }

    fn update_row<T: MemoryRecord>(&self, id: T::Id, draft: &T::Draft) -> Result<T, RepositoryError> {
        let mut tables = self.tables.lock();
        tables.check()?;
        let now = tables.now();
        let rows = T::table(&mut tables);
        let mut updated = rows
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        updated.apply(draft, now);
        ensure_unique(rows, &updated)?;
        if let Some(slot) = rows.iter_mut().find(|r| r.id() == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    fn delete_row<T: MemoryRecord>(&self, id: T::Id) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock();
        tables.check()?;
        let rows = T::table(&mut tables);
        let before = rows.len();
        rows.retain(|r| r.id() != id);
        let removed = rows.len() != before;
        if removed {
            // Comments follow their post.
            let posts: Vec<BlogPostId> = tables.posts.iter().map(|p| p.id).collect();
            tables.comments.retain(|c| posts.contains(&c.blog_post_id));
        }
        Ok(removed)
    }
}

macro_rules! memory_record_store {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl RecordStore<$ty> for MemoryStore {
                async fn list(&self) -> Result<Vec<$ty>, RepositoryError> {
                    self.list_row()
                }

                async fn get(&self, id: <$ty as Record>::Id) -> Result<Option<$ty>, RepositoryError> {
                    self.get_row(id)
                }

                async fn insert(&self, draft: &<$ty as Record>::Draft) -> Result<$ty, RepositoryError> {
                    self.insert_row(draft)
                }

                async fn update(
                    &self,
                    id: <$ty as Record>::Id,
                    draft: &<$ty as Record>::Draft,
                ) -> Result<$ty, RepositoryError> {
                    self.update_row(id, draft)
                }

                async fn delete(&self, id: <$ty as Record>::Id) -> Result<bool, RepositoryError> {
                    self.delete_row::<$ty>(id)
                }
            }
        )+
    };
}

memory_record_store!(Project, BlogPost, Testimonial, Resume);

impl MemoryRecord for Project {
    fn table(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.projects
    }

    fn from_draft(id: ProjectId, draft: &ProjectDraft, now: DateTime<Utc>) -> Self {
        let mut project = Self {
            id,
            title: String::new(),
            description: String::new(),
            tech_stack: folio_core::TechStack::default(),
            image_url: None,
            demo_url: None,
            code_url: None,
            featured: false,
            slug: None,
            case_study_content: None,
            created_at: now,
            updated_at: now,
        };
        project.apply(draft, now);
        project
    }

    fn apply(&mut self, draft: &ProjectDraft, now: DateTime<Utc>) {
        self.title.clone_from(&draft.title);
        self.description.clone_from(&draft.description);
        self.tech_stack = draft.tech_stack.clone();
        self.image_url.clone_from(&draft.image_url);
        self.demo_url.clone_from(&draft.demo_url);
        self.code_url.clone_from(&draft.code_url);
        self.featured = draft.featured;
        self.slug = Some(draft.slug.as_str().to_owned());
        self.case_study_content.clone_from(&draft.case_study_content);
        self.updated_at = now;
    }

    fn generate_id() -> ProjectId {
        ProjectId::generate()
    }

    fn unique_key(&self) -> Option<&str> {
        self.slug.as_deref()
    }
}

impl MemoryRecord for BlogPost {
    fn table(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.posts
    }

    fn from_draft(id: BlogPostId, draft: &BlogPostDraft, now: DateTime<Utc>) -> Self {
        let mut post = Self {
            id,
            title: String::new(),
            slug: String::new(),
            excerpt: None,
            content: String::new(),
            featured_image: None,
            published: false,
            tags: Vec::new(),
            categories: Vec::new(),
            meta_description: None,
            reading_time: 1,
            author_id: None,
            created_at: now,
            updated_at: now,
        };
        post.apply(draft, now);
        post
    }

    fn apply(&mut self, draft: &BlogPostDraft, now: DateTime<Utc>) {
        self.title.clone_from(&draft.title);
        self.slug = draft.slug.as_str().to_owned();
        self.excerpt.clone_from(&draft.excerpt);
        self.content.clone_from(&draft.content);
        self.featured_image.clone_from(&draft.featured_image);
        self.published = draft.published;
        self.tags.clone_from(&draft.tags);
        self.categories.clone_from(&draft.categories);
        self.meta_description.clone_from(&draft.meta_description);
        self.reading_time = draft.reading_time;
        self.author_id = Some(draft.author_id);
        self.updated_at = now;
    }

    fn generate_id() -> BlogPostId {
        BlogPostId::generate()
    }

    fn unique_key(&self) -> Option<&str> {
        Some(&self.slug)
    }
}

impl MemoryRecord for Testimonial {
    fn table(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.testimonials
    }

    fn from_draft(id: TestimonialId, draft: &TestimonialDraft, now: DateTime<Utc>) -> Self {
        let mut testimonial = Self {
            id,
            name: String::new(),
            position: None,
            company: None,
            content: String::new(),
            avatar_url: None,
            rating: draft.rating,
            featured: false,
            created_at: now,
            updated_at: now,
        };
        testimonial.apply(draft, now);
        testimonial
    }

    fn apply(&mut self, draft: &TestimonialDraft, now: DateTime<Utc>) {
        self.name.clone_from(&draft.name);
        self.position.clone_from(&draft.position);
        self.company.clone_from(&draft.company);
        self.content.clone_from(&draft.content);
        self.avatar_url.clone_from(&draft.avatar_url);
        self.rating = draft.rating;
        self.featured = draft.featured;
        self.updated_at = now;
    }

    fn generate_id() -> TestimonialId {
        TestimonialId::generate()
    }
}

impl MemoryRecord for Resume {
    const SINGLETON: bool = true;

    fn table(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.resumes
    }

    fn from_draft(id: ResumeId, draft: &ResumeDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: Some(draft.user_id),
            full_name: draft.full_name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            summary: draft.summary.clone(),
            skills: draft.skills.clone(),
            experience: draft.experience.clone(),
            education: draft.education.clone(),
            certifications: draft.certifications.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, draft: &ResumeDraft, now: DateTime<Utc>) {
        *self = Self {
            id: self.id,
            created_at: self.created_at,
            ..Self::from_draft(self.id, draft, now)
        };
    }

    fn generate_id() -> ResumeId {
        ResumeId::generate()
    }
}

// =============================================================================
// Roles and Identities
// =============================================================================

impl RoleStore for MemoryStore {
    async fn roles_for(&self, identity: IdentityId) -> Result<Vec<AppRole>, RepositoryError> {
        let tables = self.tables.lock();
        tables.check()?;
        Ok(tables
            .roles
            .iter()
            .filter(|r| r.identity == identity)
            .map(|r| r.role)
            .collect())
    }

    async fn admin_exists(&self) -> Result<bool, RepositoryError> {
        let tables = self.tables.lock();
        tables.check()?;
        Ok(tables.roles.iter().any(|r| r.role == AppRole::Admin))
    }

    async fn insert_role(&self, identity: IdentityId, role: AppRole) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock();
        tables.check()?;
        if tables.has_role(identity, role) {
            return Err(RepositoryError::Conflict("role already assigned".to_owned()));
        }
        if tables.roles.iter().any(|r| r.role == AppRole::Admin) {
            return Err(RepositoryError::PolicyViolation(
                "self-service role writes are closed once an admin exists".to_owned(),
            ));
        }
        let created_at = tables.now();
        tables.roles.push(RoleRow {
            id: RoleAssignmentId::generate(),
            identity,
            role,
            created_at,
        });
        Ok(())
    }

    async fn grant_role(&self, identity: IdentityId, role: AppRole) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock();
        tables.check()?;
        if tables.has_role(identity, role) {
            return Ok(false);
        }
        let created_at = tables.now();
        tables.roles.push(RoleRow {
            id: RoleAssignmentId::generate(),
            identity,
            role,
            created_at,
        });
        Ok(true)
    }

    async fn revoke_role(&self, identity: IdentityId, role: AppRole) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock();
        tables.check()?;
        let before = tables.roles.len();
        tables
            .roles
            .retain(|r| !(r.identity == identity && r.role == role));
        Ok(tables.roles.len() != before)
    }

    async fn role_assignments(&self) -> Result<Vec<RoleAssignment>, RepositoryError> {
        let tables = self.tables.lock();
        tables.check()?;
        let mut assignments: Vec<RoleAssignment> = tables
            .roles
            .iter()
            .filter_map(|r| {
                let row = tables
                    .identities
                    .iter()
                    .find(|i| i.identity.id == r.identity)?;
                Some(RoleAssignment {
                    id: r.id,
                    identity_id: r.identity,
                    email: row.identity.email.clone(),
                    role: r.role,
                    created_at: r.created_at,
                })
            })
            .collect();
        assignments.sort_by_key(|a| a.created_at);
        Ok(assignments)
    }
}

fn same_email(a: &Email, b: &Email) -> bool {
    a.as_str().eq_ignore_ascii_case(b.as_str())
}

impl IdentityStore for MemoryStore {
    async fn create_identity(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<Identity, RepositoryError> {
        let mut tables = self.tables.lock();
        tables.check()?;
        if tables
            .identities
            .iter()
            .any(|row| same_email(&row.identity.email, email))
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let identity = Identity {
            id: IdentityId::generate(),
            email: email.clone(),
            created_at: tables.now(),
        };
        tables.identities.push(IdentityRow {
            identity: identity.clone(),
            password_hash: password_hash.to_owned(),
        });
        Ok(identity)
    }

    async fn credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(Identity, String)>, RepositoryError> {
        let tables = self.tables.lock();
        tables.check()?;
        Ok(tables
            .identities
            .iter()
            .find(|row| same_email(&row.identity.email, email))
            .map(|row| (row.identity.clone(), row.password_hash.clone())))
    }

    async fn identity_by_email(&self, email: &Email) -> Result<Option<Identity>, RepositoryError> {
        let tables = self.tables.lock();
        tables.check()?;
        Ok(tables
            .identities
            .iter()
            .find(|row| same_email(&row.identity.email, email))
            .map(|row| row.identity.clone()))
    }
}

// =============================================================================
// Public Reads, Comments, Contacts
// =============================================================================

impl ProjectStore for MemoryStore {
    async fn project_by_slug(&self, slug: &str) -> Result<Option<Project>, RepositoryError> {
        let tables = self.tables.lock();
        tables.check()?;
        Ok(tables
            .projects
            .iter()
            .find(|p| p.slug.as_deref() == Some(slug))
            .cloned())
    }
}

impl BlogStore for MemoryStore {
    async fn published_posts(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        let tables = self.tables.lock();
        tables.check()?;
        let mut posts: Vec<BlogPost> = tables.posts.iter().filter(|p| p.published).cloned().collect();
        posts.sort_by_key(|p| std::cmp::Reverse(p.created_at));
        Ok(posts)
    }

    async fn published_post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, RepositoryError> {
        let tables = self.tables.lock();
        tables.check()?;
        Ok(tables
            .posts
            .iter()
            .find(|p| p.published && p.slug == slug)
            .cloned())
    }

    async fn approved_comments(&self, post: BlogPostId) -> Result<Vec<BlogComment>, RepositoryError> {
        let tables = self.tables.lock();
        tables.check()?;
        let mut comments: Vec<BlogComment> = tables
            .comments
            .iter()
            .filter(|c| c.blog_post_id == post && c.approved)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    async fn insert_comment(&self, draft: &CommentDraft) -> Result<BlogComment, RepositoryError> {
        let mut tables = self.tables.lock();
        tables.check()?;
        if !tables.posts.iter().any(|p| p.id == draft.blog_post_id) {
            return Err(RepositoryError::NotFound);
        }
        let comment = BlogComment {
            id: CommentId::generate(),
            blog_post_id: draft.blog_post_id,
            author_name: draft.author_name.clone(),
            author_email: draft.author_email.clone(),
            content: draft.content.clone(),
            approved: false,
            created_at: tables.now(),
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }
}

impl ContactStore for MemoryStore {
    async fn contacts(&self) -> Result<Vec<Contact>, RepositoryError> {
        let tables = self.tables.lock();
        tables.check()?;
        let mut contacts = tables.contacts.clone();
        contacts.sort_by_key(|c| std::cmp::Reverse(c.created_at));
        Ok(contacts)
    }

    async fn contact(&self, id: ContactId) -> Result<Option<Contact>, RepositoryError> {
        let tables = self.tables.lock();
        tables.check()?;
        Ok(tables.contacts.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_contact(
        &self,
        submission: &ContactSubmission,
    ) -> Result<Contact, RepositoryError> {
        let mut tables = self.tables.lock();
        tables.check()?;
        let contact = Contact {
            id: ContactId::generate(),
            name: submission.name.clone(),
            email: submission.email.clone(),
            message: submission.message.clone(),
            status: ContactStatus::Unread,
            created_at: tables.now(),
        };
        tables.contacts.push(contact.clone());
        Ok(contact)
    }

    async fn set_contact_status(
        &self,
        id: ContactId,
        status: ContactStatus,
    ) -> Result<Contact, RepositoryError> {
        let mut tables = self.tables.lock();
        tables.check()?;
        let contact = tables
            .contacts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        contact.status = status;
        Ok(contact.clone())
    }

    async fn delete_contact(&self, id: ContactId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock();
        tables.check()?;
        let before = tables.contacts.len();
        tables.contacts.retain(|c| c.id != id);
        Ok(tables.contacts.len() != before)
    }
}

impl HealthCheck for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.tables.lock().check()
    }
}
