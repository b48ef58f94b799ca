//! Domain models for the site.
//!
//! Each content type comes in three shapes:
//!
//! - the stored row (`Project`), returned by stores and serialized to clients
//! - a validated draft (`ProjectDraft`), the full field set a write takes
//! - a request form (`ProjectForm`), deserialized from JSON and turned into a
//!   draft by [`DraftForm::into_draft`]

pub mod blog;
pub mod contact;
pub mod identity;
pub mod project;
pub mod resume;
pub mod session;
pub mod testimonial;

use serde::{Deserialize, Deserializer, de::DeserializeOwned};

use folio_core::{IdentityId, TechStack, ValidationErrors};

use crate::db::Record;

pub use blog::{BlogComment, BlogPost, BlogPostDraft, BlogPostForm, CommentDraft, CommentForm};
pub use contact::{Contact, ContactForm, Reply, ReplyForm, StatusUpdate};
pub use identity::{Identity, RoleAssignment};
pub use project::{Project, ProjectDraft, ProjectForm};
pub use resume::{Resume, ResumeDraft, ResumeForm};
pub use session::{AdminStatus, AuthContext, BypassGrant, CurrentIdentity, keys as session_keys};
pub use testimonial::{Testimonial, TestimonialDraft, TestimonialForm};

/// A request body that validates into a [`Record`] draft.
pub trait DraftForm: DeserializeOwned + Send + 'static {
    /// The record this form writes.
    type Record: Record;

    /// Validate the form. `actor` is the admin performing the write.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    fn into_draft(
        self,
        actor: IdentityId,
    ) -> Result<<Self::Record as Record>::Draft, ValidationErrors>;
}

/// Validate an optional link: blank becomes `None`, otherwise it must be an
/// absolute `http`/`https` URL.
pub(crate) fn optional_url(
    errors: &mut ValidationErrors,
    field: &str,
    label: &str,
    value: Option<&str>,
) -> Option<String> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(value.to_owned()),
        _ => {
            errors.add(field, format!("{label} must be a valid http(s) URL"));
            None
        }
    }
}

/// Deserialize a list given either as a comma-separated string or an array.
pub(crate) fn comma_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    TechStack::deserialize(deserializer).map(TechStack::into_inner)
}
