//! Client testimonials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::{IdentityId, TestimonialId, ValidationErrors};

use super::{DraftForm, optional_url};
use crate::db::Record;

/// Allowed star ratings.
pub const RATING_RANGE: std::ops::RangeInclusive<i16> = 1..=5;

/// A testimonial shown on the marketing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Testimonial {
    pub id: TestimonialId,
    pub name: String,
    pub position: Option<String>,
    pub company: Option<String>,
    pub content: String,
    pub avatar_url: Option<String>,
    /// Star rating, 1-5.
    pub rating: i16,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Testimonial {
    type Id = TestimonialId;
    type Draft = TestimonialDraft;

    const KIND: &'static str = "testimonial";
    const LABEL: &'static str = "Testimonial";

    fn id(&self) -> TestimonialId {
        self.id
    }

    fn sort_key(&self) -> (bool, DateTime<Utc>) {
        (self.featured, self.created_at)
    }
}

/// Validated testimonial fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestimonialDraft {
    pub name: String,
    pub position: Option<String>,
    pub company: Option<String>,
    pub content: String,
    pub avatar_url: Option<String>,
    pub rating: i16,
    pub featured: bool,
}

const fn default_rating() -> i16 {
    5
}

/// Testimonial create/update request.
#[derive(Debug, Clone, Deserialize)]
pub struct TestimonialForm {
    #[serde(default)]
    pub name: String,
    pub position: Option<String>,
    pub company: Option<String>,
    #[serde(default)]
    pub content: String,
    pub avatar_url: Option<String>,
    #[serde(default = "default_rating")]
    pub rating: i16,
    #[serde(default)]
    pub featured: bool,
}

impl DraftForm for TestimonialForm {
    type Record = Testimonial;

    fn into_draft(self, _actor: IdentityId) -> Result<TestimonialDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.text("name", "Name", &self.name, 1, 100);
        let position = errors.optional_text("position", "Position", self.position.as_deref(), 100);
        let company = errors.optional_text("company", "Company", self.company.as_deref(), 100);
        let content = errors.text("content", "Testimonial", &self.content, 1, 2000);
        let avatar_url = optional_url(&mut errors, "avatar_url", "Avatar URL", self.avatar_url.as_deref());
        if !RATING_RANGE.contains(&self.rating) {
            errors.add("rating", "Rating must be between 1 and 5");
        }

        errors.finish(|| TestimonialDraft {
            name,
            position,
            company,
            content,
            avatar_url,
            rating: self.rating,
            featured: self.featured,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(json: &str) -> TestimonialForm {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_rating_defaults_to_five() {
        let draft = form(r#"{"name": "Sam", "content": "Great work"}"#)
            .into_draft(IdentityId::generate())
            .unwrap();
        assert_eq!(draft.rating, 5);
    }

    #[test]
    fn test_rating_bounds() {
        for rating in [0, 6, -1] {
            let err = form(&format!(
                r#"{{"name": "Sam", "content": "Great", "rating": {rating}}}"#
            ))
            .into_draft(IdentityId::generate())
            .unwrap_err();
            assert_eq!(err.get("rating"), Some("Rating must be between 1 and 5"));
        }

        for rating in 1..=5 {
            let draft = form(&format!(
                r#"{{"name": "Sam", "content": "Great", "rating": {rating}}}"#
            ))
            .into_draft(IdentityId::generate())
            .unwrap();
            assert_eq!(draft.rating, rating);
        }
    }

    #[test]
    fn test_blank_optional_fields_become_none() {
        let draft = form(r#"{"name": "Sam", "content": "Great", "company": " ", "position": ""}"#)
            .into_draft(IdentityId::generate())
            .unwrap();
        assert_eq!(draft.company, None);
        assert_eq!(draft.position, None);
    }
}
