//! Portfolio projects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::{IdentityId, ProjectId, Slug, TechStack, ValidationErrors};

use super::{DraftForm, optional_url};
use crate::db::Record;

/// A portfolio project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub tech_stack: TechStack,
    pub image_url: Option<String>,
    pub demo_url: Option<String>,
    pub code_url: Option<String>,
    pub featured: bool,
    /// Case-study URL slug. Rows written before slugs existed have none.
    pub slug: Option<String>,
    /// Long-form case study, shown on the project page.
    pub case_study_content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Project {
    type Id = ProjectId;
    type Draft = ProjectDraft;

    const KIND: &'static str = "project";
    const LABEL: &'static str = "Project";

    fn id(&self) -> ProjectId {
        self.id
    }

    fn sort_key(&self) -> (bool, DateTime<Utc>) {
        (self.featured, self.created_at)
    }
}

/// Validated project fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub tech_stack: TechStack,
    pub image_url: Option<String>,
    pub demo_url: Option<String>,
    pub code_url: Option<String>,
    pub featured: bool,
    pub slug: Slug,
    pub case_study_content: Option<String>,
}

/// Project create/update request.
///
/// `tech_stack` may be a comma-separated string or a list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tech_stack: TechStack,
    pub image_url: Option<String>,
    pub demo_url: Option<String>,
    pub code_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    pub slug: Option<String>,
    pub case_study_content: Option<String>,
}

impl DraftForm for ProjectForm {
    type Record = Project;

    fn into_draft(self, _actor: IdentityId) -> Result<ProjectDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = errors.text("title", "Title", &self.title, 1, 200);
        let description = errors.text("description", "Description", &self.description, 1, 5000);
        let image_url = optional_url(&mut errors, "image_url", "Image URL", self.image_url.as_deref());
        let demo_url = optional_url(&mut errors, "demo_url", "Demo URL", self.demo_url.as_deref());
        let code_url = optional_url(&mut errors, "code_url", "Code URL", self.code_url.as_deref());
        let case_study_content = self
            .case_study_content
            .filter(|content| !content.trim().is_empty());

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
            Some(slug) if errors.is_empty() => Ok(ProjectDraft {
                title,
                description,
                tech_stack: self.tech_stack,
                image_url,
                demo_url,
                code_url,
                featured: self.featured,
                slug,
                case_study_content,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(json: &str) -> ProjectForm {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_tech_stack_string_is_split() {
        let draft = form(
            r#"{"title": "Folio", "description": "Site", "tech_stack": "Go, React, Postgres"}"#,
        )
        .into_draft(IdentityId::generate())
        .unwrap();
        assert_eq!(draft.tech_stack.as_slice(), ["Go", "React", "Postgres"]);
    }

    #[test]
    fn test_empty_urls_become_none() {
        let draft = form(
            r#"{"title": "Folio", "description": "Site", "image_url": "", "demo_url": "  "}"#,
        )
        .into_draft(IdentityId::generate())
        .unwrap();
        assert_eq!(draft.image_url, None);
        assert_eq!(draft.demo_url, None);
        assert_eq!(draft.code_url, None);
    }

    #[test]
    fn test_slug_derived_from_title() {
        let draft = form(r#"{"title": "My Cool App!", "description": "Site"}"#)
            .into_draft(IdentityId::generate())
            .unwrap();
        assert_eq!(draft.slug.as_str(), "my-cool-app");
    }

    #[test]
    fn test_missing_title_reports_title_only() {
        let err = form(r#"{"description": "Site"}"#)
            .into_draft(IdentityId::generate())
            .unwrap_err();
        assert_eq!(err.get("title"), Some("Title is required"));
        assert!(err.get("slug").is_none());
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = form(r#"{"title": "A", "description": "B", "code_url": "not a url"}"#)
            .into_draft(IdentityId::generate())
            .unwrap_err();
        assert!(err.get("code_url").is_some());
    }
}
