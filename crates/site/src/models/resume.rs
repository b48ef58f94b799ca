//! The site owner's resume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::{
    Certifications, Education, Email, Experience, IdentityId, ResumeId, SkillSet, ValidationErrors,
};

use super::DraftForm;
use crate::db::Record;

/// The resume. Only the most recently updated row is ever shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resume {
    pub id: ResumeId,
    pub user_id: Option<IdentityId>,
    pub full_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub summary: Option<String>,
    pub skills: SkillSet,
    pub experience: Experience,
    pub education: Education,
    pub certifications: Certifications,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Resume {
    type Id = ResumeId;
    type Draft = ResumeDraft;

    const KIND: &'static str = "resume";
    const LABEL: &'static str = "Resume";

    fn id(&self) -> ResumeId {
        self.id
    }

    fn sort_key(&self) -> (bool, DateTime<Utc>) {
        (false, self.updated_at)
    }
}

/// Validated resume fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeDraft {
    pub user_id: IdentityId,
    pub full_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub summary: Option<String>,
    pub skills: SkillSet,
    pub experience: Experience,
    pub education: Education,
    pub certifications: Certifications,
}

/// Resume create/update request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: SkillSet,
    #[serde(default)]
    pub experience: Experience,
    #[serde(default)]
    pub education: Education,
    #[serde(default)]
    pub certifications: Certifications,
}

impl DraftForm for ResumeForm {
    type Record = Resume;

    fn into_draft(self, actor: IdentityId) -> Result<ResumeDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let full_name = errors.text("full_name", "Full name", &self.full_name, 1, 100);
        let email = errors.email("email", &self.email);
        let phone = errors.optional_text("phone", "Phone", self.phone.as_deref(), 40);
        let summary = errors.optional_text("summary", "Summary", self.summary.as_deref(), 5000);

        for (i, position) in self.experience.positions.iter().enumerate() {
            if position.title.trim().is_empty() || position.company.trim().is_empty() {
                errors.add(
                    &format!("experience.positions[{i}]"),
                    "Each position needs a title and a company",
                );
            }
        }
        for (i, degree) in self.education.degrees.iter().enumerate() {
            if degree.degree.trim().is_empty() || degree.institution.trim().is_empty() {
                errors.add(
                    &format!("education.degrees[{i}]"),
                    "Each degree needs a name and an institution",
                );
            }
        }

        match email {
            Some(email) if errors.is_empty() => Ok(ResumeDraft {
                user_id: actor,
                full_name,
                email,
                phone,
                summary,
                skills: self.skills,
                experience: self.experience,
                education: self.education,
                certifications: self.certifications,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_sections_parse() {
        let form: ResumeForm = serde_json::from_str(
            r#"{
                "full_name": "Ada Lovelace",
                "email": "ada@example.com",
                "skills": {"technical": ["Rust"], "tools": ["Git"]},
                "experience": {"positions": [
                    {"title": "Engineer", "company": "Analytical Engines", "duration": "1842 - 1843",
                     "responsibilities": ["Wrote the first program"]}
                ]},
                "certifications": {"certifications": ["CKA"]}
            }"#,
        )
        .unwrap();

        let actor = IdentityId::generate();
        let draft = form.into_draft(actor).unwrap();
        assert_eq!(draft.user_id, actor);
        assert_eq!(draft.skills.technical, ["Rust"]);
        assert_eq!(draft.experience.positions.len(), 1);
        assert_eq!(draft.certifications.certifications[0].name, "CKA");
        assert!(draft.education.degrees.is_empty());
    }

    #[test]
    fn test_incomplete_position_rejected() {
        let form: ResumeForm = serde_json::from_str(
            r#"{"full_name": "Ada", "email": "ada@example.com",
                "experience": {"positions": [{"title": "Engineer"}]}}"#,
        )
        .unwrap();

        let err = form.into_draft(IdentityId::generate()).unwrap_err();
        assert!(err.get("experience.positions[0]").is_some());
    }

    #[test]
    fn test_name_and_email_required() {
        let err = ResumeForm::default()
            .into_draft(IdentityId::generate())
            .unwrap_err();
        assert_eq!(err.get("full_name"), Some("Full name is required"));
        assert_eq!(err.get("email"), Some("Invalid email address"));
    }
}
