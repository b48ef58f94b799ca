//! Typed resume sections.
//!
//! Each section is stored as one JSONB column. The shapes below are the
//! canonical schema; [`Certification`] additionally accepts a bare string so
//! older rows that listed certifications by name still load.

use serde::{Deserialize, Deserializer, Serialize};

/// Skills grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillSet {
    pub technical: Vec<String>,
    pub frameworks: Vec<String>,
    pub tools: Vec<String>,
    pub soft_skills: Vec<String>,
}

impl SkillSet {
    /// Every skill across all categories, in category order.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.technical
            .iter()
            .chain(&self.frameworks)
            .chain(&self.tools)
            .chain(&self.soft_skills)
            .map(String::as_str)
    }

    /// Returns true if no category lists a skill.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all().next().is_none()
    }
}

/// One position held, most recent first in [`Experience::positions`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub title: String,
    pub company: String,
    /// Free-form period, e.g. "2021 - present".
    pub duration: String,
    pub responsibilities: Vec<String>,
    pub description: Option<String>,
}

impl Position {
    /// One-line summary: the description, or the responsibilities joined.
    #[must_use]
    pub fn summary(&self) -> String {
        self.description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| self.responsibilities.join(", "))
    }
}

/// Work history section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub positions: Vec<Position>,
}

/// One degree or diploma.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Degree {
    pub degree: String,
    pub institution: String,
    pub graduation_year: Option<i32>,
}

/// Education section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub degrees: Vec<Degree>,
}

/// A professional certification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Certification {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl<'de> Deserialize<'de> for Certification {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Detailed {
            name: String,
            #[serde(default)]
            issuer: Option<String>,
            #[serde(default)]
            year: Option<i32>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Input {
            Name(String),
            Detailed(Detailed),
        }

        Ok(match Input::deserialize(deserializer)? {
            Input::Name(name) => Self {
                name,
                ..Self::default()
            },
            Input::Detailed(d) => Self {
                name: d.name,
                issuer: d.issuer,
                year: d.year,
            },
        })
    }
}

/// Certifications section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certifications {
    pub certifications: Vec<Certification>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_set_flattens_in_category_order() {
        let skills = SkillSet {
            technical: vec!["Rust".into()],
            frameworks: vec!["Axum".into()],
            tools: vec!["Docker".into()],
            soft_skills: vec!["Mentoring".into()],
        };
        let all: Vec<&str> = skills.all().collect();
        assert_eq!(all, ["Rust", "Axum", "Docker", "Mentoring"]);
        assert!(!skills.is_empty());
        assert!(SkillSet::default().is_empty());
    }

    #[test]
    fn test_missing_categories_default_to_empty() {
        let skills: SkillSet = serde_json::from_str(r#"{"technical": ["SQL"]}"#).unwrap();
        assert_eq!(skills.technical, ["SQL"]);
        assert!(skills.tools.is_empty());
    }

    #[test]
    fn test_position_summary_prefers_description() {
        let mut position = Position {
            responsibilities: vec!["Shipped APIs".into(), "Led reviews".into()],
            ..Position::default()
        };
        assert_eq!(position.summary(), "Shipped APIs, Led reviews");

        position.description = Some("Backend lead".into());
        assert_eq!(position.summary(), "Backend lead");
    }

    #[test]
    fn test_certifications_accept_names_and_objects() {
        let parsed: Certifications = serde_json::from_str(
            r#"{"certifications": ["CKA", {"name": "AWS SAA", "issuer": "Amazon", "year": 2023}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.certifications.len(), 2);
        assert_eq!(parsed.certifications[0].name, "CKA");
        assert_eq!(parsed.certifications[0].issuer, None);
        assert_eq!(parsed.certifications[1].issuer.as_deref(), Some("Amazon"));
        assert_eq!(parsed.certifications[1].year, Some(2023));
    }

    #[test]
    fn test_education_graduation_year() {
        let education: Education = serde_json::from_str(
            r#"{"degrees": [{"degree": "BSc", "institution": "Uni", "graduation_year": 2015}]}"#,
        )
        .unwrap();
        assert_eq!(education.degrees[0].graduation_year, Some(2015));
    }
}
