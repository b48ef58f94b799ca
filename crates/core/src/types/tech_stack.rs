//! Project technology lists.

use serde::{Deserialize, Deserializer, Serialize};

/// The ordered list of technologies used by a project.
///
/// Admin forms submit the stack as a single comma-separated string; API
/// clients may also send a JSON array. Both forms deserialize into the same
/// ordered sequence, with items trimmed and empty items dropped.
///
/// ```
/// use folio_core::TechStack;
///
/// let stack = TechStack::parse("Go, React, Postgres");
/// assert_eq!(stack.as_slice(), ["Go", "React", "Postgres"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TechStack(Vec<String>);

impl TechStack {
    /// Parse a comma-separated technology list.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self::from_items(input.split(','))
    }

    /// Build a stack from individual items, trimming and dropping blanks.
    #[must_use]
    pub fn from_items<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self(
            items
                .into_iter()
                .map(|item| item.as_ref().trim().to_owned())
                .filter(|item| !item.is_empty())
                .collect(),
        )
    }

    /// Returns the technologies in order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns true if no technologies are listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the stack and returns the inner list.
    #[must_use]
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl<'de> Deserialize<'de> for TechStack {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Input {
            Joined(String),
            Items(Vec<String>),
        }

        Ok(match Input::deserialize(deserializer)? {
            Input::Joined(s) => Self::parse(&s),
            Input::Items(items) => Self::from_items(items),
        })
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for TechStack {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Vec<String> as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Vec<String> as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for TechStack {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let items = <Vec<String> as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(items))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for TechStack {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Vec<String> as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_order() {
        let stack = TechStack::parse("Go, React, Postgres");
        assert_eq!(stack.as_slice(), ["Go", "React", "Postgres"]);
    }

    #[test]
    fn test_parse_drops_blank_items() {
        let stack = TechStack::parse(" Rust ,, ,Axum,");
        assert_eq!(stack.as_slice(), ["Rust", "Axum"]);
    }

    #[test]
    fn test_parse_empty() {
        assert!(TechStack::parse("   ").is_empty());
    }

    #[test]
    fn test_deserialize_from_string() {
        let stack: TechStack = serde_json::from_str("\"Go, React, Postgres\"").unwrap();
        assert_eq!(stack.as_slice(), ["Go", "React", "Postgres"]);
    }

    #[test]
    fn test_deserialize_from_array() {
        let stack: TechStack = serde_json::from_str(r#"[" Go", "", "React "]"#).unwrap();
        assert_eq!(stack.as_slice(), ["Go", "React"]);
    }

    #[test]
    fn test_serializes_as_array() {
        let json = serde_json::to_string(&TechStack::parse("Go, React")).unwrap();
        assert_eq!(json, r#"["Go","React"]"#);
    }
}
