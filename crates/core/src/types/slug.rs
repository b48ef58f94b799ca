//! URL slugs for blog posts and project case studies.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// Nothing usable was left after normalization.
    #[error("slug cannot be empty")]
    Empty,
    /// The slug is longer than [`Slug::MAX_LENGTH`].
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// An explicit slug contains characters outside `[a-z0-9-]`.
    #[error("slug may only contain lowercase letters, digits and single hyphens")]
    InvalidCharacters,
}

/// Derive a URL slug from a title.
///
/// Lower-cases the input, strips every character that is not an ASCII letter,
/// digit, whitespace or hyphen, and joins the remaining words with single
/// hyphens. Leading and trailing separators are dropped.
///
/// ```
/// use folio_core::derive_slug;
///
/// assert_eq!(derive_slug("Hello, World!"), "hello-world");
/// assert_eq!(derive_slug("  multi   space "), "multi-space");
/// ```
#[must_use]
pub fn derive_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_separator = true;
        }
    }

    slug
}

/// A validated URL slug (`[a-z0-9]+(-[a-z0-9]+)*`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Maximum slug length.
    pub const MAX_LENGTH: usize = 200;

    /// Build a slug from a title using [`derive_slug`].
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] if the title has no letters or digits, or
    /// [`SlugError::TooLong`] if the derived slug exceeds the maximum length.
    pub fn from_title(title: &str) -> Result<Self, SlugError> {
        Self::check(derive_slug(title))
    }

    /// Parse an explicitly supplied slug.
    ///
    /// Surrounding whitespace is ignored; the remainder must already be in
    /// canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::InvalidCharacters`] if the input is not canonical.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SlugError::Empty);
        }
        if derive_slug(s) != s {
            return Err(SlugError::InvalidCharacters);
        }
        Self::check(s.to_owned())
    }

    /// Use the explicit slug when one is supplied, otherwise derive it from
    /// the title.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`Slug::parse`] or [`Slug::from_title`].
    pub fn explicit_or_derived(explicit: Option<&str>, title: &str) -> Result<Self, SlugError> {
        match explicit.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Self::parse(s),
            None => Self::from_title(title),
        }
    }

    fn check(slug: String) -> Result<Self, SlugError> {
        if slug.is_empty() {
            return Err(SlugError::Empty);
        }
        if slug.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(slug))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
