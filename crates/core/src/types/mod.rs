//! Core types for Folio.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod resume;
pub mod slug;
pub mod status;
pub mod tech_stack;
pub mod validation;

pub use email::{Email, EmailError};
pub use id::*;
pub use resume::*;
pub use slug::{Slug, SlugError, derive_slug};
pub use status::*;
pub use tech_stack::TechStack;
pub use validation::{ContactSubmission, ValidationErrors};
