//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Email and password sign-up and sign-in
//! - `roles` - Admin flag resolution
//! - `session` - Session-backed authentication context
//! - `bootstrap` - First-admin setup (self-service, setup key, bypass)
//! - `content` - Admin content managers and dashboard notices
//! - `contacts` - Contact form submission and the admin inbox
//! - `public` - Unauthenticated read paths

pub mod auth;
pub mod bootstrap;
pub mod contacts;
pub mod content;
pub mod public;
pub mod roles;
pub mod session;

pub use auth::{AuthError, AuthService};
pub use bootstrap::{
    BootstrapError, BootstrapFlow, BootstrapMethod, BootstrapOutcome, BootstrapRequest,
    BootstrapStatus, manual_setup_sql,
};
pub use contacts::{ContactError, ContactInbox, submit_contact};
pub use content::{ContentError, ContentManager, Notice, NoticeLevel};
pub use public::{Portfolio, PublicContent};
pub use roles::resolve_role;
pub use session::SessionStore;
