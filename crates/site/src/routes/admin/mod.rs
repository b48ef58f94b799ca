//! Admin routes, mounted under `/api/admin`.
//!
//! Everything except the bootstrap endpoints requires admin access through
//! [`crate::middleware::RequireAdmin`].

pub mod bootstrap;
pub mod contacts;
pub mod content;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::db::Store;
use crate::models::{BlogPostForm, ProjectForm, ResumeForm, TestimonialForm};
use crate::state::AppState;

pub use content::{Saved, content_routes};

/// Create the contact inbox router.
pub fn contact_routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/", get(contacts::list::<S>))
        .route("/{id}", put(contacts::update::<S>).delete(contacts::delete::<S>))
        .route("/{id}/reply", post(contacts::reply::<S>))
}

/// Create the admin router.
pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/bootstrap",
            get(bootstrap::status::<S>).post(bootstrap::run::<S>),
        )
        .nest("/projects", content_routes::<S, ProjectForm>())
        .nest("/blog", content_routes::<S, BlogPostForm>())
        .nest("/testimonials", content_routes::<S, TestimonialForm>())
        .nest("/resume", content_routes::<S, ResumeForm>())
        .nest("/contacts", contact_routes::<S>())
}
