//! Public read paths and visitor submissions.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{BlogComment, BlogPost, CommentForm, ContactForm, Project, Resume, Testimonial};
use crate::services::{Portfolio, PublicContent, submit_contact};
use crate::state::AppState;

pub async fn portfolio<S: Store>(State(state): State<AppState<S>>) -> Result<Json<Portfolio>> {
    Ok(Json(PublicContent::new(state.store()).portfolio().await?))
}

pub async fn projects<S: Store>(State(state): State<AppState<S>>) -> Result<Json<Vec<Project>>> {
    Ok(Json(PublicContent::new(state.store()).projects().await?))
}

pub async fn project<S: Store>(
    State(state): State<AppState<S>>,
    Path(slug): Path<String>,
) -> Result<Json<Project>> {
    Ok(Json(PublicContent::new(state.store()).project(&slug).await?))
}

pub async fn testimonials<S: Store>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Testimonial>>> {
    Ok(Json(PublicContent::new(state.store()).testimonials().await?))
}

pub async fn resume<S: Store>(State(state): State<AppState<S>>) -> Result<Json<Resume>> {
    PublicContent::new(state.store())
        .resume()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No resume published".to_string()))
}

pub async fn blog<S: Store>(State(state): State<AppState<S>>) -> Result<Json<Vec<BlogPost>>> {
    Ok(Json(PublicContent::new(state.store()).published_posts().await?))
}

pub async fn post<S: Store>(
    State(state): State<AppState<S>>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPost>> {
    Ok(Json(PublicContent::new(state.store()).post(&slug).await?))
}

pub async fn comments<S: Store>(
    State(state): State<AppState<S>>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<BlogComment>>> {
    Ok(Json(
        PublicContent::new(state.store())
            .approved_comments(&slug)
            .await?,
    ))
}

/// Submit a comment. It is stored unapproved and hidden until moderated.
pub async fn submit_comment<S: Store>(
    State(state): State<AppState<S>>,
    Path(slug): Path<String>,
    Json(form): Json<CommentForm>,
) -> Result<(StatusCode, Json<Value>)> {
    let comment = PublicContent::new(state.store())
        .submit_comment(&slug, form)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "comment": comment,
            "message": "Comment submitted for moderation",
        })),
    ))
}

/// Submit the contact form.
pub async fn contact<S: Store>(
    State(state): State<AppState<S>>,
    Json(form): Json<ContactForm>,
) -> Result<(StatusCode, Json<Value>)> {
    let contact = submit_contact(state.store(), &form).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": contact.id,
            "message": "Message sent successfully",
        })),
    ))
}
