//! Generic CRUD routes for one content table.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Serialize;

use crate::db::{Record, RecordStore, Store};
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::DraftForm;
use crate::services::{ContentManager, Notice};
use crate::state::AppState;

/// A written row plus the notice to show for it.
#[derive(Debug, Serialize)]
pub struct Saved<T> {
    pub data: T,
    pub notice: Notice,
}

/// `GET|POST /` and `PUT|DELETE /{id}` for the record written by `F`.
pub fn content_routes<S, F>() -> Router<AppState<S>>
where
    S: Store + RecordStore<F::Record>,
    F: DraftForm,
{
    Router::new()
        .route("/", get(list::<S, F::Record>).post(create::<S, F>))
        .route("/{id}", put(update::<S, F>).delete(delete::<S, F::Record>))
}

async fn list<S, T>(
    State(state): State<AppState<S>>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<T>>>
where
    S: Store + RecordStore<T>,
    T: Record,
{
    Ok(Json(ContentManager::<S, T>::new(state.store()).list().await?))
}

async fn create<S, F>(
    State(state): State<AppState<S>>,
    RequireAdmin(admin): RequireAdmin,
    Json(form): Json<F>,
) -> Result<(StatusCode, Json<Saved<F::Record>>)>
where
    S: Store + RecordStore<F::Record>,
    F: DraftForm,
{
    let (data, notice) = ContentManager::<S, F::Record>::new(state.store())
        .create(admin.id, form)
        .await?;
    Ok((StatusCode::CREATED, Json(Saved { data, notice })))
}

async fn update<S, F>(
    State(state): State<AppState<S>>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<<F::Record as Record>::Id>,
    Json(form): Json<F>,
) -> Result<Json<Saved<F::Record>>>
where
    S: Store + RecordStore<F::Record>,
    F: DraftForm,
{
    let (data, notice) = ContentManager::<S, F::Record>::new(state.store())
        .update(admin.id, id, form)
        .await?;
    Ok(Json(Saved { data, notice }))
}

async fn delete<S, T>(
    State(state): State<AppState<S>>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<T::Id>,
) -> Result<Json<Notice>>
where
    S: Store + RecordStore<T>,
    T: Record,
{
    let notice = ContentManager::<S, T>::new(state.store())
        .delete(admin.id, id)
        .await?;
    Ok(Json(notice))
}
