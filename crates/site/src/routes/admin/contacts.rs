//! Contact inbox routes.

use axum::{
    Json,
    extract::{Path, State},
};

use folio_core::ContactId;

use super::content::Saved;
use crate::db::Store;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{Contact, ReplyForm, StatusUpdate};
use crate::services::{ContactInbox, Notice};
use crate::state::AppState;

pub async fn list<S: Store>(
    State(state): State<AppState<S>>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<Contact>>> {
    Ok(Json(ContactInbox::new(state.store()).list().await?))
}

/// Status transition. `replied` is only reachable through [`reply`].
pub async fn update<S: Store>(
    State(state): State<AppState<S>>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ContactId>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Saved<Contact>>> {
    let (data, notice) = ContactInbox::new(state.store())
        .transition(admin.id, id, update.status)
        .await?;
    Ok(Json(Saved { data, notice }))
}

pub async fn reply<S: Store>(
    State(state): State<AppState<S>>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ContactId>,
    Json(form): Json<ReplyForm>,
) -> Result<Json<Saved<Contact>>> {
    let (data, notice) = ContactInbox::new(state.store())
        .reply(admin.id, id, &form)
        .await?;
    Ok(Json(Saved { data, notice }))
}

pub async fn delete<S: Store>(
    State(state): State<AppState<S>>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ContactId>,
) -> Result<Json<Notice>> {
    Ok(Json(
        ContactInbox::new(state.store()).delete(admin.id, id).await?,
    ))
}
