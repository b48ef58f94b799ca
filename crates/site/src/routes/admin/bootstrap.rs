//! First-admin bootstrap.
//!
//! Open to any signed-in identity: the flow itself decides whether the
//! requested method is allowed.

use axum::{Json, extract::State};
use serde_json::{Value, json};
use tower_sessions::Session;

use crate::db::Store;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireIdentity;
use crate::services::{BootstrapFlow, BootstrapOutcome, BootstrapRequest, BootstrapStatus, SessionStore};
use crate::state::AppState;

/// Current bootstrap state and the manual setup statement.
pub async fn status<S: Store>(
    State(state): State<AppState<S>>,
    RequireIdentity { identity, context }: RequireIdentity,
) -> Result<Json<BootstrapStatus>> {
    let status = BootstrapFlow::new(state.store(), &state.config().bootstrap)
        .status(&identity, &context)
        .await?;
    Ok(Json(status))
}

/// Run one bootstrap method and return the refreshed auth context.
pub async fn run<S: Store>(
    State(state): State<AppState<S>>,
    session: Session,
    RequireIdentity { identity, .. }: RequireIdentity,
    Json(request): Json<BootstrapRequest>,
) -> Result<Json<Value>> {
    let sessions = SessionStore::new(&session);
    let outcome = BootstrapFlow::new(state.store(), &state.config().bootstrap)
        .run(&sessions, &identity, &request)
        .await?;

    let label = outcome_label(outcome);
    add_breadcrumb("auth", "Admin bootstrap", Some(&[("outcome", label)]));

    let context = sessions.context().await?;
    Ok(Json(json!({
        "outcome": label,
        "message": outcome.message(),
        "context": context,
    })))
}

const fn outcome_label(outcome: BootstrapOutcome) -> &'static str {
    match outcome {
        BootstrapOutcome::Granted => "granted",
        BootstrapOutcome::AlreadyAdmin => "already_admin",
        BootstrapOutcome::BypassRecorded(_) => "bypass_recorded",
    }
}
