//! Sign-up, sign-in and sign-out.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;

use crate::db::Store;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::Auth;
use crate::models::{AuthContext, CurrentIdentity};
use crate::services::{AuthService, SessionStore};
use crate::state::AppState;

/// Email and password request body.
#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Create an identity and sign it in.
#[tracing::instrument(skip_all)]
pub async fn register<S: Store>(
    State(state): State<AppState<S>>,
    session: Session,
    Json(form): Json<Credentials>,
) -> Result<(StatusCode, Json<AuthContext>)> {
    let identity = AuthService::new(state.store())
        .register(&form.email, &form.password)
        .await?;
    tracing::info!(identity = %identity.id, "Identity registered");

    let context = SessionStore::new(&session)
        .sign_in(state.store(), CurrentIdentity::from(&identity))
        .await?;
    set_sentry_user(&identity.id, Some(identity.email.as_str()));

    Ok((StatusCode::CREATED, Json(context)))
}

/// Sign in and resolve the admin flag.
#[tracing::instrument(skip_all)]
pub async fn login<S: Store>(
    State(state): State<AppState<S>>,
    session: Session,
    Json(form): Json<Credentials>,
) -> Result<Json<AuthContext>> {
    let identity = AuthService::new(state.store())
        .login(&form.email, &form.password)
        .await?;

    let context = SessionStore::new(&session)
        .sign_in(state.store(), CurrentIdentity::from(&identity))
        .await?;
    set_sentry_user(&identity.id, Some(identity.email.as_str()));
    tracing::info!(identity = %identity.id, admin = context.is_admin(), "Signed in");

    Ok(Json(context))
}

/// Sign out, discarding the whole session.
pub async fn logout(session: Session) -> Result<StatusCode> {
    SessionStore::new(&session).sign_out().await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The current auth context.
pub async fn me(Auth(context): Auth) -> Json<AuthContext> {
    Json(context)
}
