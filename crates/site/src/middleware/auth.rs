//! Authentication extractors.
//!
//! Admin gating happens here: handlers for dashboard routes take
//! [`RequireAdmin`], which resolves the admin flag if it is still outstanding
//! for the session and rejects everyone else.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn dashboard(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
//!     format!("Hello, {}!", admin.email)
//! }
//! ```

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::db::Store;
use crate::models::{AuthContext, CurrentIdentity};
use crate::services::SessionStore;
use crate::state::AppState;

/// Why an authentication extractor refused the request.
#[derive(Debug)]
pub enum AuthRejection {
    /// No session layer ran for this request.
    MissingSession,
    /// The session backend failed.
    Session(tower_sessions::session::Error),
    /// Nobody is signed in.
    Unauthorized,
    /// Signed in, but not an admin.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingSession => {
                tracing::error!("Session layer missing from request");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            Self::Session(e) => {
                let event_id = sentry::capture_error(&e);
                tracing::error!(error = %e, sentry_event_id = %event_id, "Session error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Sign in required"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Admin access required"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Load the session's auth context, resolving the admin flag if the lookup
/// for the current identity has not completed yet.
async fn load_context<S: Store>(
    parts: &Parts,
    state: &AppState<S>,
) -> Result<AuthContext, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or(AuthRejection::MissingSession)?;
    let sessions = SessionStore::new(&session);

    let context = sessions.context().await.map_err(AuthRejection::Session)?;
    if context.is_loading() {
        return sessions
            .refresh(state.store())
            .await
            .map_err(AuthRejection::Session);
    }
    Ok(context)
}

/// The session's auth context. Never rejects a signed-out visitor.
pub struct Auth(pub AuthContext);

impl<S: Store> FromRequestParts<AppState<S>> for Auth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        load_context(parts, state).await.map(Self)
    }
}

/// Extractor that requires a signed-in identity.
pub struct RequireIdentity {
    pub identity: CurrentIdentity,
    pub context: AuthContext,
}

impl<S: Store> FromRequestParts<AppState<S>> for RequireIdentity {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let context = load_context(parts, state).await?;
        let identity = context.identity.clone().ok_or(AuthRejection::Unauthorized)?;
        Ok(Self { identity, context })
    }
}

/// Extractor that requires admin access.
///
/// Admin access is the resolved admin flag, or a bypass recorded by the same
/// identity when the deployment allows bypasses.
pub struct RequireAdmin(pub CurrentIdentity);

impl<S: Store> FromRequestParts<AppState<S>> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let RequireIdentity { identity, context } =
            RequireIdentity::from_request_parts(parts, state).await?;

        if !context.has_admin_access(state.config().bootstrap.allow_bypass) {
            tracing::debug!(identity = %identity.id, "Admin access denied");
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(identity))
    }
}
