//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness
//! GET  /health/ready                 - Readiness (data service ping)
//!
//! # Auth
//! POST /auth/register                - Sign up
//! POST /auth/login                   - Sign in
//! POST /auth/logout                  - Sign out
//! GET  /auth/me                      - Current auth context
//!
//! # Public
//! GET  /api/portfolio                - Marketing page aggregate
//! GET  /api/projects                 - Projects, featured first
//! GET  /api/projects/{slug}          - Project case study
//! GET  /api/testimonials             - Testimonials, featured first
//! GET  /api/resume                   - Resume
//! GET  /api/blog                     - Published posts
//! GET  /api/blog/{slug}              - Published post
//! GET  /api/blog/{slug}/comments     - Approved comments
//! POST /api/blog/{slug}/comments     - Submit a comment for moderation
//! POST /api/contact                  - Contact form
//!
//! # Admin (see [`admin`])
//! GET|POST   /api/admin/bootstrap
//! GET|POST   /api/admin/{projects,blog,testimonials,resume}
//! PUT|DELETE /api/admin/{projects,blog,testimonials,resume}/{id}
//! GET        /api/admin/contacts
//! PUT|DELETE /api/admin/contacts/{id}
//! POST       /api/admin/contacts/{id}/reply
//! ```

pub mod admin;
pub mod auth;
pub mod public;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore as SessionBackend};

use crate::config::SiteConfig;
use crate::db::{HealthCheck, Store};
use crate::middleware::{
    auth_rate_limiter, request_id_middleware, security_headers_middleware,
    submission_rate_limiter,
};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes<S: Store>(config: &SiteConfig) -> Router<AppState<S>> {
    let router = Router::new()
        .route("/register", post(auth::register::<S>))
        .route("/login", post(auth::login::<S>))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me));

    if config.rate_limit {
        router.layer(auth_rate_limiter())
    } else {
        router
    }
}

/// Create the public read routes router.
pub fn public_routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/portfolio", get(public::portfolio::<S>))
        .route("/projects", get(public::projects::<S>))
        .route("/projects/{slug}", get(public::project::<S>))
        .route("/testimonials", get(public::testimonials::<S>))
        .route("/resume", get(public::resume::<S>))
        .route("/blog", get(public::blog::<S>))
        .route("/blog/{slug}", get(public::post::<S>))
        .route("/blog/{slug}/comments", get(public::comments::<S>))
}

/// Create the visitor submission router.
pub fn submission_routes<S: Store>(config: &SiteConfig) -> Router<AppState<S>> {
    let router = Router::new()
        .route("/blog/{slug}/comments", post(public::submit_comment::<S>))
        .route("/contact", post(public::contact::<S>));

    if config.rate_limit {
        router.layer(submission_rate_limiter())
    } else {
        router
    }
}

/// Create all routes for the site.
pub fn routes<S: Store>(config: &SiteConfig) -> Router<AppState<S>> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness::<S>))
        .nest("/auth", auth_routes(config))
        .nest(
            "/api",
            public_routes()
                .merge(submission_routes(config))
                .nest("/admin", admin::routes()),
        )
}

/// Build the full application: routes, session layer and the middleware
/// stack, with state applied.
pub fn app<S, B>(state: AppState<S>, session_layer: SessionManagerLayer<B>) -> Router
where
    S: Store,
    B: SessionBackend + Clone,
{
    routes(state.config())
        .layer(from_fn(security_headers_middleware))
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the data service does not answer.
async fn readiness<S: Store>(State(state): State<AppState<S>>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use secrecy::SecretString;
    use tower::ServiceExt;

    use super::*;
    use crate::db::MemoryStore;
    use crate::middleware::session_layer;

    fn app(store: MemoryStore) -> Router {
        let mut config = SiteConfig::new(
            SecretString::from("postgres://localhost/folio_test".to_string()),
            "http://localhost:3000",
        );
        config.rate_limit = false;
        let sessions = session_layer(tower_sessions::MemoryStore::default(), &config);
        super::app(AppState::new(config, store), sessions)
    }

    async fn get_status(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(get_status(app(MemoryStore::new()), "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_reports_unavailable_store() {
        let store = MemoryStore::new();
        assert_eq!(
            get_status(app(store.clone()), "/health/ready").await,
            StatusCode::OK
        );

        store.set_unavailable(true);
        assert_eq!(
            get_status(app(store), "/health/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_admin_routes_require_sign_in() {
        let status = get_status(app(MemoryStore::new()), "/api/admin/projects").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_post_is_not_found() {
        let status = get_status(app(MemoryStore::new()), "/api/blog/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_security_headers_applied() {
        let response = app(MemoryStore::new())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("x-frame-options").unwrap(),
            "DENY"
        );
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[test]
    fn test_router_builds_with_rate_limits() {
        let config = SiteConfig::new(
            SecretString::from("postgres://localhost/folio_test".to_string()),
            "http://localhost:3000",
        );
        assert!(config.rate_limit);
        let _router: Router<AppState<MemoryStore>> = routes(&config);
    }
}
