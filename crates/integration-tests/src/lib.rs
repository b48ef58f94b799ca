//! Integration tests for Folio.
//!
//! The full site router runs in-process on [`MemoryStore`] with an in-memory
//! session store, so no database or running server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p folio-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth` - registration, sign-in and sign-out
//! - `bootstrap` - first-admin bootstrap methods
//! - `admin_content` - admin CRUD over projects, blog, testimonials and resume
//! - `admin_contacts` - contact inbox transitions and replies
//! - `public_views` - published content and visitor submissions

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use folio_site::config::{BootstrapConfig, SiteConfig};
use folio_site::db::MemoryStore;
use folio_site::middleware::{SESSION_COOKIE_NAME, session_layer};
use folio_site::routes;
use folio_site::state::AppState;

/// Default password used by [`TestApp::sign_up`].
pub const PASSWORD: &str = "correct horse battery";

/// Setup key accepted when the keyed bootstrap path is enabled.
pub const SETUP_KEY: &str = "Zq8#mP2v!Lx9@Rt4wK";

/// The site router over a shared in-memory store.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
    pub store: MemoryStore,
}

impl TestApp {
    /// Site with every optional bootstrap method disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bootstrap(BootstrapConfig::default())
    }

    /// Site with the keyed path and the bypass both enabled.
    #[must_use]
    pub fn with_all_bootstrap_methods() -> Self {
        Self::with_bootstrap(BootstrapConfig {
            setup_key: Some(SecretString::from(SETUP_KEY.to_string())),
            allow_bypass: true,
        })
    }

    /// Site with a specific bootstrap configuration.
    #[must_use]
    pub fn with_bootstrap(bootstrap: BootstrapConfig) -> Self {
        let mut config = SiteConfig::new(
            SecretString::from("postgres://localhost/folio_test".to_string()),
            "http://localhost:3000",
        );
        config.bootstrap = bootstrap;
        config.rate_limit = false;

        let store = MemoryStore::new();
        let sessions = session_layer(tower_sessions::MemoryStore::default(), &config);
        let router = routes::app(AppState::new(config, store.clone()), sessions);

        Self { router, store }
    }

    /// A visitor with an empty cookie jar.
    #[must_use]
    pub fn client(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// Register `email` and return a client signed in as it.
    pub async fn sign_up(&self, email: &str) -> TestClient {
        let mut client = self.client();
        let response = client
            .post(
                "/auth/register",
                serde_json::json!({ "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        client
    }

    /// Register `email` and make it the first admin through self-service.
    pub async fn sign_up_admin(&self, email: &str) -> TestClient {
        let mut client = self.sign_up(email).await;
        let response = client
            .post(
                "/api/admin/bootstrap",
                serde_json::json!({ "method": "self_service" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        client
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// A status code and parsed JSON body (`Value::Null` for empty bodies).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// One visitor. Carries the session cookie between requests.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    /// Whether the client currently holds a session cookie.
    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.cookie.is_some()
    }

    async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        self.store_cookie(response.headers().get_all(header::SET_COOKIE));

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse { status, body }
    }

    fn store_cookie(&mut self, headers: axum::http::header::GetAll<'_, axum::http::HeaderValue>) {
        for value in headers {
            let Ok(value) = value.to_str() else { continue };
            let Some(pair) = value.split(';').next() else { continue };
            let Some((name, session_id)) = pair.split_once('=') else { continue };
            if name.trim() != SESSION_COOKIE_NAME {
                continue;
            }
            let expired = value.contains("Max-Age=0") || session_id.is_empty();
            self.cookie = (!expired).then(|| pair.trim().to_owned());
        }
    }
}
