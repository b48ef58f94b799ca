//! Registration, sign-in and sign-out through the site router.

use axum::http::StatusCode;
use folio_integration_tests::{PASSWORD, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_register_signs_in_without_admin() {
    let app = TestApp::new();
    let mut client = app.sign_up("visitor@example.com").await;
    assert!(client.has_session());

    let me = client.get("/auth/me").await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["identity"]["email"], "visitor@example.com");
    assert_eq!(me.body["admin"], "not_admin");
}

#[tokio::test]
async fn test_anonymous_context() {
    let app = TestApp::new();
    let me = app.client().get("/auth/me").await;
    assert_eq!(me.status, StatusCode::OK);
    assert!(me.body["identity"].is_null());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::new();
    app.sign_up("visitor@example.com").await;

    let response = app
        .client()
        .post(
            "/auth/register",
            json!({ "email": "Visitor@Example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_weak_password_rejected() {
    let app = TestApp::new();
    let response = app
        .client()
        .post(
            "/auth/register",
            json!({ "email": "visitor@example.com", "password": "short" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_and_logout() {
    let app = TestApp::new();
    let mut first = app.sign_up("visitor@example.com").await;
    assert_eq!(first.post("/auth/logout", json!({})).await.status, StatusCode::NO_CONTENT);
    assert!(first.get("/auth/me").await.body["identity"].is_null());

    let mut client = app.client();
    let wrong = client
        .post(
            "/auth/login",
            json!({ "email": "visitor@example.com", "password": "not the password" }),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let ok = client
        .post(
            "/auth/login",
            json!({ "email": "visitor@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["identity"]["email"], "visitor@example.com");
}
