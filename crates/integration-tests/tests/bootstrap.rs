//! First-admin bootstrap through `/api/admin/bootstrap`.

use axum::http::StatusCode;
use folio_integration_tests::{SETUP_KEY, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_bootstrap_requires_sign_in() {
    let app = TestApp::new();
    let response = app
        .client()
        .post("/api/admin/bootstrap", json!({ "method": "self_service" }))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_first_admin_self_service() {
    let app = TestApp::new();
    let mut client = app.sign_up("owner@example.com").await;
    assert_eq!(
        client.get("/api/admin/projects").await.status,
        StatusCode::FORBIDDEN
    );

    let status = client.get("/api/admin/bootstrap").await;
    assert_eq!(status.status, StatusCode::OK);
    assert_eq!(status.body["admin_exists"], false);
    assert_eq!(status.body["is_admin"], false);
    let sql = status.body["manual_sql"].as_str().unwrap();
    assert!(sql.starts_with("INSERT INTO public.user_roles (user_id, role) VALUES ('"));
    assert!(sql.ends_with("', 'admin') ON CONFLICT DO NOTHING;"));

    let response = client
        .post("/api/admin/bootstrap", json!({ "method": "self_service" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["outcome"], "granted");
    assert_eq!(response.body["context"]["admin"], "admin");

    assert_eq!(client.get("/api/admin/projects").await.status, StatusCode::OK);

    let again = client
        .post("/api/admin/bootstrap", json!({ "method": "self_service" }))
        .await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.body["outcome"], "already_admin");
}

#[tokio::test]
async fn test_second_self_service_refused_with_manual_sql() {
    let app = TestApp::new();
    app.sign_up_admin("owner@example.com").await;

    let mut other = app.sign_up("visitor@example.com").await;
    let response = other
        .post("/api/admin/bootstrap", json!({ "method": "self_service" }))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(response.body["hint"].as_str().unwrap().contains("manual SQL"));
    assert!(response.body["sql"].as_str().unwrap().contains("'admin'"));

    assert_eq!(
        other.get("/api/admin/blog").await.status,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_setup_key_disabled_by_default() {
    let app = TestApp::new();
    let mut client = app.sign_up("owner@example.com").await;
    let response = client
        .post(
            "/api/admin/bootstrap",
            json!({ "method": "setup_key", "setup_key": SETUP_KEY }),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_setup_key_grants_even_after_first_admin() {
    let app = TestApp::with_all_bootstrap_methods();
    app.sign_up_admin("owner@example.com").await;
    let mut client = app.sign_up("partner@example.com").await;

    let wrong = client
        .post(
            "/api/admin/bootstrap",
            json!({ "method": "setup_key", "setup_key": "not-the-key" }),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::FORBIDDEN);

    let missing = client
        .post("/api/admin/bootstrap", json!({ "method": "setup_key" }))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let granted = client
        .post(
            "/api/admin/bootstrap",
            json!({ "method": "setup_key", "setup_key": SETUP_KEY }),
        )
        .await;
    assert_eq!(granted.status, StatusCode::OK);
    assert_eq!(granted.body["context"]["admin"], "admin");
    assert_eq!(client.get("/api/admin/contacts").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_bypass_is_session_local() {
    let app = TestApp::with_all_bootstrap_methods();
    let mut client = app.sign_up("owner@example.com").await;

    let response = client
        .post("/api/admin/bootstrap", json!({ "method": "bypass" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["outcome"], "bypass_recorded");
    assert_eq!(response.body["context"]["admin"], "not_admin");
    assert_eq!(client.get("/api/admin/projects").await.status, StatusCode::OK);

    // No role row was written.
    let status = client.get("/api/admin/bootstrap").await;
    assert_eq!(status.body["admin_exists"], false);
    assert_eq!(status.body["bypass_active"], true);

    // Signing in again clears the bypass.
    client.post("/auth/logout", json!({})).await;
    client
        .post(
            "/auth/login",
            json!({ "email": "owner@example.com", "password": folio_integration_tests::PASSWORD }),
        )
        .await;
    assert_eq!(
        client.get("/api/admin/projects").await.status,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_bypass_disabled_by_default() {
    let app = TestApp::new();
    let mut client = app.sign_up("owner@example.com").await;
    let response = client
        .post("/api/admin/bootstrap", json!({ "method": "bypass" }))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
