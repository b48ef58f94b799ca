//! Admin CRUD over projects, blog posts, testimonials and the resume.

use axum::http::StatusCode;
use folio_integration_tests::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_project_lifecycle() {
    let app = TestApp::new();
    let mut admin = app.sign_up_admin("owner@example.com").await;

    let created = admin
        .post(
            "/api/admin/projects",
            json!({
                "title": "Ledger Sync",
                "description": "Nightly reconciliation",
                "tech_stack": "Go, React, Postgres",
                "demo_url": "",
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    assert_eq!(created.body["data"]["tech_stack"], json!(["Go", "React", "Postgres"]));
    assert_eq!(created.body["data"]["slug"], "ledger-sync");
    assert!(created.body["data"]["demo_url"].is_null());
    assert_eq!(created.body["notice"]["level"], "success");
    assert_eq!(created.body["notice"]["message"], "Project created successfully");

    let id = created.body["data"]["id"].as_str().unwrap().to_owned();
    let updated = admin
        .put(
            &format!("/api/admin/projects/{id}"),
            json!({
                "title": "Ledger Sync",
                "description": "Hourly reconciliation",
                "tech_stack": ["Go"],
                "featured": true,
            }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["description"], "Hourly reconciliation");
    assert_eq!(updated.body["data"]["featured"], true);

    let public = app.client().get("/api/projects/ledger-sync").await;
    assert_eq!(public.status, StatusCode::OK);
    assert_eq!(public.body["description"], "Hourly reconciliation");

    let deleted = admin.delete(&format!("/api/admin/projects/{id}")).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Project deleted successfully");

    let missing = admin.delete(&format!("/api/admin/projects/{id}")).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_orders_featured_then_newest() {
    let app = TestApp::new();
    let mut admin = app.sign_up_admin("owner@example.com").await;

    for (title, featured) in [("Old featured", true), ("Plain", false), ("New featured", true)] {
        let response = admin
            .post(
                "/api/admin/testimonials",
                json!({ "name": title, "content": "Great", "featured": featured }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let list = admin.get("/api/admin/testimonials").await;
    let names: Vec<&str> = list
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["New featured", "Old featured", "Plain"]);
}

#[tokio::test]
async fn test_invalid_draft_reports_fields_and_writes_nothing() {
    let app = TestApp::new();
    let mut admin = app.sign_up_admin("owner@example.com").await;

    let response = admin
        .post(
            "/api/admin/testimonials",
            json!({ "name": "", "content": "Great", "rating": 9 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["fields"]["name"], "Name is required");
    assert_eq!(response.body["fields"]["rating"], "Rating must be between 1 and 5");

    let list = admin.get("/api/admin/testimonials").await;
    assert_eq!(list.body, json!([]));
}

#[tokio::test]
async fn test_blog_post_slug_and_author() {
    let app = TestApp::new();
    let mut admin = app.sign_up_admin("owner@example.com").await;
    let me = admin.get("/auth/me").await;

    let created = admin
        .post(
            "/api/admin/blog",
            json!({ "title": "Hello, World!", "content": "Short post", "tags": "" }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["data"]["slug"], "hello-world");
    assert_eq!(created.body["data"]["author_id"], me.body["identity"]["id"]);
    assert_eq!(created.body["data"]["reading_time"], 1);
    assert_eq!(created.body["data"]["tags"], json!([]));

    let duplicate = admin
        .post(
            "/api/admin/blog",
            json!({ "title": "Hello World", "content": "Again" }),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_resume_is_single_row() {
    let app = TestApp::new();
    let mut admin = app.sign_up_admin("owner@example.com").await;
    assert_eq!(app.client().get("/api/resume").await.status, StatusCode::NOT_FOUND);

    let created = admin
        .post(
            "/api/admin/resume",
            json!({
                "full_name": "Ada Lovelace",
                "email": "ada@example.com",
                "skills": { "technical": ["Rust"] },
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);

    let list = admin.get("/api/admin/resume").await;
    assert_eq!(list.body.as_array().unwrap().len(), 1);

    let public = app.client().get("/api/resume").await;
    assert_eq!(public.status, StatusCode::OK);
    assert_eq!(public.body["full_name"], "Ada Lovelace");
}

#[tokio::test]
async fn test_second_resume_create_is_refused() {
    let app = TestApp::new();
    let mut admin = app.sign_up_admin("owner@example.com").await;

    let first = admin
        .post(
            "/api/admin/resume",
            json!({ "full_name": "First", "email": "first@example.com" }),
        )
        .await;
    assert_eq!(first.status, StatusCode::CREATED, "{}", first.body);

    let second = admin
        .post(
            "/api/admin/resume",
            json!({ "full_name": "Second", "email": "second@example.com" }),
        )
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["notice"]["level"], "error");

    let list = admin.get("/api/admin/resume").await;
    let rows = list.body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["full_name"], "First");

    // Editing the existing row still works.
    let id = rows[0]["id"].as_str().unwrap().to_owned();
    let updated = admin
        .put(
            &format!("/api/admin/resume/{id}"),
            json!({ "full_name": "Second", "email": "second@example.com" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{}", updated.body);
    assert_eq!(app.client().get("/api/resume").await.body["full_name"], "Second");
}

#[tokio::test]
async fn test_non_admin_cannot_write() {
    let app = TestApp::new();
    app.sign_up_admin("owner@example.com").await;
    let mut visitor = app.sign_up("visitor@example.com").await;

    let response = visitor
        .post(
            "/api/admin/projects",
            json!({ "title": "Sneaky", "description": "Nope" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(app.client().get("/api/projects").await.body, json!([]));
}
