//! Integration tests for tenant-scoped collection access.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::*;
use serde_json::{Value, json};

async fn as_user(email: &str) -> (TestServer, String) {
    let (server, _) = memory_server().await;
    let host = if email.ends_with("@globex.test") {
        "cms.globex.test"
    } else {
        "cms.acme.test"
    };
    let token = login(&server, host, email).await;
    (server, token)
}

#[tokio::test]
async fn test_editor_lists_own_tenant_only() {
    let (server, token) = as_user("editor@acme.test").await;

    let response = bearer(server.get("/api/pages"), &token).await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(sorted_ids(&body), vec!["acme-draft", "acme-home"]);
    assert_eq!(body["totalDocs"], 2);
    assert_eq!(body["limit"], 10);
    assert_eq!(body["page"], 1);
}

#[tokio::test]
async fn test_system_user_lists_everything() {
    let (server, token) = as_user("root@meridian.test").await;
    let body: Value = bearer(server.get("/api/pages"), &token).await.json();
    assert_eq!(body["totalDocs"], 3);
}

#[tokio::test]
async fn test_pagination() {
    let (server, token) = as_user("root@meridian.test").await;
    let body: Value = bearer(server.get("/api/pages?limit=2&page=2"), &token).await.json();
    assert_eq!(doc_ids(&body), vec!["globex-home"]);
    assert_eq!(body["totalDocs"], 3);
    assert_eq!(body["page"], 2);
}

#[tokio::test]
async fn test_huge_page_number() {
    let (server, token) = as_user("root@meridian.test").await;
    let response = bearer(server.get("/api/pages?page=18446744073709551615"), &token).await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert!(doc_ids(&body).is_empty());
    assert_eq!(body["totalDocs"], 3);
    assert_eq!(body["page"], u64::MAX);
}

#[tokio::test]
async fn test_unknown_collection() {
    let (server, token) = as_user("editor@acme.test").await;
    let response = bearer(server.get("/api/users-and-secrets"), &token).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("unknown collection"));
}

#[tokio::test]
async fn test_other_tenant_document_not_found() {
    let (server, token) = as_user("editor@acme.test").await;

    bearer(server.get("/api/pages/acme-draft"), &token)
        .await
        .assert_status(StatusCode::OK);
    bearer(server.get("/api/pages/globex-home"), &token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    bearer(server.patch("/api/pages/globex-home"), &token)
        .json(&json!({ "_published": false }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_editor_creates_in_own_tenant() {
    let (server, token) = as_user("editor@acme.test").await;

    let response = bearer(server.post("/api/posts"), &token)
        .json(&json!({ "id": "launch", "tenant": 7, "data": { "title": "Launch" } }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["id"], "launch");
    assert_eq!(body["tenant"], 7);
    assert_eq!(body["_published"], false);

    // Duplicate ID
    bearer(server.post("/api/posts"), &token)
        .json(&json!({ "id": "launch", "tenant": 7 }))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_denied_outside_memberships() {
    let (server, token) = as_user("editor@acme.test").await;

    bearer(server.post("/api/posts"), &token)
        .json(&json!({ "tenant": 8, "data": {} }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    bearer(server.post("/api/posts"), &token)
        .json(&json!({ "data": {} }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_viewer_cannot_write() {
    let (server, token) = as_user("viewer@acme.test").await;

    bearer(server.get("/api/pages/acme-draft"), &token)
        .await
        .assert_status(StatusCode::OK);
    bearer(server.post("/api/pages"), &token)
        .json(&json!({ "tenant": 7 }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    bearer(server.patch("/api/pages/acme-draft"), &token)
        .json(&json!({ "_published": true }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_merges_data() {
    let (server, token) = as_user("editor@acme.test").await;

    let response = bearer(server.patch("/api/pages/acme-draft"), &token)
        .json(&json!({ "_published": true, "data": { "subtitle": "Now live" } }))
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["_published"], true);
    assert_eq!(body["data"]["title"], "acme-draft");
    assert_eq!(body["data"]["subtitle"], "Now live");
}

#[tokio::test]
async fn test_only_admins_delete() {
    let (server, editor) = as_user("editor@acme.test").await;
    bearer(server.delete("/api/pages/acme-draft"), &editor)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let admin = login(&server, "cms.acme.test", "admin@acme.test").await;
    let response = bearer(server.delete("/api/pages/acme-draft"), &admin).await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["id"], "acme-draft");

    bearer(server.get("/api/pages/acme-draft"), &admin)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_navigation_writes_admin_only() {
    let (server, editor) = as_user("editor@acme.test").await;
    bearer(server.post("/api/navigation"), &editor)
        .json(&json!({ "tenant": 7, "data": { "items": [] } }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let admin = login(&server, "cms.acme.test", "admin@acme.test").await;
    bearer(server.post("/api/navigation"), &admin)
        .json(&json!({ "tenant": 7, "data": { "items": [] } }))
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_system_user_create_requires_known_tenant() {
    let (server, token) = as_user("root@meridian.test").await;
    bearer(server.post("/api/tags"), &token)
        .json(&json!({ "tenant": 99, "data": { "name": "orphan" } }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    bearer(server.post("/api/tags"), &token)
        .json(&json!({ "tenant": 8, "data": { "name": "news" } }))
        .await
        .assert_status(StatusCode::CREATED);
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use meridian_rest::ServerConfig;
    use meridian_tenancy::backends::sqlite::SqliteBackend;

    #[tokio::test]
    async fn test_list_filters_through_sqlite() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("meridian.db");
        let backend = SqliteBackend::open(&path).expect("Failed to open SQLite backend");
        backend.init_schema().expect("Failed to init schema");

        let (server, _) = server_with(backend, ServerConfig::for_testing()).await;
        let token = login(&server, "cms.acme.test", "editor@acme.test").await;

        let body: Value = bearer(server.get("/api/pages"), &token).await.json();
        assert_eq!(sorted_ids(&body), vec!["acme-draft", "acme-home"]);

        let anonymous: Value = with_host(server.get("/api/pages"), "globex.test").await.json();
        assert_eq!(doc_ids(&anonymous), vec!["globex-home"]);

        let far: Value = bearer(server.get("/api/pages?page=18446744073709551615"), &token)
            .await
            .json();
        assert!(doc_ids(&far).is_empty());
        assert_eq!(far["totalDocs"], 2);
    }
}
