//! Shared fixtures for the API integration tests.
//!
//! Tenants:
//!
//! | ID | Name | Public domain | CMS domain | API key |
//! |----|------|---------------|------------|---------|
//! | 7 | Acme | acme.test | cms.acme.test | acme-key |
//! | 8 | Globex | globex.test | cms.globex.test | globex-key |
//! | 9 | Bare | (none) | (none) | (none) |
//!
//! Every user's password is [`PASSWORD`].

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, header};
use axum_test::{TestRequest, TestServer};
use meridian_rest::session::hash_password;
use meridian_rest::{AppState, ServerConfig, create_app_with_state};
use meridian_signature::RequestSigner;
use meridian_tenancy::core::{ContentStore, Storage, TenantStore};
use meridian_tenancy::tenant::{Tenant, TenantDomain, TenantRole, User, UserRecord};
use meridian_tenancy::types::{Collection, Document};
use serde_json::{Value, json};

/// Password of every seeded user.
pub const PASSWORD: &str = "correct horse battery staple";

pub const ACME: i64 = 7;
pub const GLOBEX: i64 = 8;
pub const BARE: i64 = 9;

/// Seeds tenants, users and pages into a backend.
pub async fn seed<S: Storage>(backend: &S) {
    backend
        .put_tenant(
            Tenant::new(ACME, "Acme", "acme")
                .with_domain(TenantDomain::public("acme.test"))
                .with_domain(TenantDomain::cms("cms.acme.test"))
                .with_api_key("acme-key"),
        )
        .await
        .expect("seed acme");
    backend
        .put_tenant(
            Tenant::new(GLOBEX, "Globex", "globex")
                .with_domain(TenantDomain::public("globex.test"))
                .with_domain(TenantDomain::cms("cms.globex.test"))
                .with_api_key("globex-key"),
        )
        .await
        .expect("seed globex");
    backend
        .put_tenant(Tenant::new(BARE, "Bare", "bare"))
        .await
        .expect("seed bare");

    // Low cost keeps the suite fast
    let hash = hash_password(PASSWORD, 4).expect("hash password");
    let users = [
        User::new("root", "root@meridian.test").as_system_user(),
        User::new("acme-admin", "admin@acme.test").with_membership(ACME, TenantRole::Admin),
        User::new("acme-editor", "editor@acme.test").with_membership(ACME, TenantRole::Editor),
        User::new("acme-viewer", "viewer@acme.test").with_membership(ACME, TenantRole::Viewer),
        User::new("globex-editor", "editor@globex.test").with_membership(GLOBEX, TenantRole::Editor),
        User::new("bare-editor", "editor@bare.test").with_membership(BARE, TenantRole::Editor),
    ];
    for user in users {
        backend
            .put_user(UserRecord {
                user,
                password_hash: hash.clone(),
            })
            .await
            .expect("seed user");
    }

    let pages = [
        ("acme-home", ACME, true),
        ("acme-draft", ACME, false),
        ("globex-home", GLOBEX, true),
    ];
    for (id, tenant, published) in pages {
        let mut doc = Document::new(Collection::Pages, tenant, json!({ "title": id })).with_id(id);
        doc.published = published;
        backend.create(doc).await.expect("seed page");
    }
}

/// Builds a test server around a seeded backend.
pub async fn server_with<S: Storage + 'static>(backend: S, config: ServerConfig) -> (TestServer, Arc<S>) {
    seed(&backend).await;
    let backend = Arc::new(backend);
    let state = AppState::new(Arc::clone(&backend), config);
    let server = TestServer::new(create_app_with_state(state)).expect("Failed to create test server");
    (server, backend)
}

/// Test server over the in-memory backend with the test configuration.
pub async fn memory_server() -> (TestServer, Arc<meridian_tenancy::backends::MemoryBackend>) {
    server_with(meridian_tenancy::backends::MemoryBackend::new(), ServerConfig::for_testing()).await
}

/// Sets the `Host` header of a request.
pub fn with_host(request: TestRequest, host: &str) -> TestRequest {
    request.add_header(header::HOST, HeaderValue::from_str(host).expect("host header"))
}

/// Logs in from `host` and returns the session token.
pub async fn login(server: &TestServer, host: &str, email: &str) -> String {
    let response = with_host(server.post("/api/users/login"), host)
        .json(&json!({ "email": email, "password": PASSWORD }))
        .await;
    assert_eq!(response.status_code().as_u16(), 200, "login failed: {}", response.text());
    let body: Value = response.json();
    body["token"].as_str().expect("token in login response").to_string()
}

/// Adds a bearer token to a request.
pub fn bearer(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).expect("authorization header"),
    )
}

/// Adds tenant API key credentials and a fresh signature to a request.
pub fn signed(request: TestRequest, api_key: &str, secret: &str) -> TestRequest {
    let signed = RequestSigner::new(secret, "kiosk-1", "kiosk/1.0").sign_now();
    let request = request.add_header(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("tenants API-Key {}", api_key)).expect("authorization header"),
    );
    add_pairs(request, signed.pairs())
}

/// Adds `(name, value)` header pairs to a request.
pub fn add_pairs<I>(mut request: TestRequest, pairs: I) -> TestRequest
where
    I: IntoIterator<Item = (&'static str, String)>,
{
    for (name, value) in pairs {
        request = request.add_header(
            HeaderName::from_static(name),
            HeaderValue::from_str(&value).expect("signature header"),
        );
    }
    request
}

/// The `Set-Cookie` values of a response.
pub fn set_cookies(response: &axum_test::TestResponse) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// IDs of the documents in a list response.
pub fn doc_ids(body: &Value) -> Vec<String> {
    body["docs"]
        .as_array()
        .map(|docs| {
            docs.iter()
                .filter_map(|d| d["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// IDs of the documents in a list response, sorted.
pub fn sorted_ids(body: &Value) -> Vec<String> {
    let mut ids = doc_ids(body);
    ids.sort();
    ids
}
