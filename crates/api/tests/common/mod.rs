//! Shared helpers for HTTP integration tests.
//!
//! The app runs on an in-memory store, so tests need no database.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use appbee_api::app::build_app;
use appbee_api::auth::jwt::{generate_access_token, JwtConfig};
use appbee_api::config::ServerConfig;
use appbee_api::state::AppState;
use appbee_core::policy::MarketplacePolicy;
use appbee_core::roles::UserRole;
use appbee_core::types::DbId;
use appbee_core::user::User;
use appbee_core::{Marketplace, MemoryStore};

pub const COMPANY: DbId = 1;
pub const ENGINEER: DbId = 2;
pub const MENTOR: DbId = 3;
pub const OTHER_ENGINEER: DbId = 4;
pub const ADMIN: DbId = 5;

pub fn test_jwt() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
        access_token_expiry_mins: 15,
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: test_jwt(),
        policy: MarketplacePolicy::default(),
    }
}

pub struct TestApp {
    pub app: Router,
    pub store: MemoryStore,
}

/// Full application over a fresh in-memory store seeded with one user per
/// role, built through the same `build_app` production uses.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: ServerConfig) -> TestApp {
    let store = MemoryStore::new();
    for (id, role, name) in [
        (COMPANY, UserRole::Company, "Acme Owner"),
        (ENGINEER, UserRole::Engineer, "Jun Ior"),
        (MENTOR, UserRole::Mentor, "Men Tor"),
        (OTHER_ENGINEER, UserRole::Engineer, "Sec Ond"),
        (ADMIN, UserRole::Admin, "Ad Min"),
    ] {
        store
            .seed_user(User {
                id,
                email: format!("user{id}@appbee.dev"),
                full_name: Some(name.to_string()),
                role,
            })
            .await;
    }

    let marketplace = Marketplace::new(Arc::new(store.clone()), config.policy.clone())
        .expect("test policy is valid");
    let state = AppState {
        marketplace: Arc::new(marketplace),
        config: Arc::new(config),
    };
    TestApp {
        app: build_app(state),
        store,
    }
}

pub fn token(user_id: DbId, role: UserRole) -> String {
    let email = format!("user{user_id}@appbee.dev");
    generate_access_token(user_id, role, Some(&email), &test_jwt()).expect("token should sign")
}

pub fn company_token() -> String {
    token(COMPANY, UserRole::Company)
}

pub fn engineer_token() -> String {
    token(ENGINEER, UserRole::Engineer)
}

pub fn mentor_token() -> String {
    token(MENTOR, UserRole::Mentor)
}

pub fn admin_token() -> String {
    token(ADMIN, UserRole::Admin)
}

/// Send one request through the router.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, bearer: Option<&str>) -> Response<Body> {
    send(app, Method::GET, uri, bearer, None).await
}

pub async fn post_json(app: &Router, uri: &str, bearer: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(bearer), Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, bearer: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(bearer), Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, bearer: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(bearer), None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register the company and post a medium task with the given budget and
/// base XP. Returns the task id.
pub async fn post_task(app: &Router, budget: i64, base_xp: i64) -> i64 {
    let token = company_token();
    let response = put_json(
        app,
        "/api/v1/companies/me",
        &token,
        serde_json::json!({"name": "Acme"}),
    )
    .await;
    assert!(response.status().is_success());

    let response = post_json(
        app,
        "/api/v1/tasks",
        &token,
        serde_json::json!({
            "title": "Fix the login form",
            "difficulty": "medium",
            "budget": budget,
            "base_xp": base_xp,
        }),
    )
    .await;
    let json = body_json(response).await;
    json["data"]["id"].as_i64().unwrap()
}
