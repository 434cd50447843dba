//! Company listing and the admin company endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{
    admin_token, body_json, company_token, delete, engineer_token, get, post_json, post_task,
    put_json, OTHER_ENGINEER,
};

#[tokio::test]
async fn any_authenticated_user_lists_companies() {
    let t = common::spawn_app().await;
    put_json(&t.app, "/api/v1/companies/me", &company_token(), json!({"name": "Acme"})).await;

    let response = get(&t.app, "/api/v1/companies", Some(&engineer_token())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["name"], "Acme");

    let response = get(&t.app, "/api/v1/companies", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_company_lifecycle() {
    let t = common::spawn_app().await;
    let token = admin_token();

    let response = post_json(
        &t.app,
        "/api/v1/admin/companies",
        &token,
        json!({"owner_id": OTHER_ENGINEER, "name": "Side Hive", "description": "bees"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["data"]["id"].as_i64().unwrap();
    assert_eq!(created["data"]["owner_id"], OTHER_ENGINEER);

    let response = put_json(
        &t.app,
        &format!("/api/v1/admin/companies/{id}"),
        &token,
        json!({"name": "Main Hive"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["name"], "Main Hive");

    let listed = body_json(get(&t.app, "/api/v1/admin/companies", Some(&token)).await).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    let response = delete(&t.app, &format!("/api/v1/admin/companies/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete(&t.app, &format!("/api/v1/admin/companies/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = put_json(
        &t.app,
        &format!("/api/v1/admin/companies/{id}"),
        &token,
        json!({"name": "Ghost"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_endpoints_reject_other_roles() {
    let t = common::spawn_app().await;
    let response = post_json(
        &t.app,
        "/api/v1/admin/companies",
        &company_token(),
        json!({"owner_id": common::COMPANY, "name": "Acme"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[tokio::test]
async fn admin_create_for_owner_with_company_conflicts() {
    let t = common::spawn_app().await;
    put_json(&t.app, "/api/v1/companies/me", &company_token(), json!({"name": "Acme"})).await;

    let response = post_json(
        &t.app,
        "/api/v1/admin/companies",
        &admin_token(),
        json!({"owner_id": common::COMPANY, "name": "Acme Two"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn admin_delete_removes_open_tasks() {
    let t = common::spawn_app().await;
    let task_id = post_task(&t.app, 100, 10).await;
    let company = body_json(get(&t.app, "/api/v1/companies/me", Some(&company_token())).await).await;
    let company_id = company["data"]["id"].as_i64().unwrap();

    let response = delete(
        &t.app,
        &format!("/api/v1/admin/companies/{company_id}"),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        &t.app,
        &format!("/api/v1/tasks/{task_id}/claim"),
        &engineer_token(),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
