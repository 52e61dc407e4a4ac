//! Error responses: status codes and the `{error, code}` body.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::routing::get as get_route;
use axum::Router;
use common::{body_json, create, get, post_json, put_json, send};
use serde_json::json;
use pms_api::error::panic_response;
use sqlx::SqlitePool;
use tower_http::catch_panic::CatchPanicLayer;

#[tokio::test]
async fn missing_required_fields_are_listed_together() {
    let app = common::local_app();
    let response = post_json(&app, "/api/schedules", json!({"title": "  "})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["error"],
        "project_id, title, start_date, and end_date are required"
    );
}

#[tokio::test]
async fn issue_without_title_persists_nothing() {
    let app = common::local_app();
    let project_id = create(&app, "/api/projects", json!({"name": "P"})).await;

    let response = post_json(&app, "/api/issues", json!({"project_id": project_id})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "title is required");

    let issues = body_json(get(&app, "/api/issues").await).await;
    assert_eq!(issues, json!([]));
}

#[tokio::test]
async fn unparseable_date_names_the_field() {
    let app = common::local_app();
    let project_id = create(&app, "/api/projects", json!({"name": "P"})).await;

    let response = post_json(
        &app,
        "/api/schedules",
        json!({
            "project_id": project_id,
            "title": "bad",
            "start_date": "next tuesday",
            "end_date": "2024-01-02",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "start_date must be a valid date or timestamp");
}

#[tokio::test]
async fn form_style_ids_are_accepted() {
    let app = common::local_app();
    create(&app, "/api/projects", json!({"name": "P"})).await;

    let response = post_json(
        &app,
        "/api/issues",
        json!({"project_id": "1", "milestone_id": "", "title": "from a form", "assignee": ""}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let issue = body_json(response).await;
    assert_eq!(issue["project_id"], 1);
    assert_eq!(issue["milestone_id"], serde_json::Value::Null);
    assert_eq!(issue["assignee"], serde_json::Value::Null);
}

#[tokio::test]
async fn dangling_reference_is_validation_error() {
    let app = common::local_app();
    let response = post_json(
        &app,
        "/api/milestones",
        json!({"project_id": 42, "title": "orphan"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["error"],
        "project_id 42 does not reference an existing project"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sqlite_dangling_reference_matches_local(pool: SqlitePool) {
    let app = common::sqlite_app(pool);
    let response = post_json(
        &app,
        "/api/milestones",
        json!({"project_id": 42, "title": "orphan"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "project_id 42 does not reference an existing project"
    );
}

#[tokio::test]
async fn not_found_body_names_entity_and_id() {
    let app = common::local_app();
    let response = put_json(&app, "/api/issues/77", json!({"title": "ghost"})).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Issue with id 77 not found");
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = common::local_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/projects")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn non_numeric_path_id_is_bad_request() {
    let app = common::local_app();
    let response = get(&app, "/api/projects/abc").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn non_numeric_filter_is_bad_request() {
    let app = common::local_app();
    let response = get(&app, "/api/issues?project_id=abc").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

async fn explode() -> &'static str {
    panic!("exploded")
}

#[tokio::test]
async fn panicking_handler_returns_internal_error_body() {
    let app = Router::new()
        .route("/boom", get_route(explode))
        .layer(CatchPanicLayer::custom(panic_response));

    let response = get(&app, "/boom").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
