#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use pms_core::store::Store;
use pms_db::SqlStore;
use pms_local::LocalStore;
use sqlx::SqlitePool;
use tower::ServiceExt;

use pms_api::config::{LogFormat, ServerConfig, StorageBackend, StorageConfig};
use pms_api::router::build_app_router;
use pms_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        log_format: LogFormat::Pretty,
        storage: StorageConfig {
            backend: StorageBackend::Local,
            database_url: "sqlite::memory:".to_string(),
            db_max_connections: 1,
            local_dir: String::new(),
            local_seed: false,
        },
    }
}

/// Build the full application router around `store`.
///
/// Uses the same builder as `main.rs`, so tests exercise the production
/// middleware stack (CORS, request ID, timeout, tracing, panic recovery).
/// The router is cheap to clone and clones share the store.
pub fn build_test_app(store: Arc<dyn Store>) -> Router {
    let config = test_config();
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// App over an empty, unseeded in-memory local store.
pub fn local_app() -> Router {
    build_test_app(Arc::new(LocalStore::in_memory()))
}

/// App over a migrated SQLite pool (from `#[sqlx::test]`).
pub fn sqlite_app(pool: SqlitePool) -> Router {
    build_test_app(Arc::new(SqlStore::new(pool)))
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    json: serde_json::Value,
) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_json(app: &Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, json).await
}

pub async fn put_json(app: &Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, json).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// POST `json` to `uri` and return the created object's id.
pub async fn create(app: &Router, uri: &str, json: serde_json::Value) -> i64 {
    let response = post_json(app, uri, json).await;
    assert_eq!(response.status(), 201, "creating at {uri}");
    body_json(response).await["id"].as_i64().unwrap()
}
