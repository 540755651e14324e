#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use taskforge_api::auth::jwt::JwtConfig;
use taskforge_api::config::ServerConfig;
use taskforge_api::router::build_app_router;
use taskforge_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 24 * 60,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the full application router against `pool`, with the same
/// middleware stack production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A registered user and its credentials.
pub struct TestUser {
    pub id: i64,
    pub token: String,
    pub refresh_token: String,
}

/// Register a user through the API and return its id and tokens.
pub async fn register(pool: &PgPool, username: &str, role: &str) -> TestUser {
    let body = serde_json::json!({
        "name": format!("{username} tester"),
        "username": username,
        "password": "password-123",
        "role": role,
    });
    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    TestUser {
        id: json["user"]["id"].as_i64().unwrap(),
        token: json["token"].as_str().unwrap().to_string(),
        refresh_token: json["refreshToken"].as_str().unwrap().to_string(),
    }
}

/// Create a project as `manager` and return its id.
pub async fn create_project(pool: &PgPool, manager: &TestUser, name: &str) -> i64 {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/projects",
        serde_json::json!({ "name": name }),
        &manager.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Create a ticket and return its id.
pub async fn create_ticket(
    pool: &PgPool,
    reporter: &TestUser,
    project_id: i64,
    priority: &str,
    assignee_id: Option<i64>,
) -> i64 {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/tickets",
        serde_json::json!({
            "projectId": project_id,
            "title": "Fix login",
            "priority": priority,
            "assigneeId": assignee_id,
        }),
        &reporter.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Move a ticket to `status` and return the response status.
pub async fn set_status(pool: &PgPool, actor: &TestUser, ticket_id: i64, status: &str) -> StatusCode {
    patch_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/tickets/{ticket_id}/status"),
        serde_json::json!({ "status": status }),
        &actor.token,
    )
    .await
    .status()
}
