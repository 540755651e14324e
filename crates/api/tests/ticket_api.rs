//! HTTP-level integration tests for projects, tickets and comments.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_project, create_ticket, delete_auth, get_auth, patch_json_auth,
    post_json_auth, register, set_status,
};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_managers_create_projects(pool: PgPool) {
    let dev = register(&pool, "dev", "developer").await;
    let pm = register(&pool, "pm", "project_manager").await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/projects",
        serde_json::json!({ "name": "Apollo" }),
        &dev.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let project_id = create_project(&pool, &pm, "Apollo").await;

    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project_id}"),
        &dev.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["ownerId"], pm.id);

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/projects",
        serde_json::json!({ "name": "Apollo" }),
        &pm.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_ticket_defaults(pool: PgPool) {
    let pm = register(&pool, "pm", "project_manager").await;
    let project_id = create_project(&pool, &pm, "Apollo").await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/tickets",
        serde_json::json!({ "projectId": project_id, "title": "  Write docs  " }),
        &pm.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Write docs");
    assert_eq!(json["data"]["status"], "todo");
    assert_eq!(json["data"]["priority"], "medium");
    assert_eq!(json["data"]["ticketType"], "task");
    assert_eq!(json["data"]["reporterId"], pm.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_ticket_rejects_bad_input(pool: PgPool) {
    let pm = register(&pool, "pm", "project_manager").await;
    let project_id = create_project(&pool, &pm, "Apollo").await;

    let cases = [
        (
            serde_json::json!({ "projectId": project_id, "title": "x", "priority": "critical" }),
            StatusCode::BAD_REQUEST,
        ),
        (
            serde_json::json!({ "projectId": project_id, "title": "   " }),
            StatusCode::BAD_REQUEST,
        ),
        (
            serde_json::json!({ "projectId": 999_999, "title": "x" }),
            StatusCode::NOT_FOUND,
        ),
        (
            serde_json::json!({ "projectId": project_id, "title": "x", "assigneeId": 999_999 }),
            StatusCode::BAD_REQUEST,
        ),
    ];
    for (body, expected) in cases {
        let response =
            post_json_auth(common::build_test_app(pool.clone()), "/api/v1/tickets", body, &pm.token)
                .await;
        assert_eq!(response.status(), expected);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_tickets_filters(pool: PgPool) {
    let pm = register(&pool, "pm", "project_manager").await;
    let dev = register(&pool, "dev", "developer").await;
    let project_id = create_project(&pool, &pm, "Apollo").await;

    create_ticket(&pool, &pm, project_id, "low", None).await;
    let assigned = create_ticket(&pool, &pm, project_id, "high", Some(dev.id)).await;

    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/tickets?assigneeId={}", dev.id),
        &pm.token,
    )
    .await;
    let json = body_json(response).await;
    let tickets = json["data"].as_array().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["id"], assigned);

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/tickets?limit=1",
        &pm.token,
    )
    .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/tickets?status=closed",
        &pm.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_change_permissions(pool: PgPool) {
    let pm = register(&pool, "pm", "project_manager").await;
    let dev = register(&pool, "dev", "developer").await;
    let outsider = register(&pool, "outsider", "developer").await;
    let project_id = create_project(&pool, &pm, "Apollo").await;
    let ticket_id = create_ticket(&pool, &pm, project_id, "medium", Some(dev.id)).await;

    assert_eq!(
        set_status(&pool, &outsider, ticket_id, "in_progress").await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        set_status(&pool, &dev, ticket_id, "in_progress").await,
        StatusCode::OK
    );
    assert_eq!(set_status(&pool, &pm, ticket_id, "review").await, StatusCode::OK);
    assert_eq!(
        set_status(&pool, &pm, ticket_id, "archived").await,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        set_status(&pool, &pm, 999_999, "done").await,
        StatusCode::NOT_FOUND
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comments(pool: PgPool) {
    let pm = register(&pool, "pm", "project_manager").await;
    let project_id = create_project(&pool, &pm, "Apollo").await;
    let ticket_id = create_ticket(&pool, &pm, project_id, "medium", None).await;
    let uri = format!("/api/v1/tickets/{ticket_id}/comments");

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        serde_json::json!({ "text": "   " }),
        &pm.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        serde_json::json!({ "text": "Looks good" }),
        &pm.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["text"], "Looks good");
    assert_eq!(json["data"]["authorName"], "pm tester");

    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/tickets/{ticket_id}"),
        &pm.token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], ticket_id);
    assert_eq!(json["data"]["comments"].as_array().unwrap().len(), 1);

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/tickets/999999/comments",
        &pm.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_edit_ticket_details(pool: PgPool) {
    let pm = register(&pool, "pm", "project_manager").await;
    let dev = register(&pool, "dev", "developer").await;
    let outsider = register(&pool, "eve", "developer").await;
    let project_id = create_project(&pool, &pm, "Apollo").await;
    let ticket_id = create_ticket(&pool, &dev, project_id, "low", None).await;
    let uri = format!("/api/v1/tickets/{ticket_id}/details");

    let edit = |body: serde_json::Value, token: String| {
        let app = common::build_test_app(pool.clone());
        let uri = uri.clone();
        async move { patch_json_auth(app, &uri, body, &token).await }
    };

    let response = edit(serde_json::json!({ "title": "Nope" }), outsider.token.clone()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = edit(serde_json::json!({ "priority": "someday" }), dev.token.clone()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = edit(serde_json::json!({ "title": "  " }), dev.token.clone()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = edit(serde_json::json!({ "assigneeId": 999999 }), dev.token.clone()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = edit(
        serde_json::json!({ "title": "Fix login flow", "priority": "high", "assigneeId": dev.id }),
        dev.token.clone(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Fix login flow");
    assert_eq!(json["data"]["priority"], "high");
    assert_eq!(json["data"]["assigneeId"], dev.id);
    assert_eq!(json["data"]["status"], "todo");

    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/tickets/999999/details",
        serde_json::json!({ "title": "Ghost" }),
        &pm.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_ticket(pool: PgPool) {
    let pm = register(&pool, "pm", "project_manager").await;
    let outsider = register(&pool, "eve", "developer").await;
    let project_id = create_project(&pool, &pm, "Apollo").await;
    let ticket_id = create_ticket(&pool, &pm, project_id, "low", None).await;
    let uri = format!("/api/v1/tickets/{ticket_id}");

    let response = delete_auth(common::build_test_app(pool.clone()), &uri, &outsider.token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(common::build_test_app(pool.clone()), &uri, &pm.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(common::build_test_app(pool.clone()), &uri, &pm.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(common::build_test_app(pool), &uri, &pm.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_author_edits_and_deletes_comments(pool: PgPool) {
    let pm = register(&pool, "pm", "project_manager").await;
    let dev = register(&pool, "dev", "developer").await;
    let project_id = create_project(&pool, &pm, "Apollo").await;
    let ticket_id = create_ticket(&pool, &pm, project_id, "medium", None).await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/tickets/{ticket_id}/comments"),
        serde_json::json!({ "text": "Looks good" }),
        &dev.token,
    )
    .await;
    let comment_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/tickets/comments/{comment_id}");

    // Managers get no special rights over someone else's comment.
    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        serde_json::json!({ "text": "Edited by pm" }),
        &pm.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = delete_auth(common::build_test_app(pool.clone()), &uri, &pm.token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        serde_json::json!({ "text": "" }),
        &dev.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        serde_json::json!({ "text": "Looks great" }),
        &dev.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["text"], "Looks great");
    assert_eq!(json["data"]["authorName"], "dev tester");

    let response = delete_auth(common::build_test_app(pool.clone()), &uri, &dev.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(common::build_test_app(pool), &uri, &dev.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
