//! HTTP-level integration tests for XP awards and the gamification endpoints.
//!
//! The main scenario walks a ticket into `done` and back out again and checks
//! the ledger after each step.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_project, create_ticket, delete_auth, get_auth, patch_json_auth, register,
    set_status, TestUser,
};
use sqlx::PgPool;

async fn stats(pool: &PgPool, viewer: &TestUser, user_id: i64) -> serde_json::Value {
    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/gamification/stats/{user_id}"),
        &viewer.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

async fn events(pool: &PgPool, viewer: &TestUser, query: &str) -> serde_json::Value {
    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/gamification/events{query}"),
        &viewer.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

async fn leaderboard(pool: &PgPool, viewer: &TestUser, query: &str) -> serde_json::Value {
    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/gamification/leaderboard{query}"),
        &viewer.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_complete_then_reopen_round_trip(pool: PgPool) {
    let pm = register(&pool, "pm", "project_manager").await;
    let dev = register(&pool, "dev", "developer").await;
    let project_id = create_project(&pool, &pm, "Apollo").await;
    let ticket_id = create_ticket(&pool, &pm, project_id, "urgent", Some(dev.id)).await;

    let fresh = stats(&pool, &dev, dev.id).await;
    assert_eq!(fresh["xpTotal"], 0);
    assert_eq!(fresh["level"], 1);

    assert_eq!(set_status(&pool, &dev, ticket_id, "done").await, StatusCode::OK);

    let after_done = stats(&pool, &dev, dev.id).await;
    assert_eq!(after_done["xpTotal"], 30);
    assert_eq!(after_done["level"], 1);
    assert_eq!(after_done["nextLevelThreshold"], 100);
    assert_eq!(after_done["ticketsClosedCount"], 1);
    assert_eq!(after_done["streakDays"], 1);
    assert!(after_done["lastTicketClosedAt"].is_string());

    // done -> done is not a new completion.
    assert_eq!(set_status(&pool, &dev, ticket_id, "done").await, StatusCode::OK);
    assert_eq!(stats(&pool, &dev, dev.id).await["xpTotal"], 30);

    assert_eq!(set_status(&pool, &pm, ticket_id, "in_progress").await, StatusCode::OK);

    let after_reopen = stats(&pool, &dev, dev.id).await;
    assert_eq!(after_reopen["xpTotal"], 0);
    assert_eq!(after_reopen["level"], 1);
    assert_eq!(after_reopen["ticketsClosedCount"], 0);
    assert_eq!(after_reopen["streakDays"], 1, "rollback keeps the streak");

    let json = events(&pool, &dev, &format!("?userId={}", dev.id)).await;
    let feed = json["data"].as_array().unwrap();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0]["xp"], -30);
    assert_eq!(feed[0]["note"], "ticket Fix login reopened");
    assert_eq!(feed[1]["xp"], 30);
    assert_eq!(feed[1]["note"], "ticket Fix login completed");
    assert_eq!(feed[1]["ticketId"], ticket_id);
    assert_eq!(json["limit"], 50);
    assert!(json.get("nextCursor").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unassigned_ticket_credits_actor(pool: PgPool) {
    let pm = register(&pool, "pm", "project_manager").await;
    let project_id = create_project(&pool, &pm, "Apollo").await;
    let ticket_id = create_ticket(&pool, &pm, project_id, "low", None).await;

    assert_eq!(set_status(&pool, &pm, ticket_id, "done").await, StatusCode::OK);

    let pm_stats = stats(&pool, &pm, pm.id).await;
    assert_eq!(pm_stats["xpTotal"], 5);
    assert_eq!(pm_stats["streakDays"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stats_for_unknown_user_is_404(pool: PgPool) {
    let dev = register(&pool, "dev", "developer").await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/gamification/stats/999999",
        &dev.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["code"], "not_found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_events_cursor_pagination(pool: PgPool) {
    let pm = register(&pool, "pm", "project_manager").await;
    let project_id = create_project(&pool, &pm, "Apollo").await;
    for _ in 0..3 {
        let ticket_id = create_ticket(&pool, &pm, project_id, "medium", Some(pm.id)).await;
        set_status(&pool, &pm, ticket_id, "done").await;
    }

    let first = events(&pool, &pm, "?limit=2").await;
    assert_eq!(first["data"].as_array().unwrap().len(), 2);
    assert_eq!(first["limit"], 2);
    let cursor = first["nextCursor"].as_str().expect("more events remain").to_string();

    let query = format!("?limit=2&cursor={}", cursor.replace('+', "%2B"));
    let second = events(&pool, &pm, &query).await;
    assert_eq!(second["data"].as_array().unwrap().len(), 1);
    assert!(second.get("nextCursor").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_events_rejects_bad_cursor(pool: PgPool) {
    let dev = register(&pool, "dev", "developer").await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/gamification/events?cursor=last-tuesday",
        &dev.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "validation_error");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_leaderboard_ranking_and_paging(pool: PgPool) {
    let pm = register(&pool, "pm", "project_manager").await;
    let ana = register(&pool, "ana", "developer").await;
    let bo = register(&pool, "bo", "developer").await;
    let project_id = create_project(&pool, &pm, "Apollo").await;

    let urgent = create_ticket(&pool, &pm, project_id, "urgent", Some(ana.id)).await;
    let high = create_ticket(&pool, &pm, project_id, "high", Some(ana.id)).await;
    let low = create_ticket(&pool, &pm, project_id, "low", Some(bo.id)).await;
    set_status(&pool, &ana, urgent, "done").await;
    set_status(&pool, &ana, high, "done").await;
    set_status(&pool, &bo, low, "done").await;

    let board = leaderboard(&pool, &pm, "").await;
    let rows = board["data"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["id"], ana.id);
    assert_eq!(rows[0]["xp"], 50);
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[0]["xpGap"], 0);
    assert_eq!(rows[0]["ticketsClosedCount"], 2);
    assert_eq!(rows[1]["id"], bo.id);
    assert_eq!(rows[1]["xpGap"], 45);
    assert_eq!(rows[2]["id"], pm.id);
    assert_eq!(rows[2]["xp"], 0);
    assert_eq!(rows[2]["level"], 1);
    assert!(board.get("nextCursor").is_none());

    let page = leaderboard(&pool, &pm, "?limit=2").await;
    assert_eq!(page["data"].as_array().unwrap().len(), 2);
    assert_eq!(page["nextCursor"], 2);

    let page = leaderboard(&pool, &pm, "?limit=2&cursor=2").await;
    let rows = page["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], pm.id);
    assert_eq!(rows[0]["rank"], 1);
    assert!(page.get("nextCursor").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_leaderboard_reconciles_closed_counts(pool: PgPool) {
    let pm = register(&pool, "pm", "project_manager").await;
    let project_id = create_project(&pool, &pm, "Apollo").await;
    let ticket_id = create_ticket(&pool, &pm, project_id, "medium", Some(pm.id)).await;
    set_status(&pool, &pm, ticket_id, "done").await;

    sqlx::query("UPDATE gamification_user_stats SET tickets_closed_count = 9 WHERE user_id = $1")
        .bind(pm.id)
        .execute(&pool)
        .await
        .unwrap();

    let board = leaderboard(&pool, &pm, "").await;
    assert_eq!(board["data"][0]["ticketsClosedCount"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_done_ticket_recounts_closed(pool: PgPool) {
    let pm = register(&pool, "pm", "project_manager").await;
    let dev = register(&pool, "dev", "developer").await;
    let project_id = create_project(&pool, &pm, "Apollo").await;
    let ticket_id = create_ticket(&pool, &pm, project_id, "high", Some(dev.id)).await;
    set_status(&pool, &dev, ticket_id, "done").await;
    assert_eq!(stats(&pool, &dev, dev.id).await["ticketsClosedCount"], 1);

    let response = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/tickets/{ticket_id}"),
        &pm.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let after = stats(&pool, &dev, dev.id).await;
    assert_eq!(after["ticketsClosedCount"], 0);
    assert_eq!(after["xpTotal"], 20, "deleting keeps awarded XP");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reassigning_done_ticket_moves_closed_count(pool: PgPool) {
    let pm = register(&pool, "pm", "project_manager").await;
    let ana = register(&pool, "ana", "developer").await;
    let bo = register(&pool, "bo", "developer").await;
    let project_id = create_project(&pool, &pm, "Apollo").await;
    let ticket_id = create_ticket(&pool, &pm, project_id, "low", Some(ana.id)).await;
    set_status(&pool, &ana, ticket_id, "done").await;

    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/tickets/{ticket_id}/details"),
        serde_json::json!({ "assigneeId": bo.id }),
        &pm.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(stats(&pool, &pm, ana.id).await["ticketsClosedCount"], 0);
    assert_eq!(stats(&pool, &pm, bo.id).await["ticketsClosedCount"], 1);
    assert_eq!(stats(&pool, &pm, bo.id).await["xpTotal"], 0);
}
