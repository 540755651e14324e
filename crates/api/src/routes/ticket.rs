//! Route definitions for the `/tickets` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::ticket;
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> create
/// GET    /{id}                     -> get_by_id
/// DELETE /{id}                     -> delete
/// PATCH  /{id}/details             -> update_details
/// PATCH  /{id}/status              -> update_status
/// GET    /{id}/comments            -> list_comments
/// POST   /{id}/comments            -> add_comment
/// PATCH  /comments/{comment_id}    -> update_comment
/// DELETE /comments/{comment_id}    -> delete_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(ticket::list).post(ticket::create))
        .route("/{id}", get(ticket::get_by_id).delete(ticket::delete))
        .route("/{id}/details", patch(ticket::update_details))
        .route("/{id}/status", patch(ticket::update_status))
        .route(
            "/{id}/comments",
            get(ticket::list_comments).post(ticket::add_comment),
        )
        .route(
            "/comments/{comment_id}",
            patch(ticket::update_comment).delete(ticket::delete_comment),
        )
}
