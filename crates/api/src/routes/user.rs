//! Route definitions for the `/users` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/users`. All require auth.
///
/// ```text
/// GET    /            -> list (admin / project_manager)
/// GET    /me          -> me
/// PATCH  /me          -> update_me
/// GET    /{id}        -> get_by_id (admin / project_manager)
/// PATCH  /{id}/role   -> update_role (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(user::list))
        .route("/me", get(user::me).patch(user::update_me))
        .route("/{id}", get(user::get_by_id))
        .route("/{id}/role", patch(user::update_role))
}
