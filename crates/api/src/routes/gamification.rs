//! Route definitions for the `/gamification` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::gamification;
use crate::state::AppState;

/// Routes mounted at `/gamification`. All require auth.
///
/// ```text
/// GET /stats/{user_id}  -> get_stats
/// GET /events           -> list_events
/// GET /leaderboard      -> leaderboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats/{user_id}", get(gamification::get_stats))
        .route("/events", get(gamification::list_events))
        .route("/leaderboard", get(gamification::leaderboard))
}
