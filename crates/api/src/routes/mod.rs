pub mod auth;
pub mod gamification;
pub mod health;
pub mod project;
pub mod ticket;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                          register (public)
/// /auth/login                             login (public)
/// /auth/refresh                           refresh (public)
/// /auth/logout                            logout (requires auth)
/// /auth/me                                current user (requires auth)
/// /auth/change-password                   change password (requires auth)
///
/// /users                                  list (manager only)
/// /users/me                               get, update own profile
/// /users/{id}                             get (manager only)
/// /users/{id}/role                        change role (admin only)
///
/// /projects                               list, create (create: manager only)
/// /projects/{id}                          get
///
/// /tickets                                list, create
/// /tickets/{id}                           get (with comments), delete
/// /tickets/{id}/details                   edit fields (PATCH)
/// /tickets/{id}/status                    change status (PATCH)
/// /tickets/{id}/comments                  list, add
/// /tickets/comments/{comment_id}          edit, delete (author only)
///
/// /gamification/stats/{user_id}           per-user stats
/// /gamification/events                    XP event feed
/// /gamification/leaderboard               ranked users
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", user::router())
        .nest("/projects", project::router())
        .nest("/tickets", ticket::router())
        .nest("/gamification", gamification::router())
}
