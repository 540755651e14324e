//! User entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use taskforge_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub username: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub password_hash: String,
    pub role: String,
    pub bio: String,
    pub avatar_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: DbId,
    pub name: String,
    pub username: String,
    pub email: Option<String>,
    pub role: String,
    pub bio: String,
    pub avatar_url: Option<String>,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            bio: user.bio.clone(),
            avatar_url: user.avatar_url.clone(),
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user. The password must already be hashed.
#[derive(Debug)]
pub struct CreateUser {
    pub name: String,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: String,
}

/// Profile changes a user may make to their own account.
///
/// `None` leaves a field as it is.
#[derive(Debug, Default)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}
