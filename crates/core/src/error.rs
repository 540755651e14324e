use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Login failed. Never says whether the username or the password was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Refresh failed. Covers malformed, unknown, revoked, expired and
    /// mismatched tokens alike.
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
}
