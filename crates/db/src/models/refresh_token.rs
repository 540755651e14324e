//! Refresh token model and DTOs.

use sqlx::FromRow;
use taskforge_core::types::{DbId, Timestamp};
use uuid::Uuid;

/// A row from the `refresh_tokens` table.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    /// Public half of the `<id>.<secret>` bearer string.
    pub id: Uuid,
    pub user_id: DbId,
    /// Hex SHA-256 of the secret half.
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl RefreshToken {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }

    /// Usable at `now`: not revoked and not yet expired. The secret hash is
    /// checked separately.
    pub fn is_live_at(&self, now: Timestamp) -> bool {
        !self.is_revoked() && !self.is_expired_at(now)
    }
}

/// DTO for inserting a refresh token.
#[derive(Debug, Clone)]
pub struct CreateRefreshToken {
    pub id: Uuid,
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
}
