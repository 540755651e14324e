//! Opaque refresh tokens of the form `<id>.<secret>`.
//!
//! The id is a UUID v4 and the primary key of the `refresh_tokens` row. The
//! secret is 32 random bytes, hex-encoded; only its SHA-256 hex digest is
//! stored, so a database leak does not expose usable tokens.
//!
//! Every way a presented token can be bad (malformed, unknown, revoked,
//! expired, wrong secret, owner gone, already rotated) surfaces as the same
//! [`CoreError::InvalidRefreshToken`].

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use subtle::ConstantTimeEq;
use taskforge_core::error::CoreError;
use taskforge_core::types::{DbId, Timestamp};
use taskforge_db::models::refresh_token::CreateRefreshToken;
use taskforge_db::models::user::User;
use taskforge_db::repositories::{RefreshTokenRepo, UserRepo};
use uuid::Uuid;

use super::jwt::JwtConfig;
use crate::error::{AppError, AppResult};

/// Number of random bytes in a secret.
const SECRET_BYTES: usize = 32;

/// A freshly generated token, before it is persisted.
#[derive(Debug)]
pub struct GeneratedToken {
    pub id: Uuid,
    pub secret: String,
}

impl GeneratedToken {
    /// Generate a new random id and secret.
    pub fn generate() -> Self {
        let bytes: [u8; SECRET_BYTES] = rand::random();
        let secret = bytes.iter().map(|b| format!("{b:02x}")).collect();
        Self {
            id: Uuid::new_v4(),
            secret,
        }
    }

    /// The `<id>.<secret>` string handed to the client.
    pub fn compose(&self) -> String {
        format!("{}.{}", self.id, self.secret)
    }

    /// Insert DTO for this token owned by `user_id`, expiring at `expires_at`.
    pub fn to_create(&self, user_id: DbId, expires_at: Timestamp) -> CreateRefreshToken {
        CreateRefreshToken {
            id: self.id,
            user_id,
            token_hash: hash_secret(&self.secret),
            expires_at,
        }
    }
}

/// Split a presented token into its id and secret.
///
/// Requires exactly two non-empty dot-separated parts and a parseable UUID.
pub fn split_token(presented: &str) -> Option<(Uuid, &str)> {
    let mut parts = presented.split('.');
    let (Some(id), Some(secret), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    if id.is_empty() || secret.is_empty() {
        return None;
    }
    let id = Uuid::parse_str(id).ok()?;
    Some((id, secret))
}

/// SHA-256 hex digest of a secret.
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Whether `secret` hashes to `stored_hash`, compared in constant time.
pub fn secret_matches(secret: &str, stored_hash: &str) -> bool {
    let computed = hash_secret(secret);
    computed.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

/// Issue and persist a new refresh token for `user_id`.
///
/// Returns the composite string to send to the client.
pub async fn issue_refresh_token(
    pool: &PgPool,
    user_id: DbId,
    config: &JwtConfig,
) -> Result<String, sqlx::Error> {
    let token = GeneratedToken::generate();
    let expires_at = Utc::now() + Duration::days(config.refresh_token_expiry_days);
    RefreshTokenRepo::create(pool, &token.to_create(user_id, expires_at)).await?;
    Ok(token.compose())
}

/// Exchange a presented refresh token for a new one.
///
/// The presented token is revoked and its replacement inserted in one
/// transaction; a token that lost a concurrent rotation is rejected.
/// Returns the owning user and the replacement's composite string.
pub async fn rotate_refresh_token(
    pool: &PgPool,
    presented: &str,
    config: &JwtConfig,
) -> AppResult<(User, String)> {
    let invalid = || AppError::Core(CoreError::InvalidRefreshToken);

    let (id, secret) = split_token(presented).ok_or_else(invalid)?;

    let stored = RefreshTokenRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(invalid)?;

    let now = Utc::now();
    if !stored.is_live_at(now) || !secret_matches(secret, &stored.token_hash) {
        tracing::debug!(token_id = %id, "Rejected refresh token");
        return Err(invalid());
    }

    let user = UserRepo::find_by_id(pool, stored.user_id)
        .await?
        .ok_or_else(invalid)?;

    let replacement = GeneratedToken::generate();
    let expires_at = now + Duration::days(config.refresh_token_expiry_days);
    RefreshTokenRepo::rotate(pool, id, &replacement.to_create(user.id, expires_at))
        .await?
        .ok_or_else(|| {
            tracing::warn!(token_id = %id, user_id = user.id, "Refresh token reused");
            invalid()
        })?;

    Ok((user, replacement.compose()))
}
