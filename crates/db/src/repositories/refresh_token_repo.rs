//! Repository for the `refresh_tokens` table.
//!
//! Rows are never deleted: expired and revoked tokens stay for audit.

use sqlx::PgPool;
use taskforge_core::types::DbId;
use uuid::Uuid;

use crate::models::refresh_token::{CreateRefreshToken, RefreshToken};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token_hash, expires_at, revoked_at, created_at";

/// Provides issue, lookup, rotation and revocation for refresh tokens.
pub struct RefreshTokenRepo;

impl RefreshTokenRepo {
    /// Insert a new refresh token, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateRefreshToken,
    ) -> Result<RefreshToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshToken>(&query)
            .bind(input.id)
            .bind(input.user_id)
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a token by id regardless of state. Callers decide validity.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<RefreshToken>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM refresh_tokens WHERE id = $1");
        sqlx::query_as::<_, RefreshToken>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Revoke `consumed_id` and insert `replacement` in one transaction.
    ///
    /// The revoke only matches a row that is still unrevoked. If another
    /// request already consumed the token, nothing is inserted and `None` is
    /// returned, so each token can be exchanged at most once.
    pub async fn rotate(
        pool: &PgPool,
        consumed_id: Uuid,
        replacement: &CreateRefreshToken,
    ) -> Result<Option<RefreshToken>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let revoked = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW()
             WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(consumed_id)
        .execute(&mut *tx)
        .await?;

        if revoked.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let token = sqlx::query_as::<_, RefreshToken>(&query)
            .bind(replacement.id)
            .bind(replacement.user_id)
            .bind(&replacement.token_hash)
            .bind(replacement.expires_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(token))
    }

    /// Revoke all live tokens for a user. Returns the count of revoked tokens.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW()
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
