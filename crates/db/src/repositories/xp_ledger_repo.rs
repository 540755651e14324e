//! Repository for the XP ledger: `xp_events` and `gamification_user_stats`.
//!
//! Stats rows are only ever written here. Every write either inserts the
//! all-zero defaults or stores totals produced by
//! [`LedgerTotals::apply`](taskforge_core::gamification::LedgerTotals::apply),
//! which keeps `level` and `next_level_threshold` consistent with `xp_total`.

use chrono::Utc;
use sqlx::PgPool;
use taskforge_core::gamification::rank_page;
use taskforge_core::ticket::STATUS_DONE;
use taskforge_core::types::{DbId, Timestamp};

use crate::models::gamification::{
    AdjustXp, LeaderboardEntry, LeaderboardRow, UserGamificationStats, XpEvent,
};

/// Column list for `gamification_user_stats`.
const STATS_COLUMNS: &str = "user_id, xp_total, level, next_level_threshold, \
                              tickets_closed_count, streak_days, last_ticket_closed_at";

/// Column list for `xp_events`.
const EVENT_COLUMNS: &str = "id, user_id, ticket_id, priority, xp_value, note, created_at";

/// Provides the ledger operations: adjust, ensure, read, rank, reconcile.
pub struct XpLedgerRepo;

impl XpLedgerRepo {
    /// Create an all-zero stats row for `user_id` if none exists.
    pub async fn ensure_user(pool: &PgPool, user_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO gamification_user_stats (user_id) VALUES ($1)
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Fetch a user's stats row, if one exists.
    pub async fn get_stats(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<UserGamificationStats>, sqlx::Error> {
        let query = format!("SELECT {STATS_COLUMNS} FROM gamification_user_stats WHERE user_id = $1");
        sqlx::query_as::<_, UserGamificationStats>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Record an XP award or rollback and update the user's stats.
    ///
    /// See [`Self::adjust_at`].
    pub async fn adjust(
        pool: &PgPool,
        input: &AdjustXp,
    ) -> Result<Option<UserGamificationStats>, sqlx::Error> {
        Self::adjust_at(pool, input, Utc::now()).await
    }

    /// Record an XP award or rollback as of `now`.
    ///
    /// Appends one `xp_events` row and rewrites the user's stats in a single
    /// transaction. The stats row is locked with `FOR UPDATE` before it is
    /// read, so concurrent adjustments for the same user apply one after the
    /// other. A zero `xp_delta` is a no-op and returns `None`.
    pub async fn adjust_at(
        pool: &PgPool,
        input: &AdjustXp,
        now: Timestamp,
    ) -> Result<Option<UserGamificationStats>, sqlx::Error> {
        if input.xp_delta == 0 {
            return Ok(None);
        }

        let mut tx = pool.begin().await?;

        sqlx::query(
            "INSERT INTO gamification_user_stats (user_id) VALUES ($1)
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(input.user_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "SELECT {STATS_COLUMNS} FROM gamification_user_stats WHERE user_id = $1 FOR UPDATE"
        );
        let current = sqlx::query_as::<_, UserGamificationStats>(&query)
            .bind(input.user_id)
            .fetch_one(&mut *tx)
            .await?;

        let next = current
            .totals()
            .apply(input.xp_delta, input.closed_delta, now);

        sqlx::query(
            "INSERT INTO xp_events (user_id, ticket_id, priority, xp_value, note, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(input.user_id)
        .bind(input.ticket_id)
        .bind(&input.priority)
        .bind(input.xp_delta)
        .bind(&input.note)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE gamification_user_stats SET
                xp_total = $2,
                level = $3,
                next_level_threshold = $4,
                tickets_closed_count = $5,
                streak_days = $6,
                last_ticket_closed_at = $7
             WHERE user_id = $1
             RETURNING {STATS_COLUMNS}"
        );
        let stats = sqlx::query_as::<_, UserGamificationStats>(&query)
            .bind(input.user_id)
            .bind(next.xp_total)
            .bind(next.level)
            .bind(next.next_level_threshold)
            .bind(next.tickets_closed_count)
            .bind(next.streak_days)
            .bind(next.last_ticket_closed_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            user_id = input.user_id,
            xp_delta = input.xp_delta,
            closed_delta = input.closed_delta,
            xp_total = stats.xp_total,
            level = stats.level,
            "XP ledger adjusted"
        );
        Ok(Some(stats))
    }

    /// List XP events newest first, optionally for one user.
    ///
    /// Keyset-paginated on `created_at`: pass the returned cursor back to get
    /// the rows strictly older than the last one seen. The cursor is `None`
    /// when no further rows exist.
    pub async fn list_events(
        pool: &PgPool,
        user_id: Option<DbId>,
        cursor: Option<Timestamp>,
        limit: i64,
    ) -> Result<(Vec<XpEvent>, Option<Timestamp>), sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM xp_events
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
               AND ($2::TIMESTAMPTZ IS NULL OR created_at < $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3"
        );
        let mut events = sqlx::query_as::<_, XpEvent>(&query)
            .bind(user_id)
            .bind(cursor)
            .bind(limit + 1)
            .fetch_all(pool)
            .await?;

        if events.len() as i64 > limit {
            events.truncate(limit as usize);
            let next = events.last().map(|e| e.created_at);
            return Ok((events, next));
        }
        Ok((events, None))
    }

    /// One page of users ranked by XP, then level.
    ///
    /// Users without a stats row rank as zero XP, level 1.
    pub async fn leaderboard(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            "SELECT u.id,
                    u.name,
                    u.username,
                    u.role,
                    COALESCE(g.xp_total, 0) AS xp,
                    COALESCE(g.level, 1) AS level,
                    COALESCE(g.tickets_closed_count, 0) AS tickets_closed_count
             FROM users u
             LEFT JOIN gamification_user_stats g ON g.user_id = u.id
             ORDER BY COALESCE(g.xp_total, 0) DESC, COALESCE(g.level, 1) DESC, u.id ASC
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let xps: Vec<i32> = rows.iter().map(|r| r.xp).collect();
        let entries = rows
            .into_iter()
            .zip(rank_page(&xps))
            .map(|(row, pos)| LeaderboardEntry {
                id: row.id,
                name: row.name,
                username: row.username,
                role: row.role,
                xp: row.xp,
                level: row.level,
                tickets_closed_count: row.tickets_closed_count,
                rank: pos.rank,
                xp_gap: pos.xp_gap,
            })
            .collect();
        Ok(entries)
    }

    /// Recompute one user's closed-ticket count from their `done` tickets.
    ///
    /// `last_ticket_closed_at` takes the newest `done` ticket's `updated_at`
    /// and is left alone when the user has none.
    pub async fn refresh_closed_count(pool: &PgPool, user_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO gamification_user_stats (user_id, tickets_closed_count, last_ticket_closed_at)
             SELECT $1, COUNT(*)::INT, MAX(updated_at)
             FROM tickets
             WHERE assignee_id = $1 AND status = $2
             ON CONFLICT (user_id) DO UPDATE SET
                tickets_closed_count = EXCLUDED.tickets_closed_count,
                last_ticket_closed_at = COALESCE(
                    EXCLUDED.last_ticket_closed_at,
                    gamification_user_stats.last_ticket_closed_at
                )",
        )
        .bind(user_id)
        .bind(STATUS_DONE)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Recompute closed-ticket counts for every user.
    ///
    /// Users with assigned `done` tickets get the fresh count; every other
    /// stats row with a non-zero count is reset to zero. Both statements run
    /// in one transaction. Returns the number of stats rows written.
    pub async fn refresh_all_closed_counts(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let reset = sqlx::query(
            "UPDATE gamification_user_stats g
             SET tickets_closed_count = 0
             WHERE g.tickets_closed_count <> 0
               AND NOT EXISTS (
                   SELECT 1 FROM tickets t
                   WHERE t.assignee_id = g.user_id AND t.status = $1
               )",
        )
        .bind(STATUS_DONE)
        .execute(&mut *tx)
        .await?;

        let counted = sqlx::query(
            "INSERT INTO gamification_user_stats (user_id, tickets_closed_count, last_ticket_closed_at)
             SELECT assignee_id, COUNT(*)::INT, MAX(updated_at)
             FROM tickets
             WHERE assignee_id IS NOT NULL AND status = $1
             GROUP BY assignee_id
             ON CONFLICT (user_id) DO UPDATE SET
                tickets_closed_count = EXCLUDED.tickets_closed_count,
                last_ticket_closed_at = COALESCE(
                    EXCLUDED.last_ticket_closed_at,
                    gamification_user_stats.last_ticket_closed_at
                )",
        )
        .bind(STATUS_DONE)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(reset.rows_affected() + counted.rows_affected())
    }
}
