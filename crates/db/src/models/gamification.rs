//! Gamification ledger models: XP events, per-user stats, leaderboard rows.

use serde::Serialize;
use sqlx::FromRow;
use taskforge_core::gamification::LedgerTotals;
use taskforge_core::types::{DbId, Timestamp};

/// One row of the append-only `xp_events` ledger.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XpEvent {
    pub id: DbId,
    pub user_id: DbId,
    pub ticket_id: Option<DbId>,
    pub priority: String,
    #[serde(rename = "xp")]
    pub xp_value: i32,
    pub note: String,
    pub created_at: Timestamp,
}

/// Input for [`crate::repositories::XpLedgerRepo::adjust`].
///
/// `xp_delta` and `closed_delta` are negative when a completion is rolled back.
#[derive(Debug, Clone)]
pub struct AdjustXp {
    pub user_id: DbId,
    pub ticket_id: Option<DbId>,
    pub priority: String,
    pub xp_delta: i32,
    pub note: String,
    pub closed_delta: i32,
}

/// A row from `gamification_user_stats`.
///
/// Read-only outside the ledger repository; `level` and
/// `next_level_threshold` are always derived from `xp_total`.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGamificationStats {
    pub user_id: DbId,
    pub xp_total: i32,
    pub level: i32,
    pub next_level_threshold: i32,
    pub tickets_closed_count: i32,
    pub streak_days: i32,
    pub last_ticket_closed_at: Option<Timestamp>,
}

impl UserGamificationStats {
    /// The mutable totals, for feeding into [`LedgerTotals::apply`].
    pub fn totals(&self) -> LedgerTotals {
        LedgerTotals {
            xp_total: self.xp_total,
            level: self.level,
            next_level_threshold: self.next_level_threshold,
            tickets_closed_count: self.tickets_closed_count,
            streak_days: self.streak_days,
            last_ticket_closed_at: self.last_ticket_closed_at,
        }
    }
}

/// Raw leaderboard row before ranking.
#[derive(Debug, Clone, FromRow)]
pub struct LeaderboardRow {
    pub id: DbId,
    pub name: String,
    pub username: String,
    pub role: String,
    pub xp: i32,
    pub level: i32,
    pub tickets_closed_count: i32,
}

/// A ranked leaderboard entry as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: DbId,
    pub name: String,
    pub username: String,
    pub role: String,
    pub xp: i32,
    pub level: i32,
    pub tickets_closed_count: i32,
    pub rank: i32,
    pub xp_gap: i32,
}
