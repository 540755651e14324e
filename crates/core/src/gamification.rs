//! XP, level and streak rules for the gamification ledger.
//!
//! The ledger repository locks a user's stats row, hands the current values
//! to [`LedgerTotals::apply`], and writes back whatever comes out. Level and
//! threshold are never computed anywhere else.

use chrono::Duration;

use crate::ticket::{
    PRIORITY_HIGH, PRIORITY_LOW, PRIORITY_MEDIUM, PRIORITY_URGENT, STATUS_DONE,
};
use crate::types::Timestamp;

/// XP needed to advance one level.
pub const XP_PER_LEVEL: i32 = 100;

// ---------------------------------------------------------------------------
// Priority XP
// ---------------------------------------------------------------------------

/// XP awarded for closing a ticket of the given priority.
///
/// Unknown priorities are worth the same as `medium`.
pub fn priority_xp(priority: &str) -> i32 {
    match priority {
        PRIORITY_LOW => 5,
        PRIORITY_MEDIUM => 10,
        PRIORITY_HIGH => 20,
        PRIORITY_URGENT => 30,
        _ => 10,
    }
}

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

/// `floor(xp_total / 100) + 1`, with negative totals treated as zero.
pub fn level_for_xp(xp_total: i32) -> i32 {
    xp_total.max(0) / XP_PER_LEVEL + 1
}

/// XP total at which `level` ends.
pub fn threshold_for_level(level: i32) -> i32 {
    level * XP_PER_LEVEL
}

// ---------------------------------------------------------------------------
// Ledger totals
// ---------------------------------------------------------------------------

/// The mutable part of a user's gamification summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerTotals {
    pub xp_total: i32,
    pub level: i32,
    pub next_level_threshold: i32,
    pub tickets_closed_count: i32,
    pub streak_days: i32,
    pub last_ticket_closed_at: Option<Timestamp>,
}

impl LedgerTotals {
    /// Apply one XP delta and closed-ticket delta at time `now`.
    ///
    /// Totals are clamped at zero. The streak only moves when a ticket is
    /// closed (`closed_delta > 0`); rollbacks leave it alone.
    pub fn apply(&self, xp_delta: i32, closed_delta: i32, now: Timestamp) -> Self {
        let xp_total = self.xp_total.saturating_add(xp_delta).max(0);
        let tickets_closed_count = self.tickets_closed_count.saturating_add(closed_delta).max(0);
        let level = level_for_xp(xp_total);

        let (streak_days, last_ticket_closed_at) = if closed_delta > 0 {
            (
                next_streak(self.streak_days, self.last_ticket_closed_at, now),
                Some(now),
            )
        } else {
            (self.streak_days, self.last_ticket_closed_at)
        };

        Self {
            xp_total,
            level,
            next_level_threshold: threshold_for_level(level),
            tickets_closed_count,
            streak_days,
            last_ticket_closed_at,
        }
    }
}

/// Streak after closing a ticket at `now`, compared by UTC calendar day.
///
/// - last closing today (or later, under clock skew): unchanged
/// - last closing yesterday: `current + 1`
/// - anything else: 1
pub fn next_streak(current: i32, last_closed: Option<Timestamp>, now: Timestamp) -> i32 {
    let today = now.date_naive();
    match last_closed.map(|t| t.date_naive()) {
        Some(day) if day >= today => current,
        Some(day) if day == today - Duration::days(1) => current.saturating_add(1),
        _ => 1,
    }
}

// ---------------------------------------------------------------------------
// Award policy
// ---------------------------------------------------------------------------

/// Why XP moved on a ticket transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardKind {
    Completed,
    Reopened,
}

/// XP and closed-count deltas triggered by one status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpAdjustment {
    pub kind: AwardKind,
    pub xp_delta: i32,
    pub closed_delta: i32,
}

impl XpAdjustment {
    /// Human-readable note stored on the XP event.
    pub fn note(&self, ticket_title: &str) -> String {
        match self.kind {
            AwardKind::Completed => format!("ticket {ticket_title} completed"),
            AwardKind::Reopened => format!("ticket {ticket_title} reopened"),
        }
    }
}

/// Award (or roll back) XP for a status change.
///
/// Entering `done` from anywhere else awards; leaving `done` rolls back the
/// same amount. Every other transition is worth nothing.
pub fn adjustment_for_transition(
    previous_status: &str,
    new_status: &str,
    priority: &str,
) -> Option<XpAdjustment> {
    let was_done = previous_status == STATUS_DONE;
    let is_done = new_status == STATUS_DONE;
    let xp = priority_xp(priority);

    match (was_done, is_done) {
        (false, true) => Some(XpAdjustment {
            kind: AwardKind::Completed,
            xp_delta: xp,
            closed_delta: 1,
        }),
        (true, false) => Some(XpAdjustment {
            kind: AwardKind::Reopened,
            xp_delta: -xp,
            closed_delta: -1,
        }),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Leaderboard ranking
// ---------------------------------------------------------------------------

/// Rank and distance-to-leader of one leaderboard row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedPosition {
    pub rank: i32,
    pub xp_gap: i32,
}

/// Rank a page of XP totals that is already sorted best-first.
///
/// Ranks run 1, 2, 3, ... in page order. The gap is measured against the
/// first row of this page, not the global leader.
pub fn rank_page(xp_totals: &[i32]) -> Vec<RankedPosition> {
    let leader_xp = xp_totals.first().copied().unwrap_or(0);
    xp_totals
        .iter()
        .enumerate()
        .map(|(i, &xp)| RankedPosition {
            rank: i as i32 + 1,
            xp_gap: if i == 0 { 0 } else { (leader_xp - xp).max(0) },
        })
        .collect()
}
