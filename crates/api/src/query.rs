//! Shared query parameter types for API handlers.
//!
//! Limits are clamped in the handlers via
//! [`clamp_limit`](taskforge_core::pagination::clamp_limit) before they reach
//! a repository.

use serde::Deserialize;
use taskforge_core::types::DbId;

/// Offset pagination (`?limit=&cursor=`), where the cursor is a row offset.
#[derive(Debug, Deserialize)]
pub struct OffsetPageParams {
    pub limit: Option<i64>,
    pub cursor: Option<i64>,
}

/// Keyset pagination over XP events (`?userId=&limit=&cursor=`).
///
/// The cursor is an RFC 3339 timestamp and is parsed by the handler so a
/// malformed value can be reported as a validation error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPageParams {
    pub user_id: Option<DbId>,
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

/// Ticket list filters (`?projectId=&assigneeId=&status=&limit=`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketListParams {
    pub project_id: Option<DbId>,
    pub assignee_id: Option<DbId>,
    pub status: Option<String>,
    pub limit: Option<i64>,
}
