//! Handlers for the `/gamification` resource (stats, events, leaderboard).

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use taskforge_core::error::CoreError;
use taskforge_core::pagination::{
    clamp_limit, clamp_offset, next_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
use taskforge_core::types::{DbId, Timestamp};
use taskforge_db::models::gamification::{LeaderboardEntry, UserGamificationStats, XpEvent};
use taskforge_db::repositories::XpLedgerRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{EventPageParams, OffsetPageParams};
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// GET /api/v1/gamification/stats/{user_id}
pub async fn get_stats(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserGamificationStats>>> {
    let stats = XpLedgerRepo::get_stats(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Gamification stats",
            id: user_id,
        }))?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/gamification/events
///
/// Newest first. `cursor` is the RFC 3339 `nextCursor` of the previous page.
pub async fn list_events(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<EventPageParams>,
) -> AppResult<Json<PageResponse<XpEvent, Timestamp>>> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let cursor = params
        .cursor
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(parse_cursor)
        .transpose()?;

    let (events, next_cursor) =
        XpLedgerRepo::list_events(&state.pool, params.user_id, cursor, limit).await?;

    Ok(Json(PageResponse {
        data: events,
        limit,
        next_cursor,
    }))
}

/// GET /api/v1/gamification/leaderboard
///
/// Closed-ticket counts are reconciled from the tickets table before every
/// read. `cursor` is a row offset.
pub async fn leaderboard(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<OffsetPageParams>,
) -> AppResult<Json<PageResponse<LeaderboardEntry, i64>>> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.cursor);

    let refreshed = XpLedgerRepo::refresh_all_closed_counts(&state.pool).await?;
    tracing::debug!(refreshed, "Reconciled closed ticket counts");

    let entries = XpLedgerRepo::leaderboard(&state.pool, limit, offset).await?;
    let next_cursor = next_offset(offset, limit, entries.len());

    Ok(Json(PageResponse {
        data: entries,
        limit,
        next_cursor,
    }))
}

fn parse_cursor(raw: &str) -> Result<Timestamp, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| {
            AppError::Core(CoreError::Validation(format!(
                "cursor must be an RFC 3339 timestamp, got '{raw}'"
            )))
        })
}
