//! Handlers for the `/tickets` resource, its status transitions and comments.
//!
//! Status changes into or out of `done` move XP for the credited user (the
//! assignee, or the actor when unassigned). That happens after the ticket
//! update has committed and never affects the response.
//!
//! Edits and deletes that change who holds a `done` ticket recount the
//! affected users' closed tickets. XP already awarded stays where it is.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use taskforge_core::error::CoreError;
use taskforge_core::gamification::adjustment_for_transition;
use taskforge_core::pagination::{clamp_limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use taskforge_core::ticket::{
    can_modify, validate_comment_body, validate_priority, validate_status, validate_title,
    PRIORITY_MEDIUM, STATUS_DONE,
};
use taskforge_core::types::{DbId, Timestamp};
use taskforge_db::models::gamification::AdjustXp;
use taskforge_db::models::ticket::{
    CreateTicket, StatusChange, Ticket, TicketComment, TicketFilter, UpdateTicket,
};
use taskforge_db::repositories::{ProjectRepo, TicketRepo, UserRepo, XpLedgerRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::TicketListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Ticket type used when the request does not name one.
const DEFAULT_TICKET_TYPE: &str = "task";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /tickets`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub project_id: DbId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Option<String>,
    pub ticket_type: Option<String>,
    pub assignee_id: Option<DbId>,
    pub due_date: Option<Timestamp>,
}

/// Request body for `PATCH /tickets/{id}/details`. Omitted fields are left
/// unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub ticket_type: Option<String>,
    pub assignee_id: Option<DbId>,
    pub due_date: Option<Timestamp>,
}

/// Request body for `PATCH /tickets/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Request body for `POST /tickets/{id}/comments` and
/// `PATCH /tickets/comments/{comment_id}`.
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

/// A ticket together with its comments.
#[derive(Debug, Serialize)]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub comments: Vec<TicketComment>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/tickets
///
/// New tickets start in `todo` with the caller as reporter.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateTicketRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Ticket>>)> {
    let title = input.title.trim().to_string();
    validate_title(&title)?;

    let priority = input.priority.unwrap_or_else(|| PRIORITY_MEDIUM.to_string());
    validate_priority(&priority)?;

    ProjectRepo::find_by_id(&state.pool, input.project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: input.project_id,
        }))?;

    if let Some(assignee_id) = input.assignee_id {
        ensure_assignee_exists(&state, assignee_id).await?;
    }

    let ticket = TicketRepo::create(
        &state.pool,
        &CreateTicket {
            project_id: input.project_id,
            title,
            description: input.description,
            priority,
            ticket_type: input
                .ticket_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TICKET_TYPE.to_string()),
            reporter_id: user.user_id,
            assignee_id: input.assignee_id,
            due_date: input.due_date,
        },
    )
    .await?;

    tracing::info!(
        ticket_id = ticket.id,
        project_id = ticket.project_id,
        reporter_id = user.user_id,
        "Ticket created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: ticket })))
}

/// GET /api/v1/tickets
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<TicketListParams>,
) -> AppResult<Json<DataResponse<Vec<Ticket>>>> {
    if let Some(status) = &params.status {
        validate_status(status)?;
    }
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let filter = TicketFilter {
        project_id: params.project_id,
        assignee_id: params.assignee_id,
        status: params.status,
    };
    let tickets = TicketRepo::list(&state.pool, &filter, limit).await?;
    Ok(Json(DataResponse { data: tickets }))
}

/// GET /api/v1/tickets/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TicketDetail>>> {
    let ticket = find_ticket(&state, id).await?;
    let comments = TicketRepo::list_comments(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: TicketDetail { ticket, comments },
    }))
}

/// PATCH /api/v1/tickets/{id}/details
///
/// Same permission rule as status changes. Status itself is not editable here.
pub async fn update_details(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTicketRequest>,
) -> AppResult<Json<DataResponse<Ticket>>> {
    let title = input.title.map(|t| t.trim().to_string());
    if let Some(title) = &title {
        validate_title(title)?;
    }
    if let Some(priority) = &input.priority {
        validate_priority(priority)?;
    }

    let current = find_ticket(&state, id).await?;
    ensure_can_modify(&user, &current)?;

    if let Some(assignee_id) = input.assignee_id {
        ensure_assignee_exists(&state, assignee_id).await?;
    }

    let changes = UpdateTicket {
        title,
        description: input.description,
        priority: input.priority,
        ticket_type: input.ticket_type.filter(|t| !t.trim().is_empty()),
        assignee_id: input.assignee_id,
        due_date: input.due_date,
    };
    let ticket = TicketRepo::update_details(&state.pool, id, &changes)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        }))?;

    tracing::info!(ticket_id = id, actor_id = user.user_id, "Ticket updated");

    if ticket.status == STATUS_DONE && ticket.assignee_id != current.assignee_id {
        for user_id in [current.assignee_id, ticket.assignee_id].into_iter().flatten() {
            refresh_closed_count(&state, user_id).await;
        }
    }

    Ok(Json(DataResponse { data: ticket }))
}

/// DELETE /api/v1/tickets/{id}
///
/// Removes the ticket and its comments. Returns 204 No Content.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let current = find_ticket(&state, id).await?;
    ensure_can_modify(&user, &current)?;

    let deleted = TicketRepo::delete(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        }))?;

    tracing::info!(ticket_id = id, actor_id = user.user_id, "Ticket deleted");

    if deleted.status == STATUS_DONE {
        if let Some(assignee_id) = deleted.assignee_id {
            refresh_closed_count(&state, assignee_id).await;
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/tickets/{id}/status
///
/// Managers may move any ticket; others only tickets they reported or are
/// assigned to.
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStatusRequest>,
) -> AppResult<Json<DataResponse<Ticket>>> {
    validate_status(&input.status)?;

    let current = find_ticket(&state, id).await?;
    ensure_can_modify(&user, &current)?;

    let change = TicketRepo::update_status(&state.pool, id, &input.status)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        }))?;

    tracing::info!(
        ticket_id = id,
        actor_id = user.user_id,
        from = %change.previous_status,
        to = %change.ticket.status,
        "Ticket status changed"
    );

    award_for_transition(&state, &change, user.user_id).await;

    Ok(Json(DataResponse {
        data: change.ticket,
    }))
}

/// POST /api/v1/tickets/{id}/comments
pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TicketComment>>)> {
    validate_comment_body(&input.text)?;
    find_ticket(&state, id).await?;

    let comment = TicketRepo::add_comment(&state.pool, id, user.user_id, input.text.trim()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// GET /api/v1/tickets/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TicketComment>>>> {
    find_ticket(&state, id).await?;
    let comments = TicketRepo::list_comments(&state.pool, id).await?;
    Ok(Json(DataResponse { data: comments }))
}

/// PATCH /api/v1/tickets/comments/{comment_id}
///
/// Only the author may edit a comment.
pub async fn update_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(comment_id): Path<DbId>,
    Json(input): Json<CreateCommentRequest>,
) -> AppResult<Json<DataResponse<TicketComment>>> {
    validate_comment_body(&input.text)?;
    find_own_comment(&state, &user, comment_id).await?;

    let comment =
        TicketRepo::update_comment(&state.pool, comment_id, user.user_id, input.text.trim())
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Comment",
                id: comment_id,
            }))?;
    Ok(Json(DataResponse { data: comment }))
}

/// DELETE /api/v1/tickets/comments/{comment_id}
///
/// Only the author may delete a comment. Returns 204 No Content.
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(comment_id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_own_comment(&state, &user, comment_id).await?;

    if !TicketRepo::delete_comment(&state.pool, comment_id, user.user_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id: comment_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_ticket(state: &AppState, id: DbId) -> AppResult<Ticket> {
    TicketRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        }))
}

fn ensure_can_modify(user: &AuthUser, ticket: &Ticket) -> AppResult<()> {
    if can_modify(user.user_id, &user.role, ticket.reporter_id, ticket.assignee_id) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Only managers, the reporter or the assignee may change this ticket".into(),
        )))
    }
}

async fn ensure_assignee_exists(state: &AppState, assignee_id: DbId) -> AppResult<()> {
    if UserRepo::find_by_id(&state.pool, assignee_id).await?.is_none() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "assignee {assignee_id} does not exist"
        ))));
    }
    Ok(())
}

/// 404 if the comment is missing, 403 if the caller did not write it.
async fn find_own_comment(
    state: &AppState,
    user: &AuthUser,
    comment_id: DbId,
) -> AppResult<TicketComment> {
    let comment = TicketRepo::find_comment(&state.pool, comment_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id: comment_id,
        }))?;
    if comment.author_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the author may change this comment".into(),
        )));
    }
    Ok(comment)
}

async fn refresh_closed_count(state: &AppState, user_id: DbId) {
    if let Err(e) = XpLedgerRepo::refresh_closed_count(&state.pool, user_id).await {
        tracing::warn!(user_id, error = %e, "Failed to refresh closed ticket count");
    }
}

/// Apply the XP award (or rollback) for a committed status change, then
/// recount the credited user's closed tickets.
///
/// Failures are logged and swallowed.
async fn award_for_transition(state: &AppState, change: &StatusChange, actor_id: DbId) {
    let ticket = &change.ticket;
    let Some(adjustment) =
        adjustment_for_transition(&change.previous_status, &ticket.status, &ticket.priority)
    else {
        return;
    };

    let user_id = ticket.assignee_id.unwrap_or(actor_id);
    let input = AdjustXp {
        user_id,
        ticket_id: Some(ticket.id),
        priority: ticket.priority.clone(),
        xp_delta: adjustment.xp_delta,
        note: adjustment.note(&ticket.title),
        closed_delta: adjustment.closed_delta,
    };

    if let Err(e) = XpLedgerRepo::adjust(&state.pool, &input).await {
        tracing::warn!(ticket_id = ticket.id, user_id, error = %e, "Failed to adjust XP");
    }
    refresh_closed_count(state, user_id).await;
}
