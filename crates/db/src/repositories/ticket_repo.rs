//! Repository for the `tickets` and `ticket_comments` tables.

use sqlx::PgPool;
use taskforge_core::ticket::INITIAL_STATUS;
use taskforge_core::types::DbId;

use crate::models::ticket::{
    CreateTicket, StatusChange, Ticket, TicketComment, TicketFilter, UpdateTicket,
};

/// Comment columns joined with the author's display name, aliased `c` / `u`.
const COMMENT_COLUMNS: &str =
    "c.id, c.ticket_id, c.author_id, u.name AS author_name, c.body, c.created_at";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, title, description, status, priority, ticket_type, \
                        reporter_id, assignee_id, due_date, created_at, updated_at";

/// Provides CRUD and status transitions for tickets, plus their comments.
pub struct TicketRepo;

impl TicketRepo {
    /// Insert a new ticket in the initial status, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTicket) -> Result<Ticket, sqlx::Error> {
        let query = format!(
            "INSERT INTO tickets
                (project_id, title, description, status, priority, ticket_type,
                 reporter_id, assignee_id, due_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(input.project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(INITIAL_STATUS)
            .bind(&input.priority)
            .bind(&input.ticket_type)
            .bind(input.reporter_id)
            .bind(input.assignee_id)
            .bind(input.due_date)
            .fetch_one(pool)
            .await
    }

    /// Find a ticket by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tickets matching `filter`, newest first, at most `limit` rows.
    pub async fn list(
        pool: &PgPool,
        filter: &TicketFilter,
        limit: i64,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tickets
             WHERE ($1::BIGINT IS NULL OR project_id = $1)
               AND ($2::BIGINT IS NULL OR assignee_id = $2)
               AND ($3::TEXT IS NULL OR status = $3)
             ORDER BY created_at DESC, id DESC
             LIMIT $4"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(filter.project_id)
            .bind(filter.assignee_id)
            .bind(&filter.status)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Apply field changes to a ticket. Returns `None` if it does not exist.
    pub async fn update_details(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTicket,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                priority = COALESCE($4, priority),
                ticket_type = COALESCE($5, ticket_type),
                assignee_id = COALESCE($6, assignee_id),
                due_date = COALESCE($7, due_date)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.priority)
            .bind(&input.ticket_type)
            .bind(input.assignee_id)
            .bind(input.due_date)
            .fetch_optional(pool)
            .await
    }

    /// Delete a ticket and its comments, returning the deleted row.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("DELETE FROM tickets WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Move a ticket to `status`, returning the new row and the status it had.
    ///
    /// The row is locked while the old status is read, so two concurrent
    /// transitions into `done` see different previous statuses and only one
    /// of them counts as a completion. Returns `None` if the ticket is gone.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<StatusChange>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous: Option<(String,)> =
            sqlx::query_as("SELECT status FROM tickets WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((previous_status,)) = previous else {
            tx.rollback().await?;
            return Ok(None);
        };

        let query = format!("UPDATE tickets SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let ticket = sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(status)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(StatusChange {
            ticket,
            previous_status,
        }))
    }

    // ── Comments ─────────────────────────────────────────────────────

    /// Add a comment to a ticket, returning it with the author's name.
    pub async fn add_comment(
        pool: &PgPool,
        ticket_id: DbId,
        author_id: DbId,
        body: &str,
    ) -> Result<TicketComment, sqlx::Error> {
        sqlx::query_as::<_, TicketComment>(
            "WITH inserted AS (
                INSERT INTO ticket_comments (ticket_id, author_id, body)
                VALUES ($1, $2, $3)
                RETURNING id, ticket_id, author_id, body, created_at
             )
             SELECT i.id, i.ticket_id, i.author_id, u.name AS author_name, i.body, i.created_at
             FROM inserted i
             JOIN users u ON u.id = i.author_id",
        )
        .bind(ticket_id)
        .bind(author_id)
        .bind(body)
        .fetch_one(pool)
        .await
    }

    /// List a ticket's comments, oldest first.
    pub async fn list_comments(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<TicketComment>, sqlx::Error> {
        let query = format!(
            "SELECT {COMMENT_COLUMNS}
             FROM ticket_comments c
             JOIN users u ON u.id = c.author_id
             WHERE c.ticket_id = $1
             ORDER BY c.created_at ASC, c.id ASC"
        );
        sqlx::query_as::<_, TicketComment>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }

    /// Find a comment by ID.
    pub async fn find_comment(
        pool: &PgPool,
        comment_id: DbId,
    ) -> Result<Option<TicketComment>, sqlx::Error> {
        let query = format!(
            "SELECT {COMMENT_COLUMNS}
             FROM ticket_comments c
             JOIN users u ON u.id = c.author_id
             WHERE c.id = $1"
        );
        sqlx::query_as::<_, TicketComment>(&query)
            .bind(comment_id)
            .fetch_optional(pool)
            .await
    }

    /// Replace a comment's text. Only the author's own comment matches;
    /// returns `None` otherwise.
    pub async fn update_comment(
        pool: &PgPool,
        comment_id: DbId,
        author_id: DbId,
        body: &str,
    ) -> Result<Option<TicketComment>, sqlx::Error> {
        sqlx::query_as::<_, TicketComment>(
            "WITH updated AS (
                UPDATE ticket_comments SET body = $3
                WHERE id = $1 AND author_id = $2
                RETURNING id, ticket_id, author_id, body, created_at
             )
             SELECT c.id, c.ticket_id, c.author_id, u.name AS author_name, c.body, c.created_at
             FROM updated c
             JOIN users u ON u.id = c.author_id",
        )
        .bind(comment_id)
        .bind(author_id)
        .bind(body)
        .fetch_optional(pool)
        .await
    }

    /// Delete the author's own comment. Returns `true` if a row was removed.
    pub async fn delete_comment(
        pool: &PgPool,
        comment_id: DbId,
        author_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ticket_comments WHERE id = $1 AND author_id = $2")
            .bind(comment_id)
            .bind(author_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
