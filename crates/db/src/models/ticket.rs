//! Ticket and ticket comment models and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use taskforge_core::types::{DbId, Timestamp};

/// A ticket row from the `tickets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub ticket_type: String,
    pub reporter_id: DbId,
    pub assignee_id: Option<DbId>,
    pub due_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a ticket. Status always starts at `todo`.
#[derive(Debug, Clone)]
pub struct CreateTicket {
    pub project_id: DbId,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub ticket_type: String,
    pub reporter_id: DbId,
    pub assignee_id: Option<DbId>,
    pub due_date: Option<Timestamp>,
}

/// Field changes for an existing ticket. `None` leaves a field as it is.
///
/// Status is not editable here; it only moves through the status endpoint so
/// that XP awards stay in step.
#[derive(Debug, Clone, Default)]
pub struct UpdateTicket {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub ticket_type: Option<String>,
    pub assignee_id: Option<DbId>,
    pub due_date: Option<Timestamp>,
}

/// Optional filters for listing tickets. `None` means "any".
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub project_id: Option<DbId>,
    pub assignee_id: Option<DbId>,
    pub status: Option<String>,
}

/// Result of a status update: the new row plus the status it replaced.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub ticket: Ticket,
    pub previous_status: String,
}

/// A comment row joined with its author's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketComment {
    pub id: DbId,
    pub ticket_id: DbId,
    pub author_id: DbId,
    pub author_name: String,
    #[serde(rename = "text")]
    pub body: String,
    pub created_at: Timestamp,
}
