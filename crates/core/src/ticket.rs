//! Ticket status and priority vocabulary plus mutation rules.
//!
//! Values must match the check constraints on the `tickets` table.

use crate::error::CoreError;
use crate::roles::is_manager;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Statuses
// ---------------------------------------------------------------------------

pub const STATUS_BACKLOG: &str = "backlog";
pub const STATUS_TODO: &str = "todo";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_REVIEW: &str = "review";
pub const STATUS_DONE: &str = "done";

/// Status every new ticket starts in.
pub const INITIAL_STATUS: &str = STATUS_TODO;

pub const VALID_STATUSES: &[&str] = &[
    STATUS_BACKLOG,
    STATUS_TODO,
    STATUS_IN_PROGRESS,
    STATUS_REVIEW,
    STATUS_DONE,
];

/// Validate that a status string is one of the known statuses.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown ticket status: '{status}'. Valid statuses: {}",
            VALID_STATUSES.join(", ")
        )))
    }
}

// ---------------------------------------------------------------------------
// Priorities
// ---------------------------------------------------------------------------

pub const PRIORITY_LOW: &str = "low";
pub const PRIORITY_MEDIUM: &str = "medium";
pub const PRIORITY_HIGH: &str = "high";
pub const PRIORITY_URGENT: &str = "urgent";

pub const VALID_PRIORITIES: &[&str] =
    &[PRIORITY_LOW, PRIORITY_MEDIUM, PRIORITY_HIGH, PRIORITY_URGENT];

/// Validate that a priority string is one of the known priorities.
pub fn validate_priority(priority: &str) -> Result<(), CoreError> {
    if VALID_PRIORITIES.contains(&priority) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown ticket priority: '{priority}'. Valid priorities: {}",
            VALID_PRIORITIES.join(", ")
        )))
    }
}

// ---------------------------------------------------------------------------
// Field rules
// ---------------------------------------------------------------------------

/// Maximum ticket title length.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Validate a ticket title: non-blank and bounded.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("title is required".into()));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a comment body: must contain something besides whitespace.
pub fn validate_comment_body(body: &str) -> Result<(), CoreError> {
    if body.trim().is_empty() {
        return Err(CoreError::Validation("comment text required".into()));
    }
    Ok(())
}

/// Whether `actor` may change a ticket's status.
///
/// Managers may move any ticket; everyone else only tickets they reported or
/// are assigned to.
pub fn can_modify(
    actor_id: DbId,
    actor_role: &str,
    reporter_id: DbId,
    assignee_id: Option<DbId>,
) -> bool {
    is_manager(actor_role) || reporter_id == actor_id || assignee_id == Some(actor_id)
}
