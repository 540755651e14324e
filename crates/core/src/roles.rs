//! Well-known role name constants.
//!
//! These must match the `ck_users_role` check constraint in
//! `20261017000001_create_users_table.sql`.

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_PROJECT_MANAGER: &str = "project_manager";
pub const ROLE_DEVELOPER: &str = "developer";

/// Role assigned when registration does not name one.
pub const DEFAULT_ROLE: &str = ROLE_DEVELOPER;

pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_PROJECT_MANAGER, ROLE_DEVELOPER];

/// Validate that a role string is one of the known roles.
pub fn validate_role(role: &str) -> Result<(), CoreError> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown role: '{role}'. Valid roles: {}",
            VALID_ROLES.join(", ")
        )))
    }
}

/// Roles allowed to manage projects and to move any ticket.
pub fn is_manager(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_PROJECT_MANAGER
}
