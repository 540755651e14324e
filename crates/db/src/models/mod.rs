//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - Any read-side projections the handlers serialize directly

pub mod gamification;
pub mod project;
pub mod refresh_token;
pub mod ticket;
pub mod user;
