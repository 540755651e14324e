//! Domain rules for the Taskforge backend.
//!
//! This crate has no I/O. Everything here is plain data plus pure functions
//! so the repository and HTTP layers can share one definition of each rule.

pub mod account;
pub mod error;
pub mod gamification;
pub mod pagination;
pub mod roles;
pub mod ticket;
pub mod types;
