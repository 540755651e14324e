//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- JWT access-token generation and validation.
//! - [`refresh_token`] -- `<id>.<secret>` refresh tokens: issue and single-use rotation.

pub mod jwt;
pub mod password;
pub mod refresh_token;
