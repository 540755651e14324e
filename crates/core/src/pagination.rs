//! Pagination defaults and clamping helpers.
//!
//! Limits arriving from query strings are untrusted; every list endpoint runs
//! them through [`clamp_limit`] / [`clamp_offset`] before they reach SQL.

/// Default number of rows per page.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Maximum number of rows per page.
pub const MAX_PAGE_LIMIT: i64 = 200;

/// Clamp a user-provided limit to `[1, max]`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Offset of the following page, or `None` when the page came back short.
///
/// A full page does not prove another row exists; the client simply gets an
/// empty page next time.
pub fn next_offset(offset: i64, limit: i64, returned: usize) -> Option<i64> {
    if returned as i64 >= limit {
        Some(offset + limit)
    } else {
        None
    }
}
