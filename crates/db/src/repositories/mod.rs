//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod project_repo;
pub mod refresh_token_repo;
pub mod ticket_repo;
pub mod user_repo;
pub mod xp_ledger_repo;

pub use project_repo::ProjectRepo;
pub use refresh_token_repo::RefreshTokenRepo;
pub use ticket_repo::TicketRepo;
pub use user_repo::UserRepo;
pub use xp_ledger_repo::XpLedgerRepo;
