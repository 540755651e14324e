pub mod auth;
pub mod gamification;
pub mod project;
pub mod ticket;
pub mod user;
