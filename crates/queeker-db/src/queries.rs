//! Database query functions organized by domain.

pub mod likes;
pub mod posts;
pub mod rate_limits;
pub mod users;
