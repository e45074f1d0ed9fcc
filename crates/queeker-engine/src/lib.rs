//! # queeker-engine
//!
//! The feed interaction engine: everything between a decoded request and the
//! database.
//!
//! ## Modules
//!
//! - [`session`] — Session Resolver (token → actor id)
//! - [`rate_limit`] — Sliding-window rate limiter
//! - [`store`] — Post, Like and User store gateways over SQLite
//! - [`feed`] — Feed Query Service (feeds, profiles, thread view)
//! - [`mutation`] — Mutation Service (post, reply, like, unlike)
//! - [`users`] — Profile lookup and sign-in
//! - [`clock`] — Injectable time source
//!
//! Every public service operation returns an [`ApiResponse`]; failures never
//! escape as `Err` or panics.

pub mod clock;
pub mod feed;
pub mod mutation;
pub mod rate_limit;
pub mod session;
pub mod store;
pub mod users;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, warn};

use queeker_db::DbError;
use queeker_types::{ApiResponse, ResponseCode, ValidationError, GENERIC_ERROR_MESSAGE};

pub use clock::{Clock, ManualClock, SystemClock};
pub use feed::FeedQueryService;
pub use mutation::MutationService;
pub use rate_limit::{ActionClass, LimiterBackend, RateLimitPolicy, RateLimiter};
pub use session::{RequestContext, SessionResolver};
pub use store::{Database, LikeStore, PostStore, UserStore};
pub use users::UserService;

/// Error taxonomy shared by all services.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No or invalid session, or the session's actor does not exist.
    #[error("Unauthorized")]
    Unauthorized,

    /// Sliding window exceeded.
    #[error("Too many requests")]
    RateLimited,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    /// Storage or network fault, broken invariant.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub fn code(&self) -> ResponseCode {
        match self {
            EngineError::Unauthorized => ResponseCode::Unauthorized,
            EngineError::RateLimited => ResponseCode::TooManyRequests,
            EngineError::NotFound(_) => ResponseCode::NotFound,
            EngineError::InvalidInput(_) => ResponseCode::BadRequest,
            EngineError::Internal(_) => ResponseCode::Internal,
        }
    }

    /// Message safe to show to the caller.
    ///
    /// Internal details are only surfaced when `expose_internal` is set.
    pub fn public_message(&self, expose_internal: bool) -> String {
        match self {
            EngineError::Internal(_) if !expose_internal => GENERIC_ERROR_MESSAGE.to_string(),
            EngineError::NotFound(what) => capitalize(&format!("{what} not found")),
            other => other.to_string(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(what) => EngineError::NotFound(what),
            DbError::Constraint(detail) => EngineError::InvalidInput(detail),
            other => EngineError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::InvalidInput(err.to_string())
    }
}

/// Catch-all boundary: turn a service result into the response envelope.
///
/// Internal failures are logged in full here and masked in the response
/// unless `expose_internal` is set.
pub fn respond<T>(operation: &str, result: Result<T>, expose_internal: bool) -> ApiResponse<T> {
    match result {
        Ok(data) => ApiResponse::success(data),
        Err(err) => {
            match &err {
                EngineError::Internal(detail) => error!(operation, %detail, "operation failed"),
                EngineError::RateLimited => warn!(operation, "rate limited"),
                other => tracing::debug!(operation, error = %other, "operation rejected"),
            }
            ApiResponse::failure(err.code(), err.public_message(expose_internal))
        }
    }
}

/// Every service, wired over one database, one session resolver and one
/// rate limiter.
pub struct Engine {
    pub feed: FeedQueryService,
    pub mutations: MutationService,
    pub users: UserService,
    pub sessions: Arc<SessionResolver>,
    pub limiter: Arc<RateLimiter>,
}

impl Engine {
    pub fn new(
        db: Database,
        sessions: Arc<SessionResolver>,
        limiter: Arc<RateLimiter>,
        clock: Arc<dyn Clock>,
        expose_internal: bool,
    ) -> Self {
        let posts = PostStore::new(db.clone());
        let users = UserStore::new(db.clone());
        Self {
            feed: FeedQueryService::new(posts.clone(), sessions.clone(), expose_internal),
            mutations: MutationService::new(
                posts,
                LikeStore::new(db),
                users.clone(),
                sessions.clone(),
                limiter.clone(),
                clock.clone(),
                expose_internal,
            ),
            users: UserService::new(users, sessions.clone(), clock, expose_internal),
            sessions,
            limiter,
        }
    }
}

/// Shared handle to the single SQLite connection.
pub fn shared(conn: rusqlite::Connection) -> Database {
    Arc::new(Mutex::new(conn))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(EngineError::Unauthorized.code().as_u16(), 401);
        assert_eq!(EngineError::RateLimited.code().as_u16(), 429);
        assert_eq!(EngineError::NotFound("post".into()).code().as_u16(), 404);
        assert_eq!(EngineError::InvalidInput("bad".into()).code().as_u16(), 400);
        assert_eq!(EngineError::Internal("boom".into()).code().as_u16(), 500);
    }

    #[test]
    fn test_internal_masked() {
        let err = EngineError::Internal("disk I/O error".into());
        assert_eq!(err.public_message(false), GENERIC_ERROR_MESSAGE);
        assert!(err.public_message(true).contains("disk I/O error"));
    }

    #[test]
    fn test_messages() {
        assert_eq!(EngineError::Unauthorized.public_message(false), "Unauthorized");
        assert_eq!(EngineError::RateLimited.public_message(false), "Too many requests");
        assert_eq!(
            EngineError::NotFound("user".into()).public_message(false),
            "User not found"
        );
    }

    #[test]
    fn test_db_error_mapping() {
        let err: EngineError = DbError::NotFound("post".into()).into();
        assert!(matches!(err, EngineError::NotFound(_)));
        let err: EngineError = DbError::Migration("x".into()).into();
        assert!(matches!(err, EngineError::Internal(_)));
    }

    #[test]
    fn test_respond() {
        let ok: ApiResponse<u8> = respond("op", Ok(1), false);
        assert!(ok.is_success());
        let failed: ApiResponse<u8> = respond("op", Err(EngineError::RateLimited), false);
        assert_eq!(failed.code, ResponseCode::TooManyRequests);
        assert!(failed.data.is_none());
    }
}
