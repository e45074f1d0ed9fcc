//! # queeker-types
//!
//! Shared domain types used across the Queeker workspace: actors, posts,
//! derived feed views and the uniform `{ code, message, data }` response
//! envelope returned by every service operation.

pub mod feed;
pub mod identity;
pub mod response;

pub use feed::{FeedItem, LikeAction, Post, PostsQuery, ThreadItem};
pub use identity::{Actor, SignInProfile, SignedIn};
pub use response::{ApiResponse, ResponseCode};

/// Stable integer identifier of an actor (user).
pub type ActorId = i64;

/// Identifier of a post or reply.
pub type PostId = i64;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Feed page size.
pub const PAGE_SIZE: u32 = 25;

/// Maximum post content length, in characters.
pub const MAX_CONTENT_CHARS: usize = 280;

/// Maximum username length (identity provider handle rules).
pub const MAX_USERNAME_LEN: usize = 39;

/// User-safe message returned for unexpected failures.
pub const GENERIC_ERROR_MESSAGE: &str = "Oops, something went wrong. Please try again later.";

/// Validation failures for client supplied values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("content must not be empty")]
    EmptyContent,

    #[error("content exceeds {MAX_CONTENT_CHARS} characters")]
    ContentTooLong,

    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("unknown response code: {0}")]
    UnknownCode(u16),
}

/// Check post content: non-empty after trimming, at most [`MAX_CONTENT_CHARS`].
pub fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(ValidationError::ContentTooLong);
    }
    Ok(())
}

/// Normalize a handle supplied by the identity provider.
///
/// Usernames are case-insensitive and stored lowercase.
pub fn normalize_username(raw: &str) -> Result<String, ValidationError> {
    let username = raw.trim().to_lowercase();
    let valid = !username.is_empty()
        && username.len() <= MAX_USERNAME_LEN
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid {
        return Err(ValidationError::InvalidUsername(raw.to_string()));
    }
    Ok(username)
}
