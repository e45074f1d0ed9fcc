//! # queeker-client
//!
//! Client side of the feed: optimistic state machines that update the view
//! before the server answers and roll back deterministically when it refuses.
//!
//! ## Modules
//!
//! - [`like`] — Per-post like toggle
//! - [`composer`] — Post and reply composer with placeholder items
//! - [`pager`] — Infinite-scroll feed pager
//! - [`api`] — The [`FeedApi`] seam the controllers talk through
//! - [`rpc`] — [`FeedApi`] over the daemon's JSON-RPC socket

pub mod api;
pub mod composer;
pub mod like;
pub mod pager;
pub mod rpc;

use queeker_types::{ResponseCode, ValidationError};

pub use api::FeedApi;
pub use composer::Composer;
pub use like::LikeToggle;
pub use pager::{FeedPager, PageOutcome, PageTicket};
pub use rpc::RpcFeedApi;

/// Client errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// An earlier action on the same control has not been answered yet.
    #[error("another request is still in flight")]
    Busy,

    #[error("sign in required")]
    NotSignedIn,

    /// Refused locally, nothing was sent.
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    /// The server answered with a non-success envelope.
    #[error("{message}")]
    Rejected { code: ResponseCode, message: String },

    #[error("Failed to connect to daemon at '{path}': {reason}")]
    ConnectionFailed { path: String, reason: String },

    #[error("Failed to serialize RPC request: {0}")]
    SerializationFailed(String),

    #[error("Failed to write to daemon socket: {0}")]
    WriteFailed(String),

    #[error("Failed to read from daemon socket: {0}")]
    ReadFailed(String),

    #[error("Daemon disconnected unexpectedly (EOF)")]
    DaemonDisconnected,

    #[error("Failed to parse daemon response: {reason} (raw: {raw})")]
    ParseFailed { reason: String, raw: String },

    /// JSON-RPC level error (unknown method, bad params).
    #[error("RPC error {code}: {message}")]
    Rpc { code: i32, message: String },
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Message for a dismissible notification.
    pub fn notice(&self) -> String {
        match self {
            ClientError::Rejected { message, .. } => message.clone(),
            ClientError::Busy | ClientError::NotSignedIn | ClientError::Invalid(_) => self.to_string(),
            _ => queeker_types::GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}
