//! JSON-RPC client for the Queeker daemon.
//!
//! The daemon speaks newline-delimited JSON-RPC 2.0 over a Unix domain socket:
//! one request per line, one response per line. Each call opens its own
//! connection. The `result` member is always a `{ code, message, data }`
//! envelope; the `error` member only appears for transport-level faults.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::{debug, error};

use queeker_types::{
    Actor, ApiResponse, FeedItem, LikeAction, PostId, PostsQuery, ResponseCode, SignInProfile,
    SignedIn, ThreadItem, GENERIC_ERROR_MESSAGE,
};

use crate::api::FeedApi;
use crate::{ClientError, Result};

/// Send a single JSON-RPC request and return the parsed response line.
///
/// # Errors
///
/// Returns an error if the connection fails, the write fails, or the
/// response cannot be parsed.
pub async fn send_rpc_request(socket_path: &Path, request: &Value) -> Result<Value> {
    let stream = UnixStream::connect(socket_path).await.map_err(|e| {
        error!(path = %socket_path.display(), error = %e, "failed to connect to daemon socket");
        ClientError::ConnectionFailed {
            path: socket_path.display().to_string(),
            reason: e.to_string(),
        }
    })?;

    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let mut request_json = serde_json::to_string(request)
        .map_err(|e| ClientError::SerializationFailed(e.to_string()))?;
    request_json.push('\n');

    writer
        .write_all(request_json.as_bytes())
        .await
        .map_err(|e| ClientError::WriteFailed(e.to_string()))?;
    writer
        .flush()
        .await
        .map_err(|e| ClientError::WriteFailed(e.to_string()))?;

    let mut response_line = String::new();
    let bytes_read = reader
        .read_line(&mut response_line)
        .await
        .map_err(|e| ClientError::ReadFailed(e.to_string()))?;
    if bytes_read == 0 {
        return Err(ClientError::DaemonDisconnected);
    }

    serde_json::from_str(&response_line).map_err(|e| ClientError::ParseFailed {
        reason: e.to_string(),
        raw: response_line.clone(),
    })
}

/// [`FeedApi`] backed by the daemon socket.
#[derive(Debug)]
pub struct RpcFeedApi {
    socket_path: PathBuf,
    session_token: Option<String>,
    next_id: AtomicU64,
}

impl RpcFeedApi {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            session_token: None,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_session(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Call `method` and decode the envelope in `result`.
    ///
    /// `params` must be a JSON object; the session token is added to it.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        mut params: Value,
    ) -> Result<ApiResponse<T>> {
        if let (Some(token), Some(obj)) = (&self.session_token, params.as_object_mut()) {
            obj.insert("session_token".into(), Value::String(token.clone()));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        debug!(method, id, "rpc call");
        let mut response = send_rpc_request(&self.socket_path, &request).await?;

        if let Some(err) = response.get("error").filter(|e| !e.is_null()) {
            return Err(ClientError::Rpc {
                code: err.get("code").and_then(Value::as_i64).unwrap_or(-32603) as i32,
                message: err
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            });
        }
        let result = response
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| ClientError::ParseFailed {
                reason: "response has neither result nor error".into(),
                raw: response.to_string(),
            })?;
        serde_json::from_value(result).map_err(|e| ClientError::ParseFailed {
            reason: e.to_string(),
            raw: String::new(),
        })
    }

    /// Exchange an identity provider profile for a session; the token is
    /// kept for later calls.
    pub async fn sign_in(&mut self, profile: &SignInProfile) -> Result<Actor> {
        let params = serde_json::to_value(profile)
            .map_err(|e| ClientError::SerializationFailed(e.to_string()))?;
        let response: ApiResponse<SignedIn> = self.call("users_sign_in", params).await?;
        let signed_in = into_data(response)?;
        self.session_token = Some(signed_in.session_token);
        Ok(signed_in.user)
    }

    pub async fn get_user(&self, username: &str) -> ApiResponse<Actor> {
        envelope(self.call("users_get_by_username", json!({ "username": username })).await)
    }
}

fn into_data<T>(response: ApiResponse<T>) -> Result<T> {
    match response.data {
        Some(data) if response.code == ResponseCode::Ok => Ok(data),
        _ => Err(ClientError::Rejected {
            code: response.code,
            message: response.message,
        }),
    }
}

/// Fold a transport failure into an `Internal` envelope.
fn envelope<T>(result: Result<ApiResponse<T>>) -> ApiResponse<T> {
    result.unwrap_or_else(|e| {
        error!(error = %e, "rpc call failed");
        ApiResponse::failure(ResponseCode::Internal, GENERIC_ERROR_MESSAGE)
    })
}

impl FeedApi for RpcFeedApi {
    async fn set_like(&self, post_id: PostId, action: LikeAction) -> ApiResponse<()> {
        envelope(
            self.call("likes_set", json!({ "post_id": post_id, "action": action }))
                .await,
        )
    }

    async fn create_post(
        &self,
        content: &str,
        reply_to_post_id: Option<PostId>,
    ) -> ApiResponse<FeedItem> {
        envelope(
            self.call(
                "posts_create",
                json!({ "content": content, "reply_to_post_id": reply_to_post_id }),
            )
            .await,
        )
    }

    async fn get_posts(&self, query: PostsQuery) -> ApiResponse<Vec<FeedItem>> {
        envelope(
            self.call(
                "posts_get_many",
                json!({
                    "offset": query.offset,
                    "limit": query.limit,
                    "user_id": query.author_id,
                    "reply_to_post_id": query.reply_to_post_id,
                    "roots_only": query.roots_only,
                }),
            )
            .await,
        )
    }

    async fn get_thread(&self, post_id: PostId) -> ApiResponse<ThreadItem> {
        envelope(self.call("posts_get_by_id", json!({ "id": post_id })).await)
    }
}
