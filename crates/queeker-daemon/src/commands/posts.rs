//! Post and feed command handlers.

use serde::Deserialize;
use serde_json::Value;

use queeker_types::{ActorId, PostId, PostsQuery, PAGE_SIZE};

use super::{context, envelope, parse_params, Result};
use crate::rpc::RpcError;
use crate::DaemonState;

#[derive(Debug, Deserialize)]
struct CreateParams {
    content: String,
    #[serde(default)]
    reply_to_post_id: Option<PostId>,
    #[serde(default)]
    session_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetManyParams {
    #[serde(default)]
    offset: u32,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    user_id: Option<ActorId>,
    #[serde(default)]
    reply_to_post_id: Option<PostId>,
    #[serde(default)]
    roots_only: bool,
    #[serde(default)]
    session_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetByIdParams {
    id: Value,
    #[serde(default)]
    session_token: Option<String>,
}

/// Create a post or reply.
pub async fn posts_create(state: &DaemonState, params: &Value) -> Result {
    let params: CreateParams = parse_params(params)?;
    let ctx = context(params.session_token);
    envelope(
        state
            .engine
            .mutations
            .posts_create(&ctx, &params.content, params.reply_to_post_id)
            .await,
    )
}

/// One page of posts.
pub async fn posts_get_many(state: &DaemonState, params: &Value) -> Result {
    let params: GetManyParams = parse_params(params)?;
    let ctx = context(params.session_token);
    let query = PostsQuery {
        author_id: params.user_id,
        reply_to_post_id: params.reply_to_post_id,
        roots_only: params.roots_only,
        offset: params.offset,
        limit: params.limit.unwrap_or(PAGE_SIZE),
    };
    envelope(state.engine.feed.posts_get_many(&ctx, query).await)
}

/// Thread view. `id` may be a number or a numeric string.
pub async fn posts_get_by_id(state: &DaemonState, params: &Value) -> Result {
    let params: GetByIdParams = parse_params(params)?;
    let raw_id = match &params.id {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => return Err(RpcError::invalid_params("id must be a number or string")),
    };
    let ctx = context(params.session_token);
    envelope(state.engine.feed.posts_get_by_id(&ctx, &raw_id).await)
}
