//! Like command handlers.

use serde::Deserialize;
use serde_json::Value;

use queeker_types::{LikeAction, PostId};

use super::{context, envelope, parse_params, Result};
use crate::DaemonState;

#[derive(Debug, Deserialize)]
struct LikesSetParams {
    post_id: PostId,
    action: LikeAction,
    #[serde(default)]
    session_token: Option<String>,
}

/// Like or unlike a post.
pub async fn likes_set(state: &DaemonState, params: &Value) -> Result {
    let params: LikesSetParams = parse_params(params)?;
    let ctx = context(params.session_token);
    envelope(
        state
            .engine
            .mutations
            .likes_set(&ctx, params.post_id, params.action)
            .await,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_state;
    use serde_json::json;

    #[tokio::test]
    async fn test_unknown_action_is_invalid_params() {
        let state = test_state();
        let err = likes_set(&state, &json!({"post_id": 1, "action": "love"}))
            .await
            .expect_err("invalid");
        assert_eq!(err.code, -32602);
    }

    #[tokio::test]
    async fn test_anonymous_like_is_401() {
        let state = test_state();
        let resp = likes_set(&state, &json!({"post_id": 1, "action": "like"}))
            .await
            .expect("envelope");
        assert_eq!(resp["code"], 401);
    }
}
