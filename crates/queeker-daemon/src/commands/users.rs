//! User command handlers.

use serde::Deserialize;
use serde_json::Value;

use queeker_types::SignInProfile;

use super::{envelope, parse_params, Result};
use crate::DaemonState;

#[derive(Debug, Deserialize)]
struct GetByUsernameParams {
    username: String,
}

/// Public profile by handle.
pub async fn users_get_by_username(state: &DaemonState, params: &Value) -> Result {
    let params: GetByUsernameParams = parse_params(params)?;
    envelope(state.engine.users.get_by_username(&params.username).await)
}

/// Exchange an identity provider profile for a session token.
///
/// The socket is only reachable by the local front end, which performs the
/// provider handshake before calling this.
pub async fn users_sign_in(state: &DaemonState, params: &Value) -> Result {
    let profile: SignInProfile = parse_params(params)?;
    envelope(state.engine.users.sign_in(profile).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_state;
    use serde_json::json;

    #[tokio::test]
    async fn test_sign_in_then_lookup() {
        let state = test_state();
        let resp = users_sign_in(
            &state,
            &json!({"username": "Octocat", "avatar_url": "https://avatars/o.png"}),
        )
        .await
        .expect("envelope");
        assert_eq!(resp["code"], 200);
        assert_eq!(resp["data"]["user"]["username"], "octocat");
        assert!(resp["data"]["session_token"].is_string());

        let resp = users_get_by_username(&state, &json!({"username": "OCTOCAT"}))
            .await
            .expect("envelope");
        assert_eq!(resp["data"]["username"], "octocat");

        let resp = users_get_by_username(&state, &json!({"username": "ghost"}))
            .await
            .expect("envelope");
        assert_eq!(resp["code"], 404);
        assert_eq!(resp["message"], "User not found");
    }
}
