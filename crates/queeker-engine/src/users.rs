//! Profile lookup and sign-in.
//!
//! The identity provider handshake happens outside the engine; the daemon is
//! handed a verified profile and calls [`UserService::sign_in`], which creates
//! the actor on first sight and issues a session token.

use std::sync::Arc;

use tracing::info;

use queeker_types::{normalize_username, Actor, ApiResponse, SignInProfile, SignedIn};

use crate::clock::Clock;
use crate::session::SessionResolver;
use crate::store::UserStore;
use crate::{respond, EngineError, Result};

pub struct UserService {
    users: UserStore,
    sessions: Arc<SessionResolver>,
    clock: Arc<dyn Clock>,
    expose_internal: bool,
}

impl UserService {
    pub fn new(
        users: UserStore,
        sessions: Arc<SessionResolver>,
        clock: Arc<dyn Clock>,
        expose_internal: bool,
    ) -> Self {
        Self {
            users,
            sessions,
            clock,
            expose_internal,
        }
    }

    /// Case-insensitive lookup. Unknown or malformed handles are 404.
    pub async fn get_by_username(&self, username: &str) -> ApiResponse<Actor> {
        let result = match normalize_username(username) {
            Ok(username) => self.users.get_by_username(&username).await,
            Err(_) => Err(EngineError::NotFound("user".into())),
        };
        respond("users_get_by_username", result, self.expose_internal)
    }

    /// Get or create the actor for `profile` and issue a session token.
    pub async fn sign_in(&self, profile: SignInProfile) -> ApiResponse<SignedIn> {
        let result = self.get_or_create(profile).await;
        respond("users_sign_in", result, self.expose_internal)
    }

    async fn get_or_create(&self, profile: SignInProfile) -> Result<SignedIn> {
        let username = normalize_username(&profile.username)?;
        let display_name = profile
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());

        let user = self
            .users
            .get_or_create(&username, display_name, &profile.avatar_url, self.clock.now_secs())
            .await?;
        let session_token = self.sessions.issue(user.id)?;

        info!(actor = user.id, username = %user.username, "signed in");
        Ok(SignedIn {
            user,
            session_token,
        })
    }
}
