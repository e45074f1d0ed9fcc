//! Actor (user) structures.

use serde::{Deserialize, Serialize};

use crate::{ActorId, Timestamp};

/// An authenticated end user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct Actor {
    #[ts(type = "number")]
    pub id: ActorId,
    /// Lowercase handle, unique.
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: String,
    #[ts(type = "number")]
    pub created_at: Timestamp,
}

/// Profile handed over by the identity provider after a successful handshake.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct SignInProfile {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub avatar_url: String,
}

/// Actor plus the session token to present on later calls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct SignedIn {
    pub user: Actor,
    pub session_token: String,
}
