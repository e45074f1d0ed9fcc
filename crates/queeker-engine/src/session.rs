//! Session Resolver.
//!
//! Turns an opaque session token into an actor id. Resolution never fails:
//! anything that does not verify resolves to `None`, which read paths treat as
//! an anonymous viewer and mutations treat as `Unauthorized`.

use std::sync::Arc;

use tracing::debug;

use queeker_crypto::session::{self, SessionClaims, SessionSecret};
use queeker_types::ActorId;

use crate::clock::Clock;
use crate::{EngineError, Result};

/// Per-request context, passed explicitly into every service call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub session_token: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            session_token: Some(token.into()),
        }
    }
}

/// Verifies and issues session tokens.
pub struct SessionResolver {
    secret: SessionSecret,
    ttl_secs: u64,
    clock: Arc<dyn Clock>,
}

impl SessionResolver {
    pub fn new(secret: SessionSecret, ttl_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret,
            ttl_secs,
            clock,
        }
    }

    /// Resolve the actor behind `token`.
    ///
    /// Missing, malformed, forged and expired tokens all yield `None`.
    pub fn resolve(&self, token: Option<&str>) -> Option<ActorId> {
        let token = token.filter(|t| !t.trim().is_empty())?;
        match session::verify(token, &self.secret, self.clock.now_secs()) {
            Ok(claims) => Some(claims.sub),
            Err(e) => {
                debug!(error = %e, "session token rejected");
                None
            }
        }
    }

    /// Resolve the actor for a request context.
    pub fn resolve_ctx(&self, ctx: &RequestContext) -> Option<ActorId> {
        self.resolve(ctx.session_token.as_deref())
    }

    /// Issue a fresh token for `actor`.
    pub fn issue(&self, actor: ActorId) -> Result<String> {
        let claims = SessionClaims::new(actor, self.clock.now_secs(), self.ttl_secs);
        session::issue(&claims, &self.secret).map_err(|e| EngineError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const START_MS: u64 = 1_700_000_000_000;

    fn resolver(clock: &ManualClock) -> SessionResolver {
        let secret = SessionSecret::new(b"resolver-test-secret-0123").expect("secret");
        SessionResolver::new(secret, 60, Arc::new(clock.clone()))
    }

    #[test]
    fn test_resolve_issued_token() {
        let clock = ManualClock::new(START_MS);
        let resolver = resolver(&clock);
        let token = resolver.issue(7).expect("issue");
        assert_eq!(resolver.resolve(Some(&token)), Some(7));
        assert_eq!(resolver.resolve_ctx(&RequestContext::with_token(token)), Some(7));
    }

    #[test]
    fn test_missing_and_garbage() {
        let clock = ManualClock::new(START_MS);
        let resolver = resolver(&clock);
        assert_eq!(resolver.resolve(None), None);
        assert_eq!(resolver.resolve(Some("")), None);
        assert_eq!(resolver.resolve(Some("not-a-token")), None);
        assert_eq!(resolver.resolve_ctx(&RequestContext::anonymous()), None);
    }

    #[test]
    fn test_expired_token() {
        let clock = ManualClock::new(START_MS);
        let resolver = resolver(&clock);
        let token = resolver.issue(7).expect("issue");
        clock.advance_secs(60);
        assert_eq!(resolver.resolve(Some(&token)), None);
    }

    #[test]
    fn test_token_from_other_secret() {
        let clock = ManualClock::new(START_MS);
        let other = SessionResolver::new(
            SessionSecret::new(b"a-completely-different-secret").expect("secret"),
            60,
            Arc::new(clock.clone()),
        );
        let token = other.issue(7).expect("issue");
        assert_eq!(resolver(&clock).resolve(Some(&token)), None);
    }
}
