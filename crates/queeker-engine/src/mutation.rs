//! Mutation Service.
//!
//! Every mutation walks the same pipeline and stops at the first rejection:
//!
//! 1. resolve the actor from the session token (401)
//! 2. validate input (400)
//! 3. consult the rate limiter for the action class (429)
//! 4. confirm the actor still exists (401)
//! 5. persist
//!
//! Nothing is written unless every earlier step passed.

use std::sync::Arc;

use tracing::debug;

use queeker_types::{
    validate_content, Actor, ActorId, ApiResponse, FeedItem, LikeAction, PostId,
};

use crate::clock::Clock;
use crate::rate_limit::{ActionClass, RateLimiter};
use crate::session::{RequestContext, SessionResolver};
use crate::store::{LikeStore, PostStore, UserStore};
use crate::{respond, EngineError, Result};

/// Pipeline position, for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Unauthenticated,
    RateChecked,
    Authorized,
    Persisted,
}

pub struct MutationService {
    posts: PostStore,
    likes: LikeStore,
    users: UserStore,
    sessions: Arc<SessionResolver>,
    limiter: Arc<RateLimiter>,
    clock: Arc<dyn Clock>,
    expose_internal: bool,
}

impl MutationService {
    pub fn new(
        posts: PostStore,
        likes: LikeStore,
        users: UserStore,
        sessions: Arc<SessionResolver>,
        limiter: Arc<RateLimiter>,
        clock: Arc<dyn Clock>,
        expose_internal: bool,
    ) -> Self {
        Self {
            posts,
            likes,
            users,
            sessions,
            limiter,
            clock,
            expose_internal,
        }
    }

    /// Create a root post, or a reply when `reply_to_post_id` is set.
    pub async fn posts_create(
        &self,
        ctx: &RequestContext,
        content: &str,
        reply_to_post_id: Option<PostId>,
    ) -> ApiResponse<FeedItem> {
        let result = self.create_post(ctx, content, reply_to_post_id).await;
        respond("posts_create", result, self.expose_internal)
    }

    /// Set the viewer's like on `post_id`. Repeating an action is a no-op.
    pub async fn likes_set(
        &self,
        ctx: &RequestContext,
        post_id: PostId,
        action: LikeAction,
    ) -> ApiResponse<()> {
        let result = self.set_like(ctx, post_id, action).await;
        respond("likes_set", result, self.expose_internal)
    }

    async fn create_post(
        &self,
        ctx: &RequestContext,
        content: &str,
        reply_to_post_id: Option<PostId>,
    ) -> Result<FeedItem> {
        let actor = self.authenticate(ctx)?;
        validate_content(content)?;

        self.limiter.check(ActionClass::Post, actor).await?;
        debug!(actor, stage = ?Stage::RateChecked, "posts_create");

        let author = self.authorize(actor).await?;

        let item = self
            .posts
            .create(&author, content, reply_to_post_id, self.clock.now_secs())
            .await?;
        debug!(actor, post = item.id(), reply_to = ?reply_to_post_id, stage = ?Stage::Persisted, "posts_create");
        Ok(item)
    }

    async fn set_like(&self, ctx: &RequestContext, post_id: PostId, action: LikeAction) -> Result<()> {
        let actor = self.authenticate(ctx)?;

        self.limiter.check(ActionClass::Like, actor).await?;
        debug!(actor, stage = ?Stage::RateChecked, "likes_set");

        self.authorize(actor).await?;

        let changed = match action {
            LikeAction::Like => self.likes.add(actor, post_id, self.clock.now_secs()).await?,
            LikeAction::Unlike => self.likes.remove(actor, post_id).await?,
        };
        debug!(actor, post = post_id, %action, changed, stage = ?Stage::Persisted, "likes_set");
        Ok(())
    }

    fn authenticate(&self, ctx: &RequestContext) -> Result<ActorId> {
        self.sessions.resolve_ctx(ctx).ok_or_else(|| {
            debug!(stage = ?Stage::Unauthenticated, "mutation without a valid session");
            EngineError::Unauthorized
        })
    }

    /// A valid token for a deleted or never-created actor is still 401.
    async fn authorize(&self, actor: ActorId) -> Result<Actor> {
        match self.users.get(actor).await {
            Ok(author) => {
                debug!(actor, stage = ?Stage::Authorized, "actor confirmed");
                Ok(author)
            }
            Err(EngineError::NotFound(_)) => Err(EngineError::Unauthorized),
            Err(e) => Err(e),
        }
    }
}
