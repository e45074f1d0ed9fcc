//! Feed Query Service.
//!
//! Read paths resolve the viewer from the session token but never require
//! one: an unresolvable token reads as anonymous (`viewer_liked` false).
//!
//! Pagination is offset based. Posts created between page loads shift later
//! pages by the number of new rows, so a client may see an item twice; with
//! no concurrent writes consecutive pages are disjoint and ordered.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use queeker_types::{ActorId, ApiResponse, FeedItem, PostId, PostsQuery, ThreadItem, PAGE_SIZE};

use crate::session::{RequestContext, SessionResolver};
use crate::store::PostStore;
use crate::{respond, EngineError, Result};

/// Largest page a caller may ask for.
pub const MAX_PAGE_LIMIT: u32 = 100;

pub struct FeedQueryService {
    posts: PostStore,
    sessions: Arc<SessionResolver>,
    expose_internal: bool,
}

impl FeedQueryService {
    pub fn new(posts: PostStore, sessions: Arc<SessionResolver>, expose_internal: bool) -> Self {
        Self {
            posts,
            sessions,
            expose_internal,
        }
    }

    /// General listing.
    pub async fn posts_get_many(
        &self,
        ctx: &RequestContext,
        query: PostsQuery,
    ) -> ApiResponse<Vec<FeedItem>> {
        let result = self.list(ctx, query).await;
        respond("posts_get_many", result, self.expose_internal)
    }

    /// Root posts by everyone.
    pub async fn root_feed(&self, ctx: &RequestContext, offset: u32) -> ApiResponse<Vec<FeedItem>> {
        self.posts_get_many(ctx, PostsQuery::root_feed(offset)).await
    }

    /// Root posts by one author.
    pub async fn profile_feed(
        &self,
        ctx: &RequestContext,
        author_id: ActorId,
        offset: u32,
    ) -> ApiResponse<Vec<FeedItem>> {
        self.posts_get_many(ctx, PostsQuery::profile(author_id, offset)).await
    }

    /// Direct replies to one post.
    pub async fn replies(
        &self,
        ctx: &RequestContext,
        post_id: PostId,
        offset: u32,
    ) -> ApiResponse<Vec<FeedItem>> {
        self.posts_get_many(ctx, PostsQuery::replies(post_id, offset)).await
    }

    /// Thread view of one post. `raw_id` comes straight from the caller and
    /// must be numeric.
    pub async fn posts_get_by_id(&self, ctx: &RequestContext, raw_id: &str) -> ApiResponse<ThreadItem> {
        let result = match parse_post_id(raw_id) {
            Ok(id) => self.thread(ctx, id).await,
            Err(e) => Err(e),
        };
        respond("posts_get_by_id", result, self.expose_internal)
    }

    async fn list(&self, ctx: &RequestContext, mut query: PostsQuery) -> Result<Vec<FeedItem>> {
        query.limit = match query.limit {
            0 => PAGE_SIZE,
            n => n.min(MAX_PAGE_LIMIT),
        };
        let viewer = self.sessions.resolve_ctx(ctx);
        let items = self.posts.get_many(&query, viewer).await?;
        debug!(
            viewer = ?viewer,
            offset = query.offset,
            returned = items.len(),
            "posts_get_many"
        );
        Ok(items)
    }

    async fn thread(&self, ctx: &RequestContext, id: PostId) -> Result<ThreadItem> {
        let viewer = self.sessions.resolve_ctx(ctx);
        let post = self
            .posts
            .get_by_id(id, viewer)
            .await?
            .ok_or_else(|| EngineError::NotFound("post".into()))?;

        let ancestors = self.ancestors(&post, viewer).await?;
        let replies = self
            .posts
            .get_many(&PostsQuery::replies(id, 0), viewer)
            .await?;

        debug!(post = id, depth = ancestors.len(), replies = replies.len(), "posts_get_by_id");
        Ok(ThreadItem {
            post,
            ancestors,
            replies,
        })
    }

    /// Walk `reply_to_post_id` up to the root. Returns root first.
    ///
    /// A chain can never be longer than the number of posts; a longer walk or
    /// a repeated id means the table is corrupt.
    async fn ancestors(&self, post: &FeedItem, viewer: Option<ActorId>) -> Result<Vec<FeedItem>> {
        let mut next = post.post.reply_to_post_id;
        if next.is_none() {
            return Ok(Vec::new());
        }

        let bound = self.posts.count().await?;
        let mut seen = HashSet::from([post.id()]);
        let mut chain = Vec::new();

        while let Some(parent_id) = next {
            if chain.len() as u64 >= bound || !seen.insert(parent_id) {
                return Err(EngineError::Internal(format!(
                    "reply chain of post {} loops at post {parent_id}",
                    post.id()
                )));
            }
            let parent = self.posts.get_by_id(parent_id, viewer).await?.ok_or_else(|| {
                EngineError::Internal(format!(
                    "post {} replies to missing post {parent_id}",
                    post.id()
                ))
            })?;
            next = parent.post.reply_to_post_id;
            chain.push(parent);
        }

        chain.reverse();
        Ok(chain)
    }
}

fn parse_post_id(raw: &str) -> Result<PostId> {
    raw.trim()
        .parse::<PostId>()
        .map_err(|_| EngineError::InvalidInput(format!("invalid post id '{raw}'")))
}
