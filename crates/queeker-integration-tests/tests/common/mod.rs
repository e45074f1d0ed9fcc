//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use queeker_client::FeedApi;
use queeker_crypto::session::SessionSecret;
use queeker_engine::{
    Clock, Database, Engine, LimiterBackend, ManualClock, RateLimitPolicy, RateLimiter,
    RequestContext, SessionResolver,
};
use queeker_types::{
    Actor, ApiResponse, FeedItem, LikeAction, PostId, PostsQuery, SignInProfile, ThreadItem,
};

/// Deterministic start time (ms).
pub const START_MS: u64 = 1_700_000_000_000;

pub const SECRET: &[u8] = b"integration-test-secret-0123456";

pub struct Harness {
    pub engine: Engine,
    pub clock: ManualClock,
    pub db: Database,
}

/// Engine over a fresh in-memory database with a manual clock.
pub fn harness() -> Harness {
    build(false)
}

/// Same, with the rate limiter log kept in SQLite.
pub fn sqlite_limited_harness() -> Harness {
    build(true)
}

fn build(sqlite_limiter: bool) -> Harness {
    let db = queeker_engine::shared(queeker_db::open_memory().expect("db"));
    let clock = ManualClock::new(START_MS);
    let shared_clock: Arc<dyn Clock> = Arc::new(clock.clone());

    let sessions = Arc::new(SessionResolver::new(
        SessionSecret::new(SECRET).expect("secret"),
        3600,
        shared_clock.clone(),
    ));
    let backend = if sqlite_limiter {
        LimiterBackend::Sqlite(db.clone())
    } else {
        LimiterBackend::memory()
    };
    let limiter = Arc::new(RateLimiter::new(
        backend,
        RateLimitPolicy::LIKES,
        RateLimitPolicy::POSTS,
        shared_clock.clone(),
    ));

    Harness {
        engine: Engine::new(db.clone(), sessions, limiter, shared_clock, false),
        clock,
        db,
    }
}

impl Harness {
    /// Sign in `username`, returning the actor and a context carrying its token.
    pub async fn sign_in(&self, username: &str) -> (Actor, RequestContext) {
        let signed_in = self
            .engine
            .users
            .sign_in(SignInProfile {
                username: username.into(),
                display_name: None,
                avatar_url: format!("https://avatars/{username}.png"),
            })
            .await
            .data
            .expect("signed in");
        (signed_in.user, RequestContext::with_token(signed_in.session_token))
    }

    /// Create a post as `ctx`, moving the clock past the post window first.
    pub async fn post(&self, ctx: &RequestContext, content: &str, reply_to: Option<PostId>) -> FeedItem {
        self.clock.advance_secs(31);
        let resp = self
            .engine
            .mutations
            .posts_create(ctx, content, reply_to)
            .await;
        assert!(resp.is_success(), "post failed: {}", resp.message);
        resp.data.expect("item")
    }

    pub fn api(&self, ctx: RequestContext) -> EngineApi<'_> {
        EngineApi {
            engine: &self.engine,
            ctx,
        }
    }

    pub async fn row_count(&self, table: &str) -> i64 {
        let conn = self.db.lock().await;
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count")
    }
}

/// In-process [`FeedApi`] that calls the engine directly.
pub struct EngineApi<'a> {
    engine: &'a Engine,
    ctx: RequestContext,
}

impl FeedApi for EngineApi<'_> {
    async fn set_like(&self, post_id: PostId, action: LikeAction) -> ApiResponse<()> {
        self.engine.mutations.likes_set(&self.ctx, post_id, action).await
    }

    async fn create_post(&self, content: &str, reply_to_post_id: Option<PostId>) -> ApiResponse<FeedItem> {
        self.engine
            .mutations
            .posts_create(&self.ctx, content, reply_to_post_id)
            .await
    }

    async fn get_posts(&self, query: PostsQuery) -> ApiResponse<Vec<FeedItem>> {
        self.engine.feed.posts_get_many(&self.ctx, query).await
    }

    async fn get_thread(&self, post_id: PostId) -> ApiResponse<ThreadItem> {
        self.engine
            .feed
            .posts_get_by_id(&self.ctx, &post_id.to_string())
            .await
    }
}
