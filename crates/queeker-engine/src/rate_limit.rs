//! Sliding-window rate limiter.
//!
//! Each call records a hit under its key and counts the hits within the
//! trailing window, the new one included. The call is allowed iff that count
//! is at most the limit. Denied calls are recorded too, so hammering a key
//! keeps it blocked until the caller backs off for a full window.
//!
//! Record-and-count is a single critical section per backend (one mutex guard
//! for the in-memory map, one SQL transaction for SQLite), so two concurrent
//! requests can never both observe "under limit" for the same slot.
//!
//! If the backend fails the limiter fails closed: the action is rejected.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::error;

use queeker_db::queries::rate_limits;
use queeker_types::ActorId;

use crate::clock::Clock;
use crate::store::Database;
use crate::{EngineError, Result};

/// Limit and trailing window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    pub limit: u32,
    pub window_secs: u64,
}

impl RateLimitPolicy {
    /// Like and unlike: 4 actions per 10 seconds.
    pub const LIKES: Self = Self {
        limit: 4,
        window_secs: 10,
    };

    /// Post and reply creation: 2 actions per 30 seconds.
    pub const POSTS: Self = Self {
        limit: 2,
        window_secs: 30,
    };

    /// Longest accepted window: one day.
    pub const MAX_WINDOW_SECS: u64 = 86_400;

    /// Reject policies that would switch the limiter off.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidInput`] if `limit` is 0 or `window_secs` is
    /// outside `1..=MAX_WINDOW_SECS`.
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(EngineError::InvalidInput("limit must be at least 1".into()));
        }
        if !(1..=Self::MAX_WINDOW_SECS).contains(&self.window_secs) {
            return Err(EngineError::InvalidInput(format!(
                "window_secs must be between 1 and {}",
                Self::MAX_WINDOW_SECS
            )));
        }
        Ok(())
    }

    fn window_ms(&self) -> u64 {
        window_ms(self.window_secs)
    }
}

fn window_ms(window_secs: u64) -> u64 {
    window_secs.saturating_mul(1000)
}

/// Independently limited groups of actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionClass {
    Like,
    Post,
}

impl ActionClass {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionClass::Like => "likes",
            ActionClass::Post => "posts",
        }
    }

    /// Limiter key for `actor` in this class.
    pub fn key(self, actor: ActorId) -> String {
        format!("{}:{actor}", self.as_str())
    }
}

impl fmt::Display for ActionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where hit timestamps live.
pub enum LimiterBackend {
    /// Process-local log, lost on restart.
    Memory(Mutex<HashMap<String, VecDeque<u64>>>),
    /// `rate_limit_events` table, shared by every process using the database.
    Sqlite(Database),
}

impl LimiterBackend {
    pub fn memory() -> Self {
        LimiterBackend::Memory(Mutex::new(HashMap::new()))
    }

    async fn record_and_count(&self, key: &str, now_ms: u64, window_ms: u64) -> Result<u64> {
        match self {
            LimiterBackend::Memory(log) => {
                let mut log = log.lock().await;
                let hits = log.entry(key.to_string()).or_default();
                let cutoff = now_ms.saturating_sub(window_ms);
                while hits.front().is_some_and(|&t| t <= cutoff) {
                    hits.pop_front();
                }
                hits.push_back(now_ms);
                Ok(hits.len() as u64)
            }
            LimiterBackend::Sqlite(db) => {
                let conn = db.lock().await;
                rate_limits::record_and_count(&conn, key, now_ms, window_ms)
                    .map_err(|e| EngineError::Internal(format!("rate limiter unavailable: {e}")))
            }
        }
    }

    async fn prune(&self, now_ms: u64, window_ms: u64) -> Result<usize> {
        let cutoff = now_ms.saturating_sub(window_ms);
        match self {
            LimiterBackend::Memory(log) => {
                let mut log = log.lock().await;
                let mut dropped = 0;
                log.retain(|_, hits| {
                    while hits.front().is_some_and(|&t| t <= cutoff) {
                        hits.pop_front();
                        dropped += 1;
                    }
                    !hits.is_empty()
                });
                Ok(dropped)
            }
            LimiterBackend::Sqlite(db) => {
                let conn = db.lock().await;
                rate_limits::prune(&conn, cutoff).map_err(|e| EngineError::Internal(e.to_string()))
            }
        }
    }
}

/// Rate limiter with one policy per [`ActionClass`].
pub struct RateLimiter {
    backend: LimiterBackend,
    likes: RateLimitPolicy,
    posts: RateLimitPolicy,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(
        backend: LimiterBackend,
        likes: RateLimitPolicy,
        posts: RateLimitPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backend,
            likes,
            posts,
            clock,
        }
    }

    /// In-memory limiter with the default policies.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(
            LimiterBackend::memory(),
            RateLimitPolicy::LIKES,
            RateLimitPolicy::POSTS,
            clock,
        )
    }

    pub fn policy(&self, class: ActionClass) -> RateLimitPolicy {
        match class {
            ActionClass::Like => self.likes,
            ActionClass::Post => self.posts,
        }
    }

    /// Record a hit for `key` and report whether it is within `limit` hits
    /// per `window_secs`.
    ///
    /// A zero window would count every call as the first; it is refused as
    /// [`EngineError::Internal`] so the caller fails closed.
    pub async fn allow(&self, key: &str, limit: u32, window_secs: u64) -> Result<bool> {
        if window_secs == 0 {
            return Err(EngineError::Internal(format!("zero rate limit window for {key}")));
        }
        let count = self
            .backend
            .record_and_count(key, self.clock.now_ms(), window_ms(window_secs))
            .await?;
        Ok(count <= u64::from(limit))
    }

    /// Gate an action of `class` by `actor`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::RateLimited`] if the window is exhausted
    /// - [`EngineError::Internal`] if the backend failed (fail closed)
    pub async fn check(&self, class: ActionClass, actor: ActorId) -> Result<()> {
        let policy = self.policy(class);
        let key = class.key(actor);
        match self.allow(&key, policy.limit, policy.window_secs).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(EngineError::RateLimited),
            Err(e) => {
                error!(%key, error = %e, "rate limiter failed, rejecting action");
                Err(e)
            }
        }
    }

    /// Forget hits older than the longest window. Returns the number of hits
    /// dropped, across all keys.
    pub async fn prune(&self) -> Result<usize> {
        let window_ms = self.likes.window_ms().max(self.posts.window_ms());
        self.backend.prune(self.clock.now_ms(), window_ms).await
    }
}
