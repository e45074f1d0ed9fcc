//! Periodic housekeeping.
//!
//! The rate limiter forgets expired hits lazily, per key, when that key is
//! hit again. Keys that go quiet are dropped here instead.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use queeker_engine::RateLimiter;

/// Prune the rate limiter log every `interval` until the task is dropped.
pub async fn run_pruning(limiter: Arc<RateLimiter>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match limiter.prune().await {
            Ok(0) => {}
            Ok(removed) => debug!(removed, "pruned rate limiter log"),
            Err(e) => warn!(error = %e, "rate limiter prune failed"),
        }
    }
}
