//! queeker-daemon: the Queeker feed daemon.
//!
//! Single OS process running a Tokio async runtime. Front ends talk to the
//! daemon via newline-delimited JSON-RPC 2.0 over a Unix socket.

pub mod commands;
pub mod config;
pub mod maintenance;
pub mod rpc;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use queeker_crypto::session::SessionSecret;
use queeker_engine::{
    Clock, Database, Engine, LimiterBackend, RateLimiter, SessionResolver, SystemClock,
};

use crate::config::{DaemonConfig, RateLimitBackendKind};

/// Daemon-wide shared state.
pub struct DaemonState {
    /// Database connection.
    pub db: Database,
    /// Configuration.
    pub config: DaemonConfig,
    /// Services.
    pub engine: Engine,
}

impl DaemonState {
    /// Wire the engine over `db`.
    pub fn new(
        db: Database,
        config: DaemonConfig,
        secret: &[u8],
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let secret = SessionSecret::new(secret).context("invalid session secret")?;
        let sessions = Arc::new(SessionResolver::new(
            secret,
            config.auth.session_ttl_secs,
            clock.clone(),
        ));

        let backend = match config.advanced.rate_limit_backend {
            RateLimitBackendKind::Memory => LimiterBackend::memory(),
            RateLimitBackendKind::Sqlite => LimiterBackend::Sqlite(db.clone()),
        };
        let limiter = Arc::new(RateLimiter::new(
            backend,
            config.limits.likes,
            config.limits.posts,
            clock.clone(),
        ));

        let engine = Engine::new(
            db.clone(),
            sessions,
            limiter,
            clock,
            config.advanced.expose_internal_errors,
        );
        Ok(Self { db, config, engine })
    }

    /// Open the database under the data directory and wire the engine with
    /// the wall clock.
    pub fn open(config: DaemonConfig, secret: &[u8]) -> anyhow::Result<Self> {
        let data_dir = config.data_dir();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("creating {}", data_dir.display()))?;

        let db_path = config.db_path();
        let conn = queeker_db::open(&db_path)
            .with_context(|| format!("opening {}", db_path.display()))?;
        info!(path = %db_path.display(), "database ready");

        Self::new(queeker_engine::shared(conn), config, secret, Arc::new(SystemClock))
    }
}

/// In-memory state with a fixed secret, for handler tests.
#[cfg(test)]
pub(crate) fn test_state() -> DaemonState {
    let conn = queeker_db::open_memory().expect("db");
    DaemonState::new(
        queeker_engine::shared(conn),
        DaemonConfig::default(),
        b"daemon-test-secret-0123456789",
        Arc::new(SystemClock),
    )
    .expect("state")
}
