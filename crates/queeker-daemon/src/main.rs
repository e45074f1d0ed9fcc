//! queeker-daemon entry point.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use queeker_daemon::config::DaemonConfig;
use queeker_daemon::maintenance;
use queeker_daemon::rpc::RpcServer;
use queeker_daemon::DaemonState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = DaemonConfig::load()?;

    // Initialize tracing; RUST_LOG wins over the configured level
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(format!("queeker={}", config.advanced.log_level)),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Queeker daemon starting");

    // 2. Session secret; refuse to start without one
    let secret = config.resolve_secret()?;

    // 3. Open database and build services
    let prune_interval = Duration::from_secs(config.advanced.prune_interval_secs.max(1));
    let socket_path = config.socket_path();
    let state = Arc::new(DaemonState::open(config, &secret)?);
    drop(secret);

    // 4. Background pruning of the rate limiter log
    let pruning = tokio::spawn(maintenance::run_pruning(
        state.engine.limiter.clone(),
        prune_interval,
    ));

    // 5. Run the RPC server until shutdown
    let rpc_server = RpcServer::bind(state.clone(), &socket_path)?;
    tokio::select! {
        result = rpc_server.run() => {
            if let Err(e) = result {
                error!("RPC server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
        }
    }

    pruning.abort();
    let _ = std::fs::remove_file(&socket_path);

    info!("Daemon stopped");
    Ok(())
}
