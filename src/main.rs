//! gocache demo node
//!
//! Serves a `scores` group backed by a small in-memory table.
//!
//! ```text
//! $ curl http://localhost:9999/_gocache/scores/Tom
//! 630
//!
//! $ curl http://localhost:9999/_gocache/scores/kkk
//! kkk not exist
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gocache::{Config, GroupRegistry, HttpPool};

/// Main entry point for a gocache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Register the `scores` group
/// 4. Build the peer pool and attach it to the group
/// 5. Serve the pool's router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gocache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: self_addr={}, peers={:?}, cache_bytes={}, replicas={}",
        config.self_addr, config.peers, config.cache_bytes, config.replicas
    );

    let db: HashMap<&'static str, &'static str> =
        HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]);

    let registry = Arc::new(GroupRegistry::new());
    let scores = registry
        .new_group("scores", config.cache_bytes, move |key: &str| {
            info!("[SlowDB] search key {}", key);
            db.get(key)
                .map(|v| v.as_bytes().to_vec())
                .ok_or_else(|| anyhow!("{} not exist", key))
        })
        .await?;

    let pool = Arc::new(HttpPool::with_options(
        config.self_addr.clone(),
        config.pool_options(),
    )?);
    pool.set(&config.peers)?;
    scores.register_peers(pool.clone())?;

    let app = pool.router(registry);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("gocache is running at {}", config.self_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
