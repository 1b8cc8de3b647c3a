//! Configuration Module
//!
//! Handles loading node configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::pool::{HttpPoolOptions, DEFAULT_BASE_PATH, DEFAULT_REPLICAS};

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Address peers use to reach this node; also excludes it from remote routing
    pub self_addr: String,
    /// Every node in the cluster, this one included
    pub peers: Vec<String>,
    /// Path prefix of the peer protocol
    pub base_path: String,
    /// Virtual nodes per peer on the hash ring
    pub replicas: usize,
    /// Local cache budget per group in bytes
    pub cache_bytes: i64,
    /// Timeout for one peer fetch in milliseconds
    pub peer_timeout_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 9999)
    /// - `SELF_ADDR` - This node's base URL (default: `http://localhost:<SERVER_PORT>`)
    /// - `PEERS` - Comma-separated peer base URLs (default: just `SELF_ADDR`)
    /// - `BASE_PATH` - Peer protocol prefix (default: `/_gocache/`)
    /// - `REPLICAS` - Virtual nodes per peer (default: 50)
    /// - `CACHE_BYTES` - Cache budget per group (default: 2048)
    /// - `PEER_TIMEOUT_MS` - Peer fetch timeout (default: 2000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let server_port = parse_var("SERVER_PORT").unwrap_or(defaults.server_port);
        let self_addr =
            env::var("SELF_ADDR").unwrap_or_else(|_| format!("http://localhost:{}", server_port));
        let peers = env::var("PEERS")
            .ok()
            .map(|v| split_peers(&v))
            .filter(|peers| !peers.is_empty())
            .unwrap_or_else(|| vec![self_addr.clone()]);

        Self {
            server_port,
            peers,
            self_addr,
            base_path: env::var("BASE_PATH").unwrap_or(defaults.base_path),
            replicas: parse_var("REPLICAS").unwrap_or(defaults.replicas),
            cache_bytes: parse_var("CACHE_BYTES").unwrap_or(defaults.cache_bytes),
            peer_timeout_ms: parse_var("PEER_TIMEOUT_MS").unwrap_or(defaults.peer_timeout_ms),
        }
    }

    /// Pool options derived from this configuration.
    pub fn pool_options(&self) -> HttpPoolOptions {
        HttpPoolOptions {
            base_path: self.base_path.clone(),
            replicas: self.replicas,
            hash: None,
            timeout: Duration::from_millis(self.peer_timeout_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 9999,
            self_addr: "http://localhost:9999".to_string(),
            peers: vec!["http://localhost:9999".to_string()],
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            cache_bytes: 2 << 10,
            peer_timeout_ms: 2000,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn split_peers(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
