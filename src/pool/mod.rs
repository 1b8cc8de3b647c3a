//! HTTP Peer Pool
//!
//! One pool per node. It serves this node's groups to peers over HTTP and,
//! as a [`PeerPicker`], routes keys to other nodes through a consistent
//! hash ring over their addresses.

mod client;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use axum::Router;
use reqwest::Client;
use tracing::{debug, info};

use crate::api::{create_router, AppState};
use crate::error::{CacheError, Result};
use crate::group::GroupRegistry;
use crate::peers::{PeerFetcher, PeerPicker};
use crate::ring::{HashFn, HashRing};

pub use client::HttpGetter;

// == Defaults ==
/// Path prefix of the peer protocol.
pub const DEFAULT_BASE_PATH: &str = "/_gocache/";

/// Virtual nodes per peer on the hash ring.
pub const DEFAULT_REPLICAS: usize = 50;

/// Upper bound on a whole peer request, connect included.
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(2);

// == Pool Options ==
#[derive(Debug, Clone)]
pub struct HttpPoolOptions {
    /// Must start and end with `/`
    pub base_path: String,
    pub replicas: usize,
    /// Ring hash; `None` uses CRC-32C
    pub hash: Option<HashFn>,
    pub timeout: Duration,
}

impl Default for HttpPoolOptions {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            hash: None,
            timeout: DEFAULT_PEER_TIMEOUT,
        }
    }
}

#[derive(Debug)]
struct PeerSet {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

// == HTTP Pool ==
#[derive(Debug)]
pub struct HttpPool {
    self_addr: String,
    options: HttpPoolOptions,
    client: Client,
    peers: RwLock<PeerSet>,
}

impl HttpPool {
    // == Constructor ==
    /// Creates a pool for the node reachable at `self_addr`
    /// (e.g. `http://10.0.0.1:8001`) with default options.
    pub fn new(self_addr: impl Into<String>) -> Result<Self> {
        Self::with_options(self_addr, HttpPoolOptions::default())
    }

    pub fn with_options(self_addr: impl Into<String>, options: HttpPoolOptions) -> Result<Self> {
        let self_addr = self_addr.into();
        if self_addr.is_empty() {
            return Err(CacheError::Config("pool self address is required".to_string()));
        }
        if !options.base_path.starts_with('/') || !options.base_path.ends_with('/') {
            return Err(CacheError::Config(format!(
                "base path must start and end with '/': {}",
                options.base_path
            )));
        }

        let client = Client::builder()
            .connect_timeout(options.timeout)
            .timeout(options.timeout)
            .build()
            .map_err(|e| CacheError::Config(format!("building http client: {}", e)))?;
        let ring = HashRing::new(options.replicas, options.hash)?;

        Ok(Self {
            self_addr,
            options,
            client,
            peers: RwLock::new(PeerSet {
                ring,
                getters: HashMap::new(),
            }),
        })
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    pub fn base_path(&self) -> &str {
        &self.options.base_path
    }

    // == Set ==
    /// Replaces the peer set. Include this node's own address so the ring
    /// assigns it a share of the keys.
    ///
    /// The new ring is built before the lock is taken; readers see either
    /// the old set or the new one.
    pub fn set<I, S>(&self, peers: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let peers: Vec<String> = peers.into_iter().map(|p| p.as_ref().to_string()).collect();

        let mut ring = HashRing::new(self.options.replicas, self.options.hash)?;
        ring.add(&peers);
        let getters = peers
            .iter()
            .map(|peer| {
                let getter = HttpGetter::new(self.client.clone(), peer, &self.options.base_path);
                (peer.clone(), Arc::new(getter))
            })
            .collect();

        *self.peers.write().unwrap_or_else(PoisonError::into_inner) = PeerSet { ring, getters };
        info!(self_addr = %self.self_addr, peers = ?peers, "peer set updated");
        Ok(())
    }

    /// Addresses currently on the ring, sorted.
    pub fn peers(&self) -> Vec<String> {
        let set = self.peers.read().unwrap_or_else(PoisonError::into_inner);
        let mut peers: Vec<String> = set.getters.keys().cloned().collect();
        peers.sort();
        peers
    }

    // == Router ==
    /// HTTP service answering peer requests from `registry`'s groups.
    pub fn router(&self, registry: Arc<GroupRegistry>) -> Router {
        create_router(AppState::new(registry), &self.options.base_path)
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>> {
        let set = self.peers.read().unwrap_or_else(PoisonError::into_inner);
        let peer = set.ring.get(key)?;
        if peer == self.self_addr {
            return None;
        }
        debug!(self_addr = %self.self_addr, peer, key, "picked peer");
        set.getters
            .get(peer)
            .map(|getter| getter.clone() as Arc<dyn PeerFetcher>)
    }
}
