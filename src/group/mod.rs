//! Group Module
//!
//! A group is a cache namespace: a getter for misses, a byte-budgeted local
//! cache, and optionally a peer picker that routes keys to the node owning
//! them.
//!
//! # Lookup Flow
//! ```text
//! get(key) ── hit ──────────────────────────────────────────▶ value
//!    │
//!    └ miss ─▶ pick_peer(key) ── remote ─▶ fetch ── ok ─────▶ value
//!                   │                        │
//!                   │ local                  └ err (logged)
//!                   ▼                                │
//!              getter(key) ◀─────────────────────────┘
//!                   │
//!                   └ ok ─▶ populate local cache ───────────▶ value
//! ```

mod flight;
mod getter;
mod registry;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use tracing::{debug, warn};

use crate::byteview::ByteView;
use crate::cache::{CacheStats, CacheStore};
use crate::error::{CacheError, Result};
use crate::peers::{PeerFetcher, PeerPicker};

pub use flight::FlightGroup;
pub use getter::Getter;
pub use registry::GroupRegistry;

// == Group Stats ==
/// Snapshot of a group's counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupStats {
    pub name: String,
    /// Local cache counters
    pub cache: CacheStats,
    /// Getter invocations, successful or not
    pub local_loads: u64,
    /// Values served by a remote peer
    pub peer_loads: u64,
    /// Remote fetches that failed and fell back to the getter
    pub peer_errors: u64,
}

#[derive(Debug, Default)]
struct Counters {
    local_loads: AtomicU64,
    peer_loads: AtomicU64,
    peer_errors: AtomicU64,
}

// == Group ==
pub struct Group {
    name: String,
    getter: Arc<dyn Getter>,
    main_cache: CacheStore,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    /// Shares misses on the full (peer-aware) path
    loads: FlightGroup<Result<ByteView>>,
    /// Shares misses on the local-only path used when serving peers
    local_loads: FlightGroup<Result<ByteView>>,
    counters: Counters,
}

impl Group {
    /// Starts building a group named `name`.
    pub fn builder(name: impl Into<String>) -> GroupBuilder {
        GroupBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Get ==
    /// Returns the value for `key`, loading it on a miss.
    ///
    /// A miss goes to the owning peer when one is registered and picked;
    /// otherwise, or when the peer fails, the getter runs and its result is
    /// cached here. Values fetched from a peer are not cached locally.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::InvalidArgument("key is required".to_string()));
        }

        if let Some(value) = self.main_cache.get(key).await {
            debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }

        self.loads.work(key, || self.load(key)).await
    }

    // == Get Local ==
    /// Like [`Group::get`] but never consults peers.
    ///
    /// This is the path used to answer peer requests: the receiving node is
    /// the owner, so forwarding again could loop between nodes.
    pub async fn get_local(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::InvalidArgument("key is required".to_string()));
        }

        if let Some(value) = self.main_cache.get(key).await {
            debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }

        self.local_loads
            .work(key, || self.get_locally(key))
            .await
    }

    // == Register Peers ==
    /// Attaches the peer picker. Only one may ever be attached.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) -> Result<()> {
        self.peers.set(peers).map_err(|_| {
            CacheError::Config(format!(
                "peers already registered for group {}",
                self.name
            ))
        })
    }

    pub fn has_peers(&self) -> bool {
        self.peers.get().is_some()
    }

    // == Stats ==
    pub async fn stats(&self) -> GroupStats {
        GroupStats {
            name: self.name.clone(),
            cache: self.main_cache.stats().await,
            local_loads: self.counters.local_loads.load(Ordering::Relaxed),
            peer_loads: self.counters.peer_loads.load(Ordering::Relaxed),
            peer_errors: self.counters.peer_errors.load(Ordering::Relaxed),
        }
    }

    async fn load(&self, key: &str) -> Result<ByteView> {
        if let Some(peer) = self.peers.get().and_then(|picker| picker.pick_peer(key)) {
            match self.get_from_peer(peer.as_ref(), key).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    self.counters.peer_errors.fetch_add(1, Ordering::Relaxed);
                    warn!(group = %self.name, key, error = %err, "failed to get from peer, loading locally");
                }
            }
        }

        self.get_locally(key).await
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        self.counters.local_loads.fetch_add(1, Ordering::Relaxed);
        let getter = self.getter.clone();
        let owned_key = key.to_string();
        let bytes = tokio::task::spawn_blocking(move || getter.get(&owned_key))
            .await
            .map_err(|err| CacheError::Loader(format!("getter for {} aborted: {}", key, err)))?
            .map_err(|err| CacheError::Loader(err.to_string()))?;

        // The getter hands over ownership, so the view holds the only copy.
        let value = ByteView::from(bytes);
        debug!(group = %self.name, key, bytes = value.len(), "loaded locally");
        self.populate_cache(key, value.clone()).await;
        Ok(value)
    }

    async fn get_from_peer(&self, peer: &dyn PeerFetcher, key: &str) -> Result<ByteView> {
        let bytes = peer.fetch(&self.name, key).await?;
        self.counters.peer_loads.fetch_add(1, Ordering::Relaxed);
        Ok(ByteView::from(bytes))
    }

    async fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.add(key, value).await;
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("main_cache", &self.main_cache)
            .field("has_peers", &self.has_peers())
            .finish()
    }
}

// == Group Builder ==
/// Assembles a [`Group`]; `build` fails if no getter was supplied.
pub struct GroupBuilder {
    name: String,
    cache_bytes: i64,
    getter: Option<Arc<dyn Getter>>,
    peers: Option<Arc<dyn PeerPicker>>,
}

impl GroupBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cache_bytes: 0,
            getter: None,
            peers: None,
        }
    }

    /// Local cache budget in bytes; `<= 0` disables eviction.
    pub fn cache_bytes(mut self, cache_bytes: i64) -> Self {
        self.cache_bytes = cache_bytes;
        self
    }

    pub fn getter(mut self, getter: impl Getter + 'static) -> Self {
        self.getter = Some(Arc::new(getter));
        self
    }

    pub fn peers(mut self, peers: Arc<dyn PeerPicker>) -> Self {
        self.peers = Some(peers);
        self
    }

    pub fn build(self) -> Result<Group> {
        if self.name.is_empty() {
            return Err(CacheError::Config("group name is required".to_string()));
        }
        let getter = self.getter.ok_or_else(|| {
            CacheError::Config(format!("group {} has no getter", self.name))
        })?;

        let peers = OnceLock::new();
        if let Some(picker) = self.peers {
            let _ = peers.set(picker);
        }

        Ok(Group {
            name: self.name,
            getter,
            main_cache: CacheStore::new(self.cache_bytes),
            peers,
            loads: FlightGroup::new(),
            local_loads: FlightGroup::new(),
            counters: Counters::default(),
        })
    }

    /// Builds the group and registers it, replacing any same-named group.
    pub async fn register(self, registry: &GroupRegistry) -> Result<Arc<Group>> {
        let group = self.build()?;
        Ok(registry.insert(group).await)
    }
}
