//! Peer Routing
//!
//! The two capabilities a group needs from a transport: choosing which peer
//! owns a key, and fetching a key from a named group on that peer.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::Result;

/// Locates the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the fetcher for the owning peer, or `None` when the key should
    /// be resolved locally (no peers, or this node owns it).
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>>;
}

/// Fetches values from one remote peer.
pub trait PeerFetcher: Send + Sync {
    /// Retrieves `key` from `group` on the remote peer. Any transport,
    /// status or remote loader failure comes back as an error.
    fn fetch<'a>(&'a self, group: &'a str, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>>>;
}
