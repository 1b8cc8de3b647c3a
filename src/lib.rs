//! gocache - A distributed read-through cache
//!
//! Groups load values through a user getter, keep them in a byte-budgeted
//! LRU, and route misses to the peer that owns each key via a consistent
//! hash ring over HTTP.

pub mod api;
pub mod byteview;
pub mod cache;
pub mod config;
pub mod error;
pub mod group;
pub mod models;
pub mod peers;
pub mod pool;
pub mod ring;

pub use api::AppState;
pub use byteview::ByteView;
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{Getter, Group, GroupBuilder, GroupRegistry, GroupStats};
pub use peers::{PeerFetcher, PeerPicker};
pub use pool::{HttpPool, HttpPoolOptions};
pub use ring::HashRing;
