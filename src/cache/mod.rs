//! Cache Module
//!
//! Byte-budgeted local storage with LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::{LruCache, OnEvicted};
pub use stats::CacheStats;
pub use store::CacheStore;

// == Value Trait ==
/// Anything the LRU can account against its byte budget.
pub trait Value {
    /// Number of bytes this value occupies.
    fn len(&self) -> usize;
}

impl Value for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }
}

impl Value for String {
    fn len(&self) -> usize {
        String::len(self)
    }
}
