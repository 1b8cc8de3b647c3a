//! Cache Entry Module
//!
//! Defines the key/value pair stored by the LRU and its budget accounting.

use crate::cache::Value;

// == Cache Entry ==
/// A single cached key/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<V> {
    /// The lookup key
    pub key: String,
    /// The stored value
    pub value: V,
}

impl<V: Value> CacheEntry<V> {
    // == Constructor ==
    pub fn new(key: impl Into<String>, value: V) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    // == Size ==
    /// Bytes charged against the cache budget: key length plus value length.
    pub fn size(&self) -> usize {
        self.key.len() + self.value.len()
    }
}
