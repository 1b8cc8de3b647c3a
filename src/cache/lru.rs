//! LRU Cache Module
//!
//! Byte-budgeted least-recently-used cache. Not thread safe on its own;
//! [`CacheStore`](crate::cache::CacheStore) puts it behind a lock.

use std::collections::HashMap;
use std::fmt;

use crate::cache::{CacheEntry, Value};

/// Callback invoked with each entry pushed out by the byte budget.
pub type OnEvicted<V> = Box<dyn FnMut(&str, &V) + Send>;

// == Node ==
// Slots are reused through `free`; a slot with `entry: None` is unlinked.
struct Node<V> {
    entry: Option<CacheEntry<V>>,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Cache ==
/// Tracks access order over a slab-backed doubly linked list:
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// `max_bytes <= 0` disables eviction. An entry larger than the whole
/// budget is still inserted and then evicted by the same `add` call, so it
/// is never served from cache.
pub struct LruCache<V> {
    max_bytes: i64,
    used_bytes: usize,
    map: HashMap<String, usize>,
    nodes: Vec<Node<V>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    on_evicted: Option<OnEvicted<V>>,
}

impl<V: Value> LruCache<V> {
    // == Constructor ==
    /// Creates an empty cache holding at most `max_bytes` of keys and values.
    pub fn new(max_bytes: i64) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            map: HashMap::new(),
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            on_evicted: None,
        }
    }

    /// Creates a cache that reports every eviction to `on_evicted`.
    pub fn with_on_evicted(max_bytes: i64, on_evicted: OnEvicted<V>) -> Self {
        let mut cache = Self::new(max_bytes);
        cache.on_evicted = Some(on_evicted);
        cache
    }

    // == Get ==
    /// Looks up a key and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.move_to_front(idx);
        self.nodes[idx].entry.as_ref().map(|e| &e.value)
    }

    // == Add ==
    /// Inserts or replaces a value, then evicts from the tail until the
    /// budget holds again.
    ///
    /// Returns the number of entries evicted by this call.
    pub fn add(&mut self, key: impl Into<String>, value: V) -> usize {
        let key = key.into();

        if let Some(&idx) = self.map.get(&key) {
            if let Some(entry) = self.nodes[idx].entry.as_mut() {
                self.used_bytes = self.used_bytes - entry.value.len() + value.len();
                entry.value = value;
            }
            self.move_to_front(idx);
        } else {
            let entry = CacheEntry::new(key.clone(), value);
            self.used_bytes += entry.size();
            let idx = self.alloc(entry);
            self.push_front(idx);
            self.map.insert(key, idx);
        }

        let mut evicted = 0;
        while self.over_budget() && !self.map.is_empty() {
            if self.remove_oldest().is_some() {
                evicted += 1;
            }
        }
        evicted
    }

    // == Remove Oldest ==
    /// Removes and returns the least recently used entry.
    pub fn remove_oldest(&mut self) -> Option<CacheEntry<V>> {
        let idx = self.tail?;
        self.unlink(idx);
        let entry = self.nodes[idx].entry.take()?;
        self.free.push(idx);
        self.map.remove(&entry.key);
        self.used_bytes -= entry.size();

        if let Some(callback) = self.on_evicted.as_mut() {
            callback(&entry.key, &entry.value);
        }
        Some(entry)
    }

    // == Accessors ==
    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Bytes currently charged against the budget.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn max_bytes(&self) -> i64 {
        self.max_bytes
    }

    fn over_budget(&self) -> bool {
        self.max_bytes > 0 && self.used_bytes as u64 > self.max_bytes as u64
    }

    // == List Plumbing ==
    fn alloc(&mut self, entry: CacheEntry<V>) -> usize {
        let node = Node {
            entry: Some(entry),
            prev: None,
            next: None,
        };
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.nodes[idx].prev = None;
        self.nodes[idx].next = None;
    }

    fn push_front(&mut self, idx: usize) {
        self.nodes[idx].prev = None;
        self.nodes[idx].next = self.head;
        match self.head {
            Some(h) => self.nodes[h].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head != Some(idx) {
            self.unlink(idx);
            self.push_front(idx);
        }
    }
}

impl<V> fmt::Debug for LruCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("max_bytes", &self.max_bytes)
            .field("used_bytes", &self.used_bytes)
            .field("len", &self.map.len())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn s(v: &str) -> String {
        v.to_string()
    }

    #[test]
    fn test_lru_new() {
        let lru: LruCache<String> = LruCache::new(0);
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.used_bytes(), 0);
    }

    #[test]
    fn test_lru_get_hit_and_miss() {
        let mut lru = LruCache::new(0);
        lru.add("key1", s("1234"));

        assert_eq!(lru.get("key1"), Some(&s("1234")));
        assert_eq!(lru.get("key2"), None);
    }

    #[test]
    fn test_lru_used_bytes_counts_key_and_value() {
        let mut lru = LruCache::new(0);
        lru.add("key1", s("value1"));
        lru.add("k2", s("v2"));

        assert_eq!(lru.used_bytes(), 10 + 4);
    }

    #[test]
    fn test_lru_replace_adjusts_used_bytes() {
        let mut lru = LruCache::new(0);
        lru.add("key", s("short"));
        lru.add("key", s("much longer"));

        assert_eq!(lru.len(), 1);
        assert_eq!(lru.used_bytes(), 3 + 11);
        assert_eq!(lru.get("key"), Some(&s("much longer")));

        lru.add("key", s("x"));
        assert_eq!(lru.used_bytes(), 4);
    }

    #[test]
    fn test_lru_remove_oldest() {
        let (k1, k2, k3) = ("key1", "key2", "k3");
        let (v1, v2, v3) = (s("value1"), s("value2"), s("v3"));
        let cap = (k1.len() + k2.len() + v1.len() + v2.len()) as i64;

        let mut lru = LruCache::new(cap);
        lru.add(k1, v1);
        lru.add(k2, v2);
        let evicted = lru.add(k3, v3);

        assert_eq!(evicted, 1);
        assert!(!lru.contains("key1"));
        assert_eq!(lru.len(), 2);
    }

    #[test]
    fn test_lru_get_promotes_entry() {
        // Each entry is 2 bytes; budget holds three.
        let mut lru = LruCache::new(6);
        lru.add("a", s("1"));
        lru.add("b", s("2"));
        lru.add("c", s("3"));

        // Touch 'a' so 'b' becomes the oldest
        lru.get("a");
        lru.add("d", s("4"));

        assert!(lru.contains("a"));
        assert!(!lru.contains("b"));
        assert!(lru.contains("c"));
        assert!(lru.contains("d"));
    }

    #[test]
    fn test_lru_oversized_entry_is_never_cached() {
        let mut lru = LruCache::new(8);
        lru.add("a", s("1"));

        let evicted = lru.add("big", s("far too large"));

        assert!(!lru.contains("big"));
        assert!(lru.is_empty());
        assert_eq!(lru.used_bytes(), 0);
        assert_eq!(evicted, 2);
    }

    #[test]
    fn test_lru_unbounded_never_evicts() {
        let mut lru = LruCache::new(0);
        for i in 0..1000 {
            lru.add(format!("key{}", i), s("value"));
        }
        assert_eq!(lru.len(), 1000);

        let mut negative = LruCache::new(-1);
        negative.add("key", s("value"));
        assert_eq!(negative.len(), 1);
    }

    #[test]
    fn test_lru_on_evicted_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut lru = LruCache::with_on_evicted(
            10,
            Box::new(move |key: &str, _: &String| sink.lock().unwrap().push(key.to_string())),
        );

        lru.add("key1", s("123456"));
        lru.add("k2", s("k2"));
        lru.add("k3", s("k3"));
        lru.add("k4", s("k4"));

        assert_eq!(*seen.lock().unwrap(), vec!["key1".to_string(), "k2".to_string()]);
    }

    #[test]
    fn test_lru_slots_are_reused() {
        let mut lru = LruCache::new(4);
        for i in 0..100 {
            lru.add(format!("{}", i % 10), s("v"));
        }
        assert!(lru.len() <= 2);
        assert!(lru.nodes.len() <= 3);
    }

    #[test]
    fn test_lru_remove_oldest_on_empty() {
        let mut lru: LruCache<String> = LruCache::new(10);
        assert!(lru.remove_oldest().is_none());
    }
}
