//! Consistent Hash Ring
//!
//! Maps keys onto peer identifiers through virtual replica nodes placed on
//! a 32-bit hash circle.

use std::collections::HashMap;

use crate::error::{CacheError, Result};

/// Hash function placing keys and virtual nodes on the circle.
pub type HashFn = fn(&[u8]) -> u32;

/// Default hash: CRC-32C checksum.
pub fn default_hash(data: &[u8]) -> u32 {
    crc32c::crc32c(data)
}

// == Hash Ring ==
/// Sorted virtual-node hashes plus the peer owning each one.
///
/// The hash function and replica count are fixed for the ring's lifetime;
/// changing either would reassign every key.
#[derive(Debug, Clone)]
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    keys: Vec<u32>,
    owners: HashMap<u32, String>,
}

impl HashRing {
    // == Constructor ==
    /// Creates an empty ring with `replicas` virtual nodes per peer.
    ///
    /// Zero replicas would make every added peer invisible, so it is
    /// rejected as a configuration error.
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Result<Self> {
        if replicas == 0 {
            return Err(CacheError::Config(
                "hash ring needs at least one replica per peer".to_string(),
            ));
        }
        Ok(Self {
            hash: hash.unwrap_or(default_hash),
            replicas,
            keys: Vec::new(),
            owners: HashMap::new(),
        })
    }

    // == Add ==
    /// Places `replicas` virtual nodes for each peer, hashing `"{i}{peer}"`.
    ///
    /// Re-adding a peer is a no-op. When two virtual nodes collide the later
    /// peer owns the point.
    pub fn add<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for peer in peers {
            let peer = peer.as_ref();
            for i in 0..self.replicas {
                let hash = (self.hash)(format!("{}{}", i, peer).as_bytes());
                self.keys.push(hash);
                self.owners.insert(hash, peer.to_string());
            }
        }
        self.keys.sort_unstable();
        self.keys.dedup();
    }

    // == Get ==
    /// Returns the peer owning `key`: the first virtual node at or after the
    /// key's hash, wrapping to the smallest node past the top of the circle.
    ///
    /// `None` only when the ring is empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&k| k < hash);
        let point = self.keys[idx % self.keys.len()];
        self.owners.get(&point).map(String::as_str)
    }

    // == Accessors ==
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Number of virtual nodes on the circle.
    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    // Treats the input as a decimal number so placements are predictable.
    fn decimal_hash(data: &[u8]) -> u32 {
        std::str::from_utf8(data).unwrap().parse().unwrap()
    }

    #[test]
    fn test_ring_placement_with_known_hash() {
        let mut ring = HashRing::new(3, Some(decimal_hash)).unwrap();

        // Virtual nodes: 2, 4, 6, 12, 14, 16, 22, 24, 26
        ring.add(["6", "4", "2"]);

        let cases = [("2", "2"), ("11", "2"), ("23", "4"), ("27", "2")];
        for (key, peer) in cases {
            assert_eq!(ring.get(key), Some(peer), "key {}", key);
        }

        // Adding 8 places 8, 18, 28; 27 now lands on 28
        ring.add(["8"]);
        assert_eq!(ring.get("27"), Some("8"));
        assert_eq!(ring.get("11"), Some("2"));
    }

    #[test]
    fn test_ring_wraps_around() {
        let mut ring = HashRing::new(1, Some(decimal_hash)).unwrap();
        ring.add(["5", "3"]);

        // 0+"5" = 5, 0+"3" = 3; 99 is past every node
        assert_eq!(ring.get("99"), Some("3"));
        assert_eq!(ring.get("4"), Some("5"));
        assert_eq!(ring.get("3"), Some("3"));
    }

    #[test]
    fn test_ring_empty_returns_none() {
        let ring = HashRing::new(50, None).unwrap();
        assert!(ring.is_empty());
        assert_eq!(ring.get("anything"), None);
    }

    #[test]
    fn test_ring_zero_replicas_is_config_error() {
        assert!(matches!(
            HashRing::new(0, None),
            Err(CacheError::Config(_))
        ));
    }

    #[test]
    fn test_ring_add_is_idempotent() {
        let mut ring = HashRing::new(10, None).unwrap();
        ring.add(["http://a:1", "http://b:2"]);
        let before = ring.len();
        ring.add(["http://a:1"]);
        assert_eq!(ring.len(), before);
    }

    #[test]
    fn test_ring_is_deterministic() {
        let peers = ["http://10.0.0.1:8001", "http://10.0.0.2:8002", "http://10.0.0.3:8003"];
        let mut first = HashRing::new(50, None).unwrap();
        let mut second = HashRing::new(50, None).unwrap();
        first.add(peers);
        second.add(peers.iter().rev());

        for i in 0..500 {
            let key = format!("key-{}", i);
            assert_eq!(first.get(&key), first.get(&key));
            assert_eq!(first.get(&key), second.get(&key));
        }
    }

    #[test]
    fn test_ring_adding_peer_remaps_minority() {
        let mut ring = HashRing::new(50, None).unwrap();
        ring.add((1..=4).map(|i| format!("http://peer{}:800{}", i, i)));

        let keys: Vec<String> = (0..10_000).map(|i| format!("user:{}", i)).collect();
        let before: Vec<String> = keys
            .iter()
            .map(|k| ring.get(k).unwrap().to_string())
            .collect();

        ring.add(["http://peer5:8005"]);
        let moved = keys
            .iter()
            .zip(&before)
            .filter(|(k, owner)| ring.get(k).unwrap() != owner.as_str())
            .count();

        // Ideal is 1/5 of keys; anything below half shows the ring is consistent.
        assert!(moved > 0);
        assert!(moved < keys.len() / 2, "moved {} of {}", moved, keys.len());
    }
}
