//! Response DTOs for the operational endpoints
//!
//! Defines the structure of outgoing JSON bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::group::GroupStats;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// One entry per registered group, sorted by name
    pub groups: Vec<GroupStats>,
    /// Hit rate across all groups' local caches
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from per-group statistics
    pub fn new(groups: Vec<GroupStats>) -> Self {
        let mut totals = CacheStats::new();
        for group in &groups {
            totals.hits += group.cache.hits;
            totals.misses += group.cache.misses;
        }
        Self {
            hit_rate: totals.hit_rate(),
            groups,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_stats(name: &str, hits: u64, misses: u64) -> GroupStats {
        GroupStats {
            name: name.to_string(),
            cache: CacheStats {
                hits,
                misses,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let resp = StatsResponse::new(vec![group_stats("a", 30, 10), group_stats("b", 50, 10)]);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::new(Vec::new());
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_stats_response_serialize() {
        let resp = StatsResponse::new(vec![group_stats("scores", 1, 1)]);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["groups"][0]["name"], "scores");
        assert_eq!(json["groups"][0]["cache"]["hits"], 1);
        assert!(json["groups"][0].get("peer_errors").is_some());
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
