//! Response models for the operational endpoints
//!
//! Peer traffic carries raw bytes; only `/stats` and `/health` use JSON.

pub mod responses;

// Re-export commonly used types
pub use responses::{HealthResponse, StatsResponse};
