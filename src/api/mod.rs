//! API Module
//!
//! HTTP surface of a node.
//!
//! # Endpoints
//! - `GET <base_path><group>/<key>` - Peer protocol: raw value bytes
//! - `GET <base_path>?group=<group>&key=<key>` - Same, for `.` and `..` names
//! - `GET /stats` - Per-group statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
