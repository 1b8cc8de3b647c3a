//! API Routes
//!
//! Configures the Axum router for the peer protocol and operational endpoints.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{
    health_handler, peer_get_handler, peer_query_handler, stats_handler, AppState,
};

/// Creates the node's router.
///
/// # Endpoints
/// - `GET <base_path><group>/<key>` - Peer protocol
/// - `GET <base_path>?group=<group>&key=<key>` - Peer protocol for `.` and `..` names
/// - `GET /stats` - Per-group statistics
/// - `GET /health` - Health check endpoint
///
/// `base_path` must start and end with `/`.
pub fn create_router(state: AppState, base_path: &str) -> Router {
    Router::new()
        .route(base_path, get(peer_query_handler))
        .route(&format!("{}*rest", base_path), get(peer_get_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
