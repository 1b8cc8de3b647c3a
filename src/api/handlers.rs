//! API Handlers
//!
//! HTTP request handlers for the peer protocol and operational endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::group::GroupRegistry;
use crate::models::{HealthResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Groups this node answers for
    pub registry: Arc<GroupRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<GroupRegistry>) -> Self {
        Self { registry }
    }
}

/// Handler for GET `<base_path><group>/<key>`
///
/// Answers from the group's local path only: this node was picked as the
/// owner, so it never forwards to another peer. Everything after the first
/// `/` of the remainder is the key.
pub async fn peer_get_handler(
    State(state): State<AppState>,
    Path(rest): Path<String>,
) -> Result<Response> {
    let (group_name, key) = rest.split_once('/').ok_or_else(|| {
        CacheError::BadRequest(format!("expected <group>/<key>, got {}", rest))
    })?;
    serve_local(&state, group_name, key).await
}

/// Query form of the peer request, used for names a URL path cannot carry.
#[derive(Debug, Deserialize)]
pub struct PeerQuery {
    pub group: Option<String>,
    pub key: Option<String>,
}

/// Handler for GET `<base_path>?group=<group>&key=<key>`
///
/// Without both parameters this is a malformed peer path.
pub async fn peer_query_handler(
    State(state): State<AppState>,
    Query(query): Query<PeerQuery>,
) -> Result<Response> {
    match (query.group, query.key) {
        (Some(group_name), Some(key)) => serve_local(&state, &group_name, &key).await,
        _ => Err(CacheError::BadRequest("expected <group>/<key>".to_string())),
    }
}

async fn serve_local(state: &AppState, group_name: &str, key: &str) -> Result<Response> {
    debug!(group = group_name, key, "peer request");

    let group = state
        .registry
        .get_group(group_name)
        .await
        .ok_or_else(|| CacheError::GroupNotFound(group_name.to_string()))?;

    let view = group.get_local(key).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        view.byte_slice(),
    )
        .into_response())
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let mut groups = Vec::new();
    for group in state.registry.groups().await {
        groups.push(group.stats().await);
    }

    Json(StatsResponse::new(groups))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    async fn scores_state() -> AppState {
        let registry = Arc::new(GroupRegistry::new());
        registry
            .new_group("scores", 2 << 10, |key: &str| -> anyhow::Result<Vec<u8>> {
                match key {
                    "Tom" => Ok(b"630".to_vec()),
                    _ => Err(anyhow!("{} not exist", key)),
                }
            })
            .await
            .unwrap();
        AppState::new(registry)
    }

    #[tokio::test]
    async fn test_peer_get_handler_success() {
        let state = scores_state().await;

        let response = peer_get_handler(State(state), Path("scores/Tom".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_peer_get_handler_missing_key_segment() {
        let state = scores_state().await;

        let err = peer_get_handler(State(state), Path("scores".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_peer_get_handler_unknown_group() {
        let state = scores_state().await;

        let err = peer_get_handler(State(state), Path("nope/Tom".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err, CacheError::GroupNotFound("nope".to_string()));
    }

    #[tokio::test]
    async fn test_peer_get_handler_loader_error() {
        let state = scores_state().await;

        let err = peer_get_handler(State(state), Path("scores/ZZZ".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err, CacheError::Loader("ZZZ not exist".to_string()));
    }

    fn query(group: Option<&str>, key: Option<&str>) -> Query<PeerQuery> {
        Query(PeerQuery {
            group: group.map(str::to_string),
            key: key.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_peer_query_handler_serves_dot_keys() {
        let state = scores_state().await;

        let err = peer_query_handler(State(state.clone()), query(Some("scores"), Some("..")))
            .await
            .unwrap_err();
        assert_eq!(err, CacheError::Loader(".. not exist".to_string()));

        let response = peer_query_handler(State(state), query(Some("scores"), Some("Tom")))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_peer_query_handler_requires_both_params() {
        let state = scores_state().await;

        let err = peer_query_handler(State(state.clone()), query(None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::BadRequest(_)));

        let err = peer_query_handler(State(state), query(Some("scores"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_stats_handler_lists_groups() {
        let state = scores_state().await;
        peer_get_handler(State(state.clone()), Path("scores/Tom".to_string()))
            .await
            .unwrap();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.groups.len(), 1);
        assert_eq!(response.groups[0].local_loads, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
