//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for groups, the peer pool and the HTTP surface.
///
/// `Clone` so a single in-flight load can hand its outcome to every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Caller passed an unusable argument (e.g. an empty key)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The group's getter could not produce a value; carries its text verbatim
    #[error("{0}")]
    Loader(String),

    /// A remote peer could not be reached or answered with a failure
    #[error("peer error: {0}")]
    Peer(String),

    /// No group registered under this name
    #[error("no such group: {0}")]
    GroupNotFound(String),

    /// Malformed peer request
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Setup-time wiring mistake (missing getter, zero replicas, double registration)
    #[error("configuration error: {0}")]
    Config(String),
}

impl CacheError {
    /// Status code used when this error crosses the HTTP boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CacheError::InvalidArgument(_) | CacheError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Peer(_) => StatusCode::BAD_GATEWAY,
            CacheError::Loader(_) | CacheError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
// Peers read raw bodies, so errors go out as plain text rather than JSON.
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
