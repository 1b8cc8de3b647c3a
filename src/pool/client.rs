//! HTTP Peer Client
//!
//! Fetches `<peer><base_path><group>/<key>` from another pool instance.
//! A group or key that is exactly `.` or `..` would be dropped by URL
//! normalization, so those requests go to `<peer><base_path>?group=..&key=..`
//! instead.

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{Client, Url};
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::peers::PeerFetcher;

// == HTTP Getter ==
/// Transport handle for a single remote peer.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    base_url: String,
    client: Client,
}

impl HttpGetter {
    /// `peer` is the peer's base address (e.g. `http://10.0.0.2:8001`);
    /// `client` carries the request timeouts.
    pub fn new(client: Client, peer: &str, base_path: &str) -> Self {
        Self {
            base_url: format!("{}{}", peer.trim_end_matches('/'), base_path),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // == URL ==
    /// Builds the request URL with `group` and `key` percent-encoded as
    /// single path segments.
    pub fn url_for(&self, group: &str, key: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CacheError::Peer(format!("invalid peer url {}: {}", self.base_url, e)))?;
        if is_dot_segment(group) || is_dot_segment(key) {
            url.query_pairs_mut()
                .append_pair("group", group)
                .append_pair("key", key);
            return Ok(url);
        }
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                CacheError::Peer(format!("peer url {} cannot take a path", self.base_url))
            })?;
            segments.pop_if_empty().push(group).push(key);
        }
        Ok(url)
    }

    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        let url = self.url_for(group, key)?;
        debug!(%url, "fetching from peer");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CacheError::Peer(format!("GET {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CacheError::Peer(format!(
                "server returned {}: {}",
                status,
                body.trim()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CacheError::Peer(format!("reading response body: {}", e)))?;
        Ok(body.to_vec())
    }
}

// `%2e` spellings are dot segments to a URL parser too, but a pushed
// segment has its `%` escaped, so only the literal forms matter.
fn is_dot_segment(segment: &str) -> bool {
    matches!(segment, "." | "..")
}

impl PeerFetcher for HttpGetter {
    fn fetch<'a>(&'a self, group: &'a str, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        self.get(group, key).boxed()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn getter(peer: &str) -> HttpGetter {
        HttpGetter::new(Client::new(), peer, "/_gocache/")
    }

    #[test]
    fn test_url_for_plain_segments() {
        let url = getter("http://localhost:8001")
            .url_for("scores", "Tom")
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8001/_gocache/scores/Tom");
    }

    #[test]
    fn test_url_for_encodes_segments() {
        let url = getter("http://localhost:8001/")
            .url_for("my group", "a/b?c")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8001/_gocache/my%20group/a%2Fb%3Fc"
        );
    }

    #[test]
    fn test_url_for_dot_segments_use_query() {
        let getter = getter("http://localhost:8001");

        let url = getter.url_for("scores", "..").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8001/_gocache/?group=scores&key=.."
        );

        let url = getter.url_for("scores", ".").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8001/_gocache/?group=scores&key=."
        );

        let url = getter.url_for("..", "Tom").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8001/_gocache/?group=..&key=Tom");
    }

    #[test]
    fn test_url_for_keeps_dotted_keys_in_path() {
        let getter = getter("http://localhost:8001");

        let url = getter.url_for("scores", "...").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8001/_gocache/scores/...");

        let url = getter.url_for("scores", "%2e%2e").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8001/_gocache/scores/%252e%252e");
    }

    #[test]
    fn test_invalid_peer_url() {
        let err = getter("not a url").url_for("g", "k").unwrap_err();
        assert!(matches!(err, CacheError::Peer(_)));
    }

    #[tokio::test]
    async fn test_unreachable_peer_is_fetch_error() {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(200))
            .timeout(Duration::from_millis(500))
            .build()
            .unwrap();
        // Port 9 (discard) is closed on test hosts.
        let getter = HttpGetter::new(client, "http://127.0.0.1:9", "/_gocache/");

        let err = getter.fetch("scores", "Tom").await.unwrap_err();
        assert!(matches!(err, CacheError::Peer(_)));
    }
}
