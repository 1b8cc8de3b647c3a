//! Loader callback used by a group on a cache miss.

/// Loads the authoritative value for a key from the backing data source.
///
/// The group runs it on tokio's blocking pool, so it may do blocking I/O
/// without stalling the async workers. Errors are surfaced to the caller
/// verbatim and never cached.
pub trait Getter: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

// Any plain closure works as a getter.
impl<F> Getter for F
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        self(key)
    }
}
