//! Single-flight call sharing.
//!
//! Concurrent callers asking for the same key while a load is running wait
//! for that load instead of starting their own.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

// == Flight Group ==
/// Deduplicates in-flight work per key.
///
/// Nothing is remembered once a call completes: the next caller after
/// completion starts a fresh call.
#[derive(Debug)]
pub struct FlightGroup<T> {
    calls: Mutex<HashMap<String, Arc<OnceCell<T>>>>,
}

impl<T: Clone> FlightGroup<T> {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    // == Work ==
    /// Runs `f` for `key` unless a call for `key` is already in flight, in
    /// which case its result is shared.
    ///
    /// If the running caller is cancelled, one of the waiters runs its own
    /// `f` in its place.
    pub async fn work<F, Fut>(&self, key: &str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let call = {
            let mut calls = self.calls.lock().await;
            calls.entry(key.to_string()).or_default().clone()
        };

        let value = call.get_or_init(f).await.clone();

        let mut calls = self.calls.lock().await;
        if calls.get(key).is_some_and(|current| Arc::ptr_eq(current, &call)) {
            calls.remove(key);
        }
        value
    }
}

impl<T: Clone> Default for FlightGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}
