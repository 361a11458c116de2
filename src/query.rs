//! Shared query cache.
//!
//! Results are stored as JSON under a [`QueryKey`]. A failed fetch is retried a
//! fixed number of times before the error reaches the caller. Login marks every
//! entry stale and logout drops them all.

use crate::error::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{
    collections::HashMap,
    fmt,
    future::Future,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tracing::{debug, warn};

/// Ordered key segments, e.g. `["users", "42"]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn current_user() -> Self {
        Self::new(["currentUser"])
    }

    #[must_use]
    pub fn users() -> Self {
        Self::new(["users"])
    }

    #[must_use]
    pub fn user(id: &str) -> Self {
        Self::new(["users", id])
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[derive(Debug)]
struct Entry {
    value: Value,
    stale: bool,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<QueryKey, Entry>,
}

/// Cheap to clone; clones share entries.
#[derive(Clone, Debug)]
pub struct QueryCache {
    inner: Arc<Mutex<Inner>>,
    retry: u32,
    retry_delay: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_QUERY_RETRY, Duration::from_secs(1))
    }
}

impl QueryCache {
    #[must_use]
    pub fn new(retry: u32, retry_delay: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            retry,
            retry_delay,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Entries are plain data; a panic elsewhere cannot leave them half-written.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Returns the fresh cached value for `key`, or runs `fetcher` (with retry)
    /// and caches its result.
    /// # Errors
    /// Returns the fetcher's last error once retries are exhausted, or a
    /// serialization error if the value cannot be cached.
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, mut fetcher: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.fresh::<T>(key) {
            debug!(%key, "query cache hit");
            return Ok(value);
        }

        let mut attempt = 0;
        let value = loop {
            match fetcher().await {
                Ok(value) => break value,
                Err(err) if attempt < self.retry && err.is_retryable() => {
                    attempt += 1;
                    warn!(%key, attempt, "query failed, retrying: {err}");
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(err) => return Err(err),
            }
        };

        self.set_query_data(key, &value)?;
        Ok(value)
    }

    fn fresh<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let inner = self.lock();
        let entry = inner.entries.get(key).filter(|entry| !entry.stale)?;
        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Cached value regardless of staleness.
    #[must_use]
    pub fn get_query_data<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let inner = self.lock();
        let entry = inner.entries.get(key)?;
        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Stores `value` as fresh data for `key`.
    /// # Errors
    /// Returns an error if the value cannot be encoded as JSON.
    pub fn set_query_data<T: Serialize + ?Sized>(&self, key: &QueryKey, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|err| Error::Serialization(format!("Failed to cache {key}: {err}")))?;
        self.lock()
            .entries
            .insert(key.clone(), Entry { value, stale: false });
        Ok(())
    }

    #[must_use]
    pub fn is_stale(&self, key: &QueryKey) -> Option<bool> {
        self.lock().entries.get(key).map(|entry| entry.stale)
    }

    /// Marks every entry stale; the next `fetch` goes to the network.
    pub fn invalidate_all(&self) {
        let mut inner = self.lock();
        for entry in inner.entries.values_mut() {
            entry.stale = true;
        }
        debug!(entries = inner.entries.len(), "query cache invalidated");
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
        debug!("query cache cleared");
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
