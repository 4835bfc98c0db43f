//! Worker-pool-backed async wrapper over any blocking store.
//!
//! [`AsyncFacade`] dispatches each blocking call onto the tokio blocking
//! worker pool (`spawn_blocking`) and returns a future resolving to the
//! same value or the same typed failure the blocking call would produce.
//! This changes scheduling only: the underlying operation still occupies
//! a worker thread for its full blocking duration. It is off-thread, not
//! non-blocking I/O.
//!
//! Dropping a pending future does not halt the blocking call already
//! running on a worker — cancellation is best-effort at the future
//! boundary only.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::{self, JoinError};
use tracing::warn;

use crate::error::{Result, StoreError};
use crate::store::{AsyncStore, SyncStore};

/// Async adapter over a blocking [`SyncStore`].
///
/// Cheap to clone; clones share the wrapped store.
pub struct AsyncFacade<S> {
    store: Arc<S>,
}

impl<S> AsyncFacade<S> {
    /// Wrap an owned store.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Wrap an already-shared store.
    #[must_use]
    pub fn shared(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The wrapped blocking store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

impl<S> Clone for AsyncFacade<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

fn worker_failure(err: JoinError) -> StoreError {
    warn!(error = %err, "blocking worker failed");
    StoreError::internal(format!("blocking worker failed: {err}"))
}

#[async_trait]
impl<S, T> AsyncStore<T> for AsyncFacade<S>
where
    S: SyncStore<T> + 'static,
    T: Send + Sync + 'static,
{
    async fn fetch(&self, key: &str) -> Result<Option<T>> {
        let store = Arc::clone(&self.store);
        let key = key.to_owned();
        task::spawn_blocking(move || store.fetch(&key))
            .await
            .map_err(worker_failure)?
    }

    async fn fetch_all(&self) -> Result<Vec<T>> {
        let store = Arc::clone(&self.store);
        task::spawn_blocking(move || store.fetch_all())
            .await
            .map_err(worker_failure)?
    }

    async fn save(&self, key: &str, value: T) -> Result<bool> {
        let store = Arc::clone(&self.store);
        let key = key.to_owned();
        task::spawn_blocking(move || store.save(&key, &value))
            .await
            .map_err(worker_failure)?
    }

    async fn save_with_ttl(&self, key: &str, value: T, ttl: Duration) -> Result<bool> {
        let store = Arc::clone(&self.store);
        let key = key.to_owned();
        task::spawn_blocking(move || store.save_with_ttl(&key, &value, ttl))
            .await
            .map_err(worker_failure)?
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let store = Arc::clone(&self.store);
        let key = key.to_owned();
        task::spawn_blocking(move || store.delete(&key))
            .await
            .map_err(worker_failure)?
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use std::collections::HashMap;

    use parking_lot::Mutex;

    use super::*;
    use crate::error::ErrorKind;

    /// Minimal in-memory store used to exercise the facade.
    #[derive(Default)]
    struct MemoryStore {
        entries: Mutex<HashMap<String, u32>>,
        fail_fetches: bool,
    }

    impl SyncStore<u32> for MemoryStore {
        fn fetch(&self, key: &str) -> Result<Option<u32>> {
            if self.fail_fetches {
                return Err(StoreError::query("synthetic fetch failure"));
            }
            Ok(self.entries.lock().get(key).copied())
        }

        fn fetch_all(&self) -> Result<Vec<u32>> {
            Ok(self.entries.lock().values().copied().collect())
        }

        fn save(&self, key: &str, value: &u32) -> Result<bool> {
            self.entries.lock().insert(key.to_owned(), *value);
            Ok(true)
        }

        fn save_with_ttl(&self, key: &str, value: &u32, _ttl: Duration) -> Result<bool> {
            self.save(key, value)
        }

        fn delete(&self, key: &str) -> Result<bool> {
            Ok(self.entries.lock().remove(key).is_some())
        }
    }

    #[tokio::test]
    async fn round_trip_through_facade() {
        let facade = AsyncFacade::new(MemoryStore::default());
        assert!(facade.save("a", 7).await.unwrap());
        assert_eq!(facade.fetch("a").await.unwrap(), Some(7));
    }

    #[tokio::test]
    async fn fetch_absent_resolves_to_none() {
        let facade = AsyncFacade::new(MemoryStore::default());
        assert_eq!(facade.fetch("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let facade = AsyncFacade::new(MemoryStore::default());
        facade.save("a", 1).await.unwrap();
        assert!(facade.delete("a").await.unwrap());
        assert!(!facade.delete("a").await.unwrap());
    }

    #[tokio::test]
    async fn matches_sync_counterpart() {
        let store = Arc::new(MemoryStore::default());
        let facade = AsyncFacade::shared(Arc::clone(&store));

        store.save("k", &42).unwrap();
        assert_eq!(facade.fetch("k").await.unwrap(), store.fetch("k").unwrap());

        let mut via_sync = store.fetch_all().unwrap();
        let mut via_async = facade.fetch_all().await.unwrap();
        via_sync.sort_unstable();
        via_async.sort_unstable();
        assert_eq!(via_async, via_sync);
    }

    #[tokio::test]
    async fn failure_kind_matches_sync_counterpart() {
        let store = Arc::new(MemoryStore {
            fail_fetches: true,
            ..MemoryStore::default()
        });
        let facade = AsyncFacade::shared(Arc::clone(&store));

        let sync_kind = store.fetch("k").unwrap_err().kind();
        let async_kind = facade.fetch("k").await.unwrap_err().kind();
        assert_eq!(async_kind, sync_kind);
        assert_eq!(async_kind, ErrorKind::Query);
    }

    #[tokio::test]
    async fn ttl_passes_through() {
        let facade = AsyncFacade::new(MemoryStore::default());
        assert!(
            facade
                .save_with_ttl("a", 3, Duration::from_secs(60))
                .await
                .unwrap()
        );
        assert_eq!(facade.fetch("a").await.unwrap(), Some(3));
    }
}
