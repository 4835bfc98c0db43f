//! The uniform CRUD contract every backend satisfies.
//!
//! [`SyncStore`] is the blocking surface; [`AsyncStore`] is its
//! non-blocking counterpart with identical semantics. An absent key is
//! `Ok(None)` and an empty target is `Ok(vec![])` — never errors. All
//! failures are typed [`StoreError`](crate::StoreError)s.
//!
//! Concurrency contract: no ordering is guaranteed between concurrent
//! operations on different keys. Concurrent writes to the same key race;
//! the backend's own row-level atomicity decides the final stored value
//! (last write wins). This layer never serializes same-key writes.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Blocking CRUD surface over one backend target.
pub trait SyncStore<T>: Send + Sync {
    /// Fetch the value stored under `key`, or `None` when absent.
    fn fetch(&self, key: &str) -> Result<Option<T>>;

    /// Fetch every stored value. Order is unspecified.
    fn fetch_all(&self) -> Result<Vec<T>>;

    /// Insert the value under `key`, overwriting any existing value.
    /// Returns `Ok(true)` when the backend acknowledged the write.
    fn save(&self, key: &str, value: &T) -> Result<bool>;

    /// Like [`save`](Self::save), with a time-to-live after which the value
    /// expires. Backends without expiry semantics accept and ignore the TTL.
    fn save_with_ttl(&self, key: &str, value: &T, ttl: Duration) -> Result<bool>;

    /// Delete the value stored under `key`. Returns `Ok(true)` iff a value
    /// was removed, `Ok(false)` when the key was absent.
    fn delete(&self, key: &str) -> Result<bool>;
}

/// Non-blocking counterpart of [`SyncStore`].
///
/// Each operation resolves to the same value, or the same kind of typed
/// failure, that the blocking call would produce for identical inputs.
#[async_trait]
pub trait AsyncStore<T>: Send + Sync {
    /// Fetch the value stored under `key`, or `None` when absent.
    async fn fetch(&self, key: &str) -> Result<Option<T>>;

    /// Fetch every stored value. Order is unspecified.
    async fn fetch_all(&self) -> Result<Vec<T>>;

    /// Insert the value under `key`, overwriting any existing value.
    async fn save(&self, key: &str, value: T) -> Result<bool>;

    /// Like [`save`](Self::save), with a time-to-live after which the value
    /// expires. Backends without expiry semantics accept and ignore the TTL.
    async fn save_with_ttl(&self, key: &str, value: T, ttl: Duration) -> Result<bool>;

    /// Delete the value stored under `key`. Returns `Ok(true)` iff a value
    /// was removed.
    async fn delete(&self, key: &str) -> Result<bool>;
}
