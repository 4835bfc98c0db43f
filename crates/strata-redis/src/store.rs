//! Key-value cache adapter with load-bearing TTLs.

use std::marker::PhantomData;
use std::time::Duration;

use parking_lot::Mutex;
use redis::{Commands, Connection};
use serde::Serialize;
use serde::de::DeserializeOwned;
use strata_core::{ConnectionSettings, Result, StoreError, SyncStore};
use tracing::info;

/// CRUD adapter over one Redis target.
///
/// Values are stored as JSON strings under their key, verbatim. Commands
/// run over a single shared connection guarded by a mutex, matching the
/// synchronous command model of the driver.
pub struct RedisStore<T> {
    connection: Mutex<Connection>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> RedisStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    /// Connect to the descriptor's `redis://<host>:<port>` target.
    pub fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let url = settings.redis_url();
        let client = redis::Client::open(url.as_str()).map_err(StoreError::connection)?;
        let connection = client.get_connection().map_err(StoreError::connection)?;
        info!(%url, "cache store connected");
        Ok(Self {
            connection: Mutex::new(connection),
            _entity: PhantomData,
        })
    }

    /// Fetch every value stored under keys beginning with `prefix`.
    ///
    /// This is the cache-specific replacement for the generic `fetch_all`:
    /// it scans `<prefix>*` and decodes each hit. Keys written by other
    /// producers under the same prefix must hold JSON of the same shape.
    pub fn fetch_all_with_prefix(&self, prefix: &str) -> Result<Vec<T>> {
        let mut connection = self.connection.lock();
        let keys: Vec<String> = connection
            .keys(format!("{prefix}*"))
            .map_err(StoreError::query)?;

        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            // A key may expire between the scan and the read.
            let payload: Option<String> = connection.get(&key).map_err(StoreError::query)?;
            if let Some(payload) = payload {
                values.push(serde_json::from_str(&payload).map_err(StoreError::serialization)?);
            }
        }
        Ok(values)
    }

    fn encode(value: &T) -> Result<String> {
        serde_json::to_string(value).map_err(StoreError::serialization)
    }
}

impl<T> SyncStore<T> for RedisStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn fetch(&self, key: &str) -> Result<Option<T>> {
        let payload: Option<String> = self
            .connection
            .lock()
            .get(key)
            .map_err(StoreError::query)?;
        payload
            .map(|payload| serde_json::from_str(&payload).map_err(StoreError::serialization))
            .transpose()
    }

    fn fetch_all(&self) -> Result<Vec<T>> {
        Err(StoreError::Unsupported(
            "fetch_all on the cache store requires a key prefix; use fetch_all_with_prefix",
        ))
    }

    fn save(&self, key: &str, value: &T) -> Result<bool> {
        let payload = Self::encode(value)?;
        self.connection
            .lock()
            .set::<_, _, ()>(key, payload)
            .map_err(StoreError::query)?;
        Ok(true)
    }

    fn save_with_ttl(&self, key: &str, value: &T, ttl: Duration) -> Result<bool> {
        let payload = Self::encode(value)?;
        self.connection
            .lock()
            .set_ex::<_, _, ()>(key, payload, ttl.as_secs())
            .map_err(StoreError::query)?;
        Ok(true)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let removed: i64 = self
            .connection
            .lock()
            .del(key)
            .map_err(StoreError::query)?;
        Ok(removed > 0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
