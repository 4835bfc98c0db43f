//! Bounded connection pooling shared by both relational dialects.
//!
//! Thin layer over `r2d2`: checkout blocks up to the configured timeout,
//! the lease is exclusive, and the connection is returned on drop — on
//! every exit path, success, error, and unwind alike. The pool is the
//! single shared mutable resource of an engine; its lifecycle is owned by
//! the engine that built it, never by a process-wide static.

use std::time::Duration;

use r2d2::{ManageConnection, Pool, PooledConnection};
use strata_core::{Result, StoreError};
use tracing::debug;

/// Pool lifecycle limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// Maximum concurrently live connections.
    pub max_size: u32,
    /// Idle connections kept warm.
    pub min_idle: u32,
    /// How long a checkout may wait before failing.
    pub checkout_timeout: Duration,
    /// Idle connections are evicted after this long.
    pub idle_timeout: Duration,
    /// Connections are retired after this long regardless of use.
    pub max_lifetime: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_size: 10,
            min_idle: 2,
            checkout_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(60),
            max_lifetime: Duration::from_secs(30 * 60),
        }
    }
}

/// Build a pool over `manager`.
///
/// Establishes the initial connections eagerly; a connect failure here is
/// fatal to engine construction.
pub fn build_pool<M: ManageConnection>(manager: M, settings: &PoolSettings) -> Result<Pool<M>> {
    let pool = Pool::builder()
        .max_size(settings.max_size)
        .min_idle(Some(settings.min_idle))
        .connection_timeout(settings.checkout_timeout)
        .idle_timeout(Some(settings.idle_timeout))
        .max_lifetime(Some(settings.max_lifetime))
        .build(manager)
        .map_err(StoreError::connection)?;
    debug!(
        max_size = settings.max_size,
        min_idle = settings.min_idle,
        "connection pool ready"
    );
    Ok(pool)
}

/// Check out a connection, blocking up to the checkout timeout.
///
/// The lease is exclusive and non-reentrant; dropping the returned guard
/// releases the connection exactly once.
pub fn checkout<M: ManageConnection>(pool: &Pool<M>) -> Result<PooledConnection<M>> {
    pool.get().map_err(StoreError::connection)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use r2d2_sqlite::SqliteConnectionManager;
    use strata_core::ErrorKind;

    use super::*;

    fn file_manager(dir: &tempfile::TempDir) -> SqliteConnectionManager {
        SqliteConnectionManager::file(dir.path().join("pool.db"))
    }

    fn small(max_size: u32) -> PoolSettings {
        PoolSettings {
            max_size,
            min_idle: 1,
            checkout_timeout: Duration::from_millis(200),
            ..PoolSettings::default()
        }
    }

    #[test]
    fn default_limits() {
        let settings = PoolSettings::default();
        assert_eq!(settings.max_size, 10);
        assert_eq!(settings.min_idle, 2);
        assert_eq!(settings.checkout_timeout, Duration::from_secs(10));
        assert_eq!(settings.idle_timeout, Duration::from_secs(60));
        assert_eq!(settings.max_lifetime, Duration::from_secs(1800));
    }

    #[test]
    fn checkout_and_release() {
        let dir = tempfile::tempdir().unwrap();
        let pool = build_pool(file_manager(&dir), &small(2)).unwrap();

        let conn = checkout(&pool).unwrap();
        drop(conn);
        // Released on drop: a fresh checkout succeeds immediately.
        let _conn = checkout(&pool).unwrap();
    }

    #[test]
    fn exhausted_pool_times_out_with_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let pool = build_pool(file_manager(&dir), &small(1)).unwrap();

        let _held = checkout(&pool).unwrap();
        let err = checkout(&pool).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[test]
    fn concurrent_checkouts_never_exceed_max() {
        let dir = tempfile::tempdir().unwrap();
        let max_size = 3;
        let pool = Arc::new(build_pool(file_manager(&dir), &small(max_size)).unwrap());

        let live = Arc::new(AtomicU32::new(0));
        let high_water = Arc::new(AtomicU32::new(0));

        let workers: Vec<_> = (0..12)
            .map(|_| {
                let pool = Arc::clone(&pool);
                let live = Arc::clone(&live);
                let high_water = Arc::clone(&high_water);
                std::thread::spawn(move || {
                    for _ in 0..20 {
                        let Ok(conn) = checkout(&pool) else {
                            continue;
                        };
                        let now = live.fetch_add(1, Ordering::SeqCst) + 1;
                        high_water.fetch_max(now, Ordering::SeqCst);
                        std::thread::sleep(Duration::from_millis(1));
                        live.fetch_sub(1, Ordering::SeqCst);
                        drop(conn);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert!(high_water.load(Ordering::SeqCst) <= max_size);
        assert!(high_water.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn connect_failure_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory is not a valid database file.
        let manager = SqliteConnectionManager::file(dir.path());
        let err = build_pool(manager, &small(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
    }
}
