//! Relational engine: schema provisioning and pooled CRUD orchestration.
//!
//! The engine is dialect-agnostic. Construction derives the entity's
//! metadata, builds the connection pool, and provisions the table before
//! the value exists — an engine is only ever observed Ready or Closed.
//! Every CRUD call checks out a pooled connection, composes a
//! parameterized statement, lets the dialect execute it, and maps result
//! rows through the caller-supplied mapper; the connection returns to the
//! pool on drop, on every exit path.
//!
//! Same-key writes issued concurrently race; the backend's row-level
//! atomicity decides the final value (last write wins). This layer never
//! serializes them.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use r2d2::{Pool, PooledConnection};
use serde::Serialize;
use strata_core::{ConnectionSettings, Result, StoreError, SyncStore};
use tracing::{debug, info};

use crate::dialect::Dialect;
use crate::pool::{self, PoolSettings};
use crate::schema::{self, Entity, EntityMetadata};
use crate::statement::{Statement, StatementBuilder};
use crate::value::SqlRow;

/// Caller-supplied conversion from a result row to an entity value.
pub type RowMapper<E> = Arc<dyn Fn(&SqlRow) -> Result<E> + Send + Sync>;

/// CRUD engine over one relational backend table.
pub struct RelationalEngine<D: Dialect, E> {
    dialect: D,
    table: String,
    meta: Arc<EntityMetadata>,
    mapper: RowMapper<E>,
    pool: RwLock<Option<Pool<D::Manager>>>,
}

impl<D: Dialect, E> std::fmt::Debug for RelationalEngine<D, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationalEngine")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl<D, E> RelationalEngine<D, E>
where
    D: Dialect,
    E: Entity + Serialize,
{
    /// Derive the schema, build the pool, and provision the table.
    ///
    /// Any failure here — schema derivation, pool construction, DDL
    /// execution — aborts construction with the typed error; the engine
    /// never exists half-initialized. Provisioning is idempotent, and safe
    /// when several engines are constructed concurrently against the same
    /// table.
    pub fn connect(
        dialect: D,
        settings: &ConnectionSettings,
        pool_settings: &PoolSettings,
        mapper: RowMapper<E>,
    ) -> Result<Self> {
        let meta = schema::describe::<E>()?;
        let manager = dialect.manager(settings)?;
        let pool = pool::build_pool(manager, pool_settings)?;

        let engine = Self {
            dialect,
            table: settings.table.clone(),
            meta,
            mapper,
            pool: RwLock::new(Some(pool)),
        };
        engine.provision()?;
        info!(
            table = %engine.table,
            entity = engine.meta.type_name,
            "relational engine ready"
        );
        Ok(engine)
    }

    /// [`connect`](Self::connect) with default pool settings.
    pub fn connect_with_defaults(
        dialect: D,
        settings: &ConnectionSettings,
        mapper: RowMapper<E>,
    ) -> Result<Self> {
        Self::connect(dialect, settings, &PoolSettings::default(), mapper)
    }

    /// Metadata derived for the entity type at construction.
    #[must_use]
    pub fn metadata(&self) -> &EntityMetadata {
        &self.meta
    }

    /// Target table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Release the pool. Operations after this fail with
    /// [`StoreError::Closed`]. Safe to call more than once.
    pub fn close(&self) {
        if self.pool.write().take().is_some() {
            info!(table = %self.table, "relational engine closed");
        }
    }

    fn provision(&self) -> Result<()> {
        let ddl = Statement::raw(self.dialect.table_ddl(&self.meta, &self.table));
        let mut conn = self.checkout()?;
        let _ = self.dialect.execute(&mut conn, &ddl)?;
        debug!(table = %self.table, "ensured table");
        Ok(())
    }

    fn checkout(&self) -> Result<PooledConnection<D::Manager>> {
        // Clone the pool handle out of the lock so a slow checkout never
        // blocks `close`. A checkout already in flight when `close` runs
        // completes normally; only new checkouts observe Closed.
        let pool = self.pool.read().clone().ok_or(StoreError::Closed)?;
        pool::checkout(&pool)
    }

    fn key_predicate(&self) -> String {
        format!("{} = ?", self.meta.key_column())
    }
}

impl<D, E> SyncStore<E> for RelationalEngine<D, E>
where
    D: Dialect,
    E: Entity + Serialize,
{
    fn fetch(&self, key: &str) -> Result<Option<E>> {
        let mut conn = self.checkout()?;
        let statement = StatementBuilder::table(&self.table)
            .select(&self.dialect.columns(&self.meta))
            .filter(self.key_predicate())
            .bind(key)
            .build()?;
        let rows = self.dialect.query(&mut conn, &statement)?;
        rows.first().map(|row| (self.mapper)(row)).transpose()
    }

    fn fetch_all(&self) -> Result<Vec<E>> {
        let mut conn = self.checkout()?;
        let statement = StatementBuilder::table(&self.table)
            .select(&self.dialect.columns(&self.meta))
            .build()?;
        let rows = self.dialect.query(&mut conn, &statement)?;
        rows.iter().map(|row| (self.mapper)(row)).collect()
    }

    fn save(&self, key: &str, value: &E) -> Result<bool> {
        let mut conn = self.checkout()?;
        let statement = self.dialect.upsert(&self.meta, &self.table, key, value)?;
        let _ = self.dialect.execute(&mut conn, &statement)?;
        Ok(true)
    }

    fn save_with_ttl(&self, key: &str, value: &E, ttl: Duration) -> Result<bool> {
        debug!(table = %self.table, ?ttl, "ttl has no effect on a relational backend");
        self.save(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.checkout()?;
        let statement = StatementBuilder::table(&self.table)
            .delete()
            .filter(self.key_predicate())
            .bind(key)
            .build()?;
        let affected = self.dialect.execute(&mut conn, &statement)?;
        Ok(affected > 0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
