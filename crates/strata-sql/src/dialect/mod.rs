//! Backend dialect strategy consumed by the relational engine.
//!
//! A dialect is a value, not a subclass: the engine owns orchestration
//! and delegates backend specifics — how to reach the backend, how to lay
//! the table out, how to upsert, how to surface rows — to the injected
//! strategy. Adding a dialect never touches the engine.

pub mod mysql;
pub mod sqlite;

use r2d2::ManageConnection;
use serde::Serialize;
use strata_core::{ConnectionSettings, Result};

use crate::schema::{Entity, EntityMetadata};
use crate::statement::Statement;
use crate::value::SqlRow;

/// Driver connection type of a dialect's pool manager.
pub type DialectConnection<D> = <<D as Dialect>::Manager as ManageConnection>::Connection;

/// Backend-specific strategy for one relational dialect.
pub trait Dialect: Send + Sync + 'static {
    /// r2d2 manager producing this dialect's driver connections.
    type Manager: ManageConnection;

    /// Build the pool manager from the connection descriptor.
    fn manager(&self, settings: &ConnectionSettings) -> Result<Self::Manager>;

    /// Idempotent provisioning DDL for the entity's table.
    fn table_ddl(&self, meta: &EntityMetadata, table: &str) -> String;

    /// The columns this dialect stores — the row-mapping contract used for
    /// every select.
    fn columns(&self, meta: &EntityMetadata) -> Vec<&'static str>;

    /// The upsert statement writing `entity` under `key`.
    fn upsert<E>(
        &self,
        meta: &EntityMetadata,
        table: &str,
        key: &str,
        entity: &E,
    ) -> Result<Statement>
    where
        E: Entity + Serialize;

    /// Execute a statement, returning the affected row count.
    fn execute(&self, conn: &mut DialectConnection<Self>, statement: &Statement) -> Result<u64>;

    /// Run a query, surfacing rows in backend-neutral form.
    fn query(
        &self,
        conn: &mut DialectConnection<Self>,
        statement: &Statement,
    ) -> Result<Vec<SqlRow>>;
}
