//! # strata-sql
//!
//! The relational engine of the strata persistence bridge.
//!
//! An entity type declares its persistent fields once (the [`Entity`]
//! trait); [`schema::describe`] turns that declaration into cached
//! [`EntityMetadata`] and idempotent `CREATE TABLE IF NOT EXISTS` DDL.
//! [`RelationalEngine`] provisions the table at construction, then serves
//! CRUD calls through a bounded [`r2d2`] connection pool, composing
//! parameterized statements with [`StatementBuilder`] and delegating
//! backend specifics to an injected [`Dialect`]:
//!
//! - [`MySqlDialect`] — networked, multi-column: one column per entity
//!   field, upsert via `REPLACE INTO`.
//! - [`SqliteDialect`] — embedded, single-file: a fixed two-column layout
//!   (key plus JSON payload), upsert via `INSERT OR REPLACE`.
//!
//! The two dialects intentionally do not store the same entity
//! identically; see the module docs of [`dialect::sqlite`].

pub mod dialect;
pub mod engine;
pub mod pool;
pub mod schema;
pub mod statement;
pub mod value;

#[cfg(test)]
pub(crate) mod testutil;

pub use dialect::mysql::MySqlDialect;
pub use dialect::sqlite::{PAYLOAD_COLUMN, SqliteDialect, payload_mapper};
pub use dialect::{Dialect, DialectConnection};
pub use engine::{RelationalEngine, RowMapper};
pub use pool::PoolSettings;
pub use schema::{ColumnDef, Entity, EntityMetadata, FieldKind, FieldSpec, create_table_ddl, describe};
pub use statement::{Statement, StatementBuilder};
pub use value::{SqlRow, SqlValue};

/// Engine over the networked multi-column dialect.
pub type MySqlEngine<E> = RelationalEngine<MySqlDialect, E>;

/// Engine over the embedded single-file dialect.
pub type SqliteEngine<E> = RelationalEngine<SqliteDialect, E>;
