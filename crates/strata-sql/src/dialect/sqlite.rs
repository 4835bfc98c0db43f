//! Single-file dialect for the embedded SQLite backend.
//!
//! Fixed two-column layout regardless of entity shape: the primary key
//! plus the whole entity serialized to JSON in a payload column. Upsert
//! is `INSERT OR REPLACE INTO`. This storage granularity intentionally
//! diverges from the multi-column dialect — the two dialects do not store
//! the same entity identically — and the provisioning DDL matches the
//! layout actually written.
//!
//! The connection descriptor's `database` field is read as the filesystem
//! path of the database file. New pool connections get WAL journal mode,
//! a busy timeout, and foreign keys enabled.

use std::path::Path;
use std::sync::Arc;

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::{ToSqlOutput, Value as DriverValue, ValueRef};
use rusqlite::{Connection, ToSql, params_from_iter};
use serde::Serialize;
use serde::de::DeserializeOwned;
use strata_core::{ConnectionSettings, Result, StoreError};

use crate::dialect::Dialect;
use crate::engine::RowMapper;
use crate::schema::{Entity, EntityMetadata};
use crate::statement::{Statement, StatementBuilder};
use crate::value::{SqlRow, SqlValue};

/// Payload column of the single-file layout.
pub const PAYLOAD_COLUMN: &str = "data";

const DEFAULT_BUSY_TIMEOUT_MS: u32 = 30_000;

/// Single-file SQLite dialect.
#[derive(Debug, Clone, Copy)]
pub struct SqliteDialect {
    busy_timeout_ms: u32,
}

impl SqliteDialect {
    /// Dialect with the default busy timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    /// Override the per-connection busy timeout.
    #[must_use]
    pub const fn with_busy_timeout_ms(mut self, busy_timeout_ms: u32) -> Self {
        self.busy_timeout_ms = busy_timeout_ms;
        self
    }
}

impl Default for SqliteDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for SqliteDialect {
    type Manager = SqliteConnectionManager;

    fn manager(&self, settings: &ConnectionSettings) -> Result<SqliteConnectionManager> {
        let path = Path::new(&settings.database);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StoreError::connection)?;
            }
        }

        let busy_timeout_ms = self.busy_timeout_ms;
        Ok(SqliteConnectionManager::file(path).with_init(move |conn| {
            conn.execute_batch(&format!(
                "PRAGMA journal_mode = WAL;\
                 PRAGMA busy_timeout = {busy_timeout_ms};\
                 PRAGMA foreign_keys = ON;"
            ))
        }))
    }

    fn table_ddl(&self, meta: &EntityMetadata, table: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {table} \
             ({key} VARCHAR(255) PRIMARY KEY, {PAYLOAD_COLUMN} TEXT);",
            key = meta.key_column()
        )
    }

    fn columns(&self, meta: &EntityMetadata) -> Vec<&'static str> {
        vec![meta.key_column(), PAYLOAD_COLUMN]
    }

    fn upsert<E>(
        &self,
        meta: &EntityMetadata,
        table: &str,
        key: &str,
        entity: &E,
    ) -> Result<Statement>
    where
        E: Entity + Serialize,
    {
        let payload = serde_json::to_string(entity).map_err(StoreError::serialization)?;
        StatementBuilder::table(table)
            .insert_or_replace(&[meta.key_column(), PAYLOAD_COLUMN])
            .bind(key)
            .bind(payload)
            .build()
    }

    fn execute(&self, conn: &mut Connection, statement: &Statement) -> Result<u64> {
        let affected = conn
            .execute(&statement.sql, params_from_iter(statement.params.iter()))
            .map_err(StoreError::query)?;
        Ok(affected as u64)
    }

    fn query(&self, conn: &mut Connection, statement: &Statement) -> Result<Vec<SqlRow>> {
        let mut prepared = conn.prepare(&statement.sql).map_err(StoreError::query)?;
        let columns: Vec<String> = prepared
            .column_names()
            .iter()
            .map(ToString::to_string)
            .collect();

        let mut rows = prepared
            .query(params_from_iter(statement.params.iter()))
            .map_err(StoreError::query)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(StoreError::query)? {
            let mut values = Vec::with_capacity(columns.len());
            for index in 0..columns.len() {
                let value: DriverValue = row.get(index).map_err(StoreError::query)?;
                values.push(value_from_rusqlite(value));
            }
            out.push(SqlRow::new(columns.clone(), values));
        }
        Ok(out)
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Owned(DriverValue::Null),
            Self::Integer(value) => ToSqlOutput::Owned(DriverValue::Integer(*value)),
            Self::Real(value) => ToSqlOutput::Owned(DriverValue::Real(*value)),
            Self::Text(value) => ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes())),
            Self::Bool(value) => ToSqlOutput::Owned(DriverValue::Integer(i64::from(*value))),
            Self::Blob(value) => ToSqlOutput::Borrowed(ValueRef::Blob(value)),
        })
    }
}

fn value_from_rusqlite(value: DriverValue) -> SqlValue {
    match value {
        DriverValue::Null => SqlValue::Null,
        DriverValue::Integer(value) => SqlValue::Integer(value),
        DriverValue::Real(value) => SqlValue::Real(value),
        DriverValue::Text(value) => SqlValue::Text(value),
        DriverValue::Blob(value) => SqlValue::Blob(value),
    }
}

/// Row mapper that deserializes the JSON payload column.
///
/// The natural mapper for engines running this dialect: the stored row is
/// `(key, payload)`, so the entity comes back out of the payload alone.
#[must_use]
pub fn payload_mapper<E>() -> RowMapper<E>
where
    E: DeserializeOwned + 'static,
{
    Arc::new(|row| row.json(PAYLOAD_COLUMN))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
