//! Multi-column dialect for a networked MySQL backend.
//!
//! One column per entity field. Upsert is `REPLACE INTO`: insert, or
//! overwrite the row sharing the primary-key value. Row identity is the
//! primary-key column value carried inside the entity — the separate key
//! argument of the CRUD surface is not consulted here.

use mysql::prelude::Queryable;
use mysql::{Conn, Opts, OptsBuilder, Params, Row, Value};
use r2d2_mysql::MySqlConnectionManager;
use serde::Serialize;
use strata_core::{ConnectionSettings, Result, StoreError};

use crate::dialect::Dialect;
use crate::schema::{Entity, EntityMetadata, create_table_ddl};
use crate::statement::{Statement, StatementBuilder};
use crate::value::{SqlRow, SqlValue};

/// Multi-column MySQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    fn params(statement: &Statement) -> Params {
        if statement.params.is_empty() {
            Params::Empty
        } else {
            Params::Positional(statement.params.iter().cloned().map(Value::from).collect())
        }
    }
}

impl Dialect for MySqlDialect {
    type Manager = MySqlConnectionManager;

    fn manager(&self, settings: &ConnectionSettings) -> Result<MySqlConnectionManager> {
        let opts = Opts::from_url(&settings.sql_url()).map_err(StoreError::connection)?;
        let opts = OptsBuilder::from_opts(opts)
            .user(Some(settings.username.clone()))
            .pass(Some(settings.password.clone()));
        Ok(MySqlConnectionManager::new(opts))
    }

    fn table_ddl(&self, meta: &EntityMetadata, table: &str) -> String {
        create_table_ddl(meta, table)
    }

    fn columns(&self, meta: &EntityMetadata) -> Vec<&'static str> {
        meta.column_names()
    }

    fn upsert<E>(
        &self,
        meta: &EntityMetadata,
        table: &str,
        _key: &str,
        entity: &E,
    ) -> Result<Statement>
    where
        E: Entity + Serialize,
    {
        let values = entity.values();
        if values.len() != meta.columns.len() {
            return Err(StoreError::schema(format!(
                "entity `{}` yielded {} values for {} columns",
                meta.type_name,
                values.len(),
                meta.columns.len()
            )));
        }

        let mut builder = StatementBuilder::table(table).replace_into(&meta.column_names());
        for value in values {
            builder = builder.bind(value);
        }
        builder.build()
    }

    fn execute(&self, conn: &mut Conn, statement: &Statement) -> Result<u64> {
        conn.exec_drop(&statement.sql, Self::params(statement))
            .map_err(StoreError::query)?;
        Ok(conn.affected_rows())
    }

    fn query(&self, conn: &mut Conn, statement: &Statement) -> Result<Vec<SqlRow>> {
        let rows: Vec<Row> = conn
            .exec(&statement.sql, Self::params(statement))
            .map_err(StoreError::query)?;
        Ok(rows.into_iter().map(row_to_sql_row).collect())
    }
}

impl From<SqlValue> for Value {
    fn from(value: SqlValue) -> Self {
        match value {
            SqlValue::Null => Self::NULL,
            SqlValue::Integer(value) => Self::Int(value),
            SqlValue::Real(value) => Self::Double(value),
            SqlValue::Text(value) => Self::Bytes(value.into_bytes()),
            SqlValue::Bool(value) => Self::Int(i64::from(value)),
            SqlValue::Blob(value) => Self::Bytes(value),
        }
    }
}

fn value_from_mysql(value: Value) -> SqlValue {
    match value {
        Value::NULL => SqlValue::Null,
        Value::Int(value) => SqlValue::Integer(value),
        Value::UInt(value) => SqlValue::Integer(i64::try_from(value).unwrap_or(i64::MAX)),
        Value::Float(value) => SqlValue::Real(f64::from(value)),
        Value::Double(value) => SqlValue::Real(value),
        Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(text) => SqlValue::Text(text),
            Err(err) => SqlValue::Blob(err.into_bytes()),
        },
        // Temporal values come back as their SQL literal text.
        other => SqlValue::Text(other.as_sql(true).trim_matches('\'').to_owned()),
    }
}

fn row_to_sql_row(row: Row) -> SqlRow {
    let columns = row
        .columns_ref()
        .iter()
        .map(|column| column.name_str().into_owned())
        .collect();
    let values = row.unwrap().into_iter().map(value_from_mysql).collect();
    SqlRow::new(columns, values)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
