//! Entity metadata derivation and the process-wide schema registry.
//!
//! The declarative replacement for runtime field reflection: an entity
//! names its persistent fields once via [`Entity::fields`], and
//! [`describe`] turns the declaration into cached [`EntityMetadata`].
//! Declaration order fixes column order; derivation is deterministic, so
//! repeated calls for the same type yield identical column lists (and the
//! same `Arc`). The registry is keyed by [`TypeId`] and lives for the
//! process lifetime; concurrent first calls for a type are serialized on
//! the registry shard, so exactly one derivation wins.

use std::any::TypeId;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use strata_core::{Result, StoreError};

use crate::value::SqlValue;

/// Semantic storage type of a persistent field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Character data, stored as `VARCHAR(255)`.
    Text,
    /// 32-bit integer, stored as `INT`.
    Int32,
    /// 64-bit integer, stored as `BIGINT`.
    Int64,
    /// Boolean, stored as `BOOLEAN`.
    Bool,
    /// 64-bit float, stored as `DOUBLE`.
    Float64,
    /// 32-bit float, stored as `FLOAT`.
    Float32,
    /// Anything else, stored as `TEXT`. A safe fallback, not lossless for
    /// structured values.
    Other,
}

impl FieldKind {
    /// The fixed semantic-type → SQL-type mapping.
    #[must_use]
    pub const fn sql_type(self) -> &'static str {
        match self {
            Self::Text => "VARCHAR(255)",
            Self::Int32 => "INT",
            Self::Int64 => "BIGINT",
            Self::Bool => "BOOLEAN",
            Self::Float64 => "DOUBLE",
            Self::Float32 => "FLOAT",
            Self::Other => "TEXT",
        }
    }
}

/// Declarative description of one persistent field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Storage column name.
    pub column: &'static str,
    /// Semantic storage type.
    pub kind: FieldKind,
    /// Explicit SQL type; wins over the [`FieldKind`] mapping when set.
    pub sql_type: Option<&'static str>,
    /// Whether this field is the primary key.
    pub primary_key: bool,
}

impl FieldSpec {
    /// A plain field stored under `column`.
    #[must_use]
    pub const fn new(column: &'static str, kind: FieldKind) -> Self {
        Self {
            column,
            kind,
            sql_type: None,
            primary_key: false,
        }
    }

    /// Mark this field as the primary key.
    #[must_use]
    pub const fn primary(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Override the derived SQL type.
    #[must_use]
    pub const fn with_sql_type(mut self, sql_type: &'static str) -> Self {
        self.sql_type = Some(sql_type);
        self
    }
}

/// A type persistable by the relational engine.
///
/// The field table replaces reflective field scanning: declaration order
/// fixes column order, and [`values`](Self::values) must yield parameter
/// values in the same order.
pub trait Entity: Send + Sync + 'static {
    /// Stable type identifier used in diagnostics.
    const TYPE_NAME: &'static str;

    /// Persistent fields in declaration order.
    fn fields() -> &'static [FieldSpec];

    /// Field values, parallel to [`fields`](Self::fields).
    fn values(&self) -> Vec<SqlValue>;
}

/// One column definition inside [`EntityMetadata`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name, verbatim from the field table.
    pub name: &'static str,
    /// Resolved SQL type.
    pub sql_type: &'static str,
    /// Whether the column is the primary key.
    pub primary_key: bool,
}

/// Ordered column list and primary-key identity for one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMetadata {
    /// Entity type identifier.
    pub type_name: &'static str,
    /// Columns in field declaration order.
    pub columns: Vec<ColumnDef>,
    key_index: usize,
}

impl EntityMetadata {
    /// Name of the primary-key column.
    #[must_use]
    pub fn key_column(&self) -> &'static str {
        self.columns[self.key_index].name
    }

    /// Column names in declaration order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.name).collect()
    }
}

static REGISTRY: LazyLock<DashMap<TypeId, Arc<EntityMetadata>>> = LazyLock::new(DashMap::new);

/// Derive (or recall) the cached metadata for `E`.
///
/// Fails with a schema error when the entity declares no primary-key
/// field, or more than one. The first successful derivation per type
/// populates the process-wide registry; every later call returns the
/// same `Arc`.
pub fn describe<E: Entity>() -> Result<Arc<EntityMetadata>> {
    match REGISTRY.entry(TypeId::of::<E>()) {
        Entry::Occupied(hit) => Ok(Arc::clone(hit.get())),
        Entry::Vacant(slot) => {
            let meta = Arc::new(derive::<E>()?);
            let _ = slot.insert(Arc::clone(&meta));
            Ok(meta)
        }
    }
}

fn derive<E: Entity>() -> Result<EntityMetadata> {
    let fields = E::fields();
    if fields.is_empty() {
        return Err(StoreError::schema(format!(
            "entity `{}` declares no persistent fields",
            E::TYPE_NAME
        )));
    }

    let mut columns = Vec::with_capacity(fields.len());
    let mut key_index = None;
    for (index, field) in fields.iter().enumerate() {
        if field.primary_key {
            if key_index.is_some() {
                return Err(StoreError::schema(format!(
                    "entity `{}` declares more than one primary-key field",
                    E::TYPE_NAME
                )));
            }
            key_index = Some(index);
        }
        columns.push(ColumnDef {
            name: field.column,
            sql_type: field.sql_type.unwrap_or(field.kind.sql_type()),
            primary_key: field.primary_key,
        });
    }

    let Some(key_index) = key_index else {
        return Err(StoreError::schema(format!(
            "entity `{}` declares no primary-key field",
            E::TYPE_NAME
        )));
    };

    Ok(EntityMetadata {
        type_name: E::TYPE_NAME,
        columns,
        key_index,
    })
}

/// Idempotent provisioning DDL for `meta` against `table`.
///
/// Safe to execute repeatedly and from concurrent engine constructions:
/// `CREATE TABLE IF NOT EXISTS` is a no-op once the table exists.
#[must_use]
pub fn create_table_ddl(meta: &EntityMetadata, table: &str) -> String {
    let columns = meta
        .columns
        .iter()
        .map(|column| {
            if column.primary_key {
                format!("{} {} PRIMARY KEY", column.name, column.sql_type)
            } else {
                format!("{} {}", column.name, column.sql_type)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE IF NOT EXISTS {table} ({columns});")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
