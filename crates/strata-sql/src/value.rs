//! Backend-neutral statement parameters and result rows.
//!
//! Dialects translate [`SqlValue`]s into their driver's parameter type and
//! surface query results as [`SqlRow`]s, so the engine and caller-supplied
//! row mappers never touch driver types.

use serde::de::DeserializeOwned;
use strata_core::{Result, StoreError};

/// A single statement parameter or result cell.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// Signed integer (`INT`, `BIGINT`).
    Integer(i64),
    /// Double-precision float (`FLOAT`, `DOUBLE`).
    Real(f64),
    /// Character data (`VARCHAR`, `TEXT`).
    Text(String),
    /// Boolean. Bound as `0`/`1` on backends without a native bool type.
    Bool(bool),
    /// Raw bytes (`BLOB`).
    Blob(Vec<u8>),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<f32> for SqlValue {
    fn from(value: f32) -> Self {
        Self::Real(f64::from(value))
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl<V> From<Option<V>> for SqlValue
where
    V: Into<SqlValue>,
{
    fn from(value: Option<V>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One result row surfaced by a dialect, decoupled from the driver.
///
/// Columns keep the order the statement selected them in. Accessors
/// fail with a serialization error on a missing column or a cell of the
/// wrong type.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlRow {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl SqlRow {
    /// Build a row from parallel column/value lists.
    #[must_use]
    pub fn new(columns: Vec<String>, values: Vec<SqlValue>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Number of columns in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The raw value stored under `column`.
    pub fn value(&self, column: &str) -> Result<&SqlValue> {
        self.columns
            .iter()
            .position(|name| name == column)
            .map(|index| &self.values[index])
            .ok_or_else(|| {
                StoreError::serialization(format!("no column named `{column}` in result row"))
            })
    }

    /// The cell under `column` as text.
    pub fn text(&self, column: &str) -> Result<String> {
        match self.value(column)? {
            SqlValue::Text(text) => Ok(text.clone()),
            SqlValue::Blob(bytes) => String::from_utf8(bytes.clone()).map_err(|_| {
                StoreError::serialization(format!("column `{column}` holds non-utf8 bytes"))
            }),
            other => Err(type_mismatch(column, "text", other)),
        }
    }

    /// The cell under `column` as a 64-bit integer.
    pub fn int64(&self, column: &str) -> Result<i64> {
        match self.value(column)? {
            SqlValue::Integer(value) => Ok(*value),
            other => Err(type_mismatch(column, "integer", other)),
        }
    }

    /// The cell under `column` as a 32-bit integer.
    pub fn int32(&self, column: &str) -> Result<i32> {
        let wide = self.int64(column)?;
        i32::try_from(wide).map_err(|_| {
            StoreError::serialization(format!("column `{column}` value {wide} overflows i32"))
        })
    }

    /// The cell under `column` as a boolean. Integer `0`/`1` cells coerce,
    /// matching backends that store booleans as integers.
    pub fn boolean(&self, column: &str) -> Result<bool> {
        match self.value(column)? {
            SqlValue::Bool(value) => Ok(*value),
            SqlValue::Integer(0) => Ok(false),
            SqlValue::Integer(1) => Ok(true),
            other => Err(type_mismatch(column, "boolean", other)),
        }
    }

    /// The cell under `column` as a 64-bit float. Integer cells coerce.
    pub fn float64(&self, column: &str) -> Result<f64> {
        match self.value(column)? {
            SqlValue::Real(value) => Ok(*value),
            SqlValue::Integer(value) => Ok(*value as f64),
            other => Err(type_mismatch(column, "float", other)),
        }
    }

    /// The cell under `column` as a 32-bit float.
    pub fn float32(&self, column: &str) -> Result<f32> {
        self.float64(column).map(|value| value as f32)
    }

    /// Deserialize the cell under `column` from a JSON payload.
    pub fn json<T: DeserializeOwned>(&self, column: &str) -> Result<T> {
        match self.value(column)? {
            SqlValue::Text(text) => {
                serde_json::from_str(text).map_err(StoreError::serialization)
            }
            SqlValue::Blob(bytes) => {
                serde_json::from_slice(bytes).map_err(StoreError::serialization)
            }
            other => Err(type_mismatch(column, "json payload", other)),
        }
    }
}

fn type_mismatch(column: &str, expected: &str, found: &SqlValue) -> StoreError {
    StoreError::serialization(format!(
        "column `{column}`: expected {expected}, found {found:?}"
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
