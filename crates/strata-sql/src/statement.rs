//! Parameterized statement composition.
//!
//! Builds the select / upsert / delete text the engine executes. Table
//! and column names are taken verbatim from schema metadata, never from
//! untrusted input; every variable value is a positional `?` placeholder,
//! never an interpolated literal. Statements are ephemeral: built per
//! call, executed, and discarded.

use strata_core::{Result, StoreError};

use crate::value::SqlValue;

/// A finished statement: SQL text plus ordered parameter values.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Statement text with positional placeholders.
    pub sql: String,
    /// Parameter values, one per placeholder, in placeholder order.
    pub params: Vec<SqlValue>,
}

impl Statement {
    /// A statement with no parameters, e.g. provisioning DDL.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Select,
    ReplaceInto,
    InsertOrReplace,
    Delete,
}

/// Fluent builder for single-table CRUD statements.
#[derive(Debug)]
pub struct StatementBuilder {
    table: String,
    operation: Option<Operation>,
    columns: Vec<String>,
    predicate: Option<String>,
    params: Vec<SqlValue>,
}

impl StatementBuilder {
    /// Start a statement against `table` (name from schema metadata).
    #[must_use]
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            operation: None,
            columns: Vec::new(),
            predicate: None,
            params: Vec::new(),
        }
    }

    /// Select the given columns.
    #[must_use]
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.operation = Some(Operation::Select);
        self.columns = columns.iter().map(|&c| c.to_owned()).collect();
        self
    }

    /// Insert-overwriting-on-key-conflict via `REPLACE INTO`, one
    /// placeholder per column.
    #[must_use]
    pub fn replace_into(mut self, columns: &[&str]) -> Self {
        self.operation = Some(Operation::ReplaceInto);
        self.columns = columns.iter().map(|&c| c.to_owned()).collect();
        self
    }

    /// Insert-overwriting-on-key-conflict via `INSERT OR REPLACE INTO`,
    /// one placeholder per column.
    #[must_use]
    pub fn insert_or_replace(mut self, columns: &[&str]) -> Self {
        self.operation = Some(Operation::InsertOrReplace);
        self.columns = columns.iter().map(|&c| c.to_owned()).collect();
        self
    }

    /// Delete matching rows.
    #[must_use]
    pub fn delete(mut self) -> Self {
        self.operation = Some(Operation::Delete);
        self
    }

    /// Append a `WHERE` predicate fragment. The fragment must use
    /// positional placeholders only.
    #[must_use]
    pub fn filter(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    /// Bind the next positional parameter.
    #[must_use]
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Finalize the statement.
    ///
    /// Fails when no operation was chosen, when an operation that needs a
    /// column list has none, or when the number of `?` placeholders in the
    /// final text does not match the number of bound parameters.
    pub fn build(self) -> Result<Statement> {
        let operation = self
            .operation
            .ok_or_else(|| StoreError::query("statement finalized without an operation"))?;

        if self.columns.is_empty() && operation != Operation::Delete {
            return Err(StoreError::query(format!(
                "{operation:?} statement against `{}` has no columns",
                self.table
            )));
        }

        let columns = self.columns.join(", ");
        let mut sql = match operation {
            Operation::Select => format!("SELECT {columns} FROM {}", self.table),
            Operation::ReplaceInto => format!(
                "REPLACE INTO {} ({columns}) VALUES ({})",
                self.table,
                placeholders(self.columns.len())
            ),
            Operation::InsertOrReplace => format!(
                "INSERT OR REPLACE INTO {} ({columns}) VALUES ({})",
                self.table,
                placeholders(self.columns.len())
            ),
            Operation::Delete => format!("DELETE FROM {}", self.table),
        };
        if let Some(predicate) = &self.predicate {
            sql.push_str(" WHERE ");
            sql.push_str(predicate);
        }

        let expected = sql.matches('?').count();
        if expected != self.params.len() {
            return Err(StoreError::query(format!(
                "statement `{sql}` has {expected} placeholders but {} parameters",
                self.params.len()
            )));
        }

        Ok(Statement {
            sql,
            params: self.params,
        })
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
