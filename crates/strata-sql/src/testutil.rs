//! Shared test fixtures.

use serde::{Deserialize, Serialize};
use strata_core::ConnectionSettings;

use crate::schema::{Entity, FieldKind, FieldSpec};
use crate::value::SqlValue;

/// The canonical test entity: a keyed person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Primary key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: i32,
}

impl Entity for Person {
    const TYPE_NAME: &'static str = "person";

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::new("id", FieldKind::Text).primary(),
            FieldSpec::new("name", FieldKind::Text),
            FieldSpec::new("age", FieldKind::Int32),
        ];
        FIELDS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.id.as_str().into(),
            self.name.as_str().into(),
            self.age.into(),
        ]
    }
}

/// Build a [`Person`].
pub fn person(id: &str, name: &str, age: i32) -> Person {
    Person {
        id: id.to_owned(),
        name: name.to_owned(),
        age,
    }
}

/// Settings pointing the single-file dialect at a database inside `dir`,
/// bound to the `person` table.
pub fn person_settings(dir: &tempfile::TempDir) -> ConnectionSettings {
    ConnectionSettings::new(
        "localhost",
        0,
        dir.path().join("person.db").to_string_lossy(),
        "root",
        "root",
        "person",
    )
}
