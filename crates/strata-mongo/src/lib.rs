//! # strata-mongo
//!
//! Document-store adapter of the strata persistence bridge: the CRUD
//! contract over a typed MongoDB collection. Upsert is a replace-one
//! with upsert enabled; identity is a configurable document field
//! (default `_id`). TTLs are accepted and ignored, as on the relational
//! backends.

pub mod store;

pub use store::{DEFAULT_ID_FIELD, MongoStore};
