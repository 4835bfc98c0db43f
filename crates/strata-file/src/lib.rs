//! # strata-file
//!
//! Flat-file adapters of the strata persistence bridge: read-only
//! snapshot stores over JSON and YAML files holding a `{ key: value }`
//! map. The file is read eagerly at open (and on explicit reload) and
//! served from memory; mutating operations fail with a typed
//! `Unsupported` error rather than pretending to write.

pub mod json;
pub mod yaml;

pub use json::JsonFileStore;
pub use yaml::YamlFileStore;
