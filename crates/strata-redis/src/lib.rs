//! # strata-redis
//!
//! Cache-store adapter of the strata persistence bridge: the CRUD
//! contract over Redis, with JSON payloads and load-bearing TTLs.
//!
//! One contract operation is deliberately unsupported: the no-argument
//! `fetch_all`. A key-value cache has no table to scan — retrieval is
//! keyed on a prefix, which is a cache-specific extension
//! ([`RedisStore::fetch_all_with_prefix`]), not part of the generic
//! contract.

pub mod store;

pub use store::RedisStore;
