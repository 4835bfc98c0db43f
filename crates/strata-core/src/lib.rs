//! # strata-core
//!
//! The shared contract of the strata persistence bridge: one
//! create/read/update/delete surface exposed identically over
//! heterogeneous storage backends.
//!
//! This crate carries everything the backend adapters have in common:
//!
//! - [`SyncStore`] / [`AsyncStore`] — the blocking and non-blocking CRUD
//!   contracts every backend satisfies.
//! - [`StoreError`] — the single failure taxonomy callers match on.
//! - [`ConnectionSettings`] — the connection descriptor adapters consume,
//!   with per-backend URL derivations.
//! - [`AsyncFacade`] — wraps any blocking store behind the async contract
//!   by dispatching onto the runtime's bounded blocking worker pool.
//!
//! Backend adapters live in sibling crates: `strata-sql` (the relational
//! engine), `strata-redis`, `strata-mongo`, and `strata-file`.

pub mod error;
pub mod facade;
pub mod settings;
pub mod store;

pub use error::{BoxError, ErrorKind, Result, StoreError};
pub use facade::AsyncFacade;
pub use settings::ConnectionSettings;
pub use store::{AsyncStore, SyncStore};
