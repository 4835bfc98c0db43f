//! Error taxonomy shared by every storage backend.
//!
//! [`StoreError`] is the single error type returned across the CRUD
//! contract. Backends fold driver failures into the matching taxonomy
//! variant via the constructor helpers, so callers can match on the kind
//! of failure without knowing which backend served the call.
//!
//! Per-call failures always reach the caller as a typed error. No
//! operation swallows a failure into an absent or empty result; absence
//! is `Ok(None)` / `Ok(vec![])`, never an error in disguise.

use thiserror::Error;

/// Boxed source error carried inside taxonomy variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Schema derivation failed: no primary-key field, more than one, or an
    /// unmappable column. Fatal at engine construction.
    #[error("schema error: {0}")]
    Schema(String),

    /// Connection failure: pool exhausted, checkout timeout, or the backend
    /// refused the connection.
    #[error("connection error: {0}")]
    Connection(#[source] BoxError),

    /// The backend rejected statement execution.
    #[error("query execution failed: {0}")]
    Query(#[source] BoxError),

    /// Row-to-entity mapping or payload encode/decode failure.
    #[error("serialization error: {0}")]
    Serialization(#[source] BoxError),

    /// Operation on an engine that has been closed.
    #[error("store is closed")]
    Closed,

    /// Contract operation this backend cannot satisfy.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Worker-pool failure or broken internal invariant.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Wrap a driver error as a connection failure.
    pub fn connection(source: impl Into<BoxError>) -> Self {
        Self::Connection(source.into())
    }

    /// Wrap a driver error as a query execution failure.
    pub fn query(source: impl Into<BoxError>) -> Self {
        Self::Query(source.into())
    }

    /// Wrap an encode/decode or row-mapping error.
    pub fn serialization(source: impl Into<BoxError>) -> Self {
        Self::Serialization(source.into())
    }

    /// A schema derivation failure with the given message.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// An internal invariant failure with the given message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// The taxonomy member this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Schema(_) => ErrorKind::Schema,
            Self::Connection(_) => ErrorKind::Connection,
            Self::Query(_) => ErrorKind::Query,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Closed => ErrorKind::Closed,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Coarse failure classification, one member per taxonomy variant.
///
/// Useful where callers only care which kind of failure occurred, e.g.
/// when asserting that a non-blocking call fails the same way as its
/// blocking counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Schema derivation failure.
    Schema,
    /// Connection or pool failure.
    Connection,
    /// Statement execution failure.
    Query,
    /// Mapping or encode/decode failure.
    Serialization,
    /// Engine already closed.
    Closed,
    /// Operation not supported by the backend.
    Unsupported,
    /// Internal invariant failure.
    Internal,
}

/// Convenience alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
