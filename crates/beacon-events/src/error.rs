//! Error types for the event log core.

use thiserror::Error;

/// Platform error code for connection-class failures (store or counter
/// unreachable).
pub const CODE_CONNECTION: i64 = 200005;

/// Platform error code for store read/write failures.
pub const CODE_STORE: i64 = 212000;

/// Errors that can occur during event log operations.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The durable sequence counter could not be read or advanced.
    /// A record must never be persisted without a valid sequence value.
    #[error("sequence counter unavailable: {0}")]
    SequenceUnavailable(#[source] rusqlite::Error),

    /// An event insert failed (including duplicate-index conflicts).
    #[error("event write failed: {0}")]
    Write(#[source] rusqlite::Error),

    /// An event query failed.
    #[error("event read failed: {0}")]
    Read(#[source] rusqlite::Error),

    /// A filter or projection referenced a field that is not part of the
    /// event record.
    #[error("unknown event field: {0}")]
    UnknownField(String),

    /// A filter value cannot be bound for the given key.
    #[error("unsupported filter value for '{key}': {detail}")]
    InvalidFilterValue {
        /// The filter key whose value was rejected.
        key: String,
        /// What made the value unusable.
        detail: String,
    },

    /// JSON serialization of a record failed.
    #[error("event serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EventStoreError {
    /// Maps the error onto the platform's numeric error code taxonomy.
    ///
    /// Counter/store unreachability is connection-class (200005); all
    /// read/write/translation failures are store-class (212000).
    pub fn code(&self) -> i64 {
        match self {
            Self::SequenceUnavailable(_) => CODE_CONNECTION,
            Self::Write(_)
            | Self::Read(_)
            | Self::UnknownField(_)
            | Self::InvalidFilterValue { .. }
            | Self::Serialization(_) => CODE_STORE,
        }
    }
}
