//! Durable sequence allocation.
//!
//! Counters live in the `sequence_counters` table, one row per named
//! namespace, created lazily on first use. Allocation is a single atomic
//! upsert-returning statement: two concurrent callers can never observe
//! the same value, and the counter survives process restarts without
//! reusing values.

use rusqlite::Connection;

use crate::error::EventStoreError;

/// The sequence namespace used for event records.
pub const EVENT_SEQUENCE: &str = "event";

/// Allocates and returns the next value of the named sequence.
///
/// Values are strictly increasing per namespace, starting at 1. The
/// increment and read happen in one statement, so the total order holds
/// under concurrent callers.
///
/// # Errors
///
/// Returns `EventStoreError::SequenceUnavailable` if the counter table
/// cannot be read or advanced. Callers must not persist a record without
/// a successfully allocated value.
pub fn next_index(conn: &Connection, namespace: &str) -> Result<i64, EventStoreError> {
    conn.query_row(
        "INSERT INTO sequence_counters (name, current) VALUES (?1, 1)
         ON CONFLICT(name) DO UPDATE SET current = current + 1
         RETURNING current",
        [namespace],
        |row| row.get(0),
    )
    .map_err(EventStoreError::SequenceUnavailable)
}
