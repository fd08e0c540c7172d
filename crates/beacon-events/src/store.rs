//! Persistence operations for the event log.
//!
//! Writes go through [`save_event`], which allocates the next value of
//! the durable `"event"` sequence and inserts the record in a single
//! transaction. Reads go through [`find_events`], which executes the
//! translated plan as a bounded ordered query and normalizes the result
//! ordering, and [`latest_event_for_device`], the limit-1 read used by
//! the latest-event aggregation.

use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};

use crate::error::EventStoreError;
use crate::query::{translate, ConditionSet, SortDirection};
use crate::record::{EventRecord, NewEvent};
use crate::sequence::{next_index, EVENT_SEQUENCE};

const RECORD_COLUMNS: &str = "id, idx, user_uuid, owner_uuid, device_uuid, device_name, \
     device_type, event_tag, event_level, event_description, handled, timestamp";

fn row_to_record(row: &Row<'_>) -> Result<EventRecord, rusqlite::Error> {
    Ok(EventRecord {
        id: row.get(0)?,
        index: row.get(1)?,
        user_uuid: row.get(2)?,
        owner_uuid: row.get(3)?,
        device_uuid: row.get(4)?,
        device_name: row.get(5)?,
        device_type: row.get(6)?,
        event_tag: row.get(7)?,
        event_level: row.get(8)?,
        event_description: row.get(9)?,
        handled: row.get(10)?,
        timestamp: row.get(11)?,
    })
}

/// Persists a new event record.
///
/// The sequence allocation and the insert run inside one transaction: the
/// record is durably written with its `index` assigned exactly once, and
/// no record is ever persisted without a valid sequence value. The
/// `handled` flag and `timestamp` take their store defaults.
///
/// # Errors
///
/// Returns `EventStoreError::SequenceUnavailable` if the counter cannot
/// be advanced and `EventStoreError::Write` for insert failures
/// (including an index conflict, which indicates counter state behind the
/// stored maximum).
pub fn save_event(conn: &Connection, event: &NewEvent) -> Result<EventRecord, EventStoreError> {
    let tx = conn
        .unchecked_transaction()
        .map_err(EventStoreError::Write)?;

    let index = next_index(&tx, EVENT_SEQUENCE)?;
    tracing::debug!(index, device_uuid = %event.device_uuid, "allocated event sequence value");

    let record = tx
        .query_row(
            &format!(
                "INSERT INTO events
                    (idx, user_uuid, owner_uuid, device_uuid, device_name,
                     device_type, event_tag, event_level, event_description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 RETURNING {RECORD_COLUMNS}"
            ),
            params![
                index,
                event.user_uuid,
                event.owner_uuid,
                event.device_uuid,
                event.device_name,
                event.device_type,
                event.event_tag,
                event.event_level,
                event.event_description,
            ],
            row_to_record,
        )
        .map_err(EventStoreError::Write)?;

    tx.commit().map_err(EventStoreError::Write)?;

    Ok(record)
}

/// Executes a filtered, sorted, bounded read over the event log.
///
/// The condition set is translated into a parameterised query; the read
/// never returns more than the plan's limit. When the plan sorted
/// ascending (a lower-bound operator was present), the result set is
/// reversed before being returned, so the externally observed order is
/// always descending by `index`. With a non-empty `select`, each returned
/// object carries exactly those fields plus the `id` identity field.
///
/// # Errors
///
/// Returns translation errors from [`translate`] and
/// `EventStoreError::Read` for SQL failures.
pub fn find_events(
    conn: &Connection,
    cond: &ConditionSet,
) -> Result<Vec<serde_json::Value>, EventStoreError> {
    let plan = translate(cond)?;

    let mut sql = format!("SELECT {RECORD_COLUMNS} FROM events");
    if !plan.clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&plan.clauses.join(" AND "));
    }
    sql.push_str(match plan.sort {
        SortDirection::Ascending => " ORDER BY idx ASC",
        SortDirection::Descending => " ORDER BY idx DESC",
    });
    sql.push_str(" LIMIT ?");

    let limit_param = rusqlite::types::Value::Integer(plan.limit);
    let mut bind: Vec<&dyn ToSql> = plan.params.iter().map(|p| p as &dyn ToSql).collect();
    bind.push(&limit_param);

    let mut stmt = conn.prepare(&sql).map_err(EventStoreError::Read)?;
    let rows = stmt
        .query_map(bind.as_slice(), row_to_record)
        .map_err(EventStoreError::Read)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row.map_err(EventStoreError::Read)?);
    }

    // Ascending reads are an implementation detail of lower-bound
    // operators; callers always observe descending index order.
    if plan.sort == SortDirection::Ascending {
        records.reverse();
    }

    let mut results = Vec::with_capacity(records.len());
    for record in records {
        let mut value = serde_json::to_value(&record)?;
        if let Some(fields) = &plan.projection {
            if let serde_json::Value::Object(map) = &mut value {
                map.retain(|key, _| key == "id" || fields.iter().any(|f| f == key));
            }
        }
        results.push(value);
    }

    Ok(results)
}

/// Returns the most recent event for one device of one user, if any.
///
/// # Errors
///
/// Returns `EventStoreError::Read` for SQL failures.
pub fn latest_event_for_device(
    conn: &Connection,
    user_uuid: &str,
    device_uuid: &str,
) -> Result<Option<EventRecord>, EventStoreError> {
    conn.query_row(
        &format!(
            "SELECT {RECORD_COLUMNS} FROM events
             WHERE user_uuid = ?1 AND device_uuid = ?2
             ORDER BY idx DESC LIMIT 1"
        ),
        params![user_uuid, device_uuid],
        row_to_record,
    )
    .optional()
    .map_err(EventStoreError::Read)
}
