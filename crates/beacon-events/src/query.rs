//! Declarative query-condition translation.
//!
//! A request-scoped [`ConditionSet`] (`select` / `where` / `between` /
//! `limit`) is turned into a [`QueryPlan`]: parameterised WHERE clauses,
//! a sort polarity over the sequence index, a bounded limit, and an
//! optional projection. [`translate`] is pure — it never touches the
//! store — so the whole filter DSL is testable in isolation.

use serde::Deserialize;

use crate::error::EventStoreError;

/// Default result bound when the request carries no usable `limit`.
pub const DEFAULT_LIMIT: i64 = 10;

/// Comparison operators accepted in `where` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    Eq,
    Gte,
    Gt,
    Lte,
    Lt,
    Ne,
    In,
}

/// A single `where` entry: `key <op> value`.
#[derive(Debug, Clone, Deserialize)]
pub struct WhereClause {
    pub key: String,
    pub value: serde_json::Value,
    pub op: Comparator,
}

/// A closed-range entry: `low <= key <= high`.
///
/// The wire shape is `{"key": ..., "value": [low, high]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct BetweenClause {
    pub key: String,
    pub value: [serde_json::Value; 2],
}

/// The declarative condition set describing one query.
///
/// Constructed per request and discarded; all fields are optional on the
/// wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConditionSet {
    /// Field names to project in the result, empty = all fields.
    pub select: Vec<String>,
    #[serde(rename = "where")]
    pub where_: Vec<WhereClause>,
    pub between: Vec<BetweenClause>,
    pub limit: Option<i64>,
}

/// Sort polarity over the sequence index used for the underlying read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// The store-native plan produced from a [`ConditionSet`].
#[derive(Debug)]
pub struct QueryPlan {
    /// Parameterised WHERE fragments, joined with AND.
    pub clauses: Vec<String>,
    /// Bind values, in clause order.
    pub params: Vec<rusqlite::types::Value>,
    /// Sort polarity for the underlying read. Ascending reads are
    /// reversed post-read by the store so callers always observe
    /// descending index order.
    pub sort: SortDirection,
    /// Result bound, always applied.
    pub limit: i64,
    /// External field names to project, `None` = all fields.
    pub projection: Option<Vec<String>>,
}

/// External field name -> column mapping for the event record.
///
/// Filter and projection keys must come from this whitelist; nothing
/// caller-supplied is ever interpolated into SQL as an identifier.
const FIELD_COLUMNS: &[(&str, &str)] = &[
    ("index", "idx"),
    ("userUuid", "user_uuid"),
    ("ownerUuid", "owner_uuid"),
    ("deviceUuid", "device_uuid"),
    ("deviceName", "device_name"),
    ("deviceType", "device_type"),
    ("eventTag", "event_tag"),
    ("eventLevel", "event_level"),
    ("eventDescription", "event_description"),
    ("handled", "handled"),
    ("timestamp", "timestamp"),
];

fn column_for(key: &str) -> Result<&'static str, EventStoreError> {
    FIELD_COLUMNS
        .iter()
        .find(|(field, _)| *field == key)
        .map(|(_, column)| *column)
        .ok_or_else(|| EventStoreError::UnknownField(key.to_string()))
}

/// Converts a scalar JSON filter value into a bindable SQLite value.
fn bind_scalar(
    key: &str,
    value: &serde_json::Value,
) -> Result<rusqlite::types::Value, EventStoreError> {
    match value {
        serde_json::Value::Null => Ok(rusqlite::types::Value::Null),
        serde_json::Value::Bool(b) => Ok(rusqlite::types::Value::Integer(i64::from(*b))),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(rusqlite::types::Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(rusqlite::types::Value::Real(f))
            } else {
                Err(EventStoreError::InvalidFilterValue {
                    key: key.to_string(),
                    detail: format!("unrepresentable number {n}"),
                })
            }
        }
        serde_json::Value::String(s) => Ok(rusqlite::types::Value::Text(s.clone())),
        other => Err(EventStoreError::InvalidFilterValue {
            key: key.to_string(),
            detail: format!("expected a scalar, got {other}"),
        }),
    }
}

/// Translates a condition set into a store-native [`QueryPlan`].
///
/// Translation rules, in order:
/// - `eq` adds an exact-match clause.
/// - `gte`/`gt` add a lower bound and flip the sort to ascending index;
///   `lte`/`lt` add an upper bound and flip it to descending.
/// - `ne` and `in` add clauses without touching the sort.
/// - `between` entries add closed-range clauses, independent of `where`.
/// - `limit` defaults to 10 when absent or non-positive.
/// - A non-empty `select` becomes the projection (the `id` identity field
///   is always included by the store).
///
/// When several comparison operators appear, the last one in request
/// order decides the sort direction. Without any comparison operator the
/// sort is descending (most recent first).
///
/// # Errors
///
/// Returns `EventStoreError::UnknownField` for filter or projection keys
/// outside the event record, and `EventStoreError::InvalidFilterValue`
/// for values that cannot be bound.
pub fn translate(cond: &ConditionSet) -> Result<QueryPlan, EventStoreError> {
    let mut clauses = Vec::new();
    let mut params = Vec::new();
    let mut sort = SortDirection::Descending;

    for entry in &cond.where_ {
        let column = column_for(&entry.key)?;
        match entry.op {
            Comparator::Eq => {
                clauses.push(format!("{column} = ?"));
                params.push(bind_scalar(&entry.key, &entry.value)?);
            }
            Comparator::Gte => {
                clauses.push(format!("{column} >= ?"));
                params.push(bind_scalar(&entry.key, &entry.value)?);
                sort = SortDirection::Ascending;
            }
            Comparator::Gt => {
                clauses.push(format!("{column} > ?"));
                params.push(bind_scalar(&entry.key, &entry.value)?);
                sort = SortDirection::Ascending;
            }
            Comparator::Lte => {
                clauses.push(format!("{column} <= ?"));
                params.push(bind_scalar(&entry.key, &entry.value)?);
                sort = SortDirection::Descending;
            }
            Comparator::Lt => {
                clauses.push(format!("{column} < ?"));
                params.push(bind_scalar(&entry.key, &entry.value)?);
                sort = SortDirection::Descending;
            }
            Comparator::Ne => {
                clauses.push(format!("{column} <> ?"));
                params.push(bind_scalar(&entry.key, &entry.value)?);
            }
            Comparator::In => match &entry.value {
                serde_json::Value::Array(items) if items.is_empty() => {
                    // Membership in the empty set matches nothing.
                    clauses.push("1 = 0".to_string());
                }
                serde_json::Value::Array(items) => {
                    let placeholders = vec!["?"; items.len()].join(", ");
                    clauses.push(format!("{column} IN ({placeholders})"));
                    for item in items {
                        params.push(bind_scalar(&entry.key, item)?);
                    }
                }
                // A bare scalar is treated as a one-element set.
                scalar => {
                    clauses.push(format!("{column} IN (?)"));
                    params.push(bind_scalar(&entry.key, scalar)?);
                }
            },
        }
    }

    for entry in &cond.between {
        let column = column_for(&entry.key)?;
        clauses.push(format!("{column} >= ? AND {column} <= ?"));
        params.push(bind_scalar(&entry.key, &entry.value[0])?);
        params.push(bind_scalar(&entry.key, &entry.value[1])?);
    }

    let limit = match cond.limit {
        Some(n) if n > 0 => n,
        _ => DEFAULT_LIMIT,
    };

    let projection = if cond.select.is_empty() {
        None
    } else {
        for key in &cond.select {
            column_for(key)?;
        }
        Some(cond.select.clone())
    };

    Ok(QueryPlan {
        clauses,
        params,
        sort,
        limit,
        projection,
    })
}
