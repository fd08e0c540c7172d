//! Event record types and their wire-facing JSON mapping.
//!
//! External JSON uses the platform's camelCase field names; the stored
//! sequence value is exposed as `index`.

use serde::{Deserialize, Serialize};

/// Input fields for a new event, as supplied by the save operation.
///
/// The sequence `index`, `handled` flag, and `timestamp` are assigned by
/// the store at insert time and are deliberately absent here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub user_uuid: String,
    pub owner_uuid: String,
    pub device_uuid: String,
    pub device_name: String,
    pub device_type: String,
    pub event_tag: String,
    pub event_level: i64,
    pub event_description: String,
}

/// A stored event row.
///
/// Append-only: once written, a record is never updated or deleted by
/// this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Storage-level row identity.
    pub id: i64,
    /// Store-assigned sequence value, strictly increasing across all
    /// records in the `"event"` namespace.
    #[serde(rename = "index")]
    pub index: i64,
    pub user_uuid: String,
    pub owner_uuid: String,
    pub device_uuid: String,
    pub device_name: String,
    pub device_type: String,
    pub event_tag: String,
    pub event_level: i64,
    pub event_description: String,
    /// Whether the event has been acknowledged downstream. Defaults to
    /// false at insert time.
    pub handled: bool,
    /// Creation time, assigned by the store (`datetime('now')`).
    pub timestamp: String,
}
