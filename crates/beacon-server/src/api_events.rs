//! Event API handlers: save, query, and latest-per-device.
//!
//! Every operation answers with the platform's response envelope
//! `{retCode, description, data}`. HTTP transport succeeds even when the
//! operation fails; error semantics live in `retCode`. Each operation
//! resolves exactly once, and store connections are acquired inside the
//! blocking closure so they return to the pool on every exit path.

use crate::{validate, AppState};
use axum::{extract::Extension, extract::Query, Json};
use beacon_events::{find_events, latest_event_for_device, save_event, ConditionSet};
use beacon_notify::EventAlert;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Envelope code for schema/validation failures.
pub const CODE_VALIDATION: i64 = 200001;
/// Envelope code for connection-class failures (pool exhausted, store or
/// counter unreachable).
pub const CODE_CONNECTION: i64 = beacon_events::CODE_CONNECTION;
/// Envelope code for store read/write failures.
pub const CODE_STORE: i64 = beacon_events::CODE_STORE;

/// The uniform response envelope of the event service.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub ret_code: i64,
    pub description: String,
    pub data: serde_json::Value,
}

impl Envelope {
    pub fn success(data: serde_json::Value) -> Self {
        Self {
            ret_code: 200,
            description: "Success.".to_string(),
            data,
        }
    }

    pub fn error(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            ret_code: code,
            description: message.clone(),
            data: json!({ "code": code, "message": message }),
        }
    }
}

fn store_error_envelope(error: &beacon_events::EventStoreError) -> Envelope {
    Envelope::error(error.code(), error.to_string())
}

/// Handler for `POST /api/events` (saveEvent).
///
/// Validates the record, spawns notification dispatch for qualifying
/// levels, and persists the event with its store-assigned sequence index.
/// The response is sent once persistence completes and never waits on the
/// notification pipeline.
pub async fn save_event_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> Json<Envelope> {
    let record = match validate::validate_save_event(&payload) {
        Ok(record) => record,
        Err(message) => {
            tracing::debug!(%message, "save event validation failed");
            return Json(Envelope::error(CODE_VALIDATION, message));
        }
    };

    // Fire-and-forget: the dispatcher checks the threshold and runs in a
    // detached task that the save acknowledgment never waits on.
    state.dispatcher.spawn_dispatch(EventAlert {
        device_uuid: record.device_uuid.clone(),
        event_level: record.event_level,
        event_description: record.event_description.clone(),
    });

    let pool = state.pool.clone();
    let saved = tokio::task::spawn_blocking(move || {
        let conn = pool
            .get()
            .map_err(|e| Envelope::error(CODE_CONNECTION, e.to_string()))?;
        save_event(&conn, &record).map_err(|e| store_error_envelope(&e))
    })
    .await;

    Json(match saved {
        Ok(Ok(record)) => {
            tracing::info!(index = record.index, device_uuid = %record.device_uuid, "event saved");
            Envelope::success(json!({}))
        }
        Ok(Err(envelope)) => envelope,
        Err(join_error) => Envelope::error(CODE_STORE, join_error.to_string()),
    })
}

/// Handler for `POST /api/events/query` (getEvent).
///
/// Accepts the declarative condition set, executes the translated read,
/// and returns records in normalized (descending index) order.
pub async fn get_events_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> Json<Envelope> {
    let cond: ConditionSet = match serde_json::from_value(payload) {
        Ok(cond) => cond,
        Err(e) => {
            tracing::debug!(error = %e, "event query validation failed");
            return Json(Envelope::error(
                CODE_VALIDATION,
                format!("malformed query conditions: {e}"),
            ));
        }
    };

    let pool = state.pool.clone();
    let found = tokio::task::spawn_blocking(move || {
        let conn = pool
            .get()
            .map_err(|e| Envelope::error(CODE_CONNECTION, e.to_string()))?;
        find_events(&conn, &cond).map_err(|e| store_error_envelope(&e))
    })
    .await;

    Json(match found {
        Ok(Ok(records)) => Envelope::success(serde_json::Value::Array(records)),
        Ok(Err(envelope)) => envelope,
        Err(join_error) => Envelope::error(CODE_STORE, join_error.to_string()),
    })
}

/// Query parameters for `GET /api/events/latest`.
#[derive(Debug, Deserialize)]
pub struct LatestQuery {
    #[serde(rename = "userUuid")]
    pub user_uuid: Option<String>,
}

/// Handler for `GET /api/events/latest` (getLatestEvent).
///
/// Resolves the user's devices through the registry, then issues one
/// bounded descending read per device, aggregating results in device
/// input order. Devices without events, and devices whose read fails,
/// are skipped. A registry failure yields an empty result, not an error,
/// and never touches the store.
pub async fn latest_events_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<LatestQuery>,
) -> Json<Envelope> {
    let user_uuid = match params.user_uuid.filter(|u| !u.is_empty()) {
        Some(uuid) => uuid,
        None => {
            return Json(Envelope::error(
                CODE_VALIDATION,
                "missing or invalid fields: userUuid",
            ))
        }
    };

    let devices = match state.registry.devices_for_user(&user_uuid).await {
        Ok(devices) => devices,
        Err(error) => {
            tracing::warn!(%user_uuid, %error, "device registry lookup failed, returning no events");
            Vec::new()
        }
    };

    if devices.is_empty() {
        return Json(Envelope::success(json!([])));
    }

    let pool = state.pool.clone();
    let gathered = tokio::task::spawn_blocking(move || {
        let conn = pool
            .get()
            .map_err(|e| Envelope::error(CODE_CONNECTION, e.to_string()))?;

        let mut latest = Vec::new();
        // Per-device failures are not fatal to the aggregation.
        for device in &devices {
            match latest_event_for_device(&conn, &device.user_id, &device.uuid) {
                Ok(Some(record)) => match serde_json::to_value(&record) {
                    Ok(value) => latest.push(value),
                    Err(error) => {
                        tracing::debug!(device_uuid = %device.uuid, %error, "skipping device after serialization error");
                    }
                },
                Ok(None) => {}
                Err(error) => {
                    tracing::debug!(device_uuid = %device.uuid, %error, "skipping device after read error");
                }
            }
        }
        Ok(serde_json::Value::Array(latest))
    })
    .await;

    Json(match gathered {
        Ok(Ok(data)) => Envelope::success(data),
        Ok(Err(envelope)) => envelope,
        Err(join_error) => Envelope::error(CODE_STORE, join_error.to_string()),
    })
}
