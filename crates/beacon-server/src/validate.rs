//! Request validation for the event operations.
//!
//! Mirrors the platform's schema contracts: a failed validation is
//! reported to the caller as-is and the operation never touches the
//! store.

use beacon_events::NewEvent;

/// Fields a save request must carry, with their expected JSON types.
const SAVE_EVENT_STRING_FIELDS: &[&str] = &[
    "userUuid",
    "ownerUuid",
    "deviceUuid",
    "deviceName",
    "deviceType",
    "eventTag",
    "eventDescription",
];

/// Validates a save-event payload and produces the typed record.
///
/// Every required string field must be present and a string; `eventLevel`
/// must be present and an integer. On failure the returned message names
/// every offending field.
pub fn validate_save_event(payload: &serde_json::Value) -> Result<NewEvent, String> {
    let Some(object) = payload.as_object() else {
        return Err("request body must be a JSON object".to_string());
    };

    let mut invalid = Vec::new();
    for field in SAVE_EVENT_STRING_FIELDS {
        if !object.get(*field).is_some_and(serde_json::Value::is_string) {
            invalid.push(*field);
        }
    }
    if !object.get("eventLevel").is_some_and(serde_json::Value::is_i64) {
        invalid.push("eventLevel");
    }

    if !invalid.is_empty() {
        return Err(format!(
            "missing or invalid fields: {}",
            invalid.join(", ")
        ));
    }

    serde_json::from_value(payload.clone()).map_err(|e| format!("malformed event record: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> serde_json::Value {
        json!({
            "userUuid": "u1",
            "ownerUuid": "o1",
            "deviceUuid": "d1",
            "deviceName": "Front Door",
            "deviceType": "sensor",
            "eventTag": "motion",
            "eventLevel": 2,
            "eventDescription": "motion detected"
        })
    }

    #[test]
    fn accepts_complete_payload() {
        let record = validate_save_event(&valid_payload()).expect("should validate");
        assert_eq!(record.device_uuid, "d1");
        assert_eq!(record.event_level, 2);
    }

    #[test]
    fn rejects_missing_fields_by_name() {
        let mut payload = valid_payload();
        payload.as_object_mut().unwrap().remove("deviceUuid");
        payload.as_object_mut().unwrap().remove("eventTag");

        let message = validate_save_event(&payload).expect_err("should fail");
        assert!(message.contains("deviceUuid"), "{message}");
        assert!(message.contains("eventTag"), "{message}");
    }

    #[test]
    fn rejects_non_integer_level() {
        let mut payload = valid_payload();
        payload["eventLevel"] = json!("high");

        let message = validate_save_event(&payload).expect_err("should fail");
        assert!(message.contains("eventLevel"), "{message}");
    }

    #[test]
    fn rejects_non_object_body() {
        assert!(validate_save_event(&json!([1, 2, 3])).is_err());
        assert!(validate_save_event(&json!(null)).is_err());
    }
}
