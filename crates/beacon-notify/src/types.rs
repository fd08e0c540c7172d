//! Device registry record types.

use serde::{Deserialize, Serialize};

/// Name of the owner setting that holds the push credential.
pub const NOTIFICATION_KEY_SETTING: &str = "gcm_token";

/// One entry of a registry record's settings list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSetting {
    pub name: String,
    pub value: String,
}

/// A device (or owner) record as returned by the device registry.
///
/// Owners are themselves registry records; an owner's `settings` list may
/// carry the push credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceInfo {
    pub uuid: String,
    /// The owning user's identifier.
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub settings: Vec<DeviceSetting>,
}

impl DeviceInfo {
    /// Scans the settings list for the push credential.
    ///
    /// Absence is a valid state, not an error.
    pub fn notification_key(&self) -> Option<&str> {
        self.settings
            .iter()
            .find(|setting| setting.name == NOTIFICATION_KEY_SETTING)
            .map(|setting| setting.value.as_str())
    }
}
