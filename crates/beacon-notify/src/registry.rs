//! Device registry client.
//!
//! The registry is reached over HTTP with the platform's
//! `{cmdName, cmdCode, parameters}` command envelope. One endpoint is
//! selected at random from the configured list per call.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Serialize;
use serde_json::json;

use crate::error::NotifyError;
use crate::types::DeviceInfo;

/// Resolves devices and owners in the platform's device registry.
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    /// Resolves a single registry record by uuid. `None` means the
    /// registry answered successfully but knows no such record.
    async fn get_device(&self, uuid: &str) -> Result<Option<DeviceInfo>, NotifyError>;

    /// Lists all devices owned by a user, in registry order.
    async fn devices_for_user(&self, user_uuid: &str) -> Result<Vec<DeviceInfo>, NotifyError>;
}

/// The command envelope sent to platform services.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Command<P: Serialize> {
    pub cmd_name: &'static str,
    pub cmd_code: &'static str,
    pub parameters: P,
}

/// The response envelope returned by platform services.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommandResponse {
    pub ret_code: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl CommandResponse {
    pub(crate) fn into_data(self) -> Result<serde_json::Value, NotifyError> {
        if self.ret_code == 200 {
            Ok(self.data)
        } else {
            Err(NotifyError::Remote {
                code: self.ret_code,
                message: self.description.unwrap_or_default(),
            })
        }
    }
}

/// Picks one endpoint at random, mirroring the platform's randomized
/// service selection.
pub(crate) fn pick_endpoint<'a>(
    endpoints: &'a [String],
    service: &'static str,
) -> Result<&'a str, NotifyError> {
    endpoints
        .choose(&mut rand::thread_rng())
        .map(String::as_str)
        .ok_or(NotifyError::NoEndpoint { service })
}

/// HTTP implementation of [`DeviceRegistry`].
#[derive(Debug, Clone)]
pub struct HttpDeviceRegistry {
    client: reqwest::Client,
    endpoints: Vec<String>,
}

impl HttpDeviceRegistry {
    pub fn new(endpoints: Vec<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints,
        }
    }

    async fn send_command<P: Serialize + Send>(
        &self,
        command: &Command<P>,
    ) -> Result<serde_json::Value, NotifyError> {
        let endpoint = pick_endpoint(&self.endpoints, "device_registry")?;
        let response: CommandResponse = self
            .client
            .post(endpoint)
            .json(command)
            .send()
            .await?
            .json()
            .await?;
        response.into_data()
    }
}

#[async_trait]
impl DeviceRegistry for HttpDeviceRegistry {
    async fn get_device(&self, uuid: &str) -> Result<Option<DeviceInfo>, NotifyError> {
        let data = self
            .send_command(&Command {
                cmd_name: "getDevice",
                cmd_code: "0003",
                parameters: json!({ "uuid": uuid }),
            })
            .await?;

        // The registry may answer with a single record or an array of
        // candidates; an array means "take the first".
        let record = match data {
            serde_json::Value::Null => None,
            serde_json::Value::Array(mut items) => {
                if items.is_empty() {
                    None
                } else {
                    Some(items.swap_remove(0))
                }
            }
            object => Some(object),
        };

        record
            .map(|value| serde_json::from_value(value).map_err(NotifyError::from))
            .transpose()
    }

    async fn devices_for_user(&self, user_uuid: &str) -> Result<Vec<DeviceInfo>, NotifyError> {
        let data = self
            .send_command(&Command {
                cmd_name: "getDevice",
                cmd_code: "0003",
                parameters: json!({ "userId": user_uuid }),
            })
            .await?;

        match data {
            serde_json::Value::Null => Ok(Vec::new()),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(|value| serde_json::from_value(value).map_err(NotifyError::from))
                .collect(),
            object => Ok(vec![serde_json::from_value(object)?]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_endpoint_on_empty_list_is_no_endpoint() {
        let err = pick_endpoint(&[], "device_registry").unwrap_err();
        assert!(matches!(err, NotifyError::NoEndpoint { service } if service == "device_registry"));
    }

    #[test]
    fn pick_endpoint_returns_a_configured_endpoint() {
        let endpoints = vec![
            "http://registry-a".to_string(),
            "http://registry-b".to_string(),
        ];
        let chosen = pick_endpoint(&endpoints, "device_registry").expect("should pick");
        assert!(endpoints.iter().any(|e| e == chosen));
    }

    #[test]
    fn command_envelope_serializes_camel_case() {
        let command = Command {
            cmd_name: "getDevice",
            cmd_code: "0003",
            parameters: json!({ "uuid": "d-1" }),
        };
        let value = serde_json::to_value(&command).expect("serialize");
        assert_eq!(value["cmdName"], "getDevice");
        assert_eq!(value["cmdCode"], "0003");
        assert_eq!(value["parameters"]["uuid"], "d-1");
    }

    #[test]
    fn command_response_non_200_is_remote_error() {
        let response: CommandResponse = serde_json::from_value(serde_json::json!({
            "retCode": 404,
            "description": "device not found"
        }))
        .expect("deserialize");
        let err = response.into_data().unwrap_err();
        assert!(matches!(err, NotifyError::Remote { code: 404, .. }));
    }
}
