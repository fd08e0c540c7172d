//! Push-notification provider client.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;

use crate::error::NotifyError;
use crate::registry::{pick_endpoint, Command, CommandResponse};

/// Icon name carried in every push payload.
const PUSH_ICON: &str = "ic_launcher";

/// A push message addressed to one or more registration credentials.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PushMessage {
    pub registration_ids: Vec<String>,
    pub title: String,
    pub body: String,
}

/// Delivers push messages through the platform's notification service.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Sends one push message. Delivery guarantees beyond the provider's
    /// acknowledgment are out of scope.
    async fn send(&self, message: &PushMessage) -> Result<(), NotifyError>;
}

/// HTTP implementation of [`PushProvider`].
#[derive(Debug, Clone)]
pub struct HttpPushProvider {
    client: reqwest::Client,
    endpoints: Vec<String>,
}

impl HttpPushProvider {
    pub fn new(endpoints: Vec<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints,
        }
    }
}

#[async_trait]
impl PushProvider for HttpPushProvider {
    async fn send(&self, message: &PushMessage) -> Result<(), NotifyError> {
        let endpoint = pick_endpoint(&self.endpoints, "notification")?;

        let command = Command {
            cmd_name: "sendMessage",
            cmd_code: "0001",
            parameters: json!({
                "target": { "registrationIds": message.registration_ids },
                "payload": {
                    "notification": {
                        "title": message.title,
                        "body": message.body,
                        "icon": PUSH_ICON,
                    }
                }
            }),
        };

        let response: CommandResponse = self
            .client
            .post(endpoint)
            .json(&command)
            .send()
            .await?
            .json()
            .await?;
        response.into_data().map(|_| ())
    }
}
