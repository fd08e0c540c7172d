//! Fire-and-forget notification dispatch.
//!
//! [`Dispatcher::spawn_dispatch`] runs the resolve → credential lookup →
//! send pipeline in a detached task. The save path holds nothing that
//! keeps the task alive and never observes its outcome; failures are
//! logged here and contained.

use std::sync::Arc;

use crate::error::NotifyError;
use crate::provider::{PushMessage, PushProvider};
use crate::registry::DeviceRegistry;

/// The slice of a saved event the dispatcher needs.
#[derive(Debug, Clone)]
pub struct EventAlert {
    pub device_uuid: String,
    pub event_level: i64,
    pub event_description: String,
}

/// Terminal states of one dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The push message was handed to the provider.
    Sent,
    /// The registry knows no such device; nothing to notify.
    NoDevice,
    /// The owner carries no push credential; a normal state.
    NoKey,
}

/// Resolves an event's device owner and pushes a notification.
pub struct Dispatcher {
    registry: Arc<dyn DeviceRegistry>,
    provider: Arc<dyn PushProvider>,
    /// Minimum event level that triggers a push.
    push_level: i64,
    /// Fixed notification title for the platform.
    title: String,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<dyn DeviceRegistry>,
        provider: Arc<dyn PushProvider>,
        push_level: i64,
        title: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            provider,
            push_level,
            title: title.into(),
        }
    }

    /// Whether an event of the given level crosses the push threshold.
    pub fn should_notify(&self, event_level: i64) -> bool {
        event_level >= self.push_level
    }

    /// Spawns the dispatch pipeline for a qualifying event and returns
    /// immediately. Below-threshold events spawn nothing.
    pub fn spawn_dispatch(self: &Arc<Self>, alert: EventAlert) {
        if !self.should_notify(alert.event_level) {
            return;
        }

        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            match dispatcher.dispatch(&alert).await {
                Ok(DispatchOutcome::Sent) => {
                    tracing::info!(device_uuid = %alert.device_uuid, "push notification sent");
                }
                Ok(DispatchOutcome::NoDevice) => {
                    tracing::debug!(device_uuid = %alert.device_uuid, "device not in registry, skipping push");
                }
                Ok(DispatchOutcome::NoKey) => {
                    tracing::info!(device_uuid = %alert.device_uuid, "owner has no notification key");
                }
                Err(error) => {
                    tracing::warn!(device_uuid = %alert.device_uuid, %error, "push dispatch failed");
                }
            }
        });
    }

    /// Runs the pipeline once: resolve the device, resolve its owner's
    /// push credential, send the message.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] for registry or provider failures. Errors
    /// never escape `spawn_dispatch`.
    pub async fn dispatch(&self, alert: &EventAlert) -> Result<DispatchOutcome, NotifyError> {
        let Some(device) = self.registry.get_device(&alert.device_uuid).await? else {
            return Ok(DispatchOutcome::NoDevice);
        };

        let Some(owner) = self.registry.get_device(&device.user_id).await? else {
            return Ok(DispatchOutcome::NoKey);
        };
        let Some(key) = owner.notification_key() else {
            return Ok(DispatchOutcome::NoKey);
        };

        self.provider
            .send(&PushMessage {
                registration_ids: vec![key.to_string()],
                title: self.title.clone(),
                body: alert.event_description.clone(),
            })
            .await?;

        Ok(DispatchOutcome::Sent)
    }
}
