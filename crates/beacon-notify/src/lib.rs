//! Push-notification pipeline for high-severity events.
//!
//! When a saved event's level reaches the configured push threshold, the
//! [`Dispatcher`] runs a three-step pipeline in a detached task:
//!
//! 1. resolve the originating device through the device registry,
//! 2. resolve the device owner's record and scan its settings for the
//!    `gcm_token` push credential,
//! 3. send a push message through the notification provider.
//!
//! Every step is best-effort: failures and missing credentials are logged
//! and contained here — they never reach, delay, or gate the save path.
//!
//! The registry and provider sit behind traits so tests can substitute
//! in-memory fakes; the production implementations speak the platform's
//! `{cmdName, cmdCode, parameters}` command envelope over HTTP to one
//! randomly selected endpoint per call.

mod dispatcher;
mod error;
mod provider;
mod registry;
mod types;

pub use dispatcher::{Dispatcher, DispatchOutcome, EventAlert};
pub use error::NotifyError;
pub use provider::{HttpPushProvider, PushMessage, PushProvider};
pub use registry::{DeviceRegistry, HttpDeviceRegistry};
pub use types::{DeviceInfo, DeviceSetting, NOTIFICATION_KEY_SETTING};
