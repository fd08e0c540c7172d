//! Error types for the notification pipeline.
//!
//! These errors are contained within the dispatcher: they are logged and
//! never surfaced to the save caller.

use thiserror::Error;

/// Errors that can occur while resolving a device or sending a push.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// No endpoint is configured for the target service.
    #[error("no endpoint configured for {service}")]
    NoEndpoint {
        /// The service whose endpoint list was empty.
        service: &'static str,
    },

    /// The HTTP round-trip failed.
    #[error("notification transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote service answered with a non-success envelope.
    #[error("remote service error {code}: {message}")]
    Remote {
        /// The remote envelope's error code.
        code: i64,
        /// The remote envelope's error message.
        message: String,
    },

    /// The remote response body could not be decoded.
    #[error("malformed remote response: {0}")]
    Decode(#[from] serde_json::Error),
}
