use std::time::Duration;

use thiserror::Error;

use super::status::ServerStatus;

/// Errors from backend session setup and teardown.
///
/// All setup-time errors are fatal to that attempt: the session unwinds to a
/// clean closed state and health is never published.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("unable to open client connection (status {status})")]
    Connect { status: ServerStatus },

    #[error("unable to register '{name}' port: {reason}")]
    PortRegistration { name: String, reason: String },

    #[error("unable to set {kind} callback: {reason}")]
    CallbackRegistration { kind: &'static str, reason: String },

    #[error("invalid sample rate {0} reported by the server")]
    InvalidSampleRate(i32),

    #[error("unable to activate client: {0}")]
    Activation(String),

    #[error("unable to deactivate client: {0}")]
    Deactivation(String),

    #[error("unable to connect port '{source_port}' to '{destination}': {reason}")]
    PortConnection {
        source_port: String,
        destination: String,
        reason: String,
    },

    #[error("unable to close client connection: {0}")]
    Close(String),

    #[error("no open client connection")]
    NotConnected,

    #[error("backend did not signal readiness within {0:?}")]
    InitTimeout(Duration),
}
