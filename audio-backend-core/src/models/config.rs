use serde::{Deserialize, Serialize};

/// Client name announced to the audio server when none is configured.
pub const DEFAULT_CLIENT_NAME: &str = "voicechat";

/// Backend configuration, as read from the application's settings store.
///
/// This backend exposes a single implicit device, so the only knob is the
/// client name under which the connection is registered with the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Client name announced to the audio server. When empty, the session
    /// substitutes [`DEFAULT_CLIENT_NAME`] and logs a warning.
    pub client_name: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            client_name: String::new(),
        }
    }
}
