use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Label for the single implicit device this backend exposes.
pub const HARDWARE_PORTS_LABEL: &str = "Hardware Ports";

/// A selectable audio device, as presented in device-selection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceChoice {
    /// Opaque key stored in settings. Empty for the implicit default device.
    pub key: String,

    /// Human-readable label shown to the user.
    pub label: String,
}

/// Registry of named devices, keyed by an opaque device key.
///
/// Keys are unique; enumeration is sorted by key.
#[derive(Debug, Default, Clone)]
pub struct DeviceRegistry {
    entries: BTreeMap<String, String>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, label: impl Into<String>) {
        self.entries.insert(key.into(), label.into());
    }

    /// All registered devices as `(key, label)` pairs, sorted by key.
    pub fn choices(&self) -> Vec<DeviceChoice> {
        self.entries
            .iter()
            .map(|(key, label)| DeviceChoice {
                key: key.clone(),
                label: label.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
