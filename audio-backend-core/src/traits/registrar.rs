use crate::models::devices::DeviceChoice;

/// Descriptor advertising this backend as a selectable audio device source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendDescriptor {
    /// Backend name shown in device-selection settings.
    pub name: &'static str,

    /// Selection priority relative to other registered backends.
    pub priority: i32,

    /// Devices this backend exposes, sorted by key.
    pub devices: Vec<DeviceChoice>,

    pub supports_echo_cancellation: bool,
}

/// Implemented by the audio-pipeline owner. Backends register themselves as
/// device-selection choices at startup instead of mutating shared lists.
pub trait BackendRegistrar {
    fn register_input_backend(&mut self, descriptor: BackendDescriptor);
    fn register_output_backend(&mut self, descriptor: BackendDescriptor);
}
