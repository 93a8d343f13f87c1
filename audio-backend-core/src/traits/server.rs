use std::sync::Arc;

use crate::models::error::BackendError;
use crate::models::status::ServerStatus;

/// Identifier for a port registered by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

/// Flags and type reported for a server port looked up by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Hardware-backed endpoint, as opposed to a software client port.
    pub physical: bool,
    pub input: bool,
    pub output: bool,
    /// Server-reported port type string, e.g. "32 bit float mono audio".
    pub type_name: String,
}

impl PortInfo {
    pub fn is_audio(&self) -> bool {
        self.type_name.contains("audio")
    }
}

/// Verdict a real-time handler returns to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessControl {
    Continue,
    Quit,
}

/// Access to this client's port buffers for one audio block.
///
/// Only valid for the duration of a single process callback.
pub trait PortBuffers {
    /// Capture buffer for `port`, holding one block of samples.
    fn input(&self, port: PortId) -> Option<&[f32]>;

    /// Playback buffer for `port`, to be filled by the handler.
    fn output(&mut self, port: PortId) -> Option<&mut [f32]>;
}

/// Real-time process handler, invoked by the server once per audio block on
/// its real-time thread. Implementations must not block or allocate.
pub trait ProcessHandler: Send + Sync {
    fn process(&self, frames: u32, ports: &mut dyn PortBuffers) -> ProcessControl;
}

/// Invoked by the server when its operating sample rate changes.
pub trait SampleRateHandler: Send + Sync {
    fn sample_rate_changed(&self, rate: u32) -> ProcessControl;
}

/// Invoked by the server when it tears the connection down out-of-band,
/// e.g. because the server process died. The server has already invalidated
/// its own handles by the time this fires.
pub trait ShutdownHandler: Send + Sync {
    fn server_shutdown(&self);
}

/// Connection factory for a real-time audio server.
pub trait AudioServer {
    type Client: ServerClient;

    /// Open a client connection under `name`. Must not auto-start a server
    /// process. Failure carries the server's status bitmask.
    fn open_client(&self, name: &str) -> Result<Self::Client, ServerStatus>;
}

/// An open client connection to the audio server.
pub trait ServerClient: Send {
    fn register_port(&mut self, name: &str, direction: PortDirection)
        -> Result<PortId, BackendError>;

    fn set_process_handler(&mut self, handler: Arc<dyn ProcessHandler>)
        -> Result<(), BackendError>;

    fn set_sample_rate_handler(
        &mut self,
        handler: Arc<dyn SampleRateHandler>,
    ) -> Result<(), BackendError>;

    fn set_shutdown_handler(&mut self, handler: Arc<dyn ShutdownHandler>)
        -> Result<(), BackendError>;

    /// Current operating sample rate in Hz.
    fn sample_rate(&self) -> i32;

    /// Enter the server's real-time processing graph. Handlers start firing
    /// after this returns.
    fn activate(&mut self) -> Result<(), BackendError>;

    /// Leave the processing graph. Handlers no longer fire after this.
    fn deactivate(&mut self) -> Result<(), BackendError>;

    /// Names of all physical (hardware-backed) ports known to the server.
    fn physical_ports(&self) -> Vec<String>;

    /// Look up a port by name. `None` when the name no longer resolves.
    fn port_info(&self, name: &str) -> Option<PortInfo>;

    /// Fully-qualified name of one of this client's own ports.
    fn port_name(&self, port: PortId) -> String;

    fn connect_ports(&mut self, source: &str, destination: &str) -> Result<(), BackendError>;

    /// Close the connection. Safe to call more than once.
    fn close(&mut self) -> Result<(), BackendError>;
}
