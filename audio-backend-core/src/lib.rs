//! # audio-backend-core
//!
//! Server-agnostic core of a voice-chat client's real-time audio backend.
//!
//! Bridges a callback-driven low-latency audio server to the application's
//! internal capture/playback pipeline: session lifecycle against the server,
//! adapters the real-time callback feeds, and the deferred-init handshake
//! that registers the backend as a selectable device source. The server
//! itself sits behind the `AudioServer`/`ServerClient` traits; the
//! `audio-backend-jack` crate implements them over the JACK client library.
//!
//! ## Architecture
//!
//! ```text
//! audio-backend-core (this crate)
//! ├── traits/    ← AudioServer, ServerClient, handlers, pipelines, registrar
//! ├── models/    ← ServerStatus, BackendError, BackendConfig, DeviceRegistry
//! ├── session/   ← BackendSession (connection lifecycle), bootstrap handshake
//! └── adapters/  ← CaptureAdapter, PlaybackAdapter, ActiveDevices
//! ```

pub mod adapters;
pub mod models;
pub mod session;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export key types at crate root for convenience.
pub use adapters::active::ActiveDevices;
pub use adapters::capture::CaptureAdapter;
pub use adapters::playback::PlaybackAdapter;
pub use models::config::{BackendConfig, DEFAULT_CLIENT_NAME};
pub use models::devices::{DeviceChoice, DeviceRegistry, HARDWARE_PORTS_LABEL};
pub use models::error::BackendError;
pub use models::format::{speaker, SampleFormat, StreamFormat};
pub use models::status::ServerStatus;
pub use session::backend::{BackendSession, SessionView};
pub use session::bootstrap::{
    start_backend, BackendHandle, BACKEND_NAME, BACKEND_PRIORITY, READY_TIMEOUT,
};
pub use traits::pipeline::{CapturePipeline, PlaybackPipeline};
pub use traits::registrar::{BackendDescriptor, BackendRegistrar};
pub use traits::server::{
    AudioServer, PortBuffers, PortDirection, PortId, PortInfo, ProcessControl, ProcessHandler,
    SampleRateHandler, ServerClient, ShutdownHandler,
};
