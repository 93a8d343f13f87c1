//! Mock server and pipeline doubles shared by the unit tests.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::error::BackendError;
use crate::models::format::StreamFormat;
use crate::models::status::ServerStatus;
use crate::traits::pipeline::{CapturePipeline, PlaybackPipeline};
use crate::traits::server::{
    AudioServer, PortBuffers, PortDirection, PortId, PortInfo, ProcessHandler, SampleRateHandler,
    ServerClient, ShutdownHandler,
};

const AUDIO_TYPE: &str = "32 bit float mono audio";

/// A physical port the mock server advertises.
#[derive(Debug, Clone)]
pub(crate) struct MockPort {
    pub name: String,
    /// `None` models a port name that no longer resolves.
    pub info: Option<PortInfo>,
}

impl MockPort {
    pub fn physical_out(name: &str) -> Self {
        Self {
            name: name.into(),
            info: Some(PortInfo {
                physical: true,
                input: false,
                output: true,
                type_name: AUDIO_TYPE.into(),
            }),
        }
    }

    pub fn physical_in(name: &str) -> Self {
        Self {
            name: name.into(),
            info: Some(PortInfo {
                physical: true,
                input: true,
                output: false,
                type_name: AUDIO_TYPE.into(),
            }),
        }
    }

    pub fn midi_out(name: &str) -> Self {
        Self {
            name: name.into(),
            info: Some(PortInfo {
                physical: true,
                input: false,
                output: true,
                type_name: "8 bit raw midi".into(),
            }),
        }
    }

    pub fn unresolvable(name: &str) -> Self {
        Self {
            name: name.into(),
            info: None,
        }
    }
}

/// Scripted behavior for a [`MockServer`].
#[derive(Debug, Clone)]
pub(crate) struct MockBehavior {
    /// `Some` makes client-open fail with that status bitmask.
    pub connect_status: Option<ServerStatus>,
    /// Sleep inserted before client-open completes.
    pub connect_delay: Option<Duration>,
    /// Port name whose registration fails.
    pub fail_port: Option<&'static str>,
    /// Callback kind ("process", "sample-rate", "shutdown") whose
    /// registration fails.
    pub fail_callback: Option<&'static str>,
    pub sample_rate: i32,
    pub fail_activate: bool,
    pub physical_ports: Vec<MockPort>,
    /// Port name (either end) whose connection fails.
    pub fail_connect_port: Option<&'static str>,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            connect_status: None,
            connect_delay: None,
            fail_port: None,
            fail_callback: None,
            sample_rate: 48000,
            fail_activate: false,
            physical_ports: vec![
                MockPort::physical_out("system:capture_1"),
                MockPort::physical_in("system:playback_1"),
            ],
            fail_connect_port: None,
        }
    }
}

#[derive(Default)]
pub(crate) struct MockHandlers {
    pub process: Option<Arc<dyn ProcessHandler>>,
    pub sample_rate: Option<Arc<dyn SampleRateHandler>>,
    pub shutdown: Option<Arc<dyn ShutdownHandler>>,
}

/// Everything a mock client records for later inspection.
#[derive(Default)]
pub(crate) struct MockRecord {
    pub client_names: Mutex<Vec<String>>,
    pub ports: Mutex<Vec<(String, PortDirection)>>,
    pub connections: Mutex<Vec<(String, String)>>,
    pub handlers: Mutex<MockHandlers>,
    activated: AtomicBool,
    deactivated: AtomicBool,
    closes: AtomicUsize,
}

impl MockRecord {
    pub fn activated(&self) -> bool {
        self.activated.load(Ordering::SeqCst)
    }

    pub fn deactivated(&self) -> bool {
        self.deactivated.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn process_handler(&self) -> Arc<dyn ProcessHandler> {
        self.handlers
            .lock()
            .process
            .clone()
            .expect("process handler registered")
    }

    pub fn sample_rate_handler(&self) -> Arc<dyn SampleRateHandler> {
        self.handlers
            .lock()
            .sample_rate
            .clone()
            .expect("sample-rate handler registered")
    }

    pub fn shutdown_handler(&self) -> Arc<dyn ShutdownHandler> {
        self.handlers
            .lock()
            .shutdown
            .clone()
            .expect("shutdown handler registered")
    }
}

/// Scriptable stand-in for the real-time audio server.
pub(crate) struct MockServer {
    behavior: MockBehavior,
    record: Arc<MockRecord>,
}

impl MockServer {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            record: Arc::new(MockRecord::default()),
        }
    }

    /// Shared record handle, kept by tests across the server's move into
    /// the session.
    pub fn record(&self) -> Arc<MockRecord> {
        Arc::clone(&self.record)
    }
}

impl AudioServer for MockServer {
    type Client = MockClient;

    fn open_client(&self, name: &str) -> Result<MockClient, ServerStatus> {
        if let Some(delay) = self.behavior.connect_delay {
            thread::sleep(delay);
        }
        self.record.client_names.lock().push(name.to_string());
        if let Some(status) = self.behavior.connect_status {
            return Err(status);
        }
        Ok(MockClient {
            behavior: self.behavior.clone(),
            record: Arc::clone(&self.record),
        })
    }
}

pub(crate) struct MockClient {
    behavior: MockBehavior,
    record: Arc<MockRecord>,
}

impl ServerClient for MockClient {
    fn register_port(
        &mut self,
        name: &str,
        direction: PortDirection,
    ) -> Result<PortId, BackendError> {
        if self.behavior.fail_port == Some(name) {
            return Err(BackendError::PortRegistration {
                name: name.into(),
                reason: "scripted failure".into(),
            });
        }
        let mut ports = self.record.ports.lock();
        ports.push((name.to_string(), direction));
        Ok(PortId(ports.len() as u32 - 1))
    }

    fn set_process_handler(
        &mut self,
        handler: Arc<dyn ProcessHandler>,
    ) -> Result<(), BackendError> {
        if self.behavior.fail_callback == Some("process") {
            return Err(BackendError::CallbackRegistration {
                kind: "process",
                reason: "scripted failure".into(),
            });
        }
        self.record.handlers.lock().process = Some(handler);
        Ok(())
    }

    fn set_sample_rate_handler(
        &mut self,
        handler: Arc<dyn SampleRateHandler>,
    ) -> Result<(), BackendError> {
        if self.behavior.fail_callback == Some("sample-rate") {
            return Err(BackendError::CallbackRegistration {
                kind: "sample-rate",
                reason: "scripted failure".into(),
            });
        }
        self.record.handlers.lock().sample_rate = Some(handler);
        Ok(())
    }

    fn set_shutdown_handler(
        &mut self,
        handler: Arc<dyn ShutdownHandler>,
    ) -> Result<(), BackendError> {
        if self.behavior.fail_callback == Some("shutdown") {
            return Err(BackendError::CallbackRegistration {
                kind: "shutdown",
                reason: "scripted failure".into(),
            });
        }
        self.record.handlers.lock().shutdown = Some(handler);
        Ok(())
    }

    fn sample_rate(&self) -> i32 {
        self.behavior.sample_rate
    }

    fn activate(&mut self) -> Result<(), BackendError> {
        if self.behavior.fail_activate {
            return Err(BackendError::Activation("scripted failure".into()));
        }
        self.record.activated.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn deactivate(&mut self) -> Result<(), BackendError> {
        self.record.deactivated.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn physical_ports(&self) -> Vec<String> {
        self.behavior
            .physical_ports
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    fn port_info(&self, name: &str) -> Option<PortInfo> {
        self.behavior
            .physical_ports
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.info.clone())
    }

    fn port_name(&self, port: PortId) -> String {
        let ports = self.record.ports.lock();
        ports
            .get(port.0 as usize)
            .map(|(name, _)| format!("mock:{name}"))
            .unwrap_or_default()
    }

    fn connect_ports(&mut self, source: &str, destination: &str) -> Result<(), BackendError> {
        if let Some(bad) = self.behavior.fail_connect_port {
            if source == bad || destination == bad {
                return Err(BackendError::PortConnection {
                    source_port: source.into(),
                    destination: destination.into(),
                    reason: "scripted failure".into(),
                });
            }
        }
        self.record
            .connections
            .lock()
            .push((source.to_string(), destination.to_string()));
        Ok(())
    }

    fn close(&mut self) -> Result<(), BackendError> {
        self.record.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// One block's worth of port buffers, with fetch counters.
pub(crate) struct MockPortBuffers {
    pub input_data: Vec<f32>,
    pub output_data: Vec<f32>,
    pub input_port: PortId,
    pub output_port: PortId,
    pub input_fetches: Cell<usize>,
    pub output_fetches: usize,
}

impl MockPortBuffers {
    /// Buffers for one block of `frames` frames. The output buffer starts
    /// dirty so zero-filling is observable.
    pub fn new(frames: usize) -> Self {
        Self {
            input_data: vec![0.125; frames],
            output_data: vec![1.0; frames],
            input_port: PortId(0),
            output_port: PortId(1),
            input_fetches: Cell::new(0),
            output_fetches: 0,
        }
    }
}

impl PortBuffers for MockPortBuffers {
    fn input(&self, port: PortId) -> Option<&[f32]> {
        if port != self.input_port {
            return None;
        }
        self.input_fetches.set(self.input_fetches.get() + 1);
        Some(&self.input_data)
    }

    fn output(&mut self, port: PortId) -> Option<&mut [f32]> {
        if port != self.output_port {
            return None;
        }
        self.output_fetches += 1;
        Some(&mut self.output_data)
    }
}

/// Pipeline double recording every call from the adapters.
#[derive(Default)]
pub(crate) struct RecordingPipeline {
    pub initialized: Mutex<Option<StreamFormat>>,
    pub mic_blocks: Mutex<Vec<Vec<f32>>>,
    pub mix_calls: AtomicUsize,
    /// Fill the first `n` samples of each mixed block with `value`,
    /// deliberately leaving the rest untouched.
    pub mix_fill: Mutex<Option<(usize, f32)>>,
}

impl RecordingPipeline {
    pub fn mix_call_count(&self) -> usize {
        self.mix_calls.load(Ordering::SeqCst)
    }
}

impl CapturePipeline for RecordingPipeline {
    fn initialize(&self, format: &StreamFormat) {
        *self.initialized.lock() = Some(format.clone());
    }

    fn add_mic(&self, samples: &[f32]) {
        self.mic_blocks.lock().push(samples.to_vec());
    }
}

impl PlaybackPipeline for RecordingPipeline {
    fn initialize(&self, format: &StreamFormat) {
        *self.initialized.lock() = Some(format.clone());
    }

    fn mix(&self, buffer: &mut [f32]) -> bool {
        self.mix_calls.fetch_add(1, Ordering::SeqCst);
        if let Some((count, value)) = *self.mix_fill.lock() {
            for sample in buffer.iter_mut().take(count) {
                *sample = value;
            }
            count > 0
        } else {
            false
        }
    }
}
