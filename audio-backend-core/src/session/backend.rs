use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, OnceLock};

use crate::adapters::active::ActiveDevices;
use crate::models::config::{BackendConfig, DEFAULT_CLIENT_NAME};
use crate::models::devices::{DeviceChoice, DeviceRegistry, HARDWARE_PORTS_LABEL};
use crate::models::error::BackendError;
use crate::traits::server::{
    AudioServer, PortBuffers, PortDirection, PortId, ProcessControl, ProcessHandler,
    SampleRateHandler, ServerClient, ShutdownHandler,
};

#[derive(Debug, Clone, Copy)]
struct SessionPorts {
    input: PortId,
    output: PortId,
}

/// State shared with the server's callback threads.
///
/// The health flag is the single publish point: it is set only after setup
/// fully completes, with the port-id pair already installed, so the
/// real-time callback can never observe a partially-constructed session.
pub(crate) struct SessionShared {
    healthy: AtomicBool,
    sample_rate: AtomicI32,
    ports: OnceLock<SessionPorts>,
    active: Arc<ActiveDevices>,
}

impl SessionShared {
    fn new(active: Arc<ActiveDevices>) -> Self {
        Self {
            healthy: AtomicBool::new(false),
            sample_rate: AtomicI32::new(0),
            ports: OnceLock::new(),
            active,
        }
    }

    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    fn sample_rate(&self) -> i32 {
        self.sample_rate.load(Ordering::SeqCst)
    }
}

impl ProcessHandler for SessionShared {
    /// Real-time process callback: one audio block per invocation, on the
    /// server's real-time thread. Non-blocking, allocation-free apart from
    /// the lock-free device-pointer loads.
    fn process(&self, frames: u32, ports: &mut dyn PortBuffers) -> ProcessControl {
        if !self.is_healthy() {
            return ProcessControl::Continue;
        }

        let Some(session_ports) = self.ports.get().copied() else {
            // Health was published without ports; internal inconsistency.
            log::error!("process callback fired with no registered ports");
            return ProcessControl::Quit;
        };

        let Some(capture) = self.active.capture() else {
            return ProcessControl::Continue;
        };
        if capture.is_running() && capture.channels() > 0 {
            if let Some(input) = ports.input(session_ports.input) {
                capture.add_mic(input);
            }

            if let Some(playback) = self.active.playback() {
                if playback.is_running() && playback.channels() > 0 {
                    if let Some(output) = ports.output(session_ports.output) {
                        let len = (frames as usize).min(output.len());
                        output[..len].fill(0.0);
                        playback.mix(output);
                    }
                }
            }
        }

        ProcessControl::Continue
    }
}

impl SampleRateHandler for SessionShared {
    fn sample_rate_changed(&self, rate: u32) -> ProcessControl {
        self.sample_rate.store(rate as i32, Ordering::SeqCst);
        ProcessControl::Continue
    }
}

impl ShutdownHandler for SessionShared {
    fn server_shutdown(&self) {
        // The server has already invalidated its own handles; only unpublish
        // health. Everything else waits for the next explicit close().
        self.healthy.store(false, Ordering::SeqCst);
        log::warn!("audio server shut down the client connection");
    }
}

/// Read-only view of the session, handed to adapter workers.
#[derive(Clone)]
pub struct SessionView {
    shared: Arc<SessionShared>,
}

impl SessionView {
    pub fn is_healthy(&self) -> bool {
        self.shared.is_healthy()
    }

    /// Session sample rate in Hz. Tracks server rate changes.
    pub fn sample_rate(&self) -> i32 {
        self.shared.sample_rate()
    }

    /// View over a standalone state block, for exercising adapters without
    /// a server.
    #[cfg(test)]
    pub(crate) fn detached(healthy: bool, sample_rate: i32) -> Self {
        let shared = SessionShared::new(Arc::new(ActiveDevices::new()));
        shared.healthy.store(healthy, Ordering::SeqCst);
        shared.sample_rate.store(sample_rate, Ordering::SeqCst);
        Self {
            shared: Arc::new(shared),
        }
    }
}

/// Owns the connection to the external real-time audio server: client
/// registration, port creation, callback registration, hardware auto-connect
/// and lifecycle teardown. Exactly one session exists for the lifetime of
/// the backend.
pub struct BackendSession<S: AudioServer> {
    client: Option<S::Client>,
    shared: Arc<SessionShared>,
    active: Arc<ActiveDevices>,
    inputs: DeviceRegistry,
    outputs: DeviceRegistry,
}

impl<S: AudioServer> BackendSession<S> {
    pub fn new(active: Arc<ActiveDevices>) -> Self {
        Self {
            client: None,
            shared: Arc::new(SessionShared::new(Arc::clone(&active))),
            active,
            inputs: DeviceRegistry::new(),
            outputs: DeviceRegistry::new(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.shared.is_healthy()
    }

    pub fn sample_rate(&self) -> i32 {
        self.shared.sample_rate()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Registered input devices as `(key, label)` pairs, sorted by key.
    pub fn input_devices(&self) -> Vec<DeviceChoice> {
        self.inputs.choices()
    }

    /// Registered output devices as `(key, label)` pairs, sorted by key.
    pub fn output_devices(&self) -> Vec<DeviceChoice> {
        self.outputs.choices()
    }

    /// Establish the connection to the audio server.
    ///
    /// Either returns with health published and a fully wired session, or
    /// leaves health false with the partially-opened client closed and no
    /// ports, callbacks or registry entries persisting.
    pub fn open(&mut self, server: &S, config: &BackendConfig) -> Result<(), BackendError> {
        self.close();

        // Fresh shared state per attempt; a previous connection's port ids
        // must never leak into a new callback registration.
        self.shared = Arc::new(SessionShared::new(Arc::clone(&self.active)));

        match self.open_inner(server, config) {
            Ok(()) => Ok(()),
            Err(err) => {
                log::error!("backend session setup failed: {err}");
                if let Some(mut client) = self.client.take() {
                    if let Err(close_err) = client.close() {
                        log::warn!(
                            "unable to close client connection after failed setup: {close_err}"
                        );
                    }
                }
                Err(err)
            }
        }
    }

    fn open_inner(&mut self, server: &S, config: &BackendConfig) -> Result<(), BackendError> {
        let client_name = if config.client_name.is_empty() {
            log::warn!(
                "configured client name is empty, using default '{DEFAULT_CLIENT_NAME}'"
            );
            DEFAULT_CLIENT_NAME
        } else {
            config.client_name.as_str()
        };

        let client = match server.open_client(client_name) {
            Ok(client) => client,
            Err(status) => {
                let lines = status.describe();
                log::warn!(
                    "unable to open client connection due to {} errors:",
                    lines.len()
                );
                for line in &lines {
                    log::warn!("  {line}");
                }
                return Err(BackendError::Connect { status });
            }
        };
        self.client = Some(client);
        let client = self.client.as_mut().unwrap();

        let input = client.register_port("input", PortDirection::Input)?;
        let output = client.register_port("output", PortDirection::Output)?;

        let handler = Arc::clone(&self.shared);
        client.set_process_handler(handler.clone())?;
        client.set_sample_rate_handler(handler.clone())?;
        client.set_shutdown_handler(handler)?;

        let rate = client.sample_rate();
        if rate < 0 {
            return Err(BackendError::InvalidSampleRate(rate));
        }
        self.shared.sample_rate.store(rate, Ordering::SeqCst);

        client.activate()?;

        // Wire hardware input into our capture port and our playback port
        // into hardware output. Ports that no longer resolve are skipped;
        // failed connections abort.
        let input_name = client.port_name(input);
        let output_name = client.port_name(output);
        for port_name in client.physical_ports() {
            let Some(info) = client.port_info(&port_name) else {
                log::warn!("physical port '{port_name}' no longer resolves, skipping it");
                continue;
            };
            if !info.is_audio() {
                continue;
            }

            if info.physical && info.output {
                client.connect_ports(&port_name, &input_name)?;
            }
            if info.physical && info.input {
                client.connect_ports(&output_name, &port_name)?;
            }
        }

        self.inputs.insert("", HARDWARE_PORTS_LABEL);
        self.outputs.insert("", HARDWARE_PORTS_LABEL);

        let _ = self.shared.ports.set(SessionPorts { input, output });
        self.shared.healthy.store(true, Ordering::SeqCst);

        Ok(())
    }

    /// Tear down the connection. Errors are logged, never propagated; safe
    /// to call when already closed.
    pub fn close(&mut self) {
        self.shared.healthy.store(false, Ordering::SeqCst);
        if let Some(mut client) = self.client.take() {
            if let Err(err) = client.deactivate() {
                log::warn!("unable to remove client from the process graph: {err}");
            }
            if let Err(err) = client.close() {
                log::warn!("unable to disconnect from the audio server: {err}");
            }
        }
    }
}

impl<S: AudioServer> Drop for BackendSession<S> {
    fn drop(&mut self) {
        self.close();
    }
}
