use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::adapters::active::ActiveDevices;
use crate::models::config::BackendConfig;
use crate::models::devices::DeviceChoice;
use crate::models::error::BackendError;
use crate::traits::registrar::{BackendDescriptor, BackendRegistrar};
use crate::traits::server::AudioServer;

use super::backend::{BackendSession, SessionView};

/// Backend name advertised to the registrar.
pub const BACKEND_NAME: &str = "JACK";

/// Selection priority advertised to the registrar.
pub const BACKEND_PRIORITY: i32 = 10;

/// How long deferred init waits for the session to signal ready-or-failed.
pub const READY_TIMEOUT: Duration = Duration::from_millis(1000);

/// A running backend, returned by [`start_backend`]. Dropping the handle (or
/// calling [`shutdown`](Self::shutdown)) closes the session; this is the
/// deferred-teardown half of the lifecycle.
pub struct BackendHandle<S: AudioServer> {
    session: Arc<Mutex<BackendSession<S>>>,
}

impl<S: AudioServer> BackendHandle<S> {
    pub fn view(&self) -> SessionView {
        self.session.lock().view()
    }

    pub fn is_healthy(&self) -> bool {
        self.session.lock().is_healthy()
    }

    pub fn input_devices(&self) -> Vec<DeviceChoice> {
        self.session.lock().input_devices()
    }

    pub fn output_devices(&self) -> Vec<DeviceChoice> {
        self.session.lock().output_devices()
    }

    /// Selecting a device is a no-op: this backend exposes exactly one
    /// implicit device.
    pub fn set_device_choice(&self, _choice: &str) {}

    /// Echo cancellation is not supported on this backend.
    pub fn supports_echo_cancellation(&self) -> bool {
        false
    }

    pub fn shutdown(&self) {
        self.session.lock().close();
    }

    fn input_descriptor(&self) -> BackendDescriptor {
        BackendDescriptor {
            name: BACKEND_NAME,
            priority: BACKEND_PRIORITY,
            devices: self.input_devices(),
            supports_echo_cancellation: false,
        }
    }

    fn output_descriptor(&self) -> BackendDescriptor {
        BackendDescriptor {
            name: BACKEND_NAME,
            priority: BACKEND_PRIORITY,
            devices: self.output_devices(),
            supports_echo_cancellation: false,
        }
    }
}

impl<S: AudioServer> Drop for BackendHandle<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Deferred-initialization entry point.
///
/// Opens the backend session on a dedicated init worker and blocks until it
/// signals ready-or-failed, bounded by [`READY_TIMEOUT`]. On success the
/// backend registers itself with `registrar` as a selectable input and
/// output device source; on failure or timeout every partial resource is
/// released and nothing is registered.
pub fn start_backend<S>(
    server: S,
    config: BackendConfig,
    active: Arc<ActiveDevices>,
    registrar: &mut dyn BackendRegistrar,
) -> Result<BackendHandle<S>, BackendError>
where
    S: AudioServer + Send + 'static,
    S::Client: 'static,
{
    start_backend_with_timeout(server, config, active, registrar, READY_TIMEOUT)
}

pub(crate) fn start_backend_with_timeout<S>(
    server: S,
    config: BackendConfig,
    active: Arc<ActiveDevices>,
    registrar: &mut dyn BackendRegistrar,
    timeout: Duration,
) -> Result<BackendHandle<S>, BackendError>
where
    S: AudioServer + Send + 'static,
    S::Client: 'static,
{
    let session = Arc::new(Mutex::new(BackendSession::new(active)));
    let (ready_tx, ready_rx) = mpsc::sync_channel(1);

    let opener = {
        let session = Arc::clone(&session);
        thread::Builder::new()
            .name("audio-backend-init".into())
            .spawn(move || {
                let result = session.lock().open(&server, &config);
                let _ = ready_tx.send(result);
            })
            .expect("failed to spawn backend init thread")
    };

    match ready_rx.recv_timeout(timeout) {
        Ok(Ok(())) => {
            let _ = opener.join();
        }
        Ok(Err(err)) => {
            let _ = opener.join();
            return Err(err);
        }
        Err(_) => {
            // Treated exactly like an explicit failure signal. The opener is
            // left detached; the session closes when its last reference
            // drops, once the stalled open() eventually returns.
            log::warn!("backend did not signal readiness within {timeout:?}");
            return Err(BackendError::InitTimeout(timeout));
        }
    }

    let handle = BackendHandle { session };
    registrar.register_input_backend(handle.input_descriptor());
    registrar.register_output_backend(handle.output_descriptor());
    Ok(handle)
}
