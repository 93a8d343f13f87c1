//! JACK implementations of the core server traits.
//!
//! `JackServer` opens clients against the system JACK server;
//! `JackClientHandle` wraps the registration/activation lifecycle, moving
//! the registered ports and handlers into bridge structs when the client
//! enters the processing graph.

use std::sync::Arc;

use audio_backend_core::{
    AudioServer, BackendError, PortBuffers, PortDirection, PortId, PortInfo, ProcessControl,
    ProcessHandler, SampleRateHandler, ServerClient, ServerStatus, ShutdownHandler,
};

/// Maps the JACK client status bitmask onto the core status type.
///
/// The bit values are the same wire constants, but going flag-by-flag keeps
/// us honest if either side ever diverges.
pub(crate) fn map_status(status: jack::ClientStatus) -> ServerStatus {
    let pairs = [
        (jack::ClientStatus::FAILURE, ServerStatus::FAILURE),
        (jack::ClientStatus::INVALID_OPTION, ServerStatus::INVALID_OPTION),
        (jack::ClientStatus::NAME_NOT_UNIQUE, ServerStatus::NAME_NOT_UNIQUE),
        (jack::ClientStatus::SERVER_STARTED, ServerStatus::SERVER_STARTED),
        (jack::ClientStatus::SERVER_FAILED, ServerStatus::SERVER_FAILED),
        (jack::ClientStatus::SERVER_ERROR, ServerStatus::SERVER_ERROR),
        (jack::ClientStatus::NO_SUCH_CLIENT, ServerStatus::NO_SUCH_CLIENT),
        (jack::ClientStatus::LOAD_FAILURE, ServerStatus::LOAD_FAILURE),
        (jack::ClientStatus::INIT_FAILURE, ServerStatus::INIT_FAILURE),
        (jack::ClientStatus::SHM_FAILURE, ServerStatus::SHM_FAILURE),
        (jack::ClientStatus::VERSION_ERROR, ServerStatus::VERSION_ERROR),
        (jack::ClientStatus::BACKEND_ERROR, ServerStatus::BACKEND_ERROR),
        (jack::ClientStatus::CLIENT_ZOMBIE, ServerStatus::CLIENT_ZOMBIE),
    ];

    let mut mapped = ServerStatus::empty();
    for (jack_flag, flag) in pairs {
        if status.contains(jack_flag) {
            mapped |= flag;
        }
    }
    mapped
}

/// Connector for the system JACK server.
#[derive(Debug, Default, Clone, Copy)]
pub struct JackServer;

impl JackServer {
    pub fn new() -> Self {
        Self
    }
}

impl AudioServer for JackServer {
    type Client = JackClientHandle;

    fn open_client(&self, name: &str) -> Result<JackClientHandle, ServerStatus> {
        // Never auto-spawn a server process; a missing server is a failure.
        match jack::Client::new(name, jack::ClientOptions::NO_START_SERVER) {
            Ok((client, status)) => {
                if !status.is_empty() {
                    log::info!("client opened with status {status:?}");
                }
                Ok(JackClientHandle::new(client))
            }
            Err(jack::Error::ClientError(status)) => Err(map_status(status)),
            Err(err) => {
                log::warn!("client open failed without a status: {err}");
                Err(ServerStatus::FAILURE)
            }
        }
    }
}

enum ClientState {
    /// Registered but not yet part of the processing graph. Ports stay here
    /// until activation moves them into the process bridge.
    Inactive {
        client: jack::Client,
        inputs: Vec<(u32, jack::Port<jack::AudioIn>)>,
        outputs: Vec<(u32, jack::Port<jack::AudioOut>)>,
    },
    Active(jack::AsyncClient<NotificationBridge, ProcessBridge>),
    Closed,
}

/// An open JACK client connection.
pub struct JackClientHandle {
    state: ClientState,
    /// Fully-qualified port names, indexed by `PortId`.
    port_names: Vec<String>,
    process: Option<Arc<dyn ProcessHandler>>,
    sample_rate: Option<Arc<dyn SampleRateHandler>>,
    shutdown: Option<Arc<dyn ShutdownHandler>>,
}

impl JackClientHandle {
    fn new(client: jack::Client) -> Self {
        Self {
            state: ClientState::Inactive {
                client,
                inputs: Vec::new(),
                outputs: Vec::new(),
            },
            port_names: Vec::new(),
            process: None,
            sample_rate: None,
            shutdown: None,
        }
    }

    fn client(&self) -> Option<&jack::Client> {
        match &self.state {
            ClientState::Inactive { client, .. } => Some(client),
            ClientState::Active(async_client) => Some(async_client.as_client()),
            ClientState::Closed => None,
        }
    }
}

impl ServerClient for JackClientHandle {
    fn register_port(
        &mut self,
        name: &str,
        direction: PortDirection,
    ) -> Result<PortId, BackendError> {
        let ClientState::Inactive {
            client,
            inputs,
            outputs,
        } = &mut self.state
        else {
            return Err(BackendError::PortRegistration {
                name: name.into(),
                reason: "client is not in a registrable state".into(),
            });
        };

        let id = self.port_names.len() as u32;
        let full_name = match direction {
            PortDirection::Input => {
                let port = client.register_port(name, jack::AudioIn::default()).map_err(
                    |err| BackendError::PortRegistration {
                        name: name.into(),
                        reason: err.to_string(),
                    },
                )?;
                let full_name = port.name().map_err(|err| BackendError::PortRegistration {
                    name: name.into(),
                    reason: err.to_string(),
                })?;
                inputs.push((id, port));
                full_name
            }
            PortDirection::Output => {
                let port = client.register_port(name, jack::AudioOut::default()).map_err(
                    |err| BackendError::PortRegistration {
                        name: name.into(),
                        reason: err.to_string(),
                    },
                )?;
                let full_name = port.name().map_err(|err| BackendError::PortRegistration {
                    name: name.into(),
                    reason: err.to_string(),
                })?;
                outputs.push((id, port));
                full_name
            }
        };

        self.port_names.push(full_name);
        Ok(PortId(id))
    }

    fn set_process_handler(
        &mut self,
        handler: Arc<dyn ProcessHandler>,
    ) -> Result<(), BackendError> {
        self.process = Some(handler);
        Ok(())
    }

    fn set_sample_rate_handler(
        &mut self,
        handler: Arc<dyn SampleRateHandler>,
    ) -> Result<(), BackendError> {
        self.sample_rate = Some(handler);
        Ok(())
    }

    fn set_shutdown_handler(
        &mut self,
        handler: Arc<dyn ShutdownHandler>,
    ) -> Result<(), BackendError> {
        self.shutdown = Some(handler);
        Ok(())
    }

    fn sample_rate(&self) -> i32 {
        match self.client() {
            Some(client) => client.sample_rate() as i32,
            None => -1,
        }
    }

    fn activate(&mut self) -> Result<(), BackendError> {
        let process = self
            .process
            .take()
            .ok_or_else(|| BackendError::Activation("process handler not set".into()))?;
        let sample_rate = self
            .sample_rate
            .take()
            .ok_or_else(|| BackendError::Activation("sample-rate handler not set".into()))?;
        let shutdown = self
            .shutdown
            .take()
            .ok_or_else(|| BackendError::Activation("shutdown handler not set".into()))?;

        match std::mem::replace(&mut self.state, ClientState::Closed) {
            ClientState::Inactive {
                client,
                inputs,
                outputs,
            } => {
                let notifications = NotificationBridge {
                    sample_rate,
                    shutdown,
                };
                let bridge = ProcessBridge {
                    handler: process,
                    inputs,
                    outputs,
                };
                match client.activate_async(notifications, bridge) {
                    Ok(async_client) => {
                        self.state = ClientState::Active(async_client);
                        Ok(())
                    }
                    Err(err) => Err(BackendError::Activation(err.to_string())),
                }
            }
            other => {
                self.state = other;
                Err(BackendError::Activation("client is not inactive".into()))
            }
        }
    }

    fn deactivate(&mut self) -> Result<(), BackendError> {
        let state = std::mem::replace(&mut self.state, ClientState::Closed);
        match state {
            ClientState::Active(async_client) => match async_client.deactivate() {
                Ok((client, _notifications, _bridge)) => {
                    self.state = ClientState::Inactive {
                        client,
                        inputs: Vec::new(),
                        outputs: Vec::new(),
                    };
                    Ok(())
                }
                Err(err) => Err(BackendError::Deactivation(err.to_string())),
            },
            other => {
                self.state = other;
                Ok(())
            }
        }
    }

    fn physical_ports(&self) -> Vec<String> {
        match self.client() {
            Some(client) => client.ports(None, None, jack::PortFlags::IS_PHYSICAL),
            None => Vec::new(),
        }
    }

    fn port_info(&self, name: &str) -> Option<PortInfo> {
        let client = self.client()?;
        let port = client.port_by_name(name)?;
        let flags = port.flags();
        Some(PortInfo {
            physical: flags.contains(jack::PortFlags::IS_PHYSICAL),
            input: flags.contains(jack::PortFlags::IS_INPUT),
            output: flags.contains(jack::PortFlags::IS_OUTPUT),
            type_name: port.port_type().unwrap_or_default(),
        })
    }

    fn port_name(&self, port: PortId) -> String {
        self.port_names
            .get(port.0 as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn connect_ports(&mut self, source: &str, destination: &str) -> Result<(), BackendError> {
        let client = self.client().ok_or(BackendError::NotConnected)?;
        client
            .connect_ports_by_name(source, destination)
            .map_err(|err| BackendError::PortConnection {
                source_port: source.into(),
                destination: destination.into(),
                reason: err.to_string(),
            })
    }

    fn close(&mut self) -> Result<(), BackendError> {
        // Dropping the client closes the server connection.
        let state = std::mem::replace(&mut self.state, ClientState::Closed);
        if let ClientState::Active(async_client) = state {
            if let Err(err) = async_client.deactivate() {
                return Err(BackendError::Close(err.to_string()));
            }
        }
        Ok(())
    }
}

/// Forwards JACK process callbacks to the core handler, exposing the
/// registered ports through the core `PortBuffers` view.
pub(crate) struct ProcessBridge {
    handler: Arc<dyn ProcessHandler>,
    inputs: Vec<(u32, jack::Port<jack::AudioIn>)>,
    outputs: Vec<(u32, jack::Port<jack::AudioOut>)>,
}

impl jack::ProcessHandler for ProcessBridge {
    fn process(&mut self, _: &jack::Client, scope: &jack::ProcessScope) -> jack::Control {
        let mut buffers = ScopeBuffers {
            inputs: &self.inputs,
            outputs: &mut self.outputs,
            scope,
        };
        match self.handler.process(scope.n_frames(), &mut buffers) {
            ProcessControl::Continue => jack::Control::Continue,
            ProcessControl::Quit => jack::Control::Quit,
        }
    }
}

struct ScopeBuffers<'a> {
    inputs: &'a [(u32, jack::Port<jack::AudioIn>)],
    outputs: &'a mut [(u32, jack::Port<jack::AudioOut>)],
    scope: &'a jack::ProcessScope,
}

impl PortBuffers for ScopeBuffers<'_> {
    fn input(&self, port: PortId) -> Option<&[f32]> {
        self.inputs
            .iter()
            .find(|(id, _)| *id == port.0)
            .map(|(_, p)| p.as_slice(self.scope))
    }

    fn output(&mut self, port: PortId) -> Option<&mut [f32]> {
        self.outputs
            .iter_mut()
            .find(|(id, _)| *id == port.0)
            .map(|(_, p)| p.as_mut_slice(self.scope))
    }
}

/// Forwards sample-rate and shutdown notifications to the core handlers.
pub(crate) struct NotificationBridge {
    sample_rate: Arc<dyn SampleRateHandler>,
    shutdown: Arc<dyn ShutdownHandler>,
}

impl jack::NotificationHandler for NotificationBridge {
    fn sample_rate(&mut self, _: &jack::Client, rate: jack::Frames) -> jack::Control {
        match self.sample_rate.sample_rate_changed(rate) {
            ProcessControl::Continue => jack::Control::Continue,
            ProcessControl::Quit => jack::Control::Quit,
        }
    }

    unsafe fn shutdown(&mut self, _status: jack::ClientStatus, _reason: &str) {
        self.shutdown.server_shutdown();
    }
}
