//! # audio-backend-jack
//!
//! JACK binding for audio-backend-kit.
//!
//! Provides:
//! - `JackServer` — opens clients against a running JACK server
//! - `JackClientHandle` — port registration, callbacks, and the
//!   activate/deactivate lifecycle for one client connection
//!
//! The binding never starts a JACK server on its own; if no server is
//! running, opening a client fails with the server's status bits.
//!
//! ## Usage
//! ```ignore
//! use audio_backend_core::session::bootstrap::start_backend;
//! use audio_backend_jack::JackServer;
//!
//! let handle = start_backend(JackServer::new(), config, active, &mut registrar)?;
//! ```

pub mod server;

pub use server::{JackClientHandle, JackServer};
