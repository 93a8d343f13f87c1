pub mod config;
pub mod devices;
pub mod error;
pub mod format;
pub mod status;
