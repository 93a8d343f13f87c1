pub mod pipeline;
pub mod registrar;
pub mod server;
