pub mod backend;
pub mod bootstrap;
