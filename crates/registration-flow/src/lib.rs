pub mod config;
pub mod error;
pub mod flow;
pub mod registration;
pub mod session;
pub mod telemetry;
