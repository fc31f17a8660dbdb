pub mod config;
pub mod control;
pub mod error;
pub mod messages;
pub mod motor;
pub mod protocol;
pub mod runtime;
pub mod telemetry;
