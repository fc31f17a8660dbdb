// Error types for the bridge

use std::path::PathBuf;

/// Frame decoding errors. A bad frame is dropped, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Wrong frame length: expected {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}

/// Startup configuration errors (fatal)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Channel index {index} for {name} out of range (expected 1..=8)")]
    ChannelIndexOutOfRange { name: &'static str, index: usize },

    #[error("Invalid battery voltages: in={voltage_in}, out={voltage_out}")]
    InvalidVoltage { voltage_in: f64, voltage_out: f64 },

    #[error("Invalid slow factor: {0}")]
    InvalidSlowFactor(f64),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Motor board communication errors
#[derive(Debug, thiserror::Error)]
pub enum MotorError {
    #[error("Motor board not responding")]
    NotResponding,

    #[error("Motor board failed to report in failsafe mode after {attempts} attempts")]
    FailsafeNotArmed { attempts: u32 },

    #[error("Motor board IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level runtime error
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Motor error: {0}")]
    Motor(#[from] MotorError),

    #[error("Socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Telemetry error: {0}")]
    Telemetry(String),
}
