// Message types produced by the runtime

use serde::{Deserialize, Serialize};

// Drive output from runtime -> motor board
// Has default values because the motors start (and stop) at zero
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct DriveCommand {
    pub left: f64,
    pub right: f64,
}

impl DriveCommand {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}

/// Health status published by runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    CmdStale,
    Fault,
}
