// Ports, protocol literals, joystick mapping and power settings
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

// UDP ports (joystick app sends to RX, listens on TX)
pub const RX_PORT: u16 = 12001;
pub const TX_PORT: u16 = 12000;

// Receive buffer size (1 kByte)
pub const RECV_BUFFER_SIZE: usize = 1024;

// Single-byte requests answered without touching the motors
pub const IDENTIFY_REQUEST: u8 = b'?';
pub const VERSION_REQUEST: u8 = b'0';
pub const IDENTITY_REPLY: &[u8] = b"T=Diddyborg";
pub const VERSION_REPLY: &[u8] = b"1.0";

// Minimum pwm signal to indicate a switch is on
pub const SWITCH_ON_MIN: u16 = 1750;

// Speed when the slow button is held, e.g. 0.5 is half speed
pub const SLOW_FACTOR: f64 = 0.5;

// Total battery voltage to the board, and the maximum motor voltage
// (limited to 95% so the Pi keeps uninterrupted power)
pub const VOLTAGE_IN: f64 = 12.0;
pub const VOLTAGE_OUT: f64 = 12.0 * 0.95;

// Command timeout for watchdog, 0 disables it
pub const CMD_TIMEOUT_MS: u64 = 250;

// Attempts to get the board to report failsafe armed
pub const FAILSAFE_ATTEMPTS: u32 = 5;

// Zenoh topics (telemetry only)
pub const TOPIC_RT_DRIVE: &str = "diddyborg/rt/drive"; // drive levels
pub const TOPIC_HEALTH: &str = "diddyborg/state/health"; // health status

/// Number of channels in a control frame
pub const CHANNEL_COUNT: usize = 8;

/// Which frame channel feeds which input. Channels are 1-based.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    pub throttle_channel: usize,
    pub throttle_inverted: bool,
    pub steering_channel: usize,
    pub steering_inverted: bool,
    pub fast_turn_channel: usize,
    pub slow_channel: usize,
    pub button_threshold: u16,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            throttle_channel: 1,
            throttle_inverted: false,
            steering_channel: 2,
            steering_inverted: false,
            fast_turn_channel: 3,
            slow_channel: 4,
            button_threshold: SWITCH_ON_MIN,
        }
    }
}

impl AxisConfig {
    /// Check every channel index lies in 1..=8
    pub fn validate(&self) -> Result<(), ConfigError> {
        let channels = [
            ("throttle", self.throttle_channel),
            ("steering", self.steering_channel),
            ("fast_turn", self.fast_turn_channel),
            ("slow", self.slow_channel),
        ];
        for (name, index) in channels {
            if !(1..=CHANNEL_COUNT).contains(&index) {
                return Err(ConfigError::ChannelIndexOutOfRange { name, index });
            }
        }
        Ok(())
    }
}

/// Everything tunable, fixed once at startup
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub rx_port: u16,
    pub tx_port: u16,
    pub axes: AxisConfig,
    pub slow_factor: f64,
    pub voltage_in: f64,
    pub voltage_out: f64,
    /// Clamp drive levels to [-1, 1] before the power limit
    pub clamp_drive: bool,
    pub cmd_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            rx_port: RX_PORT,
            tx_port: TX_PORT,
            axes: AxisConfig::default(),
            slow_factor: SLOW_FACTOR,
            voltage_in: VOLTAGE_IN,
            voltage_out: VOLTAGE_OUT,
            clamp_drive: true,
            cmd_timeout_ms: CMD_TIMEOUT_MS,
        }
    }
}

impl BridgeConfig {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.axes.validate()?;

        let voltages_ok = self.voltage_in.is_finite()
            && self.voltage_in > 0.0
            && self.voltage_out.is_finite()
            && self.voltage_out >= 0.0;
        if !voltages_ok {
            return Err(ConfigError::InvalidVoltage {
                voltage_in: self.voltage_in,
                voltage_out: self.voltage_out,
            });
        }

        if !self.slow_factor.is_finite() || self.slow_factor < 0.0 {
            return Err(ConfigError::InvalidSlowFactor(self.slow_factor));
        }
        Ok(())
    }

    /// Watchdog timeout, `None` when disabled
    pub fn cmd_timeout(&self) -> Option<Duration> {
        (self.cmd_timeout_ms > 0).then(|| Duration::from_millis(self.cmd_timeout_ms))
    }
}
