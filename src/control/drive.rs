// Differential drive control law
//
// Turns normalized throttle/steering plus the two buttons into left and
// right motor power levels.

use crate::config::BridgeConfig;
use crate::messages::DriveCommand;

use super::mapper::MappedInputs;

/// Steering below this magnitude is treated as straight ahead
pub const DEAD_ZONE: f64 = 0.05;

/// Steering sensitivity while the fast-turn button is released
pub const STEERING_ATTENUATION: f64 = 0.5;

/// Power-limit ratio, capped at 1.0 when the motors are rated above the battery
pub fn max_power(voltage_in: f64, voltage_out: f64) -> f64 {
    if voltage_out > voltage_in {
        1.0
    } else {
        voltage_out / voltage_in
    }
}

/// Compute left/right drive levels.
///
/// The order of operations is fixed: steering attenuation, throttle
/// negation, dead-zone turn mixing, slow modifier, power limit.
///
/// Both sides start at `-throttle`. A stick pushed forward reads as a
/// negative throttle, and the motor polarity is wired to match, so the
/// negation must stay.
pub fn compute_drive(
    steering: f64,
    throttle: f64,
    fast_turn: bool,
    slow: bool,
    max_power: f64,
    slow_factor: f64,
) -> DriveCommand {
    let (left, right) = mix(steering, throttle, fast_turn, slow, slow_factor);
    DriveCommand::new(left * max_power, right * max_power)
}

fn mix(steering: f64, throttle: f64, fast_turn: bool, slow: bool, slow_factor: f64) -> (f64, f64) {
    let steering = if fast_turn {
        steering
    } else {
        steering * STEERING_ATTENUATION
    };

    let mut left = -throttle;
    let mut right = -throttle;

    if steering < -DEAD_ZONE {
        // Turning left
        left *= 1.0 + 2.0 * steering;
    } else if steering > DEAD_ZONE {
        // Turning right
        right *= 1.0 - 2.0 * steering;
    }

    if slow {
        left *= slow_factor;
        right *= slow_factor;
    }

    (left, right)
}

/// Power settings applied to every frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveLimits {
    pub max_power: f64,
    pub slow_factor: f64,
    /// Clamp to [-1, 1] before the power limit, guarding against malformed frames
    pub clamp: bool,
}

impl DriveLimits {
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            max_power: max_power(config.voltage_in, config.voltage_out),
            slow_factor: config.slow_factor,
            clamp: config.clamp_drive,
        }
    }

    pub fn apply(&self, inputs: &MappedInputs) -> DriveCommand {
        if !self.clamp {
            return compute_drive(
                inputs.steering,
                inputs.throttle,
                inputs.fast_turn,
                inputs.slow,
                self.max_power,
                self.slow_factor,
            );
        }

        let (left, right) = mix(
            inputs.steering,
            inputs.throttle,
            inputs.fast_turn,
            inputs.slow,
            self.slow_factor,
        );
        DriveCommand::new(
            left.clamp(-1.0, 1.0) * self.max_power,
            right.clamp(-1.0, 1.0) * self.max_power,
        )
    }
}
