// Motor board interfaces
//
// The ThunderBorg-style board drives two motors, reports a fault bit per
// motor driver, has a communications failsafe that stops the motors when
// no command arrives in time, and carries an RGB status LED.

use crate::error::MotorError;

pub type Result<T> = std::result::Result<T, MotorError>;

/// Two-channel motor driver. Motor 1 is the left side, motor 2 the right.
pub trait MotorInterface {
    /// Set motor 1 power, -1.0 (full reverse) .. +1.0 (full forward)
    fn set_motor1(&mut self, power: f64) -> Result<()>;

    /// Set motor 2 power, -1.0 (full reverse) .. +1.0 (full forward)
    fn set_motor2(&mut self, power: f64) -> Result<()>;

    fn motors_off(&mut self) -> Result<()>;

    fn drive_fault1(&mut self) -> Result<bool>;

    fn drive_fault2(&mut self) -> Result<bool>;

    fn set_comms_failsafe(&mut self, enabled: bool) -> Result<()>;

    fn comms_failsafe(&mut self) -> Result<bool>;
}

/// RGB status LED with a battery-level display mode
pub trait StatusIndicator {
    /// When enabled the LED shows battery level and ignores `set_leds`
    fn set_led_show_battery(&mut self, enabled: bool) -> Result<()>;

    fn set_leds(&mut self, red: f64, green: f64, blue: f64) -> Result<()>;
}

/// A board providing both motors and the status LED
pub trait MotorBoard: MotorInterface + StatusIndicator {}

impl<T: MotorInterface + StatusIndicator> MotorBoard for T {}
