// High-level driver for the DiddyBorg motor board
//
// Wraps a board implementation with the startup, drive, status and
// shutdown sequences the runtime needs.

use tracing::{debug, info, warn};

use crate::config::FAILSAFE_ATTEMPTS;
use crate::control::FaultStatus;
use crate::error::MotorError;
use crate::messages::DriveCommand;

use super::board::{MotorBoard, MotorInterface, StatusIndicator};

/// Fault colour: purple
const FAULT_LEDS: (f64, f64, f64) = (1.0, 0.0, 1.0);
/// Startup colour: blue
const STARTUP_LEDS: (f64, f64, f64) = (0.0, 0.0, 1.0);

pub struct BoardDriver<B: MotorBoard> {
    board: B,
    armed: bool,
}

impl<B: MotorBoard> BoardDriver<B> {
    pub fn new(board: B) -> Self {
        Self {
            board,
            armed: false,
        }
    }

    /// Arm the communications failsafe, stop the motors and put the LED
    /// in battery display mode.
    ///
    /// Must be called before sending drive commands. Once this succeeds
    /// the shutdown sequence runs on drop.
    pub fn initialize(&mut self) -> Result<(), MotorError> {
        info!("Initializing motor board");

        let mut failsafe = false;
        for attempt in 1..=FAILSAFE_ATTEMPTS {
            self.board.set_comms_failsafe(true)?;
            failsafe = self.board.comms_failsafe()?;
            if failsafe {
                debug!("Failsafe armed after {} attempt(s)", attempt);
                break;
            }
        }
        if !failsafe {
            return Err(MotorError::FailsafeNotArmed {
                attempts: FAILSAFE_ATTEMPTS,
            });
        }
        self.armed = true;

        self.board.motors_off()?;
        self.board.set_led_show_battery(false)?;
        let (r, g, b) = STARTUP_LEDS;
        self.board.set_leds(r, g, b)?;
        self.board.set_led_show_battery(true)?;

        info!("Motor board initialized successfully");
        Ok(())
    }

    /// Send left/right power to motors 1/2
    pub fn set_drive(&mut self, drive: &DriveCommand) -> Result<(), MotorError> {
        debug!("Setting drive: left={:.3}, right={:.3}", drive.left, drive.right);
        self.board.set_motor1(drive.left)?;
        self.board.set_motor2(drive.right)
    }

    /// Read both drive fault bits. A failed read counts as a fault.
    pub fn read_faults(&mut self) -> (bool, bool) {
        let fault1 = self.board.drive_fault1().unwrap_or_else(|e| {
            warn!("Failed to read drive fault 1: {}", e);
            true
        });
        let fault2 = self.board.drive_fault2().unwrap_or_else(|e| {
            warn!("Failed to read drive fault 2: {}", e);
            true
        });
        (fault1, fault2)
    }

    /// Switch the LED between battery display and the fault colour
    pub fn show_status(&mut self, status: FaultStatus) -> Result<(), MotorError> {
        match status {
            FaultStatus::Fault => {
                self.board.set_led_show_battery(false)?;
                let (r, g, b) = FAULT_LEDS;
                self.board.set_leds(r, g, b)
            }
            FaultStatus::Normal => self.board.set_led_show_battery(true),
        }
    }

    /// Stop both motors
    pub fn stop(&mut self) -> Result<(), MotorError> {
        info!("Stopping all motors");
        self.board.motors_off()
    }

    /// Motors off, failsafe disarmed, LED off. Every step is attempted even
    /// if an earlier one fails.
    pub fn shutdown(&mut self) {
        info!("Shutting down motor board");
        let steps: [(&str, Result<(), MotorError>); 4] = [
            ("stop motors", self.board.motors_off()),
            ("disable failsafe", self.board.set_comms_failsafe(false)),
            ("disable battery display", self.board.set_led_show_battery(false)),
            ("turn off LEDs", self.board.set_leds(0.0, 0.0, 0.0)),
        ];
        for (step, result) in steps {
            if let Err(e) = result {
                warn!("Failed to {} on shutdown: {}", step, e);
            }
        }
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn board(&self) -> &B {
        &self.board
    }
}

impl<B: MotorBoard> Drop for BoardDriver<B> {
    fn drop(&mut self) {
        // Leave the robot stopped whichever way the runtime exits
        if self.armed {
            self.shutdown();
        }
    }
}
