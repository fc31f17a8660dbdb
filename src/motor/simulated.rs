// In-memory motor board for bench runs without hardware
//
// Clones share the same state so a caller can keep a handle and inspect
// (or inject faults into) a board that the runtime owns.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use super::board::{MotorInterface, Result, StatusIndicator};

/// Snapshot of the simulated board
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    pub motor1: f64,
    pub motor2: f64,
    pub fault1: bool,
    pub fault2: bool,
    pub failsafe: bool,
    pub battery_display: bool,
    pub leds: (f64, f64, f64),
    /// Number of `set_motor*` / `motors_off` calls
    pub motor_writes: u32,
    /// Number of LED mode / colour writes
    pub led_writes: u32,
    /// Board ignores failsafe enable requests
    pub reject_failsafe: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedBoard {
    state: Arc<Mutex<BoardState>>,
}

impl SimulatedBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> BoardState {
        self.lock().clone()
    }

    /// Inject drive fault bits
    pub fn set_faults(&self, fault1: bool, fault2: bool) {
        let mut state = self.lock();
        state.fault1 = fault1;
        state.fault2 = fault2;
    }

    /// Make the board refuse to arm its failsafe
    pub fn reject_failsafe(&self) {
        self.lock().reject_failsafe = true;
    }
}

impl MotorInterface for SimulatedBoard {
    fn set_motor1(&mut self, power: f64) -> Result<()> {
        debug!("Motor 1 -> {:.3}", power);
        let mut state = self.lock();
        state.motor1 = power;
        state.motor_writes += 1;
        Ok(())
    }

    fn set_motor2(&mut self, power: f64) -> Result<()> {
        debug!("Motor 2 -> {:.3}", power);
        let mut state = self.lock();
        state.motor2 = power;
        state.motor_writes += 1;
        Ok(())
    }

    fn motors_off(&mut self) -> Result<()> {
        let mut state = self.lock();
        state.motor1 = 0.0;
        state.motor2 = 0.0;
        state.motor_writes += 1;
        Ok(())
    }

    fn drive_fault1(&mut self) -> Result<bool> {
        Ok(self.lock().fault1)
    }

    fn drive_fault2(&mut self) -> Result<bool> {
        Ok(self.lock().fault2)
    }

    fn set_comms_failsafe(&mut self, enabled: bool) -> Result<()> {
        let mut state = self.lock();
        if !(enabled && state.reject_failsafe) {
            state.failsafe = enabled;
        }
        Ok(())
    }

    fn comms_failsafe(&mut self) -> Result<bool> {
        Ok(self.lock().failsafe)
    }
}

impl StatusIndicator for SimulatedBoard {
    fn set_led_show_battery(&mut self, enabled: bool) -> Result<()> {
        debug!("LED battery display {}", if enabled { "on" } else { "off" });
        let mut state = self.lock();
        state.battery_display = enabled;
        state.led_writes += 1;
        Ok(())
    }

    fn set_leds(&mut self, red: f64, green: f64, blue: f64) -> Result<()> {
        debug!("LED -> ({}, {}, {})", red, green, blue);
        let mut state = self.lock();
        state.leds = (red, green, blue);
        state.led_writes += 1;
        Ok(())
    }
}
