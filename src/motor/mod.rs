// Motor board module for the DiddyBorg base
//
// Provides:
// - Motor and status LED interfaces for the board
// - High-level board driver (startup, drive, status, shutdown)
// - Simulated board for bench runs and tests

pub mod board;
mod driver;
mod simulated;

pub use board::{MotorBoard, MotorInterface, StatusIndicator};
pub use driver::BoardDriver;
pub use simulated::{BoardState, SimulatedBoard};
