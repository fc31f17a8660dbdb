// Control pipeline for the DiddyBorg base
//
// Provides:
// - Channel mapping (frame -> throttle, steering, buttons)
// - Differential drive control law
// - Edge-triggered motor fault monitoring

pub mod drive;
pub mod fault;
pub mod mapper;

pub use drive::{compute_drive, max_power, DriveLimits};
pub use fault::{FaultMonitor, FaultStatus};
pub use mapper::{map, normalize_axis, MappedInputs};
