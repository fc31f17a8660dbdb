// Channel frame -> throttle/steering axes and buttons

use crate::config::AxisConfig;
use crate::error::ConfigError;
use crate::protocol::ChannelFrame;

/// Pulse width of a centered stick
const CENTER_US: f64 = 1500.0;
/// Pulse width offset for full deflection
const HALF_RANGE_US: f64 = 500.0;

/// Semantic inputs for one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedInputs {
    /// Normalized deflection, -1.0 .. +1.0 for in-range pulses
    pub throttle: f64,
    pub steering: f64,
    pub fast_turn: bool,
    pub slow: bool,
}

/// Normalize a pulse width: 1000 -> -1.0, 1500 -> 0.0, 2000 -> +1.0
pub fn normalize_axis(raw: u16, inverted: bool) -> f64 {
    let value = (f64::from(raw) - CENTER_US) / HALF_RANGE_US;
    if inverted { -value } else { value }
}

fn channel(frame: &ChannelFrame, name: &'static str, index: usize) -> Result<u16, ConfigError> {
    frame
        .get(index)
        .ok_or(ConfigError::ChannelIndexOutOfRange { name, index })
}

/// Map a decoded frame to semantic inputs
pub fn map(frame: &ChannelFrame, config: &AxisConfig) -> Result<MappedInputs, ConfigError> {
    let throttle = channel(frame, "throttle", config.throttle_channel)?;
    let steering = channel(frame, "steering", config.steering_channel)?;
    let fast_turn = channel(frame, "fast_turn", config.fast_turn_channel)?;
    let slow = channel(frame, "slow", config.slow_channel)?;

    Ok(MappedInputs {
        throttle: normalize_axis(throttle, config.throttle_inverted),
        steering: normalize_axis(steering, config.steering_inverted),
        fast_turn: fast_turn > config.button_threshold,
        slow: slow > config.button_threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(throttle: u16, steering: u16, fast_turn: u16, slow: u16) -> ChannelFrame {
        ChannelFrame::new([throttle, steering, fast_turn, slow, 1500, 1500, 1500, 1500])
    }

    #[test]
    fn test_normalize_axis() {
        assert_eq!(normalize_axis(1000, false), -1.0);
        assert_eq!(normalize_axis(1500, false), 0.0);
        assert_eq!(normalize_axis(2000, false), 1.0);
        assert_eq!(normalize_axis(1750, false), 0.5);
        assert_eq!(normalize_axis(1000, true), 1.0);
        assert_eq!(normalize_axis(2000, true), -1.0);
        // Out of range pulses are not clamped here
        assert_eq!(normalize_axis(2500, false), 2.0);
    }

    #[test]
    fn test_map_defaults() {
        let inputs = map(&frame(1000, 1750, 1000, 2000), &AxisConfig::default()).unwrap();
        assert_eq!(inputs.throttle, -1.0);
        assert_eq!(inputs.steering, 0.5);
        assert!(!inputs.fast_turn);
        assert!(inputs.slow);
    }

    #[test]
    fn test_button_threshold_is_exclusive() {
        let config = AxisConfig::default();
        let at = map(&frame(1500, 1500, 1750, 1750), &config).unwrap();
        assert!(!at.fast_turn && !at.slow);

        let above = map(&frame(1500, 1500, 1751, 1751), &config).unwrap();
        assert!(above.fast_turn && above.slow);
    }

    #[test]
    fn test_inverted_and_remapped_channels() {
        let config = AxisConfig {
            throttle_channel: 5,
            throttle_inverted: true,
            steering_channel: 6,
            steering_inverted: true,
            fast_turn_channel: 7,
            slow_channel: 8,
            button_threshold: 1750,
        };
        let frame = ChannelFrame::new([1500, 1500, 1000, 1000, 1000, 2000, 1900, 1100]);
        let inputs = map(&frame, &config).unwrap();
        assert_eq!(inputs.throttle, 1.0);
        assert_eq!(inputs.steering, -1.0);
        assert!(inputs.fast_turn);
        assert!(!inputs.slow);
    }

    #[test]
    fn test_index_out_of_range() {
        let config = AxisConfig {
            fast_turn_channel: 9,
            ..AxisConfig::default()
        };
        assert!(matches!(
            map(&ChannelFrame::neutral(), &config),
            Err(ConfigError::ChannelIndexOutOfRange {
                name: "fast_turn",
                index: 9
            })
        ));
    }
}
