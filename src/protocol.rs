// Joystick app datagram format
//
// Control frame: [reserved, reserved, ch1_lo, ch1_hi, ..., ch8_lo, ch8_hi]
// 2 skipped bytes followed by 8 little-endian u16 pulse widths (1000..2000).

use crate::config::{CHANNEL_COUNT, IDENTIFY_REQUEST, VERSION_REQUEST};
use crate::error::DecodeError;

/// Reserved bytes at the start of every control frame
pub const HEADER_LEN: usize = 2;

/// Total control frame size in bytes
pub const FRAME_LEN: usize = HEADER_LEN + CHANNEL_COUNT * 2;

/// One decoded snapshot of all channel values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelFrame([u16; CHANNEL_COUNT]);

impl ChannelFrame {
    pub fn new(channels: [u16; CHANNEL_COUNT]) -> Self {
        Self(channels)
    }

    /// All channels centered, buttons released
    pub fn neutral() -> Self {
        Self([1500, 1500, 1000, 1000, 1500, 1500, 1500, 1500])
    }

    /// Value of a 1-based channel, `None` outside 1..=8
    pub fn get(&self, channel: usize) -> Option<u16> {
        channel.checked_sub(1).and_then(|i| self.0.get(i)).copied()
    }

    pub fn as_array(&self) -> [u16; CHANNEL_COUNT] {
        self.0
    }
}

/// What a received datagram asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// `?`: reply with the device identity
    Identify,
    /// `0`: reply with the protocol version
    Version,
    Control(ChannelFrame),
}

/// Decode an 18-byte control frame
pub fn decode(raw: &[u8]) -> Result<ChannelFrame, DecodeError> {
    if raw.len() != FRAME_LEN {
        return Err(DecodeError::WrongLength {
            expected: FRAME_LEN,
            actual: raw.len(),
        });
    }

    let mut channels = [0u16; CHANNEL_COUNT];
    for (value, bytes) in channels
        .iter_mut()
        .zip(raw[HEADER_LEN..].chunks_exact(2))
    {
        *value = u16::from_le_bytes([bytes[0], bytes[1]]);
    }
    Ok(ChannelFrame(channels))
}

/// Encode a channel frame, reserved bytes zeroed
pub fn encode(frame: &ChannelFrame) -> [u8; FRAME_LEN] {
    let mut raw = [0u8; FRAME_LEN];
    for (bytes, value) in raw[HEADER_LEN..].chunks_exact_mut(2).zip(frame.0) {
        bytes.copy_from_slice(&value.to_le_bytes());
    }
    raw
}

/// Sort a datagram into a query or a control frame
pub fn classify(payload: &[u8]) -> Result<Request, DecodeError> {
    match payload {
        [IDENTIFY_REQUEST] => Ok(Request::Identify),
        [VERSION_REQUEST] => Ok(Request::Version),
        _ => decode(payload).map(Request::Control),
    }
}
