//! Register frames for the I2C PWM driver.
//!
//! Every set-point sent to the PWM driver is a fixed 5-byte frame:
//!
//! ```text
//! [address, 0x00, 0x00, low(value), high(value)]
//! ```
//!
//! The address is the channel's `ON_L` register; the two zero bytes set the
//! channel's "on" tick to 0 and the little-endian value is the "off" tick,
//! so the value is the pulse width in 1/4096ths of a period.
//!
//! # Example
//!
//! ```rust
//! use rs_rover::codec::{decode, encode};
//!
//! let frame = encode(0x06, 325).unwrap();
//! assert_eq!(frame, [0x06, 0x00, 0x00, 0x45, 0x01]);
//!
//! let write = decode(&frame).unwrap();
//! assert_eq!(write.address, 0x06);
//! assert_eq!(write.value, 325);
//! ```

use core::fmt;

/// Length of an encoded register frame.
pub const FRAME_LEN: usize = 5;

/// Errors produced by the register codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// Value was negative or did not fit in 16 bits.
    ValueOutOfRange(i32),
    /// Frame had the wrong length or non-zero padding bytes.
    BadFrame,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::ValueOutOfRange(v) => write!(f, "register value {} out of range 0..=65535", v),
            CodecError::BadFrame => f.write_str("malformed register frame"),
        }
    }
}

/// A single register write: channel address plus 16-bit value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterWrite {
    /// Register address of the channel.
    pub address: u8,
    /// Set-point written little-endian after the two padding bytes.
    pub value: u16,
}

impl RegisterWrite {
    /// Create a register write.
    pub const fn new(address: u8, value: u16) -> Self {
        Self { address, value }
    }

    /// The on-the-wire frame for this write.
    pub const fn frame(&self) -> [u8; FRAME_LEN] {
        let [low, high] = self.value.to_le_bytes();
        [self.address, 0x00, 0x00, low, high]
    }
}

/// Encode `value` for the register at `address`.
///
/// Returns [`CodecError::ValueOutOfRange`] for negative values or values
/// above `u16::MAX`.
pub fn encode(address: u8, value: i32) -> Result<[u8; FRAME_LEN], CodecError> {
    let value = u16::try_from(value).map_err(|_| CodecError::ValueOutOfRange(value))?;
    Ok(RegisterWrite::new(address, value).frame())
}

/// Decode a frame produced by [`encode`].
pub fn decode(frame: &[u8]) -> Result<RegisterWrite, CodecError> {
    match frame {
        [address, 0x00, 0x00, low, high] => Ok(RegisterWrite {
            address: *address,
            value: u16::from_le_bytes([*low, *high]),
        }),
        _ => Err(CodecError::BadFrame),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_layout() {
        assert_eq!(encode(0x42, 0x0fff).unwrap(), [0x42, 0x00, 0x00, 0xff, 0x0f]);
        assert_eq!(encode(0x3e, 0).unwrap(), [0x3e, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn encode_initial_setpoints() {
        // Startup pan/tilt frames
        assert_eq!(encode(0x06, 375).unwrap(), [0x06, 0x00, 0x00, 0x77, 0x01]);
        assert_eq!(encode(0x0a, 300).unwrap(), [0x0a, 0x00, 0x00, 0x2c, 0x01]);
    }

    #[test]
    fn encode_bounds() {
        assert!(encode(0x06, 0).is_ok());
        assert!(encode(0x06, 65535).is_ok());
        assert_eq!(encode(0x06, -1), Err(CodecError::ValueOutOfRange(-1)));
        assert_eq!(encode(0x06, 65536), Err(CodecError::ValueOutOfRange(65536)));
    }

    #[test]
    fn decode_round_trip_samples() {
        for v in [0, 1, 150, 255, 256, 600, 4095, 4096, 32768, 65535] {
            let frame = encode(0x06, v).unwrap();
            assert_eq!(decode(&frame).unwrap().value as i32, v);
        }
    }

    #[test]
    fn decode_rejects_bad_frames() {
        assert_eq!(decode(&[0x06, 0x00, 0x00, 0x01]), Err(CodecError::BadFrame));
        assert_eq!(decode(&[0x06, 0x01, 0x00, 0x01, 0x00]), Err(CodecError::BadFrame));
        assert_eq!(decode(&[]), Err(CodecError::BadFrame));
    }

    #[test]
    fn register_write_frame_matches_encode() {
        let write = RegisterWrite::new(0x3e, 1234);
        assert_eq!(write.frame(), encode(0x3e, 1234).unwrap());
    }
}
