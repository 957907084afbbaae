//! Mock implementations for testing without hardware.
//!
//! [`MockBus`] records every frame written to the PWM driver and tracks the
//! level of each direction pin, so tests (and the desktop server) can run
//! the full command path without an I2C bus or GPIO chip.
//!
//! # Example
//!
//! ```rust
//! use rs_rover::{RobotController, hal::MockBus};
//! use rs_rover::traits::{DrivePin, PinLevel};
//!
//! let mut controller = RobotController::new(MockBus::new());
//! controller.initialize().unwrap();
//! controller.handle_message("move,0,-1");
//!
//! let bus = controller.bus();
//! assert_eq!(bus.level(DrivePin::LeftForward), PinLevel::High);
//! assert_eq!(bus.writes.len(), 4); // pan, tilt, left, right
//! ```

extern crate alloc;

use alloc::vec::Vec;

use crate::traits::{DeviceBus, DrivePin, PinLevel};

/// Error injected by [`MockBus`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MockBusError {
    /// A register write was refused.
    WriteFailed,
    /// A register read was refused.
    ReadFailed,
    /// A pin could not be driven.
    PinFailed(DrivePin),
}

/// Mock device bus for testing.
///
/// Use the public fields to inspect traffic or inject failures.
///
/// # Example
///
/// ```rust
/// use rs_rover::hal::MockBus;
/// use rs_rover::traits::DeviceBus;
///
/// let mut bus = MockBus::new().with_identity(0x20);
///
/// let mut buf = [0u8; 1];
/// assert_eq!(bus.read_register(0x00, &mut buf), Ok(1));
/// assert_eq!(buf[0], 0x20);
///
/// bus.fail_writes = true;
/// assert!(bus.write(&[0x06, 0, 0, 1, 0]).is_err());
/// assert!(bus.writes.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MockBus {
    /// Every frame successfully written, in order.
    pub writes: Vec<Vec<u8>>,
    /// Every register read, in order.
    pub reads: Vec<u8>,
    /// Current level of each pin, indexed by [`DrivePin::index`].
    pub pins: [PinLevel; 4],
    /// Number of `set_pin` calls.
    pub pin_calls: usize,
    /// Byte returned by register reads.
    pub identity: u8,
    /// Bytes actually "read" per call; `None` fills the whole buffer.
    pub identity_len: Option<usize>,
    /// Refuse every write.
    pub fail_writes: bool,
    /// Refuse every read.
    pub fail_reads: bool,
    /// Refuse every pin change.
    pub fail_pins: bool,
}

impl MockBus {
    /// Creates a new mock bus with all pins low.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the byte returned by register reads.
    pub fn with_identity(mut self, identity: u8) -> Self {
        self.identity = identity;
        self
    }

    /// Make register reads return only `len` bytes.
    pub fn with_identity_len(mut self, len: usize) -> Self {
        self.identity_len = Some(len);
        self
    }

    /// Current level of `pin`.
    pub fn level(&self, pin: DrivePin) -> PinLevel {
        self.pins[pin.index()]
    }

    /// The most recent frame written.
    pub fn last_write(&self) -> Option<&[u8]> {
        self.writes.last().map(Vec::as_slice)
    }

    /// Forget recorded writes and reads.
    pub fn clear_writes(&mut self) {
        self.writes.clear();
        self.reads.clear();
    }
}

impl DeviceBus for MockBus {
    type Error = MockBusError;

    fn write(&mut self, bytes: &[u8]) -> Result<(), MockBusError> {
        if self.fail_writes {
            return Err(MockBusError::WriteFailed);
        }
        self.writes.push(bytes.to_vec());
        Ok(())
    }

    fn read_register(&mut self, register: u8, buf: &mut [u8]) -> Result<usize, MockBusError> {
        if self.fail_reads {
            return Err(MockBusError::ReadFailed);
        }
        self.reads.push(register);
        let len = self.identity_len.unwrap_or(buf.len()).min(buf.len());
        buf[..len].fill(self.identity);
        Ok(len)
    }

    fn set_pin(&mut self, pin: DrivePin, level: PinLevel) -> Result<(), MockBusError> {
        if self.fail_pins {
            return Err(MockBusError::PinFailed(pin));
        }
        self.pins[pin.index()] = level;
        self.pin_calls += 1;
        Ok(())
    }
}
