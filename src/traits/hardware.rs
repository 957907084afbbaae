//! Hardware abstraction for the PWM driver and motor direction pins.
//!
//! The rover talks to exactly two kinds of hardware: an I2C PWM driver
//! (PCA9685-style, 12-bit channels) and four GPIO outputs that select motor
//! direction on an H-bridge. Both are reached through a single capability
//! trait, [`DeviceBus`], so the actuation core can run against
//! [`MockBus`](crate::hal::MockBus) on a desktop.
//!
//! # Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`DeviceBus`] | Register writes/reads and pin levels |
//! | [`DrivePin`] | The four direction outputs |
//! | [`PinLevel`] | High/low output level |
//! | [`Direction`] | Per-side drive direction |
//!
//! # Example
//!
//! ```rust
//! use rs_rover::traits::{DeviceBus, DrivePin, PinLevel};
//! use rs_rover::hal::MockBus;
//!
//! let mut bus = MockBus::new();
//! bus.write(&[0x06, 0x00, 0x00, 0x77, 0x01]).unwrap();
//! bus.set_pin(DrivePin::LeftForward, PinLevel::High).unwrap();
//!
//! assert_eq!(bus.writes.len(), 1);
//! assert_eq!(bus.level(DrivePin::LeftForward), PinLevel::High);
//! ```

/// Direction of one side of the drive train.
///
/// Each side has a forward and a reverse pin; a `Direction` decides which of
/// them is high. Modelling it as one value means both pins can never be
/// asserted at the same time.
///
/// # Default
///
/// Defaults to [`Stopped`](Self::Stopped) for safety.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Forward pin high, reverse pin low.
    Forward,
    /// Reverse pin high, forward pin low.
    Reverse,
    /// Both pins low. The H-bridge is inert regardless of PWM.
    #[default]
    Stopped,
}

impl Direction {
    /// Returns the direction as a lowercase string.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_rover::Direction;
    ///
    /// assert_eq!(Direction::Forward.as_str(), "forward");
    /// assert_eq!(Direction::Reverse.as_str(), "reverse");
    /// assert_eq!(Direction::Stopped.as_str(), "stopped");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Reverse => "reverse",
            Direction::Stopped => "stopped",
        }
    }

    /// Pin levels for this direction as `(forward, reverse)`.
    #[inline]
    pub const fn levels(&self) -> (PinLevel, PinLevel) {
        match self {
            Direction::Forward => (PinLevel::High, PinLevel::Low),
            Direction::Reverse => (PinLevel::Low, PinLevel::High),
            Direction::Stopped => (PinLevel::Low, PinLevel::Low),
        }
    }
}

/// Output level of a GPIO pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PinLevel {
    /// Driven low (the power-on state of every direction pin).
    #[default]
    Low,
    /// Driven high.
    High,
}

impl PinLevel {
    /// Returns `true` for [`PinLevel::High`].
    #[inline]
    pub const fn is_high(&self) -> bool {
        matches!(self, PinLevel::High)
    }
}

impl From<bool> for PinLevel {
    fn from(high: bool) -> Self {
        if high {
            PinLevel::High
        } else {
            PinLevel::Low
        }
    }
}

/// The four motor direction outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DrivePin {
    /// Left side, forward enable.
    LeftForward,
    /// Left side, reverse enable.
    LeftReverse,
    /// Right side, forward enable.
    RightForward,
    /// Right side, reverse enable.
    RightReverse,
}

impl DrivePin {
    /// All pins, in the order they are written after a move.
    pub const ALL: [DrivePin; 4] = [
        DrivePin::LeftForward,
        DrivePin::LeftReverse,
        DrivePin::RightForward,
        DrivePin::RightReverse,
    ];

    /// Index into [`DrivePin::ALL`].
    #[inline]
    pub const fn index(&self) -> usize {
        match self {
            DrivePin::LeftForward => 0,
            DrivePin::LeftReverse => 1,
            DrivePin::RightForward => 2,
            DrivePin::RightReverse => 3,
        }
    }
}

/// Device capability consumed by the rover controller.
///
/// Implement this for your I2C PWM driver and GPIO lines. The controller
/// never touches hardware any other way.
///
/// # Implementation Notes
///
/// - `write` sends one raw I2C frame to the PWM driver (register address
///   first, see [`crate::codec`])
/// - `read_register` reads `buf.len()` bytes starting at `register` and
///   returns how many were actually read
/// - Pins should already be configured as pulled-down outputs, driven low,
///   by the time the bus is handed to the controller
///
/// # Example Implementation
///
/// ```rust,ignore
/// use rs_rover::traits::{DeviceBus, DrivePin, PinLevel};
///
/// struct MyBus { /* i2c handle, gpio lines */ }
///
/// impl DeviceBus for MyBus {
///     type Error = std::io::Error;
///
///     fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
///         // i2c write to the PWM driver address...
///         Ok(())
///     }
///
///     fn read_register(&mut self, register: u8, buf: &mut [u8]) -> Result<usize, Self::Error> {
///         // i2c write-read...
///         Ok(buf.len())
///     }
///
///     fn set_pin(&mut self, pin: DrivePin, level: PinLevel) -> Result<(), Self::Error> {
///         // gpio line set_value...
///         Ok(())
///     }
/// }
/// ```
pub trait DeviceBus {
    /// Error type for bus operations.
    type Error: core::fmt::Debug;

    /// Write a raw frame to the PWM driver.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Read bytes starting at `register`, returning the number read.
    fn read_register(&mut self, register: u8, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Drive a direction pin to the given level.
    fn set_pin(&mut self, pin: DrivePin, level: PinLevel) -> Result<(), Self::Error>;

    /// Drive every direction pin low.
    fn release_pins(&mut self) -> Result<(), Self::Error> {
        for pin in DrivePin::ALL {
            self.set_pin(pin, PinLevel::Low)?;
        }
        Ok(())
    }
}
