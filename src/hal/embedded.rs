//! [`DeviceBus`] over `embedded-hal` 1.0 I2C and output pins.
//!
//! Any board with an `embedded-hal` I2C driver and four output pins can run
//! the rover. On a Raspberry Pi the `rover` binary builds this from
//! `linux-embedded-hal`'s `I2cdev` and `CdevPin`.
//!
//! Wiring expected by the defaults:
//! - PCA9685 on I2C address 0x40
//! - Left H-bridge enables on BCM 24 (forward) / 23 (reverse)
//! - Right H-bridge enables on BCM 17 (forward) / 22 (reverse)
//!
//! # Example
//!
//! ```ignore
//! use rs_rover::hal::EmbeddedHalBus;
//!
//! let bus = EmbeddedHalBus::new(i2c, 0x40, [left_fwd, left_rev, right_fwd, right_rev])?;
//! let mut controller = RobotController::new(bus);
//! controller.initialize()?;
//! ```

use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::{I2c, SevenBitAddress};

use crate::traits::{DeviceBus, DrivePin, PinLevel};

/// Errors from [`EmbeddedHalBus`].
#[derive(Debug, PartialEq)]
pub enum HalBusError<IE, PE> {
    /// I2C transfer failed.
    I2c(IE),
    /// Output pin could not be driven.
    Pin(DrivePin, PE),
}

/// Device bus built from an `embedded-hal` I2C bus and four output pins.
pub struct EmbeddedHalBus<I2C, P> {
    i2c: I2C,
    address: SevenBitAddress,
    /// In [`DrivePin::ALL`] order.
    pins: [P; 4],
}

impl<I2C, P> EmbeddedHalBus<I2C, P>
where
    I2C: I2c,
    P: OutputPin,
{
    /// Create the bus and drive every pin low.
    ///
    /// `pins` are in [`DrivePin::ALL`] order: left forward, left reverse,
    /// right forward, right reverse.
    pub fn new(
        i2c: I2C,
        address: SevenBitAddress,
        pins: [P; 4],
    ) -> Result<Self, HalBusError<I2C::Error, P::Error>> {
        let mut bus = Self { i2c, address, pins };
        bus.release_pins()?;
        Ok(bus)
    }

    /// The PWM driver's I2C address.
    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    /// Release the underlying I2C bus and pins.
    pub fn release(self) -> (I2C, [P; 4]) {
        (self.i2c, self.pins)
    }
}

impl<I2C, P> DeviceBus for EmbeddedHalBus<I2C, P>
where
    I2C: I2c,
    P: OutputPin,
{
    type Error = HalBusError<I2C::Error, P::Error>;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.i2c.write(self.address, bytes).map_err(HalBusError::I2c)
    }

    fn read_register(&mut self, register: u8, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.i2c
            .write_read(self.address, &[register], buf)
            .map_err(HalBusError::I2c)?;
        Ok(buf.len())
    }

    fn set_pin(&mut self, pin: DrivePin, level: PinLevel) -> Result<(), Self::Error> {
        let out = &mut self.pins[pin.index()];
        let result = match level {
            PinLevel::High => out.set_high(),
            PinLevel::Low => out.set_low(),
        };
        result.map_err(|e| HalBusError::Pin(pin, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dispatch, RobotController};
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType as PinErrorType;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    // =========================================================================
    // Fakes
    // =========================================================================

    #[derive(Default)]
    struct FakeI2c {
        writes: Vec<(u8, Vec<u8>)>,
        register_value: u8,
        fail: bool,
    }

    impl ErrorType for FakeI2c {
        type Error = ErrorKind;
    }

    impl I2c for FakeI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), ErrorKind> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                match op {
                    Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                    Operation::Read(buf) => buf.fill(self.register_value),
                }
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakePin {
        high: bool,
    }

    impl PinErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }
    }

    fn pins() -> [FakePin; 4] {
        [
            FakePin { high: true },
            FakePin { high: true },
            FakePin { high: true },
            FakePin { high: true },
        ]
    }

    // =========================================================================
    // Tests
    // =========================================================================

    #[test]
    fn new_drives_pins_low() {
        let bus = EmbeddedHalBus::new(FakeI2c::default(), 0x40, pins()).unwrap();
        let (_, pins) = bus.release();
        assert!(pins.iter().all(|p| !p.high));
    }

    #[test]
    fn write_goes_to_device_address() {
        let mut bus = EmbeddedHalBus::new(FakeI2c::default(), 0x40, pins()).unwrap();
        bus.write(&[0x06, 0, 0, 0x77, 0x01]).unwrap();

        let (i2c, _) = bus.release();
        assert_eq!(i2c.writes, vec![(0x40, vec![0x06, 0, 0, 0x77, 0x01])]);
    }

    #[test]
    fn read_register_writes_address_then_reads() {
        let i2c = FakeI2c {
            register_value: 0x11,
            ..Default::default()
        };
        let mut bus = EmbeddedHalBus::new(i2c, 0x40, pins()).unwrap();

        let mut buf = [0u8; 1];
        assert_eq!(bus.read_register(0x00, &mut buf), Ok(1));
        assert_eq!(buf, [0x11]);

        let (i2c, _) = bus.release();
        assert_eq!(i2c.writes, vec![(0x40, vec![0x00])]);
    }

    #[test]
    fn i2c_errors_propagate() {
        let i2c = FakeI2c {
            fail: true,
            ..Default::default()
        };
        let mut bus = EmbeddedHalBus::new(i2c, 0x40, pins()).unwrap();
        assert_eq!(bus.write(&[0]), Err(HalBusError::I2c(ErrorKind::Other)));
    }

    #[test]
    fn controller_over_embedded_hal() {
        let bus = EmbeddedHalBus::new(FakeI2c::default(), 0x40, pins()).unwrap();
        let mut controller = RobotController::new(bus);
        controller.initialize().unwrap();

        let dispatch = controller.handle_message("move,-1,1");
        assert!(matches!(dispatch, Dispatch::Moved(_)));

        let (i2c, pins) = controller.into_bus().release();
        // identity read, pan, tilt, left, right
        assert_eq!(i2c.writes.len(), 5);
        // Reversing with a hard left: both sides reverse
        let levels: Vec<bool> = pins.iter().map(|p| p.high).collect();
        assert_eq!(levels, vec![false, true, false, true]);
    }
}
