//! Robot controller that ties parsing, mapping and hardware together.
//!
//! [`RobotController`] owns the device bus, the pan/tilt set-points and the
//! skid-steer mapper. It is the only thing that writes to hardware.
//!
//! # Overview
//!
//! The controller:
//! - Verifies the PWM driver and writes the startup set-points ([`initialize`])
//! - Turns control-channel messages into device writes ([`handle_message`])
//! - Parks the drive on shutdown ([`stop`])
//!
//! # Example
//!
//! ```rust
//! use rs_rover::{Dispatch, RobotController, hal::MockBus};
//!
//! let mut controller = RobotController::new(MockBus::new());
//! controller.initialize().unwrap();
//!
//! let dispatch = controller.handle_message("cameraPan,5.0");
//! assert_eq!(dispatch, Dispatch::Panned { from: 375, to: 325 });
//! assert_eq!(controller.state().pan, 325);
//!
//! // The last frame written carries the new pan set-point
//! assert_eq!(controller.bus().last_write(), Some(&[0x06, 0x00, 0x00, 0x45, 0x01][..]));
//! ```
//!
//! # Thread Safety
//!
//! The controller itself is not thread-safe. For a web server with several
//! connections, wrap it in `SharedRobotState` from the services module
//! (requires the `web` feature), which serializes every command.
//!
//! [`initialize`]: RobotController::initialize
//! [`handle_message`]: RobotController::handle_message
//! [`stop`]: RobotController::stop

use core::fmt;

use crate::codec::{self, CodecError};
use crate::command::{Command, CommandKind, KindMatch, MoveCommand, ParseError};
use crate::config::{Config, PwmConfig};
use crate::mapper::{ActuationMapper, DriveOutput};
use crate::position::PanTiltState;
use crate::traits::{DeviceBus, DrivePin};

// ============================================================================
// Errors
// ============================================================================

/// Errors from controller operations.
#[derive(Debug, PartialEq)]
pub enum RoverError<E> {
    /// The device bus reported an error.
    Bus(E),
    /// A set-point could not be encoded.
    Codec(CodecError),
    /// The identity read returned the wrong number of bytes.
    IdentityMismatch {
        /// Bytes requested.
        expected: usize,
        /// Bytes actually read.
        actual: usize,
    },
}

impl<E> From<CodecError> for RoverError<E> {
    fn from(e: CodecError) -> Self {
        RoverError::Codec(e)
    }
}

impl<E: fmt::Debug> fmt::Display for RoverError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoverError::Bus(e) => write!(f, "device bus error: {:?}", e),
            RoverError::Codec(e) => write!(f, "{}", e),
            RoverError::IdentityMismatch { expected, actual } => write!(
                f,
                "failed to read device identity, have {} bytes, want {}",
                actual, expected
            ),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for RoverError<E> {}

// ============================================================================
// Dispatch Outcome
// ============================================================================

/// What happened to one control-channel message.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Dispatch {
    /// Pan set-point written and committed.
    Panned {
        /// Previous set-point.
        from: u16,
        /// New set-point.
        to: u16,
    },
    /// Tilt set-point written and committed.
    Tilted {
        /// Previous set-point.
        from: u16,
        /// New set-point.
        to: u16,
    },
    /// Drive output written.
    Moved(DriveOutput),
    /// The message did not parse; nothing was actuated.
    Rejected(ParseError),
    /// A device write failed; state for this command was not committed.
    DeviceFailed(CommandKind),
}

/// Snapshot of the controller state.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RobotState {
    /// Current pan set-point.
    pub pan: u16,
    /// Current tilt set-point.
    pub tilt: u16,
    /// Last drive output fully written to the device.
    pub drive: DriveOutput,
}

#[derive(Clone, Copy, Debug)]
struct Registers {
    identity: u8,
    pan: u8,
    tilt: u8,
    left: u8,
    right: u8,
}

impl From<&PwmConfig> for Registers {
    fn from(config: &PwmConfig) -> Self {
        Self {
            identity: config.identity_register,
            pan: config.pan_register,
            tilt: config.tilt_register,
            left: config.left_register,
            right: config.right_register,
        }
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Rover controller.
///
/// # Type Parameter
///
/// - `B`: The device bus implementation ([`DeviceBus`] trait)
pub struct RobotController<B: DeviceBus> {
    bus: B,
    position: PanTiltState,
    mapper: ActuationMapper,
    registers: Registers,
    kind_match: KindMatch,
    drive: DriveOutput,
}

impl<B: DeviceBus> RobotController<B> {
    /// Create a controller with the default configuration.
    pub fn new(bus: B) -> Self {
        Self::with_config(bus, &Config::default())
    }

    /// Create a controller from configuration.
    pub fn with_config(bus: B, config: &Config) -> Self {
        Self {
            bus,
            position: PanTiltState::from_config(&config.camera),
            mapper: ActuationMapper::from_config(&config.drive),
            registers: Registers::from(&config.pwm),
            kind_match: config.protocol.kind_match(),
            drive: DriveOutput::STOP,
        }
    }

    /// Bring the hardware to its startup state.
    ///
    /// Reads one identity byte from the PWM driver, writes the initial pan
    /// and tilt set-points and drives all direction pins low. Returns the
    /// identity byte. Any error here should be treated as fatal.
    pub fn initialize(&mut self) -> Result<u8, RoverError<B::Error>> {
        let mut id = [0u8; 1];
        let read = self
            .bus
            .read_register(self.registers.identity, &mut id)
            .map_err(RoverError::Bus)?;
        if read != id.len() {
            return Err(RoverError::IdentityMismatch {
                expected: id.len(),
                actual: read,
            });
        }
        log::info!("PWM driver identity: {:02x}", id[0]);

        self.write_register(self.registers.pan, self.position.pan())?;
        self.write_register(self.registers.tilt, self.position.tilt())?;
        self.bus.release_pins().map_err(RoverError::Bus)?;
        self.drive = DriveOutput::STOP;

        log::info!(
            "initial set-points written: pan {}, tilt {}",
            self.position.pan(),
            self.position.tilt()
        );
        Ok(id[0])
    }

    /// Parse and execute one control-channel message.
    ///
    /// Never fails: parse and device errors are logged and reported in the
    /// returned [`Dispatch`], so the caller can keep reading messages.
    pub fn handle_message(&mut self, message: &str) -> Dispatch {
        log::debug!("received: {}", message);

        let cmd = match Command::parse_with(message, self.kind_match) {
            Ok(cmd) => cmd,
            Err(e) => {
                log::warn!("rejected command '{}': {}", message, e);
                return Dispatch::Rejected(e);
            }
        };

        match self.apply(cmd) {
            Ok(dispatch) => dispatch,
            Err(e) => {
                log::error!("could not apply {} command: {}", cmd.kind(), e);
                Dispatch::DeviceFailed(cmd.kind())
            }
        }
    }

    /// Execute a parsed command.
    pub fn apply(&mut self, cmd: Command) -> Result<Dispatch, RoverError<B::Error>> {
        match cmd {
            Command::Pan(input) => {
                let from = self.position.pan();
                let to = self.pan(input)?;
                Ok(Dispatch::Panned { from, to })
            }
            Command::Tilt(input) => {
                let from = self.position.tilt();
                let to = self.tilt(input)?;
                Ok(Dispatch::Tilted { from, to })
            }
            Command::Move(mv) => self.drive(mv).map(Dispatch::Moved),
        }
    }

    /// Pan the camera by `input` steps, returning the new set-point.
    ///
    /// The set-point is only committed once the device write succeeds.
    pub fn pan(&mut self, input: f32) -> Result<u16, RoverError<B::Error>> {
        let target = self.position.pan_target(input);
        log::info!("old pan: {}, new pan: {}", self.position.pan(), target);
        self.write_register(self.registers.pan, target)?;
        self.position.commit_pan(target);
        Ok(target)
    }

    /// Tilt the camera by `input` steps, returning the new set-point.
    pub fn tilt(&mut self, input: f32) -> Result<u16, RoverError<B::Error>> {
        let target = self.position.tilt_target(input);
        log::info!("old tilt: {}, new tilt: {}", self.position.tilt(), target);
        self.write_register(self.registers.tilt, target)?;
        self.position.commit_tilt(target);
        Ok(target)
    }

    /// Map a joystick vector and write it to the motors.
    pub fn drive(&mut self, cmd: MoveCommand) -> Result<DriveOutput, RoverError<B::Error>> {
        let output = self.mapper.map(cmd);
        log::debug!(
            "x: {:.2}, y: {:.2}, left: {} {}, right: {} {}",
            cmd.x_axis,
            cmd.y_axis,
            output.left.direction.as_str(),
            output.left.pwm,
            output.right.direction.as_str(),
            output.right.pwm
        );
        self.write_drive(output)?;
        Ok(output)
    }

    /// Park the drive: both PWM channels to zero and all pins low.
    pub fn stop(&mut self) -> Result<(), RoverError<B::Error>> {
        self.write_drive(DriveOutput::STOP)
    }

    /// Current state snapshot.
    pub fn state(&self) -> RobotState {
        RobotState {
            pan: self.position.pan(),
            tilt: self.position.tilt(),
            drive: self.drive,
        }
    }

    /// Pan/tilt set-points.
    pub fn position(&self) -> &PanTiltState {
        &self.position
    }

    /// The device bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutable access to the device bus.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Consume the controller and return the bus.
    pub fn into_bus(self) -> B {
        self.bus
    }

    fn write_register(&mut self, register: u8, value: u16) -> Result<(), RoverError<B::Error>> {
        let frame = codec::encode(register, i32::from(value))?;
        self.bus.write(&frame).map_err(RoverError::Bus)
    }

    // Best effort: every write is attempted and the first error is returned.
    fn write_drive(&mut self, output: DriveOutput) -> Result<(), RoverError<B::Error>> {
        let mut first_err = None;

        for (register, pwm) in [
            (self.registers.left, output.left.pwm),
            (self.registers.right, output.right.pwm),
        ] {
            if let Err(e) = self.write_register(register, pwm) {
                log::error!("could not write pwm speed to {:#04x}: {}", register, e);
                first_err.get_or_insert(e);
            }
        }

        let (left_fwd, left_rev) = output.left.direction.levels();
        let (right_fwd, right_rev) = output.right.direction.levels();
        for (pin, level) in [
            (DrivePin::LeftForward, left_fwd),
            (DrivePin::LeftReverse, left_rev),
            (DrivePin::RightForward, right_fwd),
            (DrivePin::RightReverse, right_rev),
        ] {
            if let Err(e) = self.bus.set_pin(pin, level) {
                log::error!("could not set {:?} {:?}: {:?}", pin, level, e);
                first_err.get_or_insert(RoverError::Bus(e));
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => {
                self.drive = output;
                Ok(())
            }
        }
    }
}
