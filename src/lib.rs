//! # rs-rover
//!
//! A websocket control gateway for a skid-steer rover with a pan/tilt camera.
//!
//! Text commands from a browser (`cameraPan,v`, `cameraTilt,v`, `move,x,y`)
//! become PCA9685 register writes over I2C and H-bridge direction pins.
//!
//! ## Features
//!
//! - **Hardware abstraction**: One [`DeviceBus`] trait for register writes, reads and pins
//! - **Pure core**: Parsing, skid-steer mapping and frame encoding have no I/O
//! - **Bounded camera**: Pan/tilt set-points always stay inside the servo range
//! - **Shared control**: Any number of websocket sessions drive one controller
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `command` - Control-channel message parsing
//! - `position` - Pan/tilt set-points and servo range
//! - `mapper` - Joystick vector to skid-steer outputs
//! - `codec` - PCA9685 register frame encoding
//! - `controller` - Ties everything together and talks to the bus
//! - `hal` - Concrete buses (mock for testing, embedded-hal for hardware)
//! - `services` - Shared state and the axum websocket server
//!
//! ## Example
//!
//! ```rust
//! use rs_rover::{Dispatch, RobotController, hal::MockBus, traits::Direction};
//!
//! // Create controller with mock bus
//! let mut controller = RobotController::new(MockBus::new());
//! controller.initialize().unwrap();
//!
//! // Tilt the camera one notch
//! controller.handle_message("cameraTilt,1");
//! assert_eq!(controller.state().tilt, 310);
//!
//! // Full speed ahead (joystick up is negative y)
//! if let Dispatch::Moved(out) = controller.handle_message("move,0,-1") {
//!     assert_eq!(out.left.direction, Direction::Forward);
//!     assert_eq!(out.left_pwm(), 4095);
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// PCA9685 register frame encoding.
pub mod codec;
/// Control-channel command parsing.
pub mod command;
/// Robot controller that coordinates commands, set-points, and hardware.
pub mod controller;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Skid-steer mapping from joystick vectors to motor outputs.
pub mod mapper;
/// Pan/tilt set-points and servo range.
pub mod position;
/// Core traits for hardware abstraction.
pub mod traits;

/// Shared configuration system.
pub mod config;

/// Shared state and the websocket server.
#[cfg(feature = "std")]
pub mod services;

// Re-exports for convenience
pub use codec::{CodecError, RegisterWrite};
pub use command::{Command, CommandKind, KindMatch, MoveCommand, ParseError};
pub use controller::{Dispatch, RobotController, RobotState, RoverError};
pub use mapper::{ActuationMapper, DriveOutput, SideOutput};
pub use position::{PanTiltState, ServoRange};
pub use traits::{DeviceBus, Direction, DrivePin, PinLevel};

pub use config::{
    CameraConfig, Config, DriveConfig, PinConfig, ProtocolConfig, PwmConfig, WebConfig,
};
