//! Joystick vector to skid-steer drive outputs.
//!
//! [`ActuationMapper`] turns a [`MoveCommand`] into a [`DriveOutput`]: a
//! direction and a 12-bit PWM magnitude for each side of the robot.
//!
//! # Algorithm
//!
//! 1. **Direction** from the sign of `y`: stick forward (negative) drives
//!    both sides forward, stick back (positive) both reverse, zero leaves
//!    both sides stopped.
//! 2. **Base magnitude**: `power(v) = |v * (1 - 2^12)|`; both sides start at
//!    the larger of `power(x)` and `power(y)`, so a sideways-only stick still
//!    produces speed.
//! 3. **Turn bias** beyond the dead-zone (`|x| > 0.3` by default): the inner
//!    side is scaled by `1 - 2|x|`. Past `|x| = 0.5` the factor goes
//!    negative and that side flips to reverse, giving a pivot turn.
//! 4. **Clamp** both magnitudes to `0..4096`.
//!
//! # Example
//!
//! ```rust
//! use rs_rover::{ActuationMapper, Direction, MoveCommand};
//!
//! let mapper = ActuationMapper::default();
//!
//! // Full stick forward
//! let out = mapper.map(MoveCommand::new(0.0, -1.0));
//! assert_eq!(out.left.direction, Direction::Forward);
//! assert_eq!(out.left.pwm, 4095);
//! assert_eq!(out.right.pwm, 4095);
//!
//! // Hard right while moving forward: right side pivots backwards
//! let out = mapper.map(MoveCommand::new(1.0, -1.0));
//! assert_eq!(out.left.direction, Direction::Forward);
//! assert_eq!(out.right.direction, Direction::Reverse);
//! ```

use crate::command::MoveCommand;
use crate::config::DriveConfig;
use crate::traits::Direction;

/// Largest PWM magnitude (12-bit resolution).
pub const PWM_MAX: u16 = 4095;

/// Full-scale factor from the joystick axis: `1 - 2^12`.
const AXIS_SCALE: f32 = 1.0 - 4096.0;

// ============================================================================
// Drive Output
// ============================================================================

/// Drive output for one side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SideOutput {
    /// Which direction pin (if any) is asserted.
    pub direction: Direction,
    /// PWM magnitude, always `<= PWM_MAX`.
    pub pwm: u16,
}

impl SideOutput {
    /// Forward pin state.
    pub fn forward(&self) -> bool {
        self.direction == Direction::Forward
    }

    /// Reverse pin state.
    pub fn reverse(&self) -> bool {
        self.direction == Direction::Reverse
    }
}

/// Complete drive output: direction and magnitude for both sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriveOutput {
    /// Left motor channel.
    pub left: SideOutput,
    /// Right motor channel.
    pub right: SideOutput,
}

impl DriveOutput {
    /// Output that parks the drive: both sides stopped at zero.
    pub const STOP: DriveOutput = DriveOutput {
        left: SideOutput {
            direction: Direction::Stopped,
            pwm: 0,
        },
        right: SideOutput {
            direction: Direction::Stopped,
            pwm: 0,
        },
    };

    /// Left forward pin.
    pub fn left_forward(&self) -> bool {
        self.left.forward()
    }

    /// Left reverse pin.
    pub fn left_reverse(&self) -> bool {
        self.left.reverse()
    }

    /// Right forward pin.
    pub fn right_forward(&self) -> bool {
        self.right.forward()
    }

    /// Right reverse pin.
    pub fn right_reverse(&self) -> bool {
        self.right.reverse()
    }

    /// Left PWM magnitude.
    pub fn left_pwm(&self) -> u16 {
        self.left.pwm
    }

    /// Right PWM magnitude.
    pub fn right_pwm(&self) -> u16 {
        self.right.pwm
    }
}

// ============================================================================
// Mapper
// ============================================================================

/// Maps joystick vectors to skid-steer outputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActuationMapper {
    turn_threshold: f32,
}

impl Default for ActuationMapper {
    fn default() -> Self {
        Self::from_config(&DriveConfig::default())
    }
}

impl ActuationMapper {
    /// Create a mapper with the given turn dead-zone.
    pub fn new(turn_threshold: f32) -> Self {
        Self {
            turn_threshold: turn_threshold.abs(),
        }
    }

    /// Create a mapper from drive configuration.
    pub fn from_config(config: &DriveConfig) -> Self {
        Self::new(config.turn_threshold)
    }

    /// `|x|` at or below which no turn bias is applied.
    pub fn turn_threshold(&self) -> f32 {
        self.turn_threshold
    }

    /// Compute the drive output for a joystick vector.
    ///
    /// Any finite input (including values outside `[-1, 1]`) yields
    /// magnitudes in `0..=PWM_MAX`.
    pub fn map(&self, cmd: MoveCommand) -> DriveOutput {
        let MoveCommand { x_axis, y_axis } = cmd;

        let direction = if y_axis < 0.0 {
            Direction::Forward
        } else if y_axis > 0.0 {
            Direction::Reverse
        } else {
            Direction::Stopped
        };

        let base = power(y_axis).max(power(x_axis));
        let mut left = Side::new(direction, base);
        let mut right = Side::new(direction, base);

        if x_axis > self.turn_threshold {
            right.bias(x_axis);
        } else if x_axis < -self.turn_threshold {
            left.bias(x_axis);
        }

        DriveOutput {
            left: left.finish(),
            right: right.finish(),
        }
    }
}

fn power(axis: f32) -> f32 {
    (axis * AXIS_SCALE).abs()
}

/// One side while its magnitude is still floating point.
struct Side {
    direction: Direction,
    magnitude: f32,
}

impl Side {
    fn new(direction: Direction, magnitude: f32) -> Self {
        Self {
            direction,
            magnitude,
        }
    }

    // Inner wheel slows, then reverses once the factor crosses zero.
    fn bias(&mut self, x_axis: f32) {
        let factor = 1.0 - x_axis.abs() * 2.0;
        self.magnitude *= factor;
        if self.magnitude < 0.0 {
            self.direction = Direction::Reverse;
            self.magnitude = self.magnitude.abs();
        }
    }

    fn finish(self) -> SideOutput {
        SideOutput {
            direction: self.direction,
            pwm: clamp_pwm(self.magnitude),
        }
    }
}

/// Clamp a magnitude into `0..=PWM_MAX`, truncating the fraction.
///
/// NaN maps to 0.
pub fn clamp_pwm(magnitude: f32) -> u16 {
    if magnitude.is_nan() {
        return 0;
    }
    magnitude.clamp(0.0, f32::from(PWM_MAX)) as u16
}
