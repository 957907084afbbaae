//! Trait definitions for hardware abstraction.
//!
//! This module defines the single capability the rover controller needs:
//! a [`DeviceBus`] that writes PWM register frames, reads registers, and
//! drives the motor direction pins. Everything else in the crate is plain
//! computation over that trait, so it runs unchanged against
//! [`MockBus`](crate::hal::MockBus) or real hardware.

pub mod hardware;

pub use hardware::*;
