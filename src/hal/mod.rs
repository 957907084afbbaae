//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementation for desktop development
//! - `embedded`: Any `embedded-hal` 1.0 I2C bus plus output pins (requires `hal` feature)

pub mod mock;

#[cfg(feature = "hal")]
pub mod embedded;

pub use mock::*;

#[cfg(feature = "hal")]
pub use embedded::*;
