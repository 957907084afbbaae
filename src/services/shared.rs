//! Shared controller state for all websocket sessions.
//!
//! `SharedRobotState` wraps the single `RobotController` in a mutex so any
//! number of connections can send commands without interleaving register
//! writes or racing on the pan/tilt set-points.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rs_rover::services::SharedRobotState;
//!
//! let state = Arc::new(SharedRobotState::new(controller));
//!
//! // Each session dispatches through the same lock
//! let dispatch = state.handle_message("cameraTilt,1");
//!
//! // Reads take the lock briefly
//! let snapshot = state.state();
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::traits::DeviceBus;
use crate::{Dispatch, RobotController, RobotState, RoverError};

/// Shared state for every control session.
///
/// # Thread Safety
///
/// - One `Mutex` guards the controller, which owns both the position state
///   and the device bus. A command holds it for its whole read-modify-write,
///   so two sessions can never interleave frames on the I2C bus.
/// - The closure API keeps the guard from being held across an `.await`.
/// - Device writes are blocking and run on the calling async task. Each
///   command is a few short I2C frames and GPIO sets, well under a
///   millisecond, so dispatch stays inline rather than moving to
///   `spawn_blocking`.
pub struct SharedRobotState<B: DeviceBus> {
    controller: Mutex<RobotController<B>>,
    next_session: AtomicU64,
}

impl<B: DeviceBus> SharedRobotState<B> {
    /// Create new shared state wrapping a controller.
    pub fn new(controller: RobotController<B>) -> Self {
        Self {
            controller: Mutex::new(controller),
            next_session: AtomicU64::new(1),
        }
    }

    /// Access the controller with the lock held.
    ///
    /// # Example
    ///
    /// ```ignore
    /// state.with_controller(|controller| controller.stop())?;
    /// ```
    pub fn with_controller<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut RobotController<B>) -> R,
    {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Dispatch one control-channel message.
    pub fn handle_message(&self, message: &str) -> Dispatch {
        self.with_controller(|controller| controller.handle_message(message))
    }

    /// Get a state snapshot.
    pub fn state(&self) -> RobotState {
        self.lock().state()
    }

    /// Park the drive.
    pub fn stop(&self) -> Result<(), RoverError<B::Error>> {
        self.with_controller(|controller| controller.stop())
    }

    /// Allocate an id for a new session (used in log lines).
    pub fn next_session_id(&self) -> u64 {
        self.next_session.fetch_add(1, Ordering::Relaxed)
    }

    // Poisoning is ignored: a panicked command leaves state no worse than a failed write.
    fn lock(&self) -> MutexGuard<'_, RobotController<B>> {
        self.controller
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
