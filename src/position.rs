//! Pan/tilt servo set-points.
//!
//! The camera servos are driven by absolute PWM set-points. Commands arrive
//! as relative deltas, so the current set-points are tracked here and every
//! new target is clamped to the servos' safe travel range.
//!
//! Updates are two-phase: [`PanTiltState::pan_target`] computes where the
//! servo should go, and [`PanTiltState::commit_pan`] records it once the
//! device write has succeeded. A failed write therefore never moves the
//! tracked position.
//!
//! # Example
//!
//! ```rust
//! use rs_rover::position::PanTiltState;
//!
//! let mut state = PanTiltState::default();
//! assert_eq!(state.pan(), 375);
//!
//! let target = state.pan_target(5.0);
//! assert_eq!(target, 325);
//! state.commit_pan(target);
//! assert_eq!(state.pan(), 325);
//! ```

use crate::config::CameraConfig;

/// Closed range of servo set-points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServoRange {
    /// Lowest allowed set-point.
    pub min: u16,
    /// Highest allowed set-point.
    pub max: u16,
}

impl Default for ServoRange {
    fn default() -> Self {
        Self { min: 150, max: 600 }
    }
}

impl ServoRange {
    /// Create a range, swapping the bounds if given in the wrong order.
    pub fn new(a: u16, b: u16) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Clamp any integer into the range.
    #[inline]
    pub fn clamp(&self, value: i32) -> u16 {
        // min/max fit in u16, so the clamped value does too
        value.clamp(i32::from(self.min), i32::from(self.max)) as u16
    }

    /// Whether `value` lies inside the range.
    #[inline]
    pub fn contains(&self, value: u16) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Current pan and tilt set-points.
#[derive(Clone, Debug, PartialEq)]
pub struct PanTiltState {
    pan: u16,
    tilt: u16,
    range: ServoRange,
    step: f32,
}

impl Default for PanTiltState {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl PanTiltState {
    /// Build the startup state from camera configuration.
    ///
    /// Initial set-points outside the range are clamped into it.
    pub fn from_config(config: &CameraConfig) -> Self {
        let range = ServoRange::new(config.min, config.max);
        Self {
            pan: range.clamp(i32::from(config.initial_pan)),
            tilt: range.clamp(i32::from(config.initial_tilt)),
            range,
            step: config.step,
        }
    }

    /// Current pan set-point.
    pub fn pan(&self) -> u16 {
        self.pan
    }

    /// Current tilt set-point.
    pub fn tilt(&self) -> u16 {
        self.tilt
    }

    /// Travel range shared by both servos.
    pub fn range(&self) -> ServoRange {
        self.range
    }

    /// Target pan for a pan command of `input`.
    ///
    /// Positive input pans left, which lowers the set-point:
    /// `pan - trunc(input * step)`, clamped.
    pub fn pan_target(&self, input: f32) -> u16 {
        let delta = self.scaled(input);
        self.range.clamp(i32::from(self.pan).saturating_sub(delta))
    }

    /// Target tilt for a tilt command of `input`: `tilt + trunc(input * step)`, clamped.
    pub fn tilt_target(&self, input: f32) -> u16 {
        let delta = self.scaled(input);
        self.range.clamp(i32::from(self.tilt).saturating_add(delta))
    }

    /// Record a pan set-point that has been written to the device.
    pub fn commit_pan(&mut self, pan: u16) {
        self.pan = self.range.clamp(i32::from(pan));
    }

    /// Record a tilt set-point that has been written to the device.
    pub fn commit_tilt(&mut self, tilt: u16) {
        self.tilt = self.range.clamp(i32::from(tilt));
    }

    // Truncates toward zero; `as` saturates on overflow and maps NaN to 0.
    fn scaled(&self, input: f32) -> i32 {
        (input * self.step) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // ServoRange Tests
    // =========================================================================

    #[test]
    fn range_default() {
        let range = ServoRange::default();
        assert_eq!(range.min, 150);
        assert_eq!(range.max, 600);
    }

    #[test]
    fn range_clamp() {
        let range = ServoRange::default();
        assert_eq!(range.clamp(100), 150);
        assert_eq!(range.clamp(700), 600);
        assert_eq!(range.clamp(375), 375);
        assert_eq!(range.clamp(i32::MIN), 150);
        assert_eq!(range.clamp(i32::MAX), 600);
    }

    #[test]
    fn range_clamp_idempotent() {
        let range = ServoRange::default();
        for v in [-5000, 0, 149, 150, 151, 375, 599, 600, 601, 90_000] {
            let once = range.clamp(v);
            assert_eq!(range.clamp(i32::from(once)), once);
        }
    }

    #[test]
    fn range_new_orders_bounds() {
        let range = ServoRange::new(600, 150);
        assert_eq!(range, ServoRange::default());
    }

    // =========================================================================
    // PanTiltState Tests
    // =========================================================================

    #[test]
    fn state_defaults() {
        let state = PanTiltState::default();
        assert_eq!(state.pan(), 375);
        assert_eq!(state.tilt(), 300);
    }

    #[test]
    fn pan_subtracts_scaled_input() {
        let state = PanTiltState::default();
        assert_eq!(state.pan_target(5.0), 325);
        assert_eq!(state.pan_target(-5.0), 425);
    }

    #[test]
    fn tilt_adds_scaled_input() {
        let state = PanTiltState::default();
        assert_eq!(state.tilt_target(5.0), 350);
        assert_eq!(state.tilt_target(-5.0), 250);
    }

    #[test]
    fn targets_truncate_toward_zero() {
        let state = PanTiltState::default();
        // 0.79 * 10 = 7.9 -> 7
        assert_eq!(state.pan_target(0.79), 368);
        // -0.79 * 10 = -7.9 -> -7
        assert_eq!(state.pan_target(-0.79), 382);
        assert_eq!(state.tilt_target(0.05), 300);
    }

    #[test]
    fn targets_clamped() {
        let state = PanTiltState::default();
        assert_eq!(state.pan_target(100.0), 150);
        assert_eq!(state.pan_target(-100.0), 600);
        assert_eq!(state.tilt_target(1.0e30), 600);
        assert_eq!(state.tilt_target(-1.0e30), 150);
    }

    #[test]
    fn target_does_not_mutate() {
        let state = PanTiltState::default();
        let _ = state.pan_target(5.0);
        let _ = state.tilt_target(5.0);
        assert_eq!(state.pan(), 375);
        assert_eq!(state.tilt(), 300);
    }

    #[test]
    fn commit_updates_state() {
        let mut state = PanTiltState::default();
        state.commit_pan(200);
        state.commit_tilt(500);
        assert_eq!(state.pan(), 200);
        assert_eq!(state.tilt(), 500);
    }

    #[test]
    fn commit_clamps_out_of_range() {
        let mut state = PanTiltState::default();
        state.commit_pan(10);
        state.commit_tilt(9000);
        assert_eq!(state.pan(), 150);
        assert_eq!(state.tilt(), 600);
    }

    #[test]
    fn repeated_commands_stay_in_range() {
        let mut state = PanTiltState::default();
        for _ in 0..100 {
            let target = state.pan_target(7.3);
            state.commit_pan(target);
            assert!(state.range().contains(state.pan()));
        }
        assert_eq!(state.pan(), 150);
    }

    #[test]
    fn from_config_clamps_initial() {
        let config = CameraConfig::default().with_initial(10, 1000);
        let state = PanTiltState::from_config(&config);
        assert_eq!(state.pan(), 150);
        assert_eq!(state.tilt(), 600);
    }
}
