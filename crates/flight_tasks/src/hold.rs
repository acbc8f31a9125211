//! Brake-and-hold decision.
//!
//! Once the operator centers the stick the vehicle keeps braking under pure
//! velocity control. The position is latched only after the measured speed
//! has dropped below the hold threshold, so the lock never lands on a point
//! the vehicle is still carrying momentum past.
//!
//! ```text
//!            stick centered && stopped
//!  UNLOCKED ---------------------------> LOCKED
//!     ^                                    |
//!     +------------ stick moved -----------+
//! ```

use crate::setpoint::HorizontalEstimate;
use crate::vector::Vector2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HoldState {
    /// Velocity tracking only, position setpoint absent.
    Unlocked,
    /// Position held at the latched point.
    Locked,
}

/// True when the velocity setpoint commands no horizontal motion.
pub fn brake_requested(velocity_setpoint: Vector2) -> bool {
    velocity_setpoint.length() <= f32::EPSILON
}

/// True when the vehicle counts as stopped.
///
/// A threshold at or below epsilon disables the check: the vehicle is then
/// always considered stopped and locks as soon as the brake is requested.
pub fn is_stopped(velocity: Vector2, hold_threshold: f32) -> bool {
    hold_threshold <= f32::EPSILON || velocity.length() < hold_threshold
}

/// Held horizontal position, the only state carried from one tick to the next.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PositionHold {
    held: Option<Vector2>,
}

impl PositionHold {
    pub const fn new() -> Self {
        Self { held: None }
    }

    /// Run one tick of the decision and return the position setpoint to report.
    ///
    /// Both axes of the latched position come from the same `estimate`.
    pub fn update(
        &mut self,
        velocity_setpoint: Vector2,
        estimate: &HorizontalEstimate,
        hold_threshold: f32,
    ) -> Option<Vector2> {
        let apply_brake = brake_requested(velocity_setpoint);
        let stopped = is_stopped(estimate.velocity, hold_threshold);

        if !apply_brake {
            self.held = None;
        } else if stopped && self.held.is_none() {
            self.held = Some(estimate.position);
        }

        self.held
    }

    pub fn held_position(&self) -> Option<Vector2> {
        self.held
    }

    pub fn state(&self) -> HoldState {
        match self.held {
            Some(_) => HoldState::Locked,
            None => HoldState::Unlocked,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.held.is_some()
    }

    /// Drop any lock, used when the task is (re)activated.
    pub fn reset(&mut self) {
        self.held = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate(px: f32, py: f32, vx: f32, vy: f32) -> HorizontalEstimate {
        HorizontalEstimate {
            position: Vector2::new(px, py),
            velocity: Vector2::new(vx, vy),
        }
    }

    #[test]
    fn test_starts_unlocked() {
        let hold = PositionHold::new();
        assert_eq!(hold.state(), HoldState::Unlocked);
        assert_eq!(hold.held_position(), None);
    }

    #[test]
    fn test_locks_when_braking_and_stopped() {
        let mut hold = PositionHold::new();
        let sp = hold.update(Vector2::ZERO, &estimate(10.0, 5.0, 0.03, 0.04), 0.1);
        assert_eq!(sp, Some(Vector2::new(10.0, 5.0)));
        assert_eq!(hold.state(), HoldState::Locked);
    }

    #[test]
    fn test_lock_is_latched_once() {
        let mut hold = PositionHold::new();
        hold.update(Vector2::ZERO, &estimate(1.0, 2.0, 0.0, 0.0), 0.1);

        // estimate drifts, lock stays put
        for i in 1..=10 {
            let drift = i as f32 * 0.01;
            let sp = hold.update(Vector2::ZERO, &estimate(1.0 + drift, 2.0 - drift, 0.0, 0.05), 0.1);
            assert_eq!(sp, Some(Vector2::new(1.0, 2.0)));
        }
    }

    #[test]
    fn test_no_lock_while_moving() {
        let mut hold = PositionHold::new();
        let sp = hold.update(Vector2::ZERO, &estimate(3.0, 3.0, 2.0, 0.0), 0.1);
        assert_eq!(sp, None);
        assert_eq!(hold.state(), HoldState::Unlocked);

        // decelerated below threshold on a later tick
        let sp = hold.update(Vector2::ZERO, &estimate(4.0, 3.0, 0.05, 0.0), 0.1);
        assert_eq!(sp, Some(Vector2::new(4.0, 3.0)));
    }

    #[test]
    fn test_speed_equal_to_threshold_is_not_stopped() {
        assert!(!is_stopped(Vector2::new(0.5, 0.0), 0.5));
        assert!(is_stopped(Vector2::new(0.49, 0.0), 0.5));
    }

    #[test]
    fn test_disabled_threshold_locks_regardless_of_speed() {
        let mut hold = PositionHold::new();
        let sp = hold.update(Vector2::ZERO, &estimate(-7.0, 2.5, 3.0, 4.0), 0.0);
        assert_eq!(sp, Some(Vector2::new(-7.0, 2.5)));

        let mut hold = PositionHold::new();
        let sp = hold.update(Vector2::ZERO, &estimate(1.0, 1.0, 5.0, 0.0), -1.0);
        assert!(sp.is_some());
    }

    #[test]
    fn test_stick_input_unlocks_same_tick() {
        let mut hold = PositionHold::new();
        hold.update(Vector2::ZERO, &estimate(10.0, 5.0, 0.0, 0.0), 0.1);
        assert!(hold.is_locked());

        let sp = hold.update(Vector2::new(2.5, 0.0), &estimate(10.0, 5.0, 0.0, 0.0), 0.1);
        assert_eq!(sp, None);
        assert_eq!(hold.state(), HoldState::Unlocked);
    }

    #[test]
    fn test_motion_command_never_locks() {
        let mut hold = PositionHold::new();
        let sp = hold.update(Vector2::new(0.0, 0.1), &estimate(0.0, 0.0, 0.0, 0.0), 0.0);
        assert_eq!(sp, None);
    }

    #[test]
    fn test_relock_after_unlock_uses_new_position() {
        let mut hold = PositionHold::new();
        hold.update(Vector2::ZERO, &estimate(0.0, 0.0, 0.0, 0.0), 0.1);
        hold.update(Vector2::new(1.0, 0.0), &estimate(0.0, 0.0, 0.0, 0.0), 0.1);
        let sp = hold.update(Vector2::ZERO, &estimate(8.0, -1.0, 0.0, 0.0), 0.1);
        assert_eq!(sp, Some(Vector2::new(8.0, -1.0)));
    }

    #[test]
    fn test_reset_drops_lock() {
        let mut hold = PositionHold::new();
        hold.update(Vector2::ZERO, &estimate(1.0, 1.0, 0.0, 0.0), 0.1);
        hold.reset();
        assert_eq!(hold.held_position(), None);
    }

    #[test]
    fn test_brake_requested_epsilon() {
        assert!(brake_requested(Vector2::ZERO));
        assert!(brake_requested(Vector2::new(f32::EPSILON / 2.0, 0.0)));
        assert!(!brake_requested(Vector2::new(0.01, 0.0)));
    }
}
