//! Manual position flight task.
//!
//! Extends the altitude/yaw base task with horizontal control: the sticks
//! command a velocity, and a centered stick brakes the vehicle and then
//! holds the position it came to rest at.

use crate::hold::PositionHold;
use crate::params::ConfigLimits;
use crate::setpoint::{CombinedSetpoint, HorizontalEstimate, VerticalYawProvider};
use crate::stick::{shape_velocity, StickInput};

#[derive(Debug, Clone, Default)]
pub struct ManualPositionTask {
    hold: PositionHold,
}

impl ManualPositionTask {
    pub const fn new() -> Self {
        Self {
            hold: PositionHold::new(),
        }
    }

    /// Reset the hold state on (re)entry into the task.
    pub fn activate(&mut self) {
        self.hold.reset();
    }

    /// Compute this tick's setpoint.
    ///
    /// `estimate` and `limits` must already be refreshed for this tick. The
    /// base task runs first and its yaw setpoint is the heading the stick
    /// velocity is rotated by.
    pub fn update<B: VerticalYawProvider>(
        &mut self,
        base: &mut B,
        stick: StickInput,
        estimate: &HorizontalEstimate,
        limits: &ConfigLimits,
    ) -> CombinedSetpoint {
        let mut setpoint = CombinedSetpoint::from_vertical_yaw(base.update(limits));

        let velocity_setpoint = shape_velocity(stick, setpoint.yaw, limits.vel_manual_max);
        setpoint.velocity_xy = velocity_setpoint;
        setpoint.position_xy = self.hold.update(velocity_setpoint, estimate, limits.hold_max_xy);

        setpoint
    }

    pub fn is_position_locked(&self) -> bool {
        self.hold.is_locked()
    }

    pub fn hold(&self) -> &PositionHold {
        &self.hold
    }
}
