//! Per-tick records exchanged with the surrounding flight task stack.

use crate::params::ConfigLimits;
use crate::vector::Vector2;

/// Horizontal state from the estimator, one sample per tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HorizontalEstimate {
    /// Local north/east position (m)
    pub position: Vector2,
    /// Local north/east velocity (m/s)
    pub velocity: Vector2,
}

/// Output of the altitude/yaw base task.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VerticalYawSetpoint {
    /// Heading setpoint (rad)
    pub yaw: f32,
    /// Heading rate feed-forward (rad/s)
    pub yawspeed: f32,
    /// Climb rate, positive up (m/s)
    pub climb_rate: f32,
    /// Altitude lock, `None` while the pilot commands a climb or descent
    pub altitude: Option<f32>,
}

/// Supplies yaw, climb rate and altitude ahead of the horizontal logic.
///
/// Called once per tick, before any horizontal field is computed. The
/// horizontal acceleration limit is consumed here, not by this crate.
pub trait VerticalYawProvider {
    fn update(&mut self, limits: &ConfigLimits) -> VerticalYawSetpoint;
}

impl<F> VerticalYawProvider for F
where
    F: FnMut(&ConfigLimits) -> VerticalYawSetpoint,
{
    fn update(&mut self, limits: &ConfigLimits) -> VerticalYawSetpoint {
        self(limits)
    }
}

/// Combined setpoint handed to the position controller.
///
/// When `position_xy` is present it is the authority for the horizontal
/// plane; `velocity_xy` is then zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CombinedSetpoint {
    pub yaw: f32,
    pub yawspeed: f32,
    pub climb_rate: f32,
    pub altitude: Option<f32>,
    pub velocity_xy: Vector2,
    pub position_xy: Option<Vector2>,
}

impl CombinedSetpoint {
    /// Start a record from the base task's output, horizontal fields empty.
    pub fn from_vertical_yaw(base: VerticalYawSetpoint) -> Self {
        Self {
            yaw: base.yaw,
            yawspeed: base.yawspeed,
            climb_rate: base.climb_rate,
            altitude: base.altitude,
            velocity_xy: Vector2::ZERO,
            position_xy: None,
        }
    }

    pub fn position_locked(&self) -> bool {
        self.position_xy.is_some()
    }
}
