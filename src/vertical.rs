//! Altitude/yaw base task used by the position loop.
//!
//! Throttle around mid-stick commands a climb rate; at mid-stick the
//! altitude is held. The yaw stick commands a yaw rate that is integrated
//! into the heading setpoint the horizontal stick is rotated by.

use core::f32::consts::PI;

use flight_tasks::{ConfigLimits, VerticalYawProvider, VerticalYawSetpoint};

const CLIMB_RATE_MAX: f32 = 3.0; // m/s
const YAW_RATE_MAX: f32 = 1.5; // rad/s

pub struct StickVerticalYaw {
    /// Inputs for the next `update`, refreshed by the loop before each tick
    pub climb_stick: f32,
    pub yaw_stick: f32,
    pub altitude: f32,
    pub dt: f32,
    yaw_sp: f32,
    altitude_lock: Option<f32>,
}

impl StickVerticalYaw {
    pub fn new(initial_yaw: f32) -> Self {
        Self {
            climb_stick: 0.0,
            yaw_stick: 0.0,
            altitude: 0.0,
            dt: 0.0,
            yaw_sp: initial_yaw,
            altitude_lock: None,
        }
    }

    /// Re-seed the heading when the task is (re)entered.
    pub fn reset(&mut self, yaw: f32) {
        self.yaw_sp = yaw;
        self.altitude_lock = None;
    }
}

fn wrap_pi(mut a: f32) -> f32 {
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}

impl VerticalYawProvider for StickVerticalYaw {
    fn update(&mut self, _limits: &ConfigLimits) -> VerticalYawSetpoint {
        let yawspeed = self.yaw_stick * YAW_RATE_MAX;
        self.yaw_sp = wrap_pi(self.yaw_sp + yawspeed * self.dt);

        let climb_rate = self.climb_stick * CLIMB_RATE_MAX;
        if climb_rate == 0.0 {
            if self.altitude_lock.is_none() {
                self.altitude_lock = Some(self.altitude);
            }
        } else {
            self.altitude_lock = None;
        }

        VerticalYawSetpoint {
            yaw: self.yaw_sp,
            yawspeed,
            climb_rate,
            altitude: self.altitude_lock,
        }
    }
}
