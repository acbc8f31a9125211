//! Stick-to-velocity shaping.
//!
//! Turns the pre-shaped two-axis stick into a horizontal velocity command in
//! the local frame. Diagonal deflection is capped to the same magnitude as a
//! full single-axis deflection.

use crate::vector::Vector2;

/// Two-axis manual input, heading relative: `x` forward, `y` right.
///
/// Each axis is nominally in [-1, 1] after expo; rounding upstream may push
/// it slightly past the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StickInput {
    pub x: f32,
    pub y: f32,
}

impl StickInput {
    pub const CENTERED: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn as_vector(self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }
}

/// Velocity setpoint for the given stick, heading and manual speed limit.
///
/// `heading` must be the yaw setpoint produced for the same tick, so the
/// commanded translation and the commanded yaw stay coherent.
pub fn shape_velocity(stick: StickInput, heading: f32, vel_manual_max: f32) -> Vector2 {
    let mut stick_xy = stick.as_vector();

    let mag = stick_xy.length().clamp(0.0, 1.0);

    if mag > f32::EPSILON {
        stick_xy = stick_xy.normalized() * mag;
    }

    (stick_xy * vel_manual_max).rotated(heading)
}

/// Cubic expo: `(1 - e) * v + e * v^3`.
///
/// Input is clamped to [-1, 1], `e` to [0, 1].
pub fn expo(value: f32, e: f32) -> f32 {
    let v = value.clamp(-1.0, 1.0);
    let e = e.clamp(0.0, 1.0);
    (1.0 - e) * v + e * v * v * v
}

/// Dead band around center, rescaled so full deflection still reaches 1.
pub fn deadzone(value: f32, dz: f32) -> f32 {
    let v = value.clamp(-1.0, 1.0);
    let dz = dz.clamp(0.0, 0.99);
    if v > dz {
        (v - dz) / (1.0 - dz)
    } else if v < -dz {
        (v + dz) / (1.0 - dz)
    } else {
        0.0
    }
}
