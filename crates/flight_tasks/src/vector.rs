//! Minimal 2D vector for the horizontal plane.
//!
//! Trigonometry and square roots go through `libm` so the target and the
//! host produce the same bits for the same inputs.

use core::ops::{Mul, Sub};

use libm::{cosf, sinf, sqrtf};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        sqrtf(self.x * self.x + self.y * self.y)
    }

    /// Unit vector with the same direction.
    ///
    /// The caller must make sure the length is not (near) zero.
    pub fn normalized(self) -> Self {
        self * (1.0 / self.length())
    }

    /// Rotate counter-clockwise by `angle` radians (heading frame -> local frame).
    pub fn rotated(self, angle: f32) -> Self {
        let (s, c) = (sinf(angle), cosf(angle));
        Self {
            x: c * self.x - s * self.y,
            y: s * self.x + c * self.y,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Sub for Vector2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vector2 {
    type Output = Self;

    fn mul(self, k: f32) -> Self {
        Self::new(self.x * k, self.y * k)
    }
}
