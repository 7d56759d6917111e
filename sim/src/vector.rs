//! 2D vector value type used for positions and movement.
//!
//! All operations return new values; nothing mutates in place.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A point or direction on the battlefield (x = left/right, y = up/down).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance(&self, other: &Vector) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn scale(&self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Unit vector in the same direction, or zero for a degenerate vector.
    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len < 0.0001 {
            Self::ZERO
        } else {
            self.scale(1.0 / len)
        }
    }

    /// Step from `self` toward `target` by at most `step` units.
    ///
    /// Never overshoots: if the target is closer than `step`, the result is
    /// the target itself.
    pub fn move_toward(&self, target: &Vector, step: f32) -> Self {
        let offset = *target - *self;
        let dist = offset.length();
        if dist <= step {
            *target
        } else {
            *self + offset.normalized().scale(step)
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f32) -> Vector {
        self.scale(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_hypot() {
        let a = Vector::new(1.0, 1.0);
        let b = Vector::new(4.0, 5.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
        assert!((b.distance(&a) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalized_zero_vector() {
        assert_eq!(Vector::ZERO.normalized(), Vector::ZERO);
        let n = Vector::new(3.0, 4.0).normalized();
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_move_toward_does_not_overshoot() {
        let from = Vector::new(0.0, 0.0);
        let to = Vector::new(1.0, 0.0);

        let stepped = from.move_toward(&to, 0.25);
        assert!((stepped.x - 0.25).abs() < 1e-6);
        assert_eq!(stepped.y, 0.0);

        assert_eq!(from.move_toward(&to, 5.0), to);
    }

    #[test]
    fn test_operators_return_new_values() {
        let a = Vector::new(1.0, 2.0);
        let b = Vector::new(0.5, -1.0);
        assert_eq!(a + b, Vector::new(1.5, 1.0));
        assert_eq!(a - b, Vector::new(0.5, 3.0));
        assert_eq!(a * 2.0, Vector::new(2.0, 4.0));
        assert_eq!(a, Vector::new(1.0, 2.0));
    }
}
