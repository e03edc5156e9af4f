//! Mathematical utilities for angles and orientation tests.
//!
//! All angles are in radians, counter-clockwise positive from +X.

use std::f64::consts::PI;

use super::point::Point2D;

/// Two times PI (full circle in radians).
pub const TWO_PI: f64 = 2.0 * PI;

/// Normalize angle to [-π, π).
///
/// # Example
/// ```
/// use kshetra::core::math::normalize_angle;
/// use std::f64::consts::PI;
///
/// assert!((normalize_angle(PI / 2.0) - PI / 2.0).abs() < 1e-12);
/// assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-12);
/// ```
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % TWO_PI;
    if a >= PI {
        a -= TWO_PI;
    } else if a < -PI {
        a += TWO_PI;
    }
    a
}

/// Signed shortest rotation from `from` to `to`, in [-π, π).
///
/// Positive means counter-clockwise.
#[inline]
pub fn angle_diff(from: f64, to: f64) -> f64 {
    normalize_angle(to - from)
}

/// Twice the signed area of triangle (a, b, c).
///
/// Positive when `c` lies to the left of the directed line a→b.
#[inline]
pub fn cross(a: Point2D, b: Point2D, c: Point2D) -> f64 {
    (b - a).cross(&(c - a))
}

/// Round a coordinate to a fixed precision grid.
#[inline]
pub fn round_to(value: f64, precision: f64) -> f64 {
    (value / precision).round() * precision
}
