//! Robot pose type.

use serde::{Deserialize, Serialize};

use super::math::{angle_diff, normalize_angle};
use super::point::Point2D;

/// Position and heading in world frame.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position in meters
    pub x: f64,
    /// Y position in meters
    pub y: f64,
    /// Heading in radians, normalized to [-π, π)
    pub theta: f64,
}

impl Pose2D {
    /// Create a new pose. The heading is normalized.
    #[inline]
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    /// Pose at a point with the given heading.
    #[inline]
    pub fn at(position: Point2D, theta: f64) -> Self {
        Self::new(position.x, position.y, theta)
    }

    /// Position component.
    #[inline]
    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Unit vector along the heading.
    #[inline]
    pub fn forward(&self) -> Point2D {
        Point2D::from_angle(self.theta)
    }

    /// Heading error towards a target point (signed, CCW positive).
    #[inline]
    pub fn bearing_error(&self, target: &Point2D) -> f64 {
        angle_diff(self.theta, self.position().angle_to(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_new_normalizes_heading() {
        let pose = Pose2D::new(0.0, 0.0, 3.0 * PI);
        assert!((pose.theta.abs() - PI).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_error() {
        let pose = Pose2D::new(0.0, 0.0, 0.0);
        let err = pose.bearing_error(&Point2D::new(0.0, 2.0));
        assert!((err - FRAC_PI_2).abs() < 1e-12);

        let facing_back = Pose2D::new(1.0, 1.0, FRAC_PI_2);
        let err = facing_back.bearing_error(&Point2D::new(2.0, 1.0));
        assert!((err + FRAC_PI_2).abs() < 1e-12);
    }
}
