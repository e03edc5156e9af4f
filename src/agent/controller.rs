//! Proportional waypoint controller.
//!
//! Turns in place while the heading error exceeds the angular tolerance,
//! otherwise drives straight with speed proportional to remaining distance.

use crate::config::{RobotConfig, ToleranceConfig};
use crate::core::{Point2D, Pose2D, angle_diff};
use crate::energy::MotorCommand;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionController {
    pub speed_gain: f64,
    pub turn_gain: f64,
    pub deadband: f64,
    /// Position tolerance (m)
    pub distance_tolerance: f64,
    /// Heading tolerance (rad)
    pub angle_tolerance: f64,
}

impl MotionController {
    pub fn from_config(robot: &RobotConfig, tolerance: &ToleranceConfig) -> Self {
        Self {
            speed_gain: robot.speed_gain,
            turn_gain: robot.turn_gain,
            deadband: robot.command_deadband,
            distance_tolerance: tolerance.distance,
            angle_tolerance: tolerance.angle_rad(),
        }
    }

    /// True if `pose` is within tolerance of `goal` and, if given, `facing`.
    pub fn reached(&self, pose: &Pose2D, goal: Point2D, facing: Option<f64>) -> bool {
        pose.position().distance(&goal) <= self.distance_tolerance
            && facing.is_none_or(|f| angle_diff(pose.theta, f).abs() <= self.angle_tolerance)
    }

    /// Command towards `waypoint` (or `goal` once the route is used up),
    /// then into the required `facing`.
    pub fn command(&self, pose: &Pose2D, waypoint: Option<Point2D>, goal: Point2D, facing: Option<f64>) -> MotorCommand {
        let target = waypoint.unwrap_or(goal);
        let distance = pose.position().distance(&target);

        let command = if distance > self.distance_tolerance {
            let error = pose.bearing_error(&target);
            if error.abs() > self.angle_tolerance {
                self.turn(error, self.turn_gain)
            } else {
                MotorCommand::forward((distance * self.speed_gain).min(1.0))
            }
        } else if let Some(facing) = facing {
            let error = angle_diff(pose.theta, facing);
            if error.abs() > self.angle_tolerance {
                self.turn(error, self.turn_gain * 0.5)
            } else {
                MotorCommand::STOP
            }
        } else {
            MotorCommand::STOP
        };

        command.with_deadband(self.deadband)
    }

    fn turn(&self, error: f64, gain: f64) -> MotorCommand {
        let strength = (error.abs() / PI * gain).min(1.0);
        MotorCommand::turn(strength.copysign(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn controller() -> MotionController {
        MotionController::from_config(&RobotConfig::default(), &ToleranceConfig::default())
    }

    #[test]
    fn test_turns_towards_waypoint_first() {
        let cmd = controller().command(&Pose2D::default(), Some(Point2D::new(0.0, 5.0)), Point2D::ZERO, None);
        assert!(cmd.right > 0.0 && cmd.left < 0.0);
        assert!((cmd.right - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_drives_when_aligned() {
        let cmd = controller().command(&Pose2D::default(), None, Point2D::new(1.0, 0.0), None);
        assert_eq!(cmd, MotorCommand::forward(0.5));
        let far = controller().command(&Pose2D::default(), None, Point2D::new(9.0, 0.0), None);
        assert_eq!(far, MotorCommand::forward(1.0));
    }

    #[test]
    fn test_final_facing() {
        let c = controller();
        let pose = Pose2D::new(1.0, 1.0, 0.0);
        let cmd = c.command(&pose, None, Point2D::new(1.0, 1.0), Some(-FRAC_PI_2));
        assert!(cmd.right < 0.0 && cmd.left > 0.0);
        assert!(!c.reached(&pose, Point2D::new(1.0, 1.0), Some(-FRAC_PI_2)));
        assert!(c.reached(&pose, Point2D::new(1.0, 1.0), None));
        assert_eq!(c.command(&pose, None, Point2D::new(1.0, 1.0), Some(0.0)), MotorCommand::STOP);
    }
}
