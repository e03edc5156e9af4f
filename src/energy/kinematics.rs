//! Differential-drive kinematics.

use serde::{Deserialize, Serialize};

use crate::config::RobotConfig;
use crate::core::{Point2D, Pose2D, normalize_angle};

/// Normalized wheel commands in [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotorCommand {
    pub left: f64,
    pub right: f64,
}

impl MotorCommand {
    pub const STOP: MotorCommand = MotorCommand {
        left: 0.0,
        right: 0.0,
    };

    #[inline]
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Both wheels forward at `speed`.
    #[inline]
    pub fn forward(speed: f64) -> Self {
        Self::new(speed, speed)
    }

    /// Point turn; positive `strength` turns counter-clockwise.
    #[inline]
    pub fn turn(strength: f64) -> Self {
        Self::new(-strength, strength)
    }

    /// Zero out components below `deadband`.
    pub fn with_deadband(self, deadband: f64) -> Self {
        let cut = |v: f64| if v.abs() < deadband { 0.0 } else { v };
        Self::new(cut(self.left), cut(self.right))
    }
}

/// Body velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity2D {
    /// Linear velocity (m/s)
    pub linear: f64,
    /// Angular velocity (rad/s)
    pub angular: f64,
}

/// Differential-drive model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialDrive {
    pub max_forward_velocity: f64,
    pub wheel_base: f64,
    pub max_angular_velocity: f64,
}

impl DifferentialDrive {
    pub fn from_config(config: &RobotConfig) -> Self {
        Self {
            max_forward_velocity: config.max_forward_velocity,
            wheel_base: config.wheel_base,
            max_angular_velocity: config.max_angular_velocity,
        }
    }

    /// Body velocity produced by a wheel command.
    pub fn velocity(&self, command: MotorCommand) -> Velocity2D {
        let v_left = command.left.clamp(-1.0, 1.0) * self.max_forward_velocity;
        let v_right = command.right.clamp(-1.0, 1.0) * self.max_forward_velocity;
        let angular = ((v_right - v_left) / self.wheel_base)
            .clamp(-self.max_angular_velocity, self.max_angular_velocity);
        Velocity2D {
            linear: (v_right + v_left) / 2.0,
            angular,
        }
    }

    /// Advance `pose` by `dt` seconds under `command`.
    ///
    /// Position moves along the heading held at the start of the step.
    pub fn integrate(&self, pose: Pose2D, command: MotorCommand, dt: f64) -> (Pose2D, Velocity2D) {
        let velocity = self.velocity(command);
        let position = pose.position() + Point2D::from_angle(pose.theta) * (velocity.linear * dt);
        let theta = normalize_angle(pose.theta + velocity.angular * dt);
        (Pose2D::at(position, theta), velocity)
    }
}
