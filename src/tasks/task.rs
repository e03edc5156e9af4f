//! Task records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::Point2D;
use crate::ids::{AgentId, CropId, RowId, StationId};

/// Monotonic task identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// What a task sends an agent to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskTarget {
    /// Scan and process a crop
    Crop { crop: CropId, row: RowId },
    /// Queue at and charge from a station
    Station(StationId),
    /// Return to the spawn position
    Spawn,
}

impl TaskTarget {
    pub fn name(&self) -> &'static str {
        match self {
            TaskTarget::Crop { .. } => "crop",
            TaskTarget::Station(_) => "station",
            TaskTarget::Spawn => "spawn",
        }
    }

    pub fn station(&self) -> Option<StationId> {
        match self {
            TaskTarget::Station(id) => Some(*id),
            _ => None,
        }
    }

    pub fn crop(&self) -> Option<CropId> {
        match self {
            TaskTarget::Crop { crop, .. } => Some(*crop),
            _ => None,
        }
    }
}

/// A target assigned to one agent, with where to stand and how to face.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub agent: AgentId,
    pub target: TaskTarget,
    pub position: Point2D,
    /// Required final heading, radians
    pub facing: Option<f64>,
}

impl Task {
    pub fn new(id: TaskId, agent: AgentId, target: TaskTarget, position: Point2D, facing: Option<f64>) -> Self {
        Self {
            id,
            agent,
            target,
            position,
            facing,
        }
    }

    #[inline]
    pub fn is_station(&self) -> bool {
        matches!(self.target, TaskTarget::Station(_))
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            TaskTarget::Crop { crop, row } => write!(f, "{} {} -> {} ({})", self.id, self.agent, crop, row),
            TaskTarget::Station(station) => write!(
                f,
                "{} {} -> {} at ({:.2}, {:.2})",
                self.id, self.agent, station, self.position.x, self.position.y
            ),
            TaskTarget::Spawn => write!(f, "{} {} -> spawn", self.id, self.agent),
        }
    }
}
