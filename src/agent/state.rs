//! Agent states and the pure transition function.

use serde::{Deserialize, Serialize};

use crate::ids::{CropId, StationId};
use crate::resources::CropState;
use crate::tasks::TaskTarget;

/// Agent state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    /// Standing still, with or without a task
    Idle,

    /// Following a route to the task target
    Travel,

    /// Scanning a crop
    WorkScan { crop: CropId },

    /// Processing a scanned crop
    WorkProcess { crop: CropId },

    /// At the head of a station queue, charging
    Charging { station: StationId },

    /// Battery empty. Terminal until the scenario is reset
    Discharged,
}

impl AgentState {
    /// State name for logging
    pub fn name(&self) -> &'static str {
        match self {
            AgentState::Idle => "Idle",
            AgentState::Travel => "Travel",
            AgentState::WorkScan { .. } => "WorkScan",
            AgentState::WorkProcess { .. } => "WorkProcess",
            AgentState::Charging { .. } => "Charging",
            AgentState::Discharged => "Discharged",
        }
    }

    #[inline]
    pub fn is_discharged(&self) -> bool {
        matches!(self, AgentState::Discharged)
    }

    #[inline]
    pub fn is_charging(&self) -> bool {
        matches!(self, AgentState::Charging { .. })
    }

    #[inline]
    pub fn is_working(&self) -> bool {
        matches!(self, AgentState::WorkScan { .. } | AgentState::WorkProcess { .. })
    }
}

/// What a transition needs to know about the agent and its task target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// State of charge, percent
    pub soc: f64,
    pub task: Option<TaskTarget>,
    /// Position and required facing of the task reached
    pub at_target: bool,
    /// State of the task's crop, for crop tasks
    pub crop_state: Option<CropState>,
    /// First in the task station's queue, for station tasks
    pub queue_head: bool,
}

/// Side effects requested by a transition, applied by the agent in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Plan a fresh route to the task target
    ComputeRoute,
    /// Discard the current route
    ClearRoute,
    /// One tick of work on a crop
    AdvanceCrop(CropId),
    /// Drop the finished task; its resources stay as they are
    CompleteTask,
    /// Drop the task and hand it back so its resources get released
    ReleaseTask,
}

/// Result of one transition evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub next: AgentState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn stay(state: AgentState) -> Self {
        Self::to(state, Vec::new())
    }

    fn to(next: AgentState, effects: Vec<Effect>) -> Self {
        Self { next, effects }
    }
}

/// Evaluate the transition table for `state` given `snapshot`.
///
/// Total: every input yields exactly one next state. An empty battery
/// preempts every other rule.
pub fn transition(state: AgentState, snapshot: &AgentSnapshot) -> Transition {
    if state.is_discharged() {
        return Transition::stay(state);
    }

    if snapshot.soc <= 0.0 {
        let mut effects = Vec::new();
        if state == AgentState::Travel {
            effects.push(Effect::ClearRoute);
        }
        if snapshot.task.is_some() {
            effects.push(Effect::ReleaseTask);
        }
        return Transition::to(AgentState::Discharged, effects);
    }

    let Some(target) = snapshot.task else {
        return match state {
            AgentState::Idle => Transition::stay(state),
            AgentState::Travel => Transition::to(AgentState::Idle, vec![Effect::ClearRoute]),
            _ => Transition::to(AgentState::Idle, Vec::new()),
        };
    };

    match state {
        AgentState::Idle if !snapshot.at_target => Transition::to(AgentState::Travel, vec![Effect::ComputeRoute]),
        AgentState::Idle => arrive(target, snapshot, Vec::new()),

        AgentState::Travel if !snapshot.at_target => Transition::stay(state),
        AgentState::Travel => arrive(target, snapshot, vec![Effect::ClearRoute]),

        AgentState::Charging { station } => match target {
            TaskTarget::Station(s) if s == station => Transition::stay(state),
            _ => Transition::to(AgentState::Travel, vec![Effect::ComputeRoute]),
        },

        AgentState::WorkScan { crop } => match target {
            TaskTarget::Crop { crop: c, .. } if c == crop => match snapshot.crop_state {
                Some(CropState::Scanned | CropState::Processing) => {
                    Transition::to(AgentState::WorkProcess { crop }, Vec::new())
                }
                Some(CropState::Processed) | None => Transition::to(AgentState::Idle, vec![Effect::CompleteTask]),
                Some(CropState::Unprocessed | CropState::Scanning) => {
                    Transition::to(state, vec![Effect::AdvanceCrop(crop)])
                }
            },
            _ => Transition::to(AgentState::Travel, vec![Effect::ComputeRoute]),
        },

        AgentState::WorkProcess { crop } => match target {
            TaskTarget::Crop { crop: c, .. } if c == crop => match snapshot.crop_state {
                Some(CropState::Processed) | None => Transition::to(AgentState::Idle, vec![Effect::CompleteTask]),
                Some(_) => Transition::to(state, vec![Effect::AdvanceCrop(crop)]),
            },
            _ => Transition::to(AgentState::Travel, vec![Effect::ComputeRoute]),
        },

        AgentState::Discharged => Transition::stay(state),
    }
}

/// Dispatch on reaching the task target.
fn arrive(target: TaskTarget, snapshot: &AgentSnapshot, mut effects: Vec<Effect>) -> Transition {
    let next = match target {
        TaskTarget::Station(station) if snapshot.queue_head => AgentState::Charging { station },
        // Waiting slot behind the head: hold until the queue moves up
        TaskTarget::Station(_) => AgentState::Idle,
        TaskTarget::Crop { crop, .. } => match snapshot.crop_state {
            Some(CropState::Unprocessed | CropState::Scanning) => AgentState::WorkScan { crop },
            Some(CropState::Scanned | CropState::Processing) => AgentState::WorkProcess { crop },
            Some(CropState::Processed) | None => {
                effects.push(Effect::CompleteTask);
                AgentState::Idle
            }
        },
        TaskTarget::Spawn => {
            effects.push(Effect::CompleteTask);
            AgentState::Idle
        }
    };
    Transition::to(next, effects)
}
