//! Per-tick task allocation.
//!
//! Every assignment releases the agent's previous task before the new
//! claim is taken, so no other agent can observe a resource that is held
//! twice or by nobody in between.

use crate::agent::AgentState;
use crate::config::TaskConfig;
use crate::core::Point2D;
use crate::error::TaskError;
use crate::ids::{AgentId, CropId, StationId};
use crate::tasks::policy::{
    ChargeCandidate, ChargingPolicy, StationSelector, charging_policy_from_config, station_selector_from_config,
};
use crate::world::World;

use super::task::{Task, TaskId, TaskTarget};

/// Allocates crops, stations and spawn returns to agents.
#[derive(Debug)]
pub struct TaskManager {
    task_id_counter: u64,
    history: Vec<Task>,
    charging_policy: Box<dyn ChargingPolicy>,
    station_selector: Box<dyn StationSelector>,
    /// Agents within this distance of spawn get no return task
    spawn_tolerance: f64,
}

impl TaskManager {
    pub fn new(
        charging_policy: Box<dyn ChargingPolicy>,
        station_selector: Box<dyn StationSelector>,
        spawn_tolerance: f64,
    ) -> Self {
        Self {
            task_id_counter: 0,
            history: Vec::new(),
            charging_policy,
            station_selector,
            spawn_tolerance,
        }
    }

    pub fn from_config(config: &TaskConfig, spawn_tolerance: f64) -> Self {
        Self::new(
            charging_policy_from_config(config),
            station_selector_from_config(config),
            spawn_tolerance,
        )
    }

    /// Every task ever assigned, in assignment order.
    pub fn history(&self) -> &[Task] {
        &self.history
    }

    /// Id the next assigned task receives.
    #[inline]
    pub fn next_task_id(&self) -> TaskId {
        TaskId(self.task_id_counter)
    }

    pub fn charging_policy(&self) -> &dyn ChargingPolicy {
        self.charging_policy.as_ref()
    }

    pub fn station_selector(&self) -> &dyn StationSelector {
        self.station_selector.as_ref()
    }

    /// Task sending `agent` to work on `crop`.
    pub fn crop_task(&self, world: &World, agent: AgentId, crop: CropId) -> Result<Task, TaskError> {
        let crop = world.registry.crop(crop).ok_or(TaskError::UnknownTarget("crop"))?;
        Ok(Task::new(
            self.next_task_id(),
            agent,
            TaskTarget::Crop {
                crop: crop.id,
                row: crop.row,
            },
            crop.position,
            None,
        ))
    }

    /// Task queueing `agent` at `station`. The waiting position is fixed on assignment.
    pub fn station_task(&self, world: &World, agent: AgentId, station: StationId) -> Result<Task, TaskError> {
        let st = world
            .registry
            .station(station)
            .ok_or(TaskError::UnknownTarget("station"))?;
        Ok(Task::new(
            self.next_task_id(),
            agent,
            TaskTarget::Station(station),
            st.position,
            Some(st.agent_heading()),
        ))
    }

    /// Task returning `agent` to its spawn point.
    pub fn spawn_task(&self, world: &World, agent: AgentId) -> Result<Task, TaskError> {
        let spawn = world.agent(agent).ok_or(TaskError::UnknownAgent(agent))?.spawn();
        Ok(Task::new(self.next_task_id(), agent, TaskTarget::Spawn, spawn, None))
    }

    /// Release the agent's current task and install `task` in its place.
    ///
    /// Fails without side effects if the agent or target is unknown, or
    /// the crop's row belongs to another agent.
    pub fn assign_task(&mut self, task: Task, world: &mut World) -> Result<(), TaskError> {
        let agent_id = task.agent;
        if world.agent(agent_id).is_none() {
            return Err(TaskError::UnknownAgent(agent_id));
        }
        match task.target {
            TaskTarget::Crop { crop, row } => {
                if world.registry.crop(crop).is_none() {
                    return Err(TaskError::UnknownTarget("crop"));
                }
                let owner = world
                    .registry
                    .row(row)
                    .ok_or(TaskError::UnknownTarget("row"))?
                    .claim();
                if let Some(owner) = owner.filter(|&o| o != agent_id) {
                    return Err(TaskError::RowClaimed { row, owner });
                }
            }
            TaskTarget::Station(station) => {
                if world.registry.station(station).is_none() {
                    return Err(TaskError::UnknownTarget("station"));
                }
            }
            TaskTarget::Spawn => {}
        }

        let previous = world.agents[agent_id.index()].clear_task();
        if let Some(previous) = previous {
            self.release_task(&previous, world);
        }
        world.registry.release_rows_of(agent_id);

        let mut task = task;
        task.id = self.next_task_id();
        match task.target {
            TaskTarget::Station(station) => {
                if let Some(st) = world.registry.station_mut(station) {
                    task.position = st.request_charge(agent_id);
                    task.facing = Some(st.agent_heading());
                }
            }
            TaskTarget::Crop { row, .. } => {
                world.registry.claim_row(row, agent_id);
            }
            TaskTarget::Spawn => {}
        }

        tracing::info!("[Tasks] {}", task);
        world.agents[agent_id.index()].on_task_assigned(task.clone(), &world.navmesh);
        self.history.push(task);
        self.task_id_counter += 1;
        Ok(())
    }

    /// Give back the resources held through `task`.
    ///
    /// Station tasks leave the queue and move everyone behind up; crop
    /// tasks drop the row claim and reset unfinished crop work.
    pub fn release_task(&mut self, task: &Task, world: &mut World) {
        match task.target {
            TaskTarget::Station(station) => {
                let moved = world
                    .registry
                    .station_mut(station)
                    .map(|st| st.release_agent(task.agent))
                    .unwrap_or_default();
                for (agent, position) in moved {
                    if let Some(a) = world.agents.get_mut(agent.index()) {
                        a.retarget(position, &world.navmesh);
                    }
                }
            }
            TaskTarget::Crop { crop, row } => {
                world.registry.release_row(row, task.agent);
                world.registry.quit_crop(crop);
            }
            TaskTarget::Spawn => {}
        }
        tracing::debug!("[Tasks] released {}", task);
    }

    /// Allocation pass, run once per tick before agents update.
    pub fn assign_tasks(&mut self, world: &mut World) {
        let mut handled = vec![false; world.agents.len()];

        // Discharged agents give everything back and get nothing new
        for i in 0..world.agents.len() {
            if !world.agents[i].state().is_discharged() {
                continue;
            }
            handled[i] = true;
            let id = world.agents[i].id;
            if let Some(task) = world.agents[i].clear_task() {
                self.release_task(&task, world);
            }
            world.registry.release_rows_of(id);
        }

        // Fully charged agents leave the station for new work
        for i in 0..world.agents.len() {
            let agent = &world.agents[i];
            if handled[i] || !agent.state().is_charging() || !agent.battery().is_full() {
                continue;
            }
            handled[i] = true;
            let id = agent.id;
            tracing::info!("[Tasks] {} fully charged", id);
            if !self.offer_work(id, world, true) {
                if let Some(task) = world.agents[i].clear_task() {
                    self.release_task(&task, world);
                }
            }
        }

        // Agents bound for or queued at a station keep going
        for (i, agent) in world.agents.iter().enumerate() {
            if agent.task().is_some_and(Task::is_station) {
                handled[i] = true;
            }
        }
        let station_bound = world
            .agents
            .iter()
            .filter(|a| a.task().is_some_and(Task::is_station))
            .count();

        let candidates: Vec<ChargeCandidate> = world
            .agents
            .iter()
            .filter(|a| !handled[a.id.index()])
            .map(|a| ChargeCandidate {
                agent: a.id,
                soc: a.soc(),
            })
            .collect();
        for id in self
            .charging_policy
            .select(&candidates, station_bound, &world.registry)
        {
            handled[id.index()] = true;
            let position = world.agents[id.index()].position();
            let Some(station) = self.station_selector.select(position, &world.registry) else {
                tracing::warn!("[Tasks] {} needs charging but there are no stations", id);
                continue;
            };
            match self.station_task(world, id, station) {
                Ok(task) => {
                    if let Err(e) = self.assign_task(task, world) {
                        tracing::warn!("[Tasks] {}: {}", id, e);
                    }
                }
                Err(e) => tracing::warn!("[Tasks] {}: {}", id, e),
            }
        }

        // Idle or homebound agents, healthiest battery first
        let mut idle: Vec<(AgentId, f64)> = world
            .agents
            .iter()
            .filter(|a| !handled[a.id.index()])
            .filter(|a| match a.task() {
                None => a.state() == AgentState::Idle,
                Some(t) => t.target == TaskTarget::Spawn,
            })
            .map(|a| (a.id, a.soc()))
            .collect();
        idle.sort_by(|a, b| b.1.total_cmp(&a.1));

        for (id, _) in idle {
            let returning = world.agents[id.index()].task().is_some();
            self.offer_work(id, world, !returning);
        }
    }

    /// Assign the nearest frontier crop, else a spawn return.
    ///
    /// Returns false if the agent got neither.
    fn offer_work(&mut self, id: AgentId, world: &mut World, allow_spawn: bool) -> bool {
        let position = world.agents[id.index()].position();
        let nearest = nearest_crop(world, id, position);

        let task = match nearest {
            Some(crop) => self.crop_task(world, id, crop),
            None if allow_spawn => {
                let spawn = world.agents[id.index()].spawn();
                if position.distance(&spawn) <= self.spawn_tolerance {
                    return false;
                }
                self.spawn_task(world, id)
            }
            None => return false,
        };

        match task.and_then(|t| self.assign_task(t, world)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("[Tasks] {}: {}", id, e);
                false
            }
        }
    }
}

fn nearest_crop(world: &World, agent: AgentId, position: Point2D) -> Option<CropId> {
    world
        .registry
        .frontier_crops(agent)
        .into_iter()
        .filter_map(|id| world.registry.crop(id).map(|c| (id, c.position.distance(&position))))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}
