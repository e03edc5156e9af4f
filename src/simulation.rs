//! Fixed-step simulation loop.
//!
//! Each tick runs the allocation pass, then every agent's update in id
//! order, then advances the calendar.

use crate::config::SimConfig;
use crate::energy::SimClock;
use crate::error::{Result, TaskError};
use crate::scenario::{Scenario, ScenarioLayout};
use crate::tasks::{Task, TaskManager};
use crate::world::World;

/// End-of-run statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub simulated_secs: f64,
    pub processed_crops: usize,
    pub total_crops: usize,
    pub discharged_agents: usize,
    pub tasks_assigned: usize,
    pub field_processed: bool,
}

pub struct Simulation {
    config: SimConfig,
    world: World,
    task_manager: TaskManager,
    clock: SimClock,
    tick: u64,
}

impl Simulation {
    pub fn new(scenario: &Scenario, config: SimConfig) -> Result<Self> {
        let world = World::new(scenario, &config)?;
        let task_manager = TaskManager::from_config(&config.tasks, config.tolerance.distance);
        let clock = SimClock::parse(&config.simulation.start_date)?;
        tracing::info!(
            "[Simulation] charging policy {}, station selection {}",
            task_manager.charging_policy().name(),
            task_manager.station_selector().name()
        );
        Ok(Self {
            config,
            world,
            task_manager,
            clock,
            tick: 0,
        })
    }

    /// Generated field populated from the `[scenario]` section.
    pub fn from_config(config: SimConfig) -> Result<Self> {
        let scenario = ScenarioLayout::from_config(&config.scenario).build();
        Self::new(&scenario, config)
    }

    /// Advance one tick.
    pub fn step(&mut self) -> Result<()> {
        let dt = self.config.simulation.dt;
        self.task_manager.assign_tasks(&mut self.world);

        let calendar = self.clock.calendar();
        for i in 0..self.world.agents.len() {
            let World {
                navmesh,
                agents,
                registry,
            } = &mut self.world;
            let outcome = agents[i].update(dt, &calendar, navmesh, registry)?;
            if let Some(task) = outcome.released_task {
                self.task_manager.release_task(&task, &mut self.world);
            }
        }

        self.clock.advance(dt);
        self.tick += 1;
        Ok(())
    }

    /// Step until the field is processed, every agent is discharged, or `max_ticks` pass.
    pub fn run(&mut self, max_ticks: u64) -> Result<RunSummary> {
        while self.tick < max_ticks {
            if self.world.registry.is_field_processed() {
                tracing::info!("[Simulation] field processed after {} ticks", self.tick);
                break;
            }
            if !self.world.agents.is_empty() && self.world.agents.iter().all(|a| a.state().is_discharged()) {
                tracing::warn!("[Simulation] all agents discharged after {} ticks", self.tick);
                break;
            }
            self.step()?;
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            ticks: self.tick,
            simulated_secs: self.clock.elapsed_secs(),
            processed_crops: self.world.registry.processed_crops(),
            total_crops: self.world.registry.crops().len(),
            discharged_agents: self
                .world
                .agents
                .iter()
                .filter(|a| a.state().is_discharged())
                .count(),
            tasks_assigned: self.task_manager.history().len(),
            field_processed: self.world.registry.is_field_processed(),
        }
    }

    /// Assign a task from outside the allocation pass.
    pub fn assign_task(&mut self, task: Task) -> std::result::Result<(), TaskError> {
        self.task_manager.assign_task(task, &mut self.world)
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[inline]
    pub fn task_manager(&self) -> &TaskManager {
        &self.task_manager
    }

    /// Task manager and world, borrowed together.
    pub fn parts_mut(&mut self) -> (&mut TaskManager, &mut World) {
        (&mut self.task_manager, &mut self.world)
    }

    #[inline]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}
