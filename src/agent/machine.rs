//! Per-agent update loop: energy, transitions, motion.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::config::{PowerConfig, SimConfig};
use crate::core::{Point2D, Pose2D};
use crate::energy::{Battery, CalendarContext, ChargeProfile, DifferentialDrive, MotorCommand, Velocity2D};
use crate::error::BatteryError;
use crate::ids::AgentId;
use crate::navmesh::NavMesh;
use crate::resources::ResourceRegistry;
use crate::tasks::{Task, TaskTarget};

use super::controller::MotionController;
use super::state::{AgentSnapshot, AgentState, Effect, transition};

/// What the caller must follow up on after an update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepOutcome {
    /// Task dropped by the agent whose resources still need releasing
    pub released_task: Option<Task>,
}

/// A mobile agent.
#[derive(Clone, Debug)]
pub struct Agent {
    pub id: AgentId,
    pose: Pose2D,
    velocity: Velocity2D,
    battery: Battery,
    state: AgentState,
    task: Option<Task>,
    route: VecDeque<Point2D>,
    spawn: Point2D,
    last_command: MotorCommand,
    drive: DifferentialDrive,
    controller: MotionController,
    power: PowerConfig,
}

impl Agent {
    /// Agent at `pose` with `soc` percent charge. The spawn point is the initial position.
    pub fn new(id: AgentId, pose: Pose2D, soc: f64, config: &SimConfig, profile: Arc<ChargeProfile>) -> Self {
        Self {
            id,
            pose,
            velocity: Velocity2D::default(),
            battery: Battery::new(config.battery.capacity_wh, soc, profile),
            state: AgentState::Idle,
            task: None,
            route: VecDeque::new(),
            spawn: pose.position(),
            last_command: MotorCommand::STOP,
            drive: DifferentialDrive::from_config(&config.robot),
            controller: MotionController::from_config(&config.robot, &config.tolerance),
            power: config.power.clone(),
        }
    }

    #[inline]
    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    #[inline]
    pub fn position(&self) -> Point2D {
        self.pose.position()
    }

    #[inline]
    pub fn velocity(&self) -> Velocity2D {
        self.velocity
    }

    #[inline]
    pub fn battery(&self) -> &Battery {
        &self.battery
    }

    #[inline]
    pub fn battery_mut(&mut self) -> &mut Battery {
        &mut self.battery
    }

    #[inline]
    pub fn soc(&self) -> f64 {
        self.battery.soc()
    }

    #[inline]
    pub fn state(&self) -> AgentState {
        self.state
    }

    #[inline]
    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    /// Remaining route waypoints.
    pub fn route(&self) -> impl Iterator<Item = &Point2D> {
        self.route.iter()
    }

    #[inline]
    pub fn spawn(&self) -> Point2D {
        self.spawn
    }

    #[inline]
    pub fn last_command(&self) -> MotorCommand {
        self.last_command
    }

    /// Distance and facing tolerances of this agent.
    #[inline]
    pub fn controller(&self) -> &MotionController {
        &self.controller
    }

    /// Task target reached within tolerance.
    pub fn at_target(&self) -> bool {
        self.task
            .as_ref()
            .is_some_and(|t| self.controller.reached(&self.pose, t.position, t.facing))
    }

    /// Install a task and plan a route to it.
    pub fn on_task_assigned(&mut self, task: Task, navmesh: &NavMesh) {
        tracing::debug!("[Agent {}] assigned {}", self.id, task);
        self.task = Some(task);
        self.plan_route(navmesh);
    }

    /// Drop the current task without touching its resources.
    pub fn clear_task(&mut self) -> Option<Task> {
        self.route.clear();
        self.task.take()
    }

    /// Move the current task's target, replanning if travelling.
    pub fn retarget(&mut self, position: Point2D, navmesh: &NavMesh) {
        let Some(task) = self.task.as_mut() else {
            return;
        };
        task.position = position;
        tracing::debug!(
            "[Agent {}] {} moved to ({:.2}, {:.2})",
            self.id,
            task.id,
            position.x,
            position.y
        );
        if self.state == AgentState::Travel {
            self.plan_route(navmesh);
        }
    }

    /// Advance the agent by `dt` seconds.
    ///
    /// Fails only on battery curve defects.
    pub fn update(
        &mut self,
        dt: f64,
        calendar: &CalendarContext,
        navmesh: &NavMesh,
        registry: &mut ResourceRegistry,
    ) -> Result<StepOutcome, BatteryError> {
        let mut outcome = StepOutcome::default();

        self.account_energy(dt, calendar)?;

        let snapshot = self.snapshot(registry);
        let step = transition(self.state, &snapshot);
        for effect in &step.effects {
            match *effect {
                Effect::ComputeRoute => self.plan_route(navmesh),
                Effect::ClearRoute => self.route.clear(),
                Effect::AdvanceCrop(crop) => {
                    registry.work_crop(crop);
                }
                Effect::CompleteTask => {
                    if let Some(task) = self.task.take() {
                        tracing::debug!("[Agent {}] completed {}", self.id, task);
                    }
                }
                Effect::ReleaseTask => outcome.released_task = self.clear_task(),
            }
        }
        self.enter(step.next);

        if self.state.is_discharged() {
            self.last_command = MotorCommand::STOP;
            self.velocity = Velocity2D::default();
            return Ok(outcome);
        }

        self.last_command = self.motion_command();
        let (pose, velocity) = self.drive.integrate(self.pose, self.last_command, dt);
        self.pose = pose;
        self.velocity = velocity;

        Ok(outcome)
    }

    fn account_energy(&mut self, dt: f64, calendar: &CalendarContext) -> Result<(), BatteryError> {
        let power = match self.state {
            AgentState::Idle => self.power.idle_w,
            AgentState::Travel => {
                self.power.travel_w * self.velocity.linear.abs() / self.drive.max_forward_velocity
            }
            AgentState::WorkScan { .. } => self.power.work_scan_w,
            AgentState::WorkProcess { .. } => self.power.work_process_w,
            AgentState::Charging { .. } => return self.battery.charge(dt, calendar.month),
            AgentState::Discharged => return Ok(()),
        };
        self.battery.discharge(power, dt);
        Ok(())
    }

    fn snapshot(&self, registry: &ResourceRegistry) -> AgentSnapshot {
        let target = self.task.as_ref().map(|t| t.target);
        let crop_state = target
            .and_then(|t| t.crop())
            .and_then(|c| registry.crop(c))
            .map(|c| c.state());
        let queue_head = match target {
            Some(TaskTarget::Station(s)) => registry.station(s).is_some_and(|st| st.is_head(self.id)),
            _ => false,
        };
        AgentSnapshot {
            soc: self.battery.soc(),
            task: target,
            at_target: self.at_target(),
            crop_state,
            queue_head,
        }
    }

    fn enter(&mut self, next: AgentState) {
        if next == self.state {
            return;
        }
        match next {
            AgentState::Discharged => tracing::info!(
                "[Agent {}] discharged at ({:.2}, {:.2})",
                self.id,
                self.pose.x,
                self.pose.y
            ),
            AgentState::Charging { station } => tracing::info!(
                "[Agent {}] charging at {} ({:.1}%)",
                self.id,
                station,
                self.battery.soc()
            ),
            _ => tracing::debug!(
                "[Agent {}] {} -> {}",
                self.id,
                self.state.name(),
                next.name()
            ),
        }
        self.state = next;
    }

    fn plan_route(&mut self, navmesh: &NavMesh) {
        self.route.clear();
        let Some(task) = &self.task else {
            return;
        };
        match navmesh.find_shortest_path(self.pose.position(), task.position) {
            Ok(path) => self.route.extend(path.points),
            Err(e) => tracing::warn!("[Agent {}] {}; heading straight for target", self.id, e),
        }
    }

    fn motion_command(&mut self) -> MotorCommand {
        if self.state != AgentState::Travel {
            return MotorCommand::STOP;
        }
        let Some(task) = &self.task else {
            return MotorCommand::STOP;
        };

        while let Some(next) = self.route.front() {
            if next.distance(&self.pose.position()) <= self.controller.distance_tolerance {
                self.route.pop_front();
            } else {
                break;
            }
        }

        self.controller
            .command(&self.pose, self.route.front().copied(), task.position, task.facing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NavmeshConfig;
    use crate::ids::{RowId, StationId};
    use crate::tasks::TaskId;

    fn navmesh() -> NavMesh {
        let boundary = [
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(0.0, 10.0),
        ];
        NavMesh::build(&boundary, &[], &[], &NavmeshConfig::default()).unwrap()
    }

    fn agent(soc: f64) -> Agent {
        let config = SimConfig::default();
        let profile = Arc::new(
            ChargeProfile::generated(
                config.battery.capacity_wh,
                config.battery.winter_full_charge_s,
                config.battery.summer_full_charge_s,
            )
            .unwrap(),
        );
        Agent::new(AgentId(0), Pose2D::new(1.0, 1.0, 0.0), soc, &config, profile)
    }

    fn spawn_task(position: Point2D) -> Task {
        Task::new(TaskId(0), AgentId(0), TaskTarget::Spawn, position, None)
    }

    #[test]
    fn test_travels_to_target_and_completes() {
        let mesh = navmesh();
        let mut registry = ResourceRegistry::new();
        let mut a = agent(90.0);
        a.on_task_assigned(spawn_task(Point2D::new(6.0, 4.0)), &mesh);

        let calendar = CalendarContext::new(1);
        for _ in 0..600 {
            a.update(0.1, &calendar, &mesh, &mut registry).unwrap();
            if a.task().is_none() {
                break;
            }
        }
        assert!(a.task().is_none());
        assert_eq!(a.state(), AgentState::Idle);
        assert!(a.position().distance(&Point2D::new(6.0, 4.0)) <= 0.05);
        assert!(a.soc() < 90.0);
    }

    #[test]
    fn test_discharge_freezes_agent() {
        let mesh = navmesh();
        let mut registry = ResourceRegistry::new();
        let mut a = agent(90.0);
        a.on_task_assigned(spawn_task(Point2D::new(9.0, 9.0)), &mesh);

        let calendar = CalendarContext::new(1);
        for _ in 0..5 {
            a.update(0.1, &calendar, &mesh, &mut registry).unwrap();
        }
        a.battery_mut().set_soc(0.0);
        let outcome = a.update(0.1, &calendar, &mesh, &mut registry).unwrap();
        assert_eq!(a.state(), AgentState::Discharged);
        assert!(a.task().is_none());
        assert!(outcome.released_task.is_some());

        let frozen = a.pose();
        for _ in 0..10 {
            a.update(0.1, &calendar, &mesh, &mut registry).unwrap();
        }
        assert_eq!(a.pose(), frozen);
        assert_eq!(a.velocity(), Velocity2D::default());
    }

    #[test]
    fn test_works_crop_to_completion() {
        let mesh = navmesh();
        let mut registry = ResourceRegistry::new();
        let row = registry.add_row(&[Point2D::new(1.0, 1.0)], 2, 3);
        let mut a = agent(90.0);
        let crop = registry.row(row).unwrap().crops[0];
        a.on_task_assigned(
            Task::new(
                TaskId(0),
                AgentId(0),
                TaskTarget::Crop { crop, row: RowId(0) },
                Point2D::new(1.0, 1.0),
                None,
            ),
            &mesh,
        );

        let calendar = CalendarContext::new(6);
        let mut states = Vec::new();
        for _ in 0..10 {
            a.update(0.1, &calendar, &mesh, &mut registry).unwrap();
            states.push(a.state());
        }
        assert_eq!(states[0], AgentState::WorkScan { crop });
        assert!(registry.crop(crop).unwrap().is_processed());
        assert!(registry.row(row).unwrap().is_processed());
        assert_eq!(a.state(), AgentState::Idle);
        assert!(a.task().is_none());
    }

    #[test]
    fn test_waits_behind_queue_head() {
        let mesh = navmesh();
        let mut registry = ResourceRegistry::new();
        let station = registry.add_station(Point2D::new(1.0, 0.0), Point2D::new(0.0, 1.0), 1.0);
        let st = registry.station_mut(station).unwrap();
        st.request_charge(AgentId(7));
        let slot = st.request_charge(AgentId(0));
        assert_eq!(slot, Point2D::new(1.0, 1.0));

        let mut a = agent(30.0);
        let heading = registry.station(StationId(0)).unwrap().agent_heading();
        a.on_task_assigned(
            Task::new(TaskId(1), AgentId(0), TaskTarget::Station(station), slot, Some(heading)),
            &mesh,
        );

        let calendar = CalendarContext::new(1);
        for _ in 0..200 {
            a.update(0.1, &calendar, &mesh, &mut registry).unwrap();
        }
        assert_eq!(a.state(), AgentState::Idle);
        assert!(a.at_target());
        assert!(a.task().is_some());
    }
}
